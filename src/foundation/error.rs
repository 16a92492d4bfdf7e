use crate::foundation::core::Platform;
use crate::foundation::path::JsonPath;

/// Crate-wide result alias.
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Errors produced while loading, compiling, generating or rendering a widget layout.
#[derive(thiserror::Error, Debug)]
pub enum WidgetError {
    /// The layout JSON is malformed or violates the layout schema.
    #[error("schema error at {path}: {reason}")]
    Schema {
        /// JSON path of the offending node.
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// An expression does not type-check or has the wrong number of operands.
    #[error("expression type error at {path}: {message}")]
    ExpressionType {
        /// JSON path of the offending expression node.
        path: String,
        /// Human-readable reason.
        message: String,
    },

    /// An expression names an operator outside the closed operator set.
    #[error("unsupported operator at {path}: '{operator}'")]
    UnsupportedOperator {
        /// JSON path of the offending expression node.
        path: String,
        /// Operator name as written in the layout.
        operator: String,
    },

    /// An alignment keyword has no mapping for the target platform.
    #[error("unsupported alignment at {path}: '{keyword}' has no {platform} mapping")]
    UnsupportedAlignment {
        /// JSON path of the alignment property.
        path: String,
        /// Keyword as written in the layout.
        keyword: String,
        /// Platform being compiled.
        platform: Platform,
    },

    /// A color literal is neither a theme token, a hex color nor a known color name.
    #[error("invalid color at {path}: '{value}'")]
    InvalidColor {
        /// JSON path of the color value.
        path: String,
        /// The rejected value.
        value: String,
    },

    /// A binding did not resolve against the data context (render time only).
    #[error("missing binding: {binding}")]
    MissingBinding {
        /// The unresolved binding path.
        binding: String,
    },

    /// The style configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// An error scoped to one widget of a batch.
    #[error("widget '{widget}': {source}")]
    Widget {
        /// Widget name.
        widget: String,
        /// Underlying error.
        #[source]
        source: Box<WidgetError>,
    },

    /// Lower-level failure (I/O and similar).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WidgetError {
    /// Build a [`WidgetError::Schema`].
    pub fn schema(path: &JsonPath, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Build a [`WidgetError::ExpressionType`].
    pub fn expression_type(path: &JsonPath, message: impl Into<String>) -> Self {
        Self::ExpressionType {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Build a [`WidgetError::UnsupportedOperator`].
    pub fn unsupported_operator(path: &JsonPath, operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            path: path.to_string(),
            operator: operator.into(),
        }
    }

    /// Build a [`WidgetError::UnsupportedAlignment`].
    pub fn unsupported_alignment(
        path: &JsonPath,
        keyword: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self::UnsupportedAlignment {
            path: path.to_string(),
            keyword: keyword.into(),
            platform,
        }
    }

    /// Build a [`WidgetError::InvalidColor`].
    pub fn invalid_color(path: &JsonPath, value: impl Into<String>) -> Self {
        Self::InvalidColor {
            path: path.to_string(),
            value: value.into(),
        }
    }

    /// Build a [`WidgetError::MissingBinding`].
    pub fn missing_binding(binding: impl Into<String>) -> Self {
        Self::MissingBinding {
            binding: binding.into(),
        }
    }

    /// Build a [`WidgetError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach the widget name. Already-scoped errors are returned unchanged.
    pub fn in_widget(self, widget: impl Into<String>) -> Self {
        match self {
            Self::Widget { .. } => self,
            other => Self::Widget {
                widget: widget.into(),
                source: Box::new(other),
            },
        }
    }

    /// The error without any widget scoping.
    pub fn root(&self) -> &WidgetError {
        match self {
            Self::Widget { source, .. } => source.root(),
            other => other,
        }
    }

    /// JSON path carried by compile-time errors.
    pub fn path(&self) -> Option<&str> {
        match self.root() {
            Self::Schema { path, .. }
            | Self::ExpressionType { path, .. }
            | Self::UnsupportedOperator { path, .. }
            | Self::UnsupportedAlignment { path, .. }
            | Self::InvalidColor { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
