use std::fmt;

/// Reserved prefix for user settings references.
pub const SETTINGS_PREFIX: &str = "config.settings.";

/// Root a binding path is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingScope {
    /// Current item: the list element inside `forEach`, the data root elsewhere.
    Item,
    /// Root data context.
    Data,
    /// Rendered canvas size (`size.width`, `size.height`).
    Size,
    /// User settings map.
    Settings,
}

/// One path step below a scope.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A scoped, segmented data path such as `item.hourly.0.temperature`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Binding {
    /// Root the path starts from.
    pub scope: BindingScope,
    /// Steps below the root, never empty.
    pub segments: Vec<Segment>,
}

impl Binding {
    /// Settings reference for `key`.
    pub fn setting(key: impl Into<String>) -> Self {
        Self {
            scope: BindingScope::Settings,
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// Parse the strict binding grammar `(item|data|size)(.segment)+`.
    ///
    /// Returns `None` for anything else, including settings references.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let scope = match parts.next()? {
            "item" => BindingScope::Item,
            "data" => BindingScope::Data,
            "size" => BindingScope::Size,
            _ => return None,
        };
        let mut segments = Vec::new();
        for p in parts {
            segments.push(parse_segment(p)?);
        }
        if segments.is_empty() {
            return None;
        }
        Some(Self { scope, segments })
    }

    /// Parse either a binding or a `config.settings.<key>` reference.
    pub fn parse_path(s: &str) -> Option<Self> {
        if let Some(key) = setting_key(s) {
            return Some(Self::setting(key));
        }
        Self::parse(s)
    }

    /// For `size.*` bindings: `true` for width, `false` for height, `None` otherwise.
    pub fn size_axis_is_width(&self) -> Option<bool> {
        if self.scope != BindingScope::Size || self.segments.len() != 1 {
            return None;
        }
        match &self.segments[0] {
            Segment::Key(k) if k == "width" => Some(true),
            Segment::Key(k) if k == "height" => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.scope {
            BindingScope::Item => "item",
            BindingScope::Data => "data",
            BindingScope::Size => "size",
            BindingScope::Settings => "config.settings",
        };
        f.write_str(root)?;
        for s in &self.segments {
            write!(f, ".{s}")?;
        }
        Ok(())
    }
}

/// Key of a `config.settings.<key>` reference.
pub fn setting_key(s: &str) -> Option<&str> {
    let key = s.strip_prefix(SETTINGS_PREFIX)?;
    is_identifier(key).then_some(key)
}

fn parse_segment(p: &str) -> Option<Segment> {
    if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) {
        return p.parse().ok().map(Segment::Index);
    }
    is_identifier(p).then(|| Segment::Key(p.to_string()))
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A piece of a `{{path}}` text template.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplatePart {
    /// Verbatim text.
    Text(String),
    /// Placeholder.
    Binding(Binding),
}

/// Split a text template into parts.
///
/// `Ok(None)` when the string has no placeholder. Placeholders hold a binding, a settings
/// reference, or a bare dotted path that is read relative to `item`.
pub fn parse_template(s: &str) -> Result<Option<Vec<TemplatePart>>, String> {
    if !s.contains("{{") {
        return Ok(None);
    }
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        if start > 0 {
            parts.push(TemplatePart::Text(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| format!("unclosed placeholder in template '{s}'"))?;
        let inner = after[..end].trim();
        let binding = Binding::parse_path(inner)
            .or_else(|| Binding::parse(&format!("item.{inner}")))
            .ok_or_else(|| format!("invalid placeholder '{{{{{inner}}}}}'"))?;
        parts.push(TemplatePart::Binding(binding));
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        parts.push(TemplatePart::Text(rest.to_string()));
    }
    Ok(Some(parts))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/binding.rs"]
mod tests;
