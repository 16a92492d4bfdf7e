pub(crate) mod batch;
pub(crate) mod glance;
pub(crate) mod swiftui;
pub(crate) mod writer;

use crate::foundation::core::CompiledPlatform;
use crate::foundation::error::WidgetResult;
use crate::layout::model::WidgetLayout;
use crate::style::config::StyleConfig;

/// Name written into generated headers.
pub const GENERATOR_NAME: &str = "widgetc";
/// Version written into generated headers.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Package of generated Kotlin files unless overridden.
pub const DEFAULT_KOTLIN_PACKAGE: &str = "com.akylas.weather.widgets.generated";

/// Knobs of the source generators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Kotlin package declaration of Glance files.
    pub kotlin_package: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            kotlin_package: DEFAULT_KOTLIN_PACKAGE.to_string(),
        }
    }
}

/// One generated source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// File name without directory.
    pub file_name: String,
    /// Full file contents.
    pub contents: String,
}

/// File name a widget generates to on `platform`.
pub fn output_file_name(widget: &str, platform: CompiledPlatform) -> String {
    match platform {
        CompiledPlatform::Glance => format!("{widget}Content.generated.kt"),
        CompiledPlatform::SwiftUi => format!("{widget}View.generated.swift"),
    }
}

/// Generate the source file of one widget for one compiled platform.
///
/// Output is a pure function of the layout, platform, configuration and generator version.
/// Errors carry the widget name.
#[tracing::instrument(skip_all, fields(widget = %layout.name, platform = %platform.platform()))]
pub fn generate(
    layout: &WidgetLayout,
    platform: CompiledPlatform,
    config: &StyleConfig,
    options: &GeneratorOptions,
) -> WidgetResult<SourceFile> {
    let contents = match platform {
        CompiledPlatform::Glance => glance::generate_glance(layout, config, options),
        CompiledPlatform::SwiftUi => swiftui::generate_swiftui(layout, config),
    }
    .map_err(|e| e.in_widget(layout.name.clone()))?;
    tracing::debug!(bytes = contents.len(), "generated source");
    Ok(SourceFile {
        file_name: output_file_name(&layout.name, platform),
        contents,
    })
}

/// Comment lines opening every generated file.
pub(crate) fn header_lines(layout: &WidgetLayout) -> [String; 3] {
    [
        format!(
            "// Auto-generated from {}.json - DO NOT EDIT MANUALLY",
            layout.name
        ),
        format!("// Generator: {GENERATOR_NAME} {GENERATOR_VERSION}"),
        format!("// Layout fingerprint: {:016x}", layout.fingerprint),
    ]
}

/// Floating point literal that always carries a decimal point; negatives are parenthesized.
pub(crate) fn number_literal(x: f64) -> String {
    let body = if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}.0", x.abs() as i64)
    } else {
        let s = format!("{}", x.abs());
        if s.contains('.') { s } else { format!("{s}.0") }
    };
    if x.is_sign_negative() && x != 0.0 {
        format!("(-{body})")
    } else {
        body
    }
}

/// `s` when it is already a single operand (number, or fully parenthesized), else `(s)`.
pub(crate) fn group(s: &str) -> String {
    if s.parse::<f64>().is_ok() || fully_wrapped(s) {
        s.to_string()
    } else {
        format!("({s})")
    }
}

fn fully_wrapped(s: &str) -> bool {
    if !s.starts_with('(') || !s.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_str {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_str = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_str = true,
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i + 1 != s.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// `small-wide` -> `SmallWide`.
pub(crate) fn pascal(id: &str) -> String {
    let mut out = String::new();
    let mut upper = true;
    for c in id.chars() {
        if !c.is_ascii_alphanumeric() {
            upper = true;
            continue;
        }
        if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Layout context of the element being emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Parent {
    Column,
    Row,
    Other,
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/mod.rs"]
mod tests;
