use crate::expression::value::number_to_string;
use crate::foundation::core::{InterpretedPlatform, Platform, Rgba, Size};
use crate::foundation::error::WidgetResult;
use crate::layout::model::WidgetLayout;
use crate::render::context::DataContext;
use crate::render::renderer::Renderer;
use crate::style::config::StyleConfig;
use std::sync::Arc;

/// Standalone HTML page showing `layout` rendered against `ctx` at `size`.
///
/// The widget sits in a fixed-size frame painted with the theme's `widgetBackground`; the
/// context is embedded as JSON for inspection.
#[tracing::instrument(skip_all, fields(widget = %layout.name))]
pub fn preview_page(
    layout: &WidgetLayout,
    ctx: &DataContext,
    size: Size,
    config: &StyleConfig,
) -> WidgetResult<String> {
    let renderer = Renderer::new(InterpretedPlatform::Html, Arc::new(config.clone()));
    let handle = renderer.render(layout.clone(), ctx, size)?;
    for missing in handle.missing_bindings() {
        tracing::warn!(error = %missing, "preview data is incomplete");
    }
    let body = handle.backend().to_html(handle.root());

    let theme = |token: &str, fallback: Rgba| {
        config
            .theme_color(Platform::Html, token)
            .unwrap_or(fallback)
            .to_hex()
    };
    let background = theme("widgetBackground", Rgba::new(0x1C, 0x1B, 0x1F, 0xFF));
    let foreground = theme("onSurface", Rgba::new(0xE6, 0xE1, 0xE5, 0xFF));
    let data = serde_json::to_string_pretty(ctx)
        .map_err(anyhow::Error::from)?
        .replace("</", "<\\/");

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{} preview</title>\n", escape_text(&layout.display_name)));
    out.push_str("<style>\n");
    out.push_str(
        "body { margin: 0; padding: 24px; background: #101014; \
         font-family: system-ui, sans-serif; }\n",
    );
    out.push_str(&format!(
        ".widget {{ width: {}px; height: {}px; overflow: hidden; box-sizing: border-box; \
         border-radius: 16px; background: {background}; color: {foreground}; }}\n",
        number_to_string(size.width),
        number_to_string(size.height),
    ));
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!(
        "<div class=\"widget\" data-widget=\"{}\">\n",
        escape_text(&layout.name)
    ));
    out.push_str(&body);
    out.push_str("</div>\n");
    out.push_str("<script type=\"application/json\" id=\"widget-context\">\n");
    out.push_str(&data);
    out.push_str("\n</script>\n</body>\n</html>\n");
    Ok(out)
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[path = "../../tests/unit/render/html.rs"]
mod tests;
