use super::*;

#[test]
fn display_prefixes_are_stable() {
    let p = JsonPath::root().field("layout");
    assert!(
        WidgetError::schema(&p, "x")
            .to_string()
            .starts_with("schema error at $.layout:")
    );
    assert!(
        WidgetError::expression_type(&p, "x")
            .to_string()
            .contains("expression type error at $.layout")
    );
    assert!(
        WidgetError::unsupported_operator(&p, "pow")
            .to_string()
            .contains("'pow'")
    );
    assert!(
        WidgetError::unsupported_alignment(&p, "middle", Platform::Glance)
            .to_string()
            .contains("no glance mapping")
    );
    assert!(
        WidgetError::invalid_color(&p, "not-a-color")
            .to_string()
            .contains("invalid color at $.layout: 'not-a-color'")
    );
    assert!(
        WidgetError::missing_binding("item.x")
            .to_string()
            .contains("missing binding: item.x")
    );
    assert!(WidgetError::config("x").to_string().contains("config error:"));
}

#[test]
fn widget_scope_wraps_once_and_keeps_path() {
    let p = JsonPath::root().field("layout").field("color");
    let err = WidgetError::invalid_color(&p, "nope")
        .in_widget("Clock")
        .in_widget("Other");
    assert!(err.to_string().starts_with("widget 'Clock':"));
    assert!(matches!(err.root(), WidgetError::InvalidColor { .. }));
    assert_eq!(err.path(), Some("$.layout.color"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WidgetError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.path(), None);
}
