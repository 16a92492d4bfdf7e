use super::*;

#[test]
fn builtin_is_total() {
    let cfg = StyleConfig::builtin();
    cfg.validate().unwrap();
    for p in Platform::ALL {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            for kw in AlignKeyword::ALL {
                assert!(cfg.alignment(p, axis, kw).is_some(), "{p} {axis:?} {kw:?}");
            }
        }
        for w in FontWeight::ALL {
            assert!(cfg.font_weight(p, w).is_some());
        }
    }
}

#[test]
fn builtin_constants() {
    let cfg = StyleConfig::builtin();
    assert_eq!(
        cfg.alignment(Platform::Glance, Axis::Horizontal, AlignKeyword::Center),
        Some("Alignment.Horizontal.CenterHorizontally")
    );
    assert_eq!(
        cfg.alignment(Platform::NativeScript, Axis::Vertical, AlignKeyword::Center),
        Some("middle")
    );
    assert_eq!(cfg.text_align(Platform::SwiftUi, AlignKeyword::End), Some(".trailing"));
    assert_eq!(cfg.font_weight(Platform::Html, FontWeight::Bold), Some("700"));
    assert_eq!(
        cfg.theme_color(Platform::SwiftUi, "@primary").map(|c| c.argb()),
        Some(0xFFD0BCFF)
    );
    assert_eq!(cfg.theme_color(Platform::SwiftUi, "red"), None);
    assert_eq!(
        cfg.resolve_color(Platform::Html, "red"),
        Some(Rgba::new(255, 0, 0, 255))
    );
}

#[test]
fn keyword_synonyms() {
    assert_eq!(AlignKeyword::from_name("leading"), Some(AlignKeyword::Start));
    assert_eq!(AlignKeyword::from_name("bottom"), Some(AlignKeyword::End));
    assert_eq!(AlignKeyword::from_name("middle"), None);
    assert_eq!(FontWeight::from_name("regular"), Some(FontWeight::Normal));
    assert_eq!(FontWeight::from_name("heavy"), None);
}

#[test]
fn overlay_on_builtin() {
    let cfg = StyleConfig::from_json(
        r##"{
            "extends": "builtin",
            "palettes": {"glance": {"primary": "#112233"}},
            "fontWeights": {"html": {"bold": "800"}}
        }"##,
    )
    .unwrap();
    assert_eq!(
        cfg.theme_color(Platform::Glance, "primary"),
        Some(Rgba::new(0x11, 0x22, 0x33, 255))
    );
    assert_eq!(
        cfg.theme_color(Platform::SwiftUi, "primary"),
        Some(Rgba::new(0xD0, 0xBC, 0xFF, 255))
    );
    assert_eq!(cfg.font_weight(Platform::Html, FontWeight::Bold), Some("800"));
}

#[test]
fn incomplete_tables_are_rejected() {
    let err = StyleConfig::from_json(r#"{"palettes": {}}"#).unwrap_err();
    assert!(err.to_string().contains("alignment table has no glance"));

    let err = StyleConfig::from_json(
        r#"{"extends": "builtin", "palettes": {"html": {"x": "nope"}}}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("invalid color 'nope'"));

    let err = StyleConfig::from_json(r#"{"extends": "other"}"#).unwrap_err();
    assert!(err.to_string().contains("unknown base configuration"));

    let err = StyleConfig::from_json(r#"{"colours": {}}"#).unwrap_err();
    assert!(matches!(err, WidgetError::Config(_)));
}

#[test]
fn missing_file_is_an_error() {
    let err = StyleConfig::from_path(Path::new("/nonexistent/style.json")).unwrap_err();
    assert!(format!("{err:#}").contains("read style config"));
}
