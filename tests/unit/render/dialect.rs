use super::*;
use crate::foundation::core::Rgba;

fn ns() -> Dialect {
    Dialect::new(InterpretedPlatform::NativeScript)
}

fn html() -> Dialect {
    Dialect::new(InterpretedPlatform::Html)
}

#[test]
fn tags() {
    assert_eq!(ns().tag(ElementKind::Stack), "GridLayout");
    assert_eq!(ns().tag(ElementKind::ForEach), "StackLayout");
    assert_eq!(ns().tag(ElementKind::Conditional), "ContentView");
    assert_eq!(html().tag(ElementKind::Label), "span");
    assert_eq!(html().tag(ElementKind::Image), "img");
    assert_eq!(html().tag(ElementKind::ScrollView), "div");
    assert_eq!(ns().platform(), Platform::NativeScript);
}

#[test]
fn encodings() {
    let cfg = StyleConfig::builtin();
    assert_eq!(ns().encode(Encoding::Number, &Value::Number(4.0), &cfg).as_deref(), Some("4"));
    assert_eq!(html().encode(Encoding::Px, &Value::Number(4.5), &cfg).as_deref(), Some("4.5px"));
    assert_eq!(ns().encode(Encoding::Number, &Value::String("x".into()), &cfg), None);
    assert_eq!(
        ns().encode(Encoding::Color, &Value::Color(Rgba::new(0, 0, 0, 0x80)), &cfg)
            .as_deref(),
        Some("#00000080")
    );
    assert_eq!(
        html().encode(Encoding::Color, &Value::String("red".into()), &cfg).as_deref(),
        Some("#FF0000")
    );
    assert_eq!(
        ns().encode(Encoding::FontWeight, &Value::Bool(true), &cfg).as_deref(),
        Some("bold")
    );
    assert_eq!(
        html().encode(Encoding::FontWeight, &Value::String("medium".into()), &cfg).as_deref(),
        Some("500")
    );
    assert_eq!(html().encode(Encoding::FontWeight, &Value::Number(3.0), &cfg), None);
    assert_eq!(
        ns().encode(Encoding::Visibility, &Value::Null, &cfg).as_deref(),
        Some("collapse")
    );
    assert_eq!(html().encode(Encoding::Hidden, &Value::Bool(true), &cfg), None);
    assert_eq!(
        html().encode(Encoding::Hidden, &Value::Bool(false), &cfg).as_deref(),
        Some("")
    );
    assert!(Encoding::Hidden.is_flag() && !Encoding::Text.is_flag());
}

#[test]
fn style_outputs_depend_on_kind() {
    let (names, enc) = ns().style_outputs(StyleAttr::Color, ElementKind::Image);
    assert_eq!((names, enc), (&["tintColor"][..], Encoding::Color));
    let (names, _) = html().style_outputs(StyleAttr::Color, ElementKind::Divider);
    assert_eq!(names, ["style:background-color"]);
    let (names, enc) = html().style_outputs(StyleAttr::PaddingVertical, ElementKind::Column);
    assert_eq!(names, ["style:padding-top", "style:padding-bottom"]);
    assert_eq!(enc, Encoding::Px);
    let (names, _) = ns().style_outputs(StyleAttr::Alignment, ElementKind::Column);
    assert!(names.is_empty());
}

#[test]
fn alignment_targets() {
    assert_eq!(
        ns().alignment_prop(Flow::Vertical, Axis::Horizontal),
        ("horizontalAlignment", true)
    );
    assert_eq!(
        html().alignment_prop(Flow::Vertical, Axis::Horizontal),
        ("style:align-items", false)
    );
    assert_eq!(
        html().alignment_prop(Flow::Horizontal, Axis::Horizontal),
        ("style:justify-content", false)
    );
    assert_eq!(
        html().alignment_prop(Flow::Overlay, Axis::Horizontal),
        ("style:justify-items", false)
    );
}

#[test]
fn spacing_targets() {
    assert_eq!(
        ns().spacing(Flow::Horizontal),
        (SpacingTarget::FollowingChildren("marginLeft"), Encoding::Number)
    );
    assert_eq!(
        ns().spacing(Flow::Vertical),
        (SpacingTarget::FollowingChildren("marginTop"), Encoding::Number)
    );
    assert_eq!(
        html().spacing(Flow::Vertical),
        (SpacingTarget::Container("style:gap"), Encoding::Px)
    );
}

#[test]
fn fixed_props() {
    assert_eq!(ns().fill_prop(StyleAttr::FillWidth), ("horizontalAlignment", "stretch"));
    assert_eq!(html().fill_prop(StyleAttr::FillHeight), ("style:height", "100%"));
    assert_eq!(ns().container_props(Flow::Horizontal), [("orientation", "horizontal")]);
    assert_eq!(html().container_props(Flow::Overlay), [("style:display", "grid")]);
    assert_eq!(html().scroll_props(Flow::Vertical), [("style:overflow-y", "auto")]);
    assert!(ns().wrapper_props().is_empty());
    assert_eq!(ns().text_prop(), "text");
    assert_eq!(html().text_prop(), "textContent");
    assert_eq!(html().flexible_spacer(), Some(("style:flex", "1")));
    assert_eq!(ns().flexible_spacer(), None);
}
