use super::*;
use crate::expression::parser::parse_expr;
use crate::foundation::path::JsonPath;
use crate::layout::parse::parse_layout_value;
use serde_json::json;

fn widget(root: serde_json::Value, sizes: serde_json::Value) -> WidgetLayout {
    parse_layout_value(&json!({
        "name": "Weather",
        "supportedSizes": sizes,
        "defaultPadding": 8,
        "layout": root,
    }))
    .unwrap()
}

fn swift(root: serde_json::Value) -> String {
    let sizes = json!([
        {"id": "small", "width": 110, "height": 110},
        {"id": "medium", "width": 250, "height": 110}
    ]);
    generate_swiftui(&widget(root, sizes), &StyleConfig::builtin()).unwrap()
}

fn expr(emitter: &mut SwiftEmitter, v: serde_json::Value, ty: ExprType) -> String {
    let config = StyleConfig::builtin();
    let env = CompileEnv {
        config: &config,
        platform: Platform::SwiftUi,
        size: Size::new(250.0, 110.0),
    };
    let path = JsonPath::root().field("p");
    let e = parse_expr(&v, &path).unwrap();
    compile_property_value(&PropertyValue::Expression(e), ty, emitter, env, &path)
        .unwrap()
        .value
}

#[test]
fn swift_strings_escape_quotes_and_controls() {
    assert_eq!(swift_string("a\"b\\"), r#""a\"b\\""#);
    assert_eq!(swift_string("$x\t"), r#""$x\t""#);
}

#[test]
fn bindings_use_nil_coalescing() {
    let mut e = SwiftEmitter::new();
    assert_eq!(
        expr(&mut e, json!(["get", "item.temperature"]), ExprType::String),
        r#"(asText(lookup(data, "temperature")) ?? "")"#
    );
    assert_eq!(
        expr(&mut e, json!(["get", "item.hourly.2.temp"]), ExprType::Number),
        r#"(asNumber(lookup(data, "hourly", 2, "temp")) ?? 0.0)"#
    );
    assert_eq!(e.helpers(), vec!["lookup", "str", "asNumber", "asText"]);
}

#[test]
fn substring_and_date_format_call_helpers() {
    let mut e = SwiftEmitter::new();
    assert_eq!(
        expr(&mut e, json!(["substring", "Sunday", 0, 3]), ExprType::String),
        r#"substr("Sunday", 0.0, 3.0)"#
    );
    assert_eq!(
        expr(&mut e, json!(["substring", "Sunday", 3]), ExprType::String),
        r#"substr("Sunday", 3.0, nil)"#
    );
    assert_eq!(
        expr(&mut e, json!(["format", ["get", "item.dt"], "h:mm a"]), ExprType::String),
        r#"formatDate(lookup(data, "dt"), "h:mm a")"#
    );
    assert_eq!(e.helpers(), vec!["lookup", "str", "substr", "formatDate"]);

    let src = swift(json!({"type": "label", "text": ["format", ["get", "item.dt"], "HH:mm"]}));
    assert!(src.contains("fileprivate func formatDate(_ v: Any?, _ pattern: String) -> String {"));
    assert!(src.contains("f.timeZone = TimeZone(identifier: \"UTC\")"));
    assert!(src.contains("NSDecimalNumber(string: String(d)).stringValue"));
}

#[test]
fn case_becomes_nested_ternaries() {
    let mut e = SwiftEmitter::new();
    assert_eq!(
        expr(
            &mut e,
            json!(["case", [">=", ["get", "size.width"], 200], 48, 32]),
            ExprType::Number
        ),
        "((250.0 >= 200.0) ? 48.0 : 32.0)"
    );
}

#[test]
fn remainder_uses_truncating_remainder() {
    let mut e = SwiftEmitter::new();
    assert_eq!(
        expr(&mut e, json!(["%", 7, 2]), ExprType::Number),
        "7.0.truncatingRemainder(dividingBy: 2.0)"
    );
}

#[test]
fn colors_go_through_color_hex() {
    let mut e = SwiftEmitter::new();
    assert_eq!(
        expr(&mut e, json!(["theme-color", "primary"]), ExprType::Color),
        "colorHex(0xFFD0BCFF)"
    );
    assert_eq!(e.helpers(), vec!["colorHex"]);
}

#[test]
fn body_switches_on_geometry_size() {
    let src = swift(json!({"type": "label", "text": "hi"}));
    assert!(src.contains("struct WeatherView: View {"));
    assert!(src.contains("GeometryReader { geo in"));
    assert!(src.contains(
        "        if size.width >= 250.0 && size.height >= 110.0 {\n            sizeMedium\n        } else {\n            sizeSmall\n        }\n"
    ));
    assert!(src.contains("private var sizeSmall: some View {"));
    assert!(src.contains("\nimport SwiftUI\n"));
}

#[test]
fn single_size_needs_no_branch() {
    let w = widget(
        json!({"type": "label", "text": "hi"}),
        json!([{"id": "small", "width": 110, "height": 110}]),
    );
    let src = generate_swiftui(&w, &StyleConfig::builtin()).unwrap();
    assert!(!src.contains("if size.width"));
    assert!(src.contains("        sizeSmall\n"));
}

#[test]
fn modifiers_trail_the_view() {
    let src = swift(json!({
        "type": "label",
        "text": "hi",
        "fontSize": 14,
        "fontWeight": "bold",
        "color": "@primary"
    }));
    assert!(src.contains(
        "        Text(\"hi\")\n            .font(.system(size: 14.0, weight: .bold))\n            .foregroundColor(colorHex(0xFFD0BCFF))\n"
    ));
    assert!(src.contains("            .padding(8.0)\n"));
}

#[test]
fn root_padding_replaces_default_padding() {
    let src = swift(json!({"type": "column", "padding": 2, "children": []}));
    assert!(src.contains(".padding(2.0)"));
    assert!(!src.contains(".padding(8.0)"));
}

#[test]
fn stacks_carry_alignment_and_spacing() {
    let src = swift(json!({
        "type": "column",
        "alignment": "center",
        "spacing": 4,
        "children": [
            {"type": "row", "children": [{"type": "label", "text": "a"}]}
        ]
    }));
    assert!(src.contains("VStack(alignment: .center, spacing: 4.0) {"));
    assert!(src.contains("HStack(alignment: .top, spacing: 0) {"));
}

#[test]
fn for_each_enumerates_limited_items() {
    let src = swift(json!({
        "type": "forEach",
        "items": "item.hourly",
        "direction": "horizontal",
        "limit": 6,
        "spacing": 8,
        "itemTemplate": {"type": "label", "text": "item.time"}
    }));
    assert!(src.contains("HStack(alignment: .top, spacing: 8.0) {"));
    assert!(src.contains(
        r#"ForEach(Array(items(lookup(data, "hourly")).prefix(6).enumerated()), id: \.offset) { index1, item1 in"#
    ));
    assert!(src.contains(r#"lookup(item1, "time")"#));
}

#[test]
fn visibility_wraps_the_view_in_if() {
    let src = swift(json!({
        "type": "label",
        "text": "hi",
        "visible": ["get", "item.show"]
    }));
    assert!(src.contains(r#"if (asFlag(lookup(data, "show")) ?? false) {"#));
    assert!(src.contains("fileprivate func asFlag("));
    assert!(src.contains("fileprivate func truthy("));
}

#[test]
fn spacers_size_along_the_parent_axis() {
    let src = swift(json!({
        "type": "row",
        "children": [
            {"type": "spacer", "size": 6},
            {"type": "spacer"},
            {"type": "divider"}
        ]
    }));
    assert!(src.contains("Color.clear\n"));
    assert!(src.contains(".frame(width: 6.0)"));
    assert!(src.contains("Spacer()\n"));
    assert!(src.contains(".frame(width: 1.0)"));
}

#[test]
fn output_is_deterministic() {
    let root = json!({
        "type": "column",
        "children": [
            {"type": "label", "text": ["upcase", ["get", "item.city"]]},
            {"type": "image", "src": "item.icon", "size": 24}
        ]
    });
    assert_eq!(swift(root.clone()), swift(root));
}
