use super::*;
use crate::layout::parse::parse_layout_value;
use serde_json::json;

const W: f64 = 250.0;
const H: f64 = 110.0;

fn layout_with(root: serde_json::Value, padding: Option<f64>) -> WidgetLayout {
    let mut doc = json!({
        "name": "W",
        "supportedSizes": [{"id": "medium", "width": W, "height": H}],
        "layout": root,
    });
    if let Some(p) = padding {
        doc["defaultPadding"] = json!(p);
    }
    parse_layout_value(&doc).unwrap()
}

fn renderer(platform: InterpretedPlatform) -> Renderer {
    Renderer::new(platform, Arc::new(StyleConfig::builtin()))
}

fn render(
    platform: InterpretedPlatform,
    root: serde_json::Value,
    data: serde_json::Value,
) -> ViewHandle<ViewTree> {
    renderer(platform)
        .render(layout_with(root, None), &DataContext::new(data), Size::new(W, H))
        .unwrap()
}

fn child(h: &ViewHandle<ViewTree>, node: NodeId, i: usize) -> NodeId {
    h.backend().children(node)[i]
}

const NS: InterpretedPlatform = InterpretedPlatform::NativeScript;
const HTML: InterpretedPlatform = InterpretedPlatform::Html;

#[test]
fn renders_native_script_tree() {
    let h = render(
        NS,
        json!({
            "type": "column",
            "children": [{
                "type": "label",
                "text": "{{item.name}}",
                "color": "@primary",
                "fontSize": 12
            }]
        }),
        json!({"name": "Oslo"}),
    );
    let t = h.backend();
    assert_eq!(t.node(h.root()).unwrap().tag, "StackLayout");
    assert_eq!(t.property(h.root(), "orientation"), Some("vertical"));
    let label = child(&h, h.root(), 0);
    assert_eq!(t.node(label).unwrap().tag, "Label");
    assert_eq!(t.property(label, "text"), Some("Oslo"));
    assert_eq!(t.property(label, "color"), Some("#D0BCFF"));
    assert_eq!(t.property(label, "fontSize"), Some("12"));
    assert_eq!(h.bound_properties(), 1);
    assert_eq!(h.size(), Size::new(W, H));
}

#[test]
fn update_writes_only_changed_values() {
    let r = renderer(NS);
    let layout = layout_with(
        json!({
            "type": "column",
            "children": [
                {"type": "label", "text": "item.name"},
                {"type": "label", "text": ["format-number", ["get", "item.t"], "°"]}
            ]
        }),
        None,
    );
    let mut h = r
        .render(layout, &DataContext::new(json!({"name": "Oslo", "t": 21.4})), Size::new(W, H))
        .unwrap();

    let stats = r
        .update(&mut h, &DataContext::new(json!({"name": "Bergen", "t": 21.4})))
        .unwrap();
    assert_eq!(
        stats,
        UpdateStats {
            changed_paths: 1,
            evaluated: 1,
            writes: 1,
            rebuilt: 0
        }
    );
    let name = child(&h, h.root(), 0);
    assert_eq!(h.backend().property(name, "text"), Some("Bergen"));

    let stats = r
        .update(&mut h, &DataContext::new(json!({"name": "Bergen", "t": 21.3})))
        .unwrap();
    assert_eq!((stats.evaluated, stats.writes), (1, 0));

    let same = h.context().clone();
    let stats = r.update(&mut h, &same).unwrap();
    assert_eq!(stats, UpdateStats::default());
}

#[test]
fn for_each_rebuilds_only_when_count_changes() {
    let r = renderer(NS);
    let layout = layout_with(
        json!({
            "type": "column",
            "children": [{
                "type": "forEach",
                "items": "data.hourly",
                "limit": 2,
                "itemTemplate": {"type": "label", "text": "item.t"}
            }]
        }),
        None,
    );
    let data = json!({"hourly": [{"t": 1}, {"t": 2}, {"t": 3}]});
    let mut h = r.render(layout, &DataContext::new(data), Size::new(W, H)).unwrap();
    let each = child(&h, h.root(), 0);
    assert_eq!(h.backend().children(each).len(), 2);
    assert_eq!(h.backend().property(child(&h, each, 1), "text"), Some("2"));

    let stats = r
        .update(
            &mut h,
            &DataContext::new(json!({"hourly": [{"t": 5}, {"t": 2}, {"t": 3}]})),
        )
        .unwrap();
    assert_eq!((stats.evaluated, stats.writes, stats.rebuilt), (1, 1, 0));
    assert_eq!(h.backend().property(child(&h, each, 0), "text"), Some("5"));

    let stats = r
        .update(&mut h, &DataContext::new(json!({"hourly": [{"t": 9}]})))
        .unwrap();
    assert_eq!(stats.rebuilt, 1);
    assert_eq!(h.backend().children(each).len(), 1);
    assert_eq!(h.backend().property(child(&h, each, 0), "text"), Some("9"));
}

#[test]
fn for_each_over_missing_list_is_empty() {
    let h = render(
        NS,
        json!({
            "type": "forEach",
            "items": "item.list",
            "itemTemplate": {"type": "spacer"}
        }),
        json!({"list": "not a list"}),
    );
    assert!(h.backend().children(h.root()).is_empty());
}

#[test]
fn conditional_switches_branches() {
    let r = renderer(NS);
    let layout = layout_with(
        json!({
            "type": "column",
            "children": [{
                "type": "conditional",
                "condition": ["has", "item.alert"],
                "then": {"type": "label", "text": "item.alert"},
                "else": {"type": "label", "text": "All clear"}
            }]
        }),
        None,
    );
    let mut h = r.render(layout, &DataContext::new(json!({})), Size::new(W, H)).unwrap();
    let root = h.root();
    assert!(h.backend().find(root, "text", "All clear").is_some());

    let stats = r
        .update(&mut h, &DataContext::new(json!({"alert": "Storm"})))
        .unwrap();
    assert_eq!(stats.rebuilt, 1);
    assert!(h.backend().find(root, "text", "All clear").is_none());
    assert!(h.backend().find(root, "text", "Storm").is_some());

    let stats = r
        .update(&mut h, &DataContext::new(json!({"alert": "Wind"})))
        .unwrap();
    assert_eq!((stats.rebuilt, stats.writes), (0, 1));
    assert!(h.backend().find(root, "text", "Wind").is_some());
}

#[test]
fn html_visibility_toggles_hidden_attribute() {
    let r = renderer(HTML);
    let layout = layout_with(
        json!({
            "type": "column",
            "children": [{
                "type": "label",
                "text": "x",
                "visible": [">", ["get", "item.t"], 0]
            }]
        }),
        None,
    );
    let mut h = r
        .render(layout, &DataContext::new(json!({"t": 0})), Size::new(W, H))
        .unwrap();
    let label = child(&h, h.root(), 0);
    assert_eq!(h.backend().property(label, "hidden"), Some(""));

    let stats = r.update(&mut h, &DataContext::new(json!({"t": 5}))).unwrap();
    assert_eq!(stats.writes, 1);
    assert_eq!(h.backend().property(label, "hidden"), None);
}

#[test]
fn unresolved_visibility_reads_as_hidden() {
    let h = render(
        NS,
        json!({"type": "label", "text": "x", "visible": ["get", "item.show"]}),
        json!({}),
    );
    assert_eq!(h.backend().property(h.root(), "visibility"), Some("collapse"));
}

#[test]
fn unresolved_values_are_omitted_then_filled_in() {
    let r = renderer(NS);
    let layout = layout_with(
        json!({"type": "label", "text": "x", "color": ["get", "item.c"]}),
        None,
    );
    let mut h = r.render(layout, &DataContext::new(json!({})), Size::new(W, H)).unwrap();
    assert_eq!(h.backend().property(h.root(), "color"), None);

    r.update(&mut h, &DataContext::new(json!({"c": "#FF0000"})))
        .unwrap();
    assert_eq!(h.backend().property(h.root(), "color"), Some("#FF0000"));
}

#[test]
fn spacing_per_platform() {
    let root = json!({
        "type": "column",
        "spacing": 4,
        "children": [
            {"type": "label", "text": "a"},
            {"type": "label", "text": "b"}
        ]
    });
    let h = render(NS, root.clone(), json!({}));
    assert_eq!(h.backend().property(child(&h, h.root(), 0), "marginTop"), None);
    assert_eq!(h.backend().property(child(&h, h.root(), 1), "marginTop"), Some("4"));

    let h = render(HTML, root, json!({}));
    assert_eq!(h.backend().property(h.root(), "style:gap"), Some("4px"));
}

#[test]
fn alignment_per_platform() {
    let root = json!({
        "type": "column",
        "alignment": "center",
        "children": [{"type": "label", "text": "a"}]
    });
    let h = render(NS, root.clone(), json!({}));
    assert_eq!(
        h.backend().property(child(&h, h.root(), 0), "horizontalAlignment"),
        Some("center")
    );
    let h = render(HTML, root, json!({}));
    assert_eq!(h.backend().property(h.root(), "style:align-items"), Some("center"));
}

#[test]
fn stack_children_share_one_grid_cell() {
    let h = render(
        HTML,
        json!({
            "type": "stack",
            "children": [{"type": "spacer"}, {"type": "label", "text": "a"}]
        }),
        json!({}),
    );
    assert_eq!(h.backend().property(h.root(), "style:display"), Some("grid"));
    for i in 0..2 {
        assert_eq!(
            h.backend().property(child(&h, h.root(), i), "style:grid-area"),
            Some("1 / 1")
        );
    }
}

#[test]
fn default_padding_applies_to_unpadded_root() {
    let r = renderer(NS);
    let h = r
        .render(
            layout_with(json!({"type": "column"}), Some(8.0)),
            &DataContext::default(),
            Size::new(W, H),
        )
        .unwrap();
    assert_eq!(h.backend().property(h.root(), "padding"), Some("8"));

    let h = r
        .render(
            layout_with(json!({"type": "column", "padding": 2}), Some(8.0)),
            &DataContext::default(),
            Size::new(W, H),
        )
        .unwrap();
    assert_eq!(h.backend().property(h.root(), "padding"), Some("2"));
}

#[test]
fn image_size_folds_canvas_size() {
    let h = render(
        NS,
        json!({
            "type": "image",
            "src": "icons/sun.png",
            "size": ["case", [">=", ["get", "size.width"], 200], 48, 32]
        }),
        json!({}),
    );
    let t = h.backend();
    assert_eq!(t.property(h.root(), "src"), Some("icons/sun.png"));
    assert_eq!(t.property(h.root(), "width"), Some("48"));
    assert_eq!(t.property(h.root(), "height"), Some("48"));
    assert_eq!(h.bound_properties(), 0);
}

#[test]
fn divider_defaults() {
    let h = render(
        NS,
        json!({"type": "column", "children": [{"type": "divider"}]}),
        json!({}),
    );
    let d = child(&h, h.root(), 0);
    let t = h.backend();
    assert_eq!(t.property(d, "horizontalAlignment"), Some("stretch"));
    assert_eq!(t.property(d, "height"), Some("1"));
    assert_eq!(t.property(d, "backgroundColor"), Some("#CAC4D04D"));
}

#[test]
fn scroll_view_wraps_content() {
    let h = render(
        NS,
        json!({"type": "scrollView", "children": [{"type": "label", "text": "a"}]}),
        json!({}),
    );
    let t = h.backend();
    assert_eq!(t.node(h.root()).unwrap().tag, "ScrollView");
    let inner = child(&h, h.root(), 0);
    assert_eq!(t.node(inner).unwrap().tag, "StackLayout");
    assert_eq!(t.property(child(&h, inner, 0), "text"), Some("a"));
}

#[test]
fn html_markup() {
    let h = render(
        HTML,
        json!({
            "type": "column",
            "children": [{"type": "label", "text": "Hi", "color": "@primary"}]
        }),
        json!({}),
    );
    let html = h.backend().to_html(h.root());
    assert!(html.starts_with("<div style=\"display: flex; flex-direction: column\">"));
    assert!(html.contains("<span style=\"color: #D0BCFF\">Hi</span>"));
}

#[test]
fn compile_errors_name_the_widget() {
    let err = renderer(NS)
        .render(
            layout_with(json!({"type": "label", "text": "x", "color": "not-a-color"}), None),
            &DataContext::default(),
            Size::new(W, H),
        )
        .unwrap_err();
    assert!(err.to_string().starts_with("widget 'W':"));
    assert!(matches!(err.root(), WidgetError::InvalidColor { .. }));
}

#[test]
fn missing_bindings_are_reported_until_data_arrives() {
    let r = renderer(NS);
    let root = json!({"type": "column", "children": [
        {"type": "label", "text": ["get", "item.city"]},
        {"type": "label", "text": ["get", "item.t", "--"]}
    ]});
    let mut h = r
        .render(layout_with(root, None), &DataContext::new(json!({})), Size::new(W, H))
        .unwrap();
    let missing = h.missing_bindings();
    assert_eq!(missing.len(), 1);
    assert!(matches!(
        &missing[0],
        WidgetError::MissingBinding { binding } if binding.ends_with("city")
    ));
    assert_eq!(h.backend().property(child(&h, h.root(), 1), "text"), Some("--"));

    r.update(&mut h, &DataContext::new(json!({"city": "Oslo"})))
        .unwrap();
    assert!(h.missing_bindings().is_empty());
}
