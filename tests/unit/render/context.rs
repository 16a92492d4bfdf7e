use super::*;
use serde_json::json;

fn key(k: &str) -> Segment {
    Segment::Key(k.to_string())
}

#[test]
fn lookup_walks_objects_and_arrays() {
    let ctx = DataContext::new(json!({"hourly": [{"t": 1}, {"t": 2}]}))
        .with_setting("unit", json!({"short": "C"}));
    let p = DataPath::data(vec![key("hourly"), Segment::Index(1), key("t")]);
    assert_eq!(ctx.lookup(&p), Some(&json!(2)));
    assert_eq!(ctx.lookup(&DataPath::data(vec![key("hourly"), key("t")])), None);
    assert_eq!(ctx.lookup(&DataPath::data(vec![])), Some(&ctx.data));
    let s = DataPath {
        root: DataRoot::Settings,
        segments: vec![key("unit"), key("short")],
    };
    assert_eq!(ctx.lookup(&s), Some(&json!("C")));
    assert_eq!(ctx.lookup(&DataPath::setting("missing")), None);
}

#[test]
fn diff_descends_to_changed_leaves() {
    let a = DataContext::new(json!({"t": 1, "city": "Oslo", "hourly": [{"t": 1}, {"t": 2}]}));
    let b = DataContext::new(json!({"t": 1, "city": "Bergen", "hourly": [{"t": 1}, {"t": 3}]}));
    let changed: Vec<String> = a.diff(&b).iter().map(|p| p.to_string()).collect();
    assert_eq!(changed, ["data.city", "data.hourly.1.t"]);
}

#[test]
fn diff_reports_resized_arrays_whole() {
    let a = DataContext::new(json!({"hourly": [1, 2]}));
    let b = DataContext::new(json!({"hourly": [1, 2, 3]}));
    assert_eq!(a.diff(&b), [DataPath::data(vec![key("hourly")])]);
}

#[test]
fn diff_covers_added_keys_and_settings() {
    let a = DataContext::new(json!({})).with_setting("unit", json!("c"));
    let b = DataContext::new(json!({"x": 1}))
        .with_setting("unit", json!("f"))
        .with_setting("bold", json!(true));
    let changed: Vec<String> = a.diff(&b).iter().map(|p| p.to_string()).collect();
    assert_eq!(changed, ["data.x", "settings.bold", "settings.unit"]);
    assert!(a.diff(&a.clone()).is_empty());
}

#[test]
fn overlap_is_prefix_in_either_direction() {
    let list = DataPath::data(vec![key("hourly")]);
    let leaf = DataPath::data(vec![key("hourly"), Segment::Index(0), key("t")]);
    let other = DataPath::data(vec![key("city")]);
    assert!(list.overlaps(&leaf));
    assert!(leaf.overlaps(&list));
    assert!(!leaf.overlaps(&other));
    assert!(!DataPath::setting("hourly").overlaps(&list));
    assert!(DataPath::data(vec![]).overlaps(&other));
}
