use super::*;
use serde_json::json;

#[test]
fn key_order_does_not_matter() {
    let a = json!({"name": "W", "layout": {"type": "label", "text": "x"}});
    let b = json!({"layout": {"text": "x", "type": "label"}, "name": "W"});
    assert_eq!(fingerprint_document(&a), fingerprint_document(&b));
}

#[test]
fn content_changes_change_the_hash() {
    let a = json!({"text": "x"});
    let b = json!({"text": "y"});
    let c = json!({"text": ["x"]});
    assert_ne!(fingerprint_document(&a), fingerprint_document(&b));
    assert_ne!(fingerprint_document(&a), fingerprint_document(&c));
}

#[test]
fn strings_are_length_prefixed() {
    let a = json!(["ab", "c"]);
    let b = json!(["a", "bc"]);
    assert_ne!(fingerprint_document(&a), fingerprint_document(&b));
}
