use super::*;

#[test]
fn formats_fields_and_indices() {
    let p = JsonPath::root()
        .field("layout")
        .field("children")
        .index(2)
        .field("color");
    assert_eq!(p.to_string(), "$.layout.children[2].color");
    assert_eq!(p.depth(), 4);
}

#[test]
fn root_is_dollar() {
    assert_eq!(JsonPath::root().to_string(), "$");
}
