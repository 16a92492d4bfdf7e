use super::*;
use crate::expression::compiler::{CompileEnv, compile_property_value};
use crate::expression::parser::parse_expr;
use crate::foundation::core::{Platform, Size};
use crate::foundation::path::JsonPath;
use crate::layout::model::PropertyValue;
use crate::style::config::StyleConfig;
use serde_json::json;

fn compile_with(emitter: &mut ClosureEmitter, v: serde_json::Value, ty: ExprType) -> Thunk {
    let config = StyleConfig::builtin();
    let env = CompileEnv {
        config: &config,
        platform: Platform::NativeScript,
        size: Size::new(100.0, 50.0),
    };
    let path = JsonPath::root();
    let e = parse_expr(&v, &path).unwrap();
    compile_property_value(&PropertyValue::Expression(e), ty, emitter, env, &path)
        .unwrap()
        .value
}

fn compile(v: serde_json::Value, ty: ExprType) -> Thunk {
    compile_with(&mut ClosureEmitter::new(), v, ty)
}

fn ctx(data: serde_json::Value) -> DataContext {
    DataContext::new(data)
}

#[test]
fn case_follows_the_data() {
    let t = compile(
        json!(["case", [">", ["get", "item.t"], 20], "hot", "cold"]),
        ExprType::String,
    );
    assert_eq!(t.eval(&ctx(json!({"t": 25}))), Ok(Value::String("hot".into())));
    assert_eq!(t.eval(&ctx(json!({"t": 10}))), Ok(Value::String("cold".into())));
    assert_eq!(t.deps(), [DataPath::data(vec![Segment::Key("t".into())])]);
}

#[test]
fn item_bindings_are_rewritten_below_the_prefix() {
    let mut em = ClosureEmitter::with_item(vec![Segment::Key("hourly".into()), Segment::Index(2)]);
    let t = compile_with(&mut em, json!(["get", "item.temp"]), ExprType::Number);
    assert_eq!(
        t.deps(),
        [DataPath::data(vec![
            Segment::Key("hourly".into()),
            Segment::Index(2),
            Segment::Key("temp".into()),
        ])]
    );
    let data = ctx(json!({"hourly": [{"temp": 1}, {"temp": 2}, {"temp": 3}]}));
    assert_eq!(t.eval(&data), Ok(Value::Number(3.0)));

    let d = compile_with(&mut em, json!(["get", "data.city"]), ExprType::String);
    assert_eq!(d.deps(), [DataPath::data(vec![Segment::Key("city".into())])]);
}

#[test]
fn missing_values_fault_unless_defaulted() {
    let t = compile(json!(["get", "item.x"]), ExprType::Number);
    assert_eq!(
        t.eval(&ctx(json!({}))),
        Err(EvalFault::Missing("item.x".into()))
    );
    let t = compile(json!(["get", "item.x", 5]), ExprType::Number);
    assert_eq!(t.eval(&ctx(json!({"x": null}))), Ok(Value::Number(5.0)));
}

#[test]
fn wrong_runtime_type_is_a_type_fault() {
    let t = compile(json!(["+", ["get", "item.s"], 1]), ExprType::Number);
    assert!(matches!(t.eval(&ctx(json!({"s": "abc"}))), Err(EvalFault::Type(_))));
    assert_eq!(t.eval(&ctx(json!({"s": "3"}))), Ok(Value::Number(4.0)));
}

#[test]
fn coalesce_takes_first_present() {
    let t = compile(
        json!(["coalesce", ["get", "item.a"], ["get", "item.b"], "none"]),
        ExprType::String,
    );
    assert_eq!(t.eval(&ctx(json!({"b": "B"}))), Ok(Value::String("B".into())));
    assert_eq!(t.eval(&ctx(json!({}))), Ok(Value::String("none".into())));
    assert_eq!(t.deps().len(), 2);
}

#[test]
fn has_treats_empty_strings_as_absent() {
    let t = compile(json!(["has", "item.d"]), ExprType::Bool);
    assert_eq!(t.eval(&ctx(json!({"d": ""}))), Ok(Value::Bool(false)));
    assert_eq!(t.eval(&ctx(json!({"d": 0}))), Ok(Value::Bool(true)));
    assert_eq!(t.eval(&ctx(json!({}))), Ok(Value::Bool(false)));
}

#[test]
fn settings_read_from_the_settings_map() {
    let t = compile(json!(["get", "config.settings.unit"]), ExprType::String);
    assert_eq!(t.deps(), [DataPath::setting("unit")]);
    let c = ctx(json!({})).with_setting("unit", json!("f"));
    assert_eq!(t.eval(&c), Ok(Value::String("f".into())));
}

#[test]
fn formatting_and_text_ops() {
    let t = compile(json!(["format-number", ["get", "item.t"], "°"]), ExprType::String);
    assert_eq!(t.eval(&ctx(json!({"t": 21.4}))), Ok(Value::String("21°".into())));
    let t = compile(json!(["upcase", ["concat", "a", ["get", "item.n"]]]), ExprType::String);
    assert_eq!(t.eval(&ctx(json!({"n": 7}))), Ok(Value::String("A7".into())));
}

#[test]
fn colors() {
    let t = compile(
        json!(["interpolate-color", "#000000", "#FFFFFF", 0.5]),
        ExprType::Color,
    );
    assert_eq!(
        t.eval(&ctx(json!({}))),
        Ok(Value::Color(Rgba::new(128, 128, 128, 255)))
    );
    let t = compile(json!(["rgb", 255, 0, ["get", "item.b"]]), ExprType::Color);
    assert_eq!(
        t.eval(&ctx(json!({"b": 16}))),
        Ok(Value::Color(Rgba::new(255, 0, 16, 255)))
    );
    let t = compile(json!(["get", "item.c"]), ExprType::Color);
    assert_eq!(
        t.eval(&ctx(json!({"c": "blue"}))),
        Ok(Value::Color(Rgba::new(0, 0, 255, 255)))
    );
}

#[test]
fn match_and_boolean_ops() {
    let t = compile(
        json!(["match", ["get", "item.code"], "a", 1, "b", 2, 0]),
        ExprType::Number,
    );
    assert_eq!(t.eval(&ctx(json!({"code": "b"}))), Ok(Value::Number(2.0)));
    assert_eq!(t.eval(&ctx(json!({"code": "z"}))), Ok(Value::Number(0.0)));

    let t = compile(
        json!(["all", ["!", false], ["any", false, ["has", "item.x"]]]),
        ExprType::Bool,
    );
    assert_eq!(t.eval(&ctx(json!({"x": 1}))), Ok(Value::Bool(true)));
    assert_eq!(t.eval(&ctx(json!({}))), Ok(Value::Bool(false)));
}

#[test]
fn size_is_constant_and_deps_dedupe() {
    let t = compile(json!(["get", "size.width"]), ExprType::Number);
    assert!(t.deps().is_empty());
    assert_eq!(t.eval(&ctx(json!(null))), Ok(Value::Number(100.0)));

    let t = compile(json!(["+", ["get", "item.a"], ["get", "item.a"]]), ExprType::Number);
    assert_eq!(t.deps().len(), 1);
    assert_eq!(t.eval(&ctx(json!({"a": 2}))), Ok(Value::Number(4.0)));
}

#[test]
fn substring_and_date_format_evaluate() {
    let t = compile(json!(["substring", ["get", "item.day"], 0, 3]), ExprType::String);
    assert_eq!(t.eval(&ctx(json!({"day": "Wednesday"}))), Ok(Value::String("Wed".into())));

    let t = compile(json!(["format", ["get", "item.dt"], "EEE HH:mm"]), ExprType::String);
    let at = ctx(json!({"dt": 1_700_000_000_000_i64}));
    assert_eq!(t.eval(&at), Ok(Value::String("Tue 22:13".into())));
    let iso = ctx(json!({"dt": "2024-03-05T07:08:09Z"}));
    assert_eq!(t.eval(&iso), Ok(Value::String("Tue 07:08".into())));
    assert_eq!(t.eval(&ctx(json!({"dt": "later"}))), Ok(Value::String("later".into())));
}
