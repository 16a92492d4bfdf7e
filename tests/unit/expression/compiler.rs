use super::*;
use crate::expression::parser::parse_expr;
use crate::expression::value::number_to_string;
use serde_json::json;

/// Renders compiled trees as s-expressions so typing decisions are visible.
#[derive(Default)]
struct Sexp;

impl Emitter for Sexp {
    type Output = String;

    fn literal(&mut self, lit: &Literal) -> String {
        match lit {
            Literal::Number(n) => number_to_string(*n),
            Literal::String(s) => format!("{s:?}"),
            Literal::Bool(b) => b.to_string(),
            Literal::Color(c) => c.to_hex(),
        }
    }

    fn binding(
        &mut self,
        binding: &Binding,
        want: ExprType,
        fallback: Fallback<'_>,
    ) -> WidgetResult<String> {
        let fb = match fallback {
            Fallback::Default(l) => self.literal(l),
            Fallback::Zero => "zero".to_string(),
            Fallback::Null => "null".to_string(),
        };
        Ok(format!("(get {binding} {want} {fb})"))
    }

    fn presence(&mut self, binding: &Binding) -> WidgetResult<String> {
        Ok(format!("(has {binding})"))
    }

    fn operator(
        &mut self,
        op: Operator,
        operands: Vec<Typed<String>>,
        _result: ExprType,
    ) -> WidgetResult<String> {
        let args: Vec<String> = operands.into_iter().map(|o| o.value).collect();
        Ok(format!("({} {})", op.name(), args.join(" ")))
    }

    fn coerce(&mut self, value: String, from: ExprType, to: ExprType) -> String {
        format!("({from}->{to} {value})")
    }
}

fn compile_value(value: PropertyValue, ty: ExprType) -> WidgetResult<Typed<String>> {
    let config = StyleConfig::builtin();
    let env = CompileEnv {
        config: &config,
        platform: Platform::Glance,
        size: Size::new(110.0, 50.0),
    };
    compile_property_value(&value, ty, &mut Sexp, env, &JsonPath::root().field("p"))
}

fn compile(v: serde_json::Value, ty: ExprType) -> WidgetResult<Typed<String>> {
    let e = parse_expr(&v, &JsonPath::root().field("p"))?;
    compile_value(PropertyValue::Expression(e), ty)
}

fn out(v: serde_json::Value, ty: ExprType) -> String {
    compile(v, ty).unwrap().value
}

#[test]
fn color_literals_resolve_through_the_palette() {
    let t = compile_value(
        PropertyValue::Literal(Literal::String("@primary".into())),
        ExprType::Color,
    )
    .unwrap();
    assert_eq!(t.value, "#D0BCFF");
    assert_eq!(t.ty, ExprType::Color);
    assert_eq!(out(json!("red"), ExprType::Color), "#FF0000");
}

#[test]
fn invalid_color_names_the_path() {
    let err = compile_value(
        PropertyValue::Literal(Literal::String("not-a-color".into())),
        ExprType::Color,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        WidgetError::InvalidColor { ref path, ref value } if path == "$.p" && value == "not-a-color"
    ));
}

#[test]
fn size_bindings_fold_to_constants() {
    assert_eq!(out(json!(["+", ["get", "size.width"], 1]), ExprType::Number), "(+ 110 1)");
    assert_eq!(
        compile_value(
            PropertyValue::Binding(Binding::parse("size.height").unwrap()),
            ExprType::Number
        )
        .unwrap()
        .value,
        "50"
    );
}

#[test]
fn bindings_take_the_expected_type() {
    let t = compile_value(
        PropertyValue::Binding(Binding::parse("item.temperature").unwrap()),
        ExprType::Number,
    )
    .unwrap();
    assert_eq!(t.value, "(get item.temperature number zero)");
    let t = compile_value(PropertyValue::Setting("unit".into()), ExprType::String).unwrap();
    assert_eq!(t.value, "(get config.settings.unit string zero)");
}

#[test]
fn get_defaults_type_the_lookup() {
    assert_eq!(
        out(json!(["get", "item.c", "@error"]), ExprType::Color),
        "(get item.c color #F2B8B5)"
    );
    assert_eq!(
        out(json!(["get", "item.n", 3]), ExprType::String),
        "(number->string (get item.n number 3))"
    );
}

#[test]
fn ordering_coerces_untyped_operands_to_number() {
    assert_eq!(
        out(json!([">", ["get", "item.t"], 3]), ExprType::Bool),
        "(> (any->number (get item.t any zero)) 3)"
    );
    assert_eq!(
        out(json!(["==", ["get", "item.s"], "x"]), ExprType::Bool),
        "(== (any->string (get item.s any zero)) \"x\")"
    );
}

#[test]
fn comparison_type_errors() {
    let err = compile(json!(["==", 1, "1"]), ExprType::Bool).unwrap_err();
    assert!(err.to_string().contains("cannot compare number with string"));
    let err = compile(json!(["<", true, false]), ExprType::Bool).unwrap_err();
    assert!(err.to_string().contains("ordering needs numbers or strings"));
}

#[test]
fn arithmetic_rejects_strings() {
    let err = compile(json!(["+", "a", 1]), ExprType::Number).unwrap_err();
    assert!(matches!(
        err,
        WidgetError::ExpressionType { ref path, ref message }
            if path == "$.p[1]" && message == "expected number, found string"
    ));
}

#[test]
fn result_type_must_fit_the_property() {
    let err = compile(json!(["concat", "a", "b"]), ExprType::Number).unwrap_err();
    assert!(err.to_string().contains("expected number, found string"));
    assert_eq!(out(json!(["+", 1, 2]), ExprType::String), "(number->string (+ 1 2))");
}

#[test]
fn case_unifies_branches() {
    assert_eq!(
        out(json!(["case", false, "a", true, "b", "c"]), ExprType::String),
        "(case false \"a\" true \"b\" \"c\")"
    );
    assert_eq!(
        out(json!(["case", ["has", "item.x"], 1, "none"]), ExprType::String),
        "(case (has item.x) (number->string 1) \"none\")"
    );
    assert_eq!(
        out(json!(["case", true, "@primary", "#000000"]), ExprType::Color),
        "(case true #D0BCFF #000000)"
    );
}

#[test]
fn coalesce_makes_all_but_last_nullable() {
    assert_eq!(
        out(
            json!(["coalesce", ["get", "item.a"], ["get", "item.b"], "-"]),
            ExprType::String
        ),
        "(coalesce (get item.a string null) (get item.b string null) \"-\")"
    );
}

#[test]
fn match_types_input_from_labels() {
    assert_eq!(
        out(json!(["match", ["get", "item.code"], 1, "sun", 2, "rain", "?"]), ExprType::String),
        "(match (get item.code number zero) 1 \"sun\" 2 \"rain\" \"?\")"
    );
    let err = compile(json!(["match", "x", 1, "a", "b", "c", "d"]), ExprType::String).unwrap_err();
    assert!(err.to_string().contains("same type"));
    let err = compile(json!(["match", "x", ["get", "item.l"], "a", "d"]), ExprType::String)
        .unwrap_err();
    assert!(err.to_string().contains("labels must be literal"));
}

#[test]
fn format_number_fills_optional_operands() {
    assert_eq!(
        out(json!(["format-number", ["get", "item.t"], "°"]), ExprType::String),
        "(format-number (get item.t number zero) \"°\" 0)"
    );
    assert_eq!(
        out(json!(["format-number", 1.5]), ExprType::String),
        "(format-number 1.5 \"\" 0)"
    );
    let err = compile(json!(["format-number", 1, "", ["get", "item.d"]]), ExprType::String)
        .unwrap_err();
    assert!(err.to_string().contains("decimals"));
    assert!(compile(json!(["format-number", 1, "", 7]), ExprType::String).is_err());
}

#[test]
fn substring_and_date_format_operands() {
    assert_eq!(
        out(json!(["substring", ["get", "item.day"], 0, 3]), ExprType::String),
        "(substring (get item.day string zero) 0 3)"
    );
    assert_eq!(
        out(json!(["substring", "Sunday", 3]), ExprType::String),
        "(substring \"Sunday\" 3)"
    );
    assert_eq!(
        out(json!(["format", ["get", "item.dt"], "HH:mm"]), ExprType::String),
        "(format (get item.dt any zero) \"HH:mm\")"
    );
    let err = compile(json!(["format", 0, ["get", "item.p"]]), ExprType::String).unwrap_err();
    assert!(err.to_string().contains("literal date pattern"));
    let err = compile(json!(["format", 0, "YYYY"]), ExprType::String).unwrap_err();
    assert_eq!(err.path(), Some("$.p[2]"));
    assert!(compile(json!(["substring", "x"]), ExprType::String).is_err());
    assert!(compile(json!(["substring", "x", "y"]), ExprType::String).is_err());
}

#[test]
fn hand_built_operator_nodes_are_arity_checked() {
    let path = JsonPath::root().field("p");
    for op in [Operator::Case, Operator::Match, Operator::Coalesce, Operator::Concat] {
        let e = Expr {
            kind: ExprKind::Op {
                op,
                args: Vec::new(),
            },
            path: path.clone(),
        };
        let err = compile_value(PropertyValue::Expression(e), ExprType::String).unwrap_err();
        assert!(matches!(err, WidgetError::ExpressionType { .. }), "{op:?}");
    }
}

#[test]
fn theme_color_is_resolved_at_compile_time() {
    assert_eq!(out(json!(["theme-color", "primary"]), ExprType::Color), "#D0BCFF");
    let err = compile(json!(["theme-color", "nope"]), ExprType::Color).unwrap_err();
    assert!(matches!(err, WidgetError::InvalidColor { .. }));
    let err = compile(json!(["theme-color", ["get", "item.t"]]), ExprType::Color).unwrap_err();
    assert!(err.to_string().contains("literal token"));
}

#[test]
fn strings_coerce_to_colors_at_runtime() {
    assert_eq!(
        out(json!(["interpolate-color", ["get", "item.c"], "white", 0.5]), ExprType::Color),
        "(interpolate-color (get item.c color zero) #FFFFFF 0.5)"
    );
    assert_eq!(
        out(json!(["concat", "#", "FF0000"]), ExprType::Color),
        "(string->color (concat \"#\" \"FF0000\"))"
    );
}
