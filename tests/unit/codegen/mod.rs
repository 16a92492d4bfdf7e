use super::*;
use crate::foundation::error::WidgetError;
use crate::layout::parse::parse_layout_value;
use serde_json::json;

fn layout(root: serde_json::Value) -> WidgetLayout {
    parse_layout_value(&json!({
        "name": "Demo",
        "supportedSizes": [{"id": "small", "width": 110, "height": 110}],
        "layout": root,
    }))
    .unwrap()
}

#[test]
fn number_literals_always_carry_a_point() {
    assert_eq!(number_literal(4.0), "4.0");
    assert_eq!(number_literal(0.5), "0.5");
    assert_eq!(number_literal(0.0), "0.0");
    assert_eq!(number_literal(-0.0), "0.0");
    assert_eq!(number_literal(-2.0), "(-2.0)");
    assert_eq!(number_literal(-1.25), "(-1.25)");
}

#[test]
fn group_parenthesizes_compound_operands() {
    assert_eq!(group("1.0"), "1.0");
    assert_eq!(group("(a + b)"), "(a + b)");
    assert_eq!(group("(a) + (b)"), "((a) + (b))");
    assert_eq!(group("str(x)"), "(str(x))");
    assert_eq!(group(r#"(")" + a)"#), r#"(")" + a)"#);
}

#[test]
fn pascal_case_size_ids() {
    assert_eq!(pascal("small-wide"), "SmallWide");
    assert_eq!(pascal("medium"), "Medium");
    assert_eq!(pascal("size_2x"), "Size2x");
}

#[test]
fn output_names_per_platform() {
    assert_eq!(
        output_file_name("Weather", CompiledPlatform::Glance),
        "WeatherContent.generated.kt"
    );
    assert_eq!(
        output_file_name("Weather", CompiledPlatform::SwiftUi),
        "WeatherView.generated.swift"
    );
}

#[test]
fn header_names_source_generator_and_fingerprint() {
    let w = layout(json!({"type": "label", "text": "hi"}));
    let [source, generator, fingerprint] = header_lines(&w);
    assert_eq!(source, "// Auto-generated from Demo.json - DO NOT EDIT MANUALLY");
    assert_eq!(generator, format!("// Generator: widgetc {GENERATOR_VERSION}"));
    assert_eq!(
        fingerprint,
        format!("// Layout fingerprint: {:016x}", w.fingerprint)
    );
}

#[test]
fn generated_files_start_with_the_header() {
    let w = layout(json!({"type": "label", "text": "hi"}));
    let config = StyleConfig::builtin();
    for p in CompiledPlatform::ALL {
        let file = generate(&w, p, &config, &GeneratorOptions::default()).unwrap();
        assert_eq!(file.file_name, output_file_name("Demo", p));
        assert!(file.contents.starts_with(&header_lines(&w)[0]));
    }
}

#[test]
fn generation_errors_name_the_widget() {
    let w = layout(json!({"type": "label", "text": "hi", "color": "not-a-color"}));
    let config = StyleConfig::builtin();
    for p in CompiledPlatform::ALL {
        let err = generate(&w, p, &config, &GeneratorOptions::default()).unwrap_err();
        assert!(matches!(err, WidgetError::Widget { ref widget, .. } if widget == "Demo"));
        assert!(matches!(err.root(), WidgetError::InvalidColor { .. }));
        assert_eq!(err.path(), Some("$.layout.color"));
    }
}
