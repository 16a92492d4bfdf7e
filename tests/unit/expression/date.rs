use super::*;

// 2023-11-14T22:13:20Z, a Tuesday.
const NOV_14: f64 = 1_700_000_000_000.0;

fn fmt(pattern: &str, v: Value) -> String {
    DatePattern::parse(pattern).unwrap().format(&v)
}

#[test]
fn common_patterns_from_epoch_millis() {
    assert_eq!(fmt("HH:mm", Value::Number(NOV_14)), "22:13");
    assert_eq!(fmt("h:mm a", Value::Number(NOV_14)), "10:13 PM");
    assert_eq!(fmt("EEE, MMM d", Value::Number(NOV_14)), "Tue, Nov 14");
    assert_eq!(fmt("MMM d, yyyy", Value::Number(NOV_14)), "Nov 14, 2023");
    assert_eq!(fmt("EEEE MMMM dd", Value::Number(NOV_14)), "Tuesday November 14");
    assert_eq!(fmt("HH:mm", Value::Number(0.0)), "00:00");
}

#[test]
fn rfc3339_strings_are_shown_in_utc() {
    let v = Value::String("2024-03-05T07:08:09+02:00".to_string());
    assert_eq!(fmt("HH:mm:ss", v.clone()), "05:08:09");
    assert_eq!(fmt("d/M/yy", v), "5/3/24");
}

#[test]
fn quoted_text_and_symbols_are_literal() {
    assert_eq!(fmt("'at' HH'h'", Value::Number(NOV_14)), "at 22h");
    assert_eq!(fmt("HH''mm", Value::Number(NOV_14)), "22'13");
    assert_eq!(fmt("'it''s' HH", Value::Number(NOV_14)), "it's 22");
    assert_eq!(fmt("HH%", Value::Number(NOV_14)), "22%");
}

#[test]
fn unsupported_fields_are_rejected() {
    assert!(DatePattern::parse("YYYY").unwrap_err().contains("'YYYY'"));
    assert!(DatePattern::parse("yyy").unwrap_err().contains("'yyy'"));
    assert!(DatePattern::parse("[HH]").is_err());
    assert!(DatePattern::parse("'open").unwrap_err().contains("unterminated"));
}

#[test]
fn non_dates_print_as_text() {
    let p = DatePattern::parse("HH:mm").unwrap();
    assert_eq!(p.format(&Value::String("soon".to_string())), "soon");
    assert_eq!(p.format(&Value::Null), "");
    assert_eq!(p.format(&Value::Bool(true)), "true");
    assert_eq!(p.format(&Value::Number(f64::NAN)), "NaN");
    assert_eq!(p.format(&Value::Number(1e16)), "10000000000000000");
}
