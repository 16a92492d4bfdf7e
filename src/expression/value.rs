use crate::foundation::core::Rgba;
use crate::layout::model::Literal;
use crate::style::color::parse_color;
use std::cmp::Ordering;

/// Dynamically typed value produced by interpreted expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent or JSON `null`.
    Null,
    /// Number.
    Number(f64),
    /// String.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Color.
    Color(Rgba),
    /// A JSON array or object; present, but not a scalar.
    Composite,
}

impl Value {
    /// Convert a JSON value.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Value::Composite,
        }
    }

    /// Convert a layout literal.
    pub fn from_literal(l: &Literal) -> Self {
        match l {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Color(c) => Value::Color(*c),
        }
    }

    /// `false` only for [`Value::Null`].
    pub fn is_present(&self) -> bool {
        !matches!(self, Value::Null)
    }

    /// Text rendering shared by every backend.
    pub fn to_display(&self) -> String {
        match self {
            Value::Null | Value::Composite => String::new(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Color(c) => c.to_hex(),
        }
    }

    /// Truthiness: null, `false`, `0` and `""` are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Color(_) | Value::Composite => true,
        }
    }

    /// Numeric view: numbers, and strings that parse as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Color view: colors, and strings that parse as hex or named colors.
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Value::Color(c) => Some(*c),
            Value::String(s) => parse_color(s),
            _ => None,
        }
    }

    /// Equality with numeric comparison across number representations.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => self == other,
        }
    }

    /// Ordering of two numbers or two strings.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Shortest round-trip digits in plain notation (never exponent form); integral values print
/// without a fractional part. The generated `str` helpers produce the same text.
pub fn number_to_string(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
        return format!("{}", x as i64);
    }
    format!("{x}")
}

/// Characters `start..start + length` of `s`, counted in Unicode scalars.
///
/// Indices truncate toward zero and clamp to the string, so out-of-range requests yield a
/// shorter or empty result; no `length` runs to the end.
pub fn substring(s: &str, start: f64, length: Option<f64>) -> String {
    let count = s.chars().count() as i64;
    let from = (start as i64).clamp(0, count);
    let to = match length {
        Some(n) => from.saturating_add((n as i64).max(0)).min(count),
        None => count,
    };
    s.chars()
        .skip(from as usize)
        .take((to - from) as usize)
        .collect()
}

/// Round half away from zero to `decimals` places (at most 6) and append `unit`.
pub fn format_number(x: f64, unit: &str, decimals: u32) -> String {
    let d = decimals.min(6);
    let f = 10f64.powi(d as i32);
    let mut r = (x * f).round() / f;
    if r == 0.0 {
        r = 0.0;
    }
    format!("{:.*}{}", d as usize, r, unit)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/value.rs"]
mod tests;
