use crate::expression::value::Value;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// Largest epoch-millisecond magnitude read as a date.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// A checked `format` pattern.
///
/// Patterns use the LDML field letters that Java's `DateTimeFormatter` and Foundation's
/// `DateFormatter` share, limited to fields all backends print identically: `yy yyyy`,
/// `M MM MMM MMMM`, `d dd`, `E EEE EEEE`, `H HH`, `h hh`, `m mm`, `s ss` and `a`. Text in
/// single quotes is literal; `''` is a quote. Dates are printed in UTC with English names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatePattern {
    strftime: String,
}

impl DatePattern {
    /// Validate `pattern`; the error names the offending field.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let mut out = String::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.next_if_eq(&'\'').is_some() {
                    out.push('\'');
                    continue;
                }
                let mut closed = false;
                while let Some(q) = chars.next() {
                    if q != '\'' {
                        push_literal(&mut out, q);
                    } else if chars.next_if_eq(&'\'').is_some() {
                        out.push('\'');
                    } else {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err("unterminated quote in date pattern".to_string());
                }
            } else if c.is_ascii_alphabetic() {
                let mut n = 1;
                while chars.next_if_eq(&c).is_some() {
                    n += 1;
                }
                out.push_str(field(c, n).ok_or_else(|| {
                    format!("unsupported date field '{}'", c.to_string().repeat(n))
                })?);
            } else if matches!(c, '[' | ']' | '{' | '}' | '#') {
                return Err(format!("'{c}' must be quoted in a date pattern"));
            } else {
                push_literal(&mut out, c);
            }
        }
        Ok(Self { strftime: out })
    }

    /// Format a date value: epoch milliseconds or an RFC 3339 string. Anything else prints as
    /// its plain text.
    pub fn format(&self, v: &Value) -> String {
        let Some(at) = instant(v) else {
            return v.to_display();
        };
        let mut out = String::new();
        match write!(out, "{}", at.format(&self.strftime)) {
            Ok(()) => out,
            Err(_) => v.to_display(),
        }
    }
}

fn field(letter: char, n: usize) -> Option<&'static str> {
    Some(match (letter, n) {
        ('y', 2) => "%y",
        ('y', 4) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', 4) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('E', 1..=3) => "%a",
        ('E', 4) => "%A",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('a', 1) => "%p",
        _ => return None,
    })
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn instant(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(ms) if ms.is_finite() && ms.abs() <= MAX_EPOCH_MILLIS => {
            DateTime::from_timestamp_millis(*ms as i64)
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/date.rs"]
mod tests;
