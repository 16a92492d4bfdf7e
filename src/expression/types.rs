use std::fmt;

/// Static type of an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprType {
    /// 64-bit float.
    Number,
    /// Text.
    String,
    /// Boolean.
    Bool,
    /// RGBA color.
    Color,
    /// Unknown until run time (unannotated data lookups).
    Any,
}

impl ExprType {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ExprType::Number => "number",
            ExprType::String => "string",
            ExprType::Bool => "boolean",
            ExprType::Color => "color",
            ExprType::Any => "any",
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An emitted value paired with its static type.
#[derive(Clone, Debug, PartialEq)]
pub struct Typed<T> {
    /// Emitter output.
    pub value: T,
    /// Static type of `value`.
    pub ty: ExprType,
}

impl<T> Typed<T> {
    /// Pair a value with its type.
    pub fn new(value: T, ty: ExprType) -> Self {
        Self { value, ty }
    }
}
