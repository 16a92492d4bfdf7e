use crate::foundation::path::JsonPath;
use crate::layout::binding::Binding;
use crate::layout::model::Literal;

/// Operators of the expression language. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-` (negation with one operand)
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `all`
    All,
    /// `any`
    Any,
    /// `not` / `!`
    Not,
    /// `case`
    Case,
    /// `match`
    Match,
    /// `coalesce`
    Coalesce,
    /// `concat`
    Concat,
    /// `to-string`
    ToString,
    /// `format-number`
    FormatNumber,
    /// `upcase`
    Upcase,
    /// `downcase`
    Downcase,
    /// `substring`
    Substring,
    /// `format` (dates)
    FormatDate,
    /// `rgb`
    Rgb,
    /// `rgba`
    Rgba,
    /// `interpolate-color`
    InterpolateColor,
    /// `theme-color`
    ThemeColor,
}

/// Operand count rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Arity {
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
    pub(crate) parity: Parity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Parity {
    Free,
    Odd,
    Even,
}

impl Arity {
    const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
            parity: Parity::Free,
        }
    }

    const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
            parity: Parity::Free,
        }
    }

    const fn at_least(min: usize) -> Self {
        Self {
            min,
            max: None,
            parity: Parity::Free,
        }
    }

    const fn with(self, parity: Parity) -> Self {
        Self { parity, ..self }
    }
}

impl Operator {
    const ALL: [Operator; 28] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::All,
        Operator::Any,
        Operator::Not,
        Operator::Case,
        Operator::Match,
        Operator::Coalesce,
        Operator::Concat,
        Operator::ToString,
        Operator::FormatNumber,
        Operator::Upcase,
        Operator::Downcase,
        Operator::Substring,
        Operator::FormatDate,
        Operator::Rgb,
        Operator::Rgba,
        Operator::InterpolateColor,
        Operator::ThemeColor,
    ];

    /// Name as written in layout JSON.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::All => "all",
            Operator::Any => "any",
            Operator::Not => "not",
            Operator::Case => "case",
            Operator::Match => "match",
            Operator::Coalesce => "coalesce",
            Operator::Concat => "concat",
            Operator::ToString => "to-string",
            Operator::FormatNumber => "format-number",
            Operator::Upcase => "upcase",
            Operator::Downcase => "downcase",
            Operator::Substring => "substring",
            Operator::FormatDate => "format",
            Operator::Rgb => "rgb",
            Operator::Rgba => "rgba",
            Operator::InterpolateColor => "interpolate-color",
            Operator::ThemeColor => "theme-color",
        }
    }

    /// Inverse of [`Operator::name`]; `!` is accepted for `not`.
    pub fn from_name(s: &str) -> Option<Self> {
        if s == "!" {
            return Some(Operator::Not);
        }
        Self::ALL.into_iter().find(|op| op.name() == s)
    }

    pub(crate) fn arity(self) -> Arity {
        match self {
            Operator::Add | Operator::Mul => Arity::at_least(2),
            Operator::Sub => Arity::range(1, 2),
            Operator::Div | Operator::Mod => Arity::exactly(2),
            Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Le
            | Operator::Gt
            | Operator::Ge => Arity::exactly(2),
            Operator::All | Operator::Any => Arity::at_least(1),
            Operator::Not => Arity::exactly(1),
            Operator::Case => Arity::at_least(1).with(Parity::Odd),
            Operator::Match => Arity::at_least(4).with(Parity::Even),
            Operator::Coalesce | Operator::Concat => Arity::at_least(1),
            Operator::ToString | Operator::Upcase | Operator::Downcase => Arity::exactly(1),
            Operator::FormatNumber => Arity::range(1, 3),
            Operator::Substring => Arity::range(2, 3),
            Operator::FormatDate => Arity::exactly(2),
            Operator::Rgb => Arity::exactly(3),
            Operator::Rgba => Arity::exactly(4),
            Operator::InterpolateColor => Arity::exactly(3),
            Operator::ThemeColor => Arity::exactly(1),
        }
    }

    /// Check an operand count against the arity table.
    pub(crate) fn check_arity(self, n: usize) -> Result<(), String> {
        let a = self.arity();
        let name = self.name();
        let plural = |k: usize| if k == 1 { "arg" } else { "args" };
        let count_ok = n >= a.min && a.max.is_none_or(|max| n <= max);
        if !count_ok {
            return Err(match a.max {
                Some(max) if max == a.min => {
                    format!("'{name}' expects {max} {}, got {n}", plural(max))
                }
                Some(max) => format!("'{name}' expects {} to {max} args, got {n}", a.min),
                None => format!("'{name}' expects at least {} {}, got {n}", a.min, plural(a.min)),
            });
        }
        match a.parity {
            Parity::Odd if n % 2 == 0 => Err(format!(
                "'{name}' expects condition/value pairs followed by a fallback, got {n} args"
            )),
            Parity::Even if n % 2 == 1 => Err(format!(
                "'{name}' expects an input, label/value pairs and a fallback, got {n} args"
            )),
            _ => Ok(()),
        }
    }
}

/// Expression node with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// Node payload.
    pub kind: ExprKind,
    /// Location in the layout document.
    pub path: JsonPath,
}

/// Expression node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Constant.
    Literal(Literal),
    /// `["get", path, default?]`
    Get {
        /// Path to resolve.
        binding: Binding,
        /// Literal used when the path does not resolve.
        default: Option<Literal>,
    },
    /// `["has", path]`
    Has(Binding),
    /// Any other operator.
    Op {
        /// Operator.
        op: Operator,
        /// Operands, arity-checked.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Every binding referenced by this expression, in source order.
    pub fn bindings(&self) -> Vec<&Binding> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a Binding>) {
        match &self.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Get { binding, .. } | ExprKind::Has(binding) => out.push(binding),
            ExprKind::Op { args, .. } => {
                for a in args {
                    a.collect_bindings(out);
                }
            }
        }
    }
}
