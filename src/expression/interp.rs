use crate::expression::ast::Operator;
use crate::expression::compiler::{Emitter, Fallback};
use crate::expression::types::{ExprType, Typed};
use crate::expression::date::DatePattern;
use crate::expression::value::{Value, format_number, substring};
use crate::foundation::core::Rgba;
use crate::foundation::error::WidgetResult;
use crate::layout::binding::{Binding, BindingScope, Segment};
use crate::layout::model::Literal;
use crate::render::context::{DataContext, DataPath, DataRoot};
use std::fmt;
use std::sync::Arc;

/// Why a thunk produced no value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalFault {
    /// A binding without default did not resolve.
    #[error("missing value at {0}")]
    Missing(String),
    /// A value could not be converted to the type the expression needs.
    #[error("type mismatch: {0}")]
    Type(String),
}

type EvalFn = dyn Fn(&DataContext) -> Result<Value, EvalFault> + Send + Sync;

/// A compiled expression: a closure over the data context and the paths it reads.
#[derive(Clone)]
pub struct Thunk {
    eval: Arc<EvalFn>,
    deps: Vec<DataPath>,
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk").field("deps", &self.deps).finish()
    }
}

impl Thunk {
    fn new(
        deps: Vec<DataPath>,
        f: impl Fn(&DataContext) -> Result<Value, EvalFault> + Send + Sync + 'static,
    ) -> Self {
        Self {
            eval: Arc::new(f),
            deps,
        }
    }

    /// A thunk that always yields `v`.
    pub fn constant(v: Value) -> Self {
        Self::new(Vec::new(), move |_| Ok(v.clone()))
    }

    /// Evaluate against `ctx`.
    pub fn eval(&self, ctx: &DataContext) -> Result<Value, EvalFault> {
        (self.eval)(ctx)
    }

    /// Absolute paths this thunk reads.
    pub fn deps(&self) -> &[DataPath] {
        &self.deps
    }
}

/// [`Emitter`] producing closures for the interpreted renderers.
///
/// `item.*` bindings are rewritten to absolute data paths using the current item prefix, so a
/// thunk built inside `forEach` reads its own list element.
#[derive(Clone, Debug, Default)]
pub struct ClosureEmitter {
    item_prefix: Vec<Segment>,
}

impl ClosureEmitter {
    /// Emitter for the top level, where `item` is the data root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitter whose `item` is the element at `prefix`.
    pub fn with_item(prefix: Vec<Segment>) -> Self {
        Self {
            item_prefix: prefix,
        }
    }

    /// Absolute path a binding reads, `None` for `size.*`.
    pub fn absolute(&self, binding: &Binding) -> Option<DataPath> {
        match binding.scope {
            BindingScope::Item => {
                let mut segs = self.item_prefix.clone();
                segs.extend(binding.segments.iter().cloned());
                Some(DataPath::data(segs))
            }
            BindingScope::Data => Some(DataPath::data(binding.segments.clone())),
            BindingScope::Settings => Some(DataPath {
                root: DataRoot::Settings,
                segments: binding.segments.clone(),
            }),
            BindingScope::Size => None,
        }
    }
}

impl Emitter for ClosureEmitter {
    type Output = Thunk;

    fn literal(&mut self, lit: &Literal) -> Thunk {
        Thunk::constant(Value::from_literal(lit))
    }

    fn binding(
        &mut self,
        binding: &Binding,
        want: ExprType,
        fallback: Fallback<'_>,
    ) -> WidgetResult<Thunk> {
        let Some(path) = self.absolute(binding) else {
            return Ok(Thunk::constant(Value::Null));
        };
        let fallback = match fallback {
            Fallback::Default(l) => Some(Value::from_literal(l)),
            Fallback::Null => Some(Value::Null),
            Fallback::Zero => None,
        };
        let shown = binding.to_string();
        let deps = vec![path.clone()];
        Ok(Thunk::new(deps, move |ctx| {
            let raw = ctx.lookup(&path).map(Value::from_json);
            match (raw, &fallback) {
                (Some(v), _) if v.is_present() => convert(v, want).or_else(|e| match &fallback {
                    Some(d) => Ok(d.clone()),
                    None => Err(e),
                }),
                (_, Some(d)) => Ok(d.clone()),
                (_, None) => Err(EvalFault::Missing(shown.clone())),
            }
        }))
    }

    fn presence(&mut self, binding: &Binding) -> WidgetResult<Thunk> {
        let Some(path) = self.absolute(binding) else {
            return Ok(Thunk::constant(Value::Bool(true)));
        };
        let deps = vec![path.clone()];
        Ok(Thunk::new(deps, move |ctx| {
            let present = match ctx.lookup(&path) {
                None | Some(serde_json::Value::Null) => false,
                Some(serde_json::Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            };
            Ok(Value::Bool(present))
        }))
    }

    fn operator(
        &mut self,
        op: Operator,
        operands: Vec<Typed<Thunk>>,
        _result: ExprType,
    ) -> WidgetResult<Thunk> {
        let mut deps: Vec<DataPath> = Vec::new();
        for o in &operands {
            for d in o.value.deps() {
                if !deps.contains(d) {
                    deps.push(d.clone());
                }
            }
        }
        let args: Vec<Thunk> = operands.into_iter().map(|o| o.value).collect();
        Ok(Thunk::new(deps, move |ctx| apply(op, &args, ctx)))
    }

    fn coerce(&mut self, value: Thunk, _from: ExprType, to: ExprType) -> Thunk {
        let deps = value.deps.clone();
        Thunk::new(deps, move |ctx| convert(value.eval(ctx)?, to))
    }
}

/// Runtime conversion to `to`, mirroring the compile-time coercion rules.
fn convert(v: Value, to: ExprType) -> Result<Value, EvalFault> {
    match to {
        ExprType::Any => Ok(v),
        ExprType::String => Ok(Value::String(v.to_display())),
        ExprType::Bool => Ok(Value::Bool(v.truthy())),
        ExprType::Number => v
            .as_number()
            .map(Value::Number)
            .ok_or_else(|| EvalFault::Type(format!("expected number, found {v:?}"))),
        ExprType::Color => v
            .as_color()
            .map(Value::Color)
            .ok_or_else(|| EvalFault::Type(format!("expected color, found {v:?}"))),
    }
}

fn num(t: &Thunk, ctx: &DataContext) -> Result<f64, EvalFault> {
    let v = t.eval(ctx)?;
    v.as_number()
        .ok_or_else(|| EvalFault::Type(format!("expected number, found {v:?}")))
}

fn color(t: &Thunk, ctx: &DataContext) -> Result<Rgba, EvalFault> {
    let v = t.eval(ctx)?;
    v.as_color()
        .ok_or_else(|| EvalFault::Type(format!("expected color, found {v:?}")))
}

fn text(t: &Thunk, ctx: &DataContext) -> Result<String, EvalFault> {
    Ok(t.eval(ctx)?.to_display())
}

fn flag(t: &Thunk, ctx: &DataContext) -> Result<bool, EvalFault> {
    Ok(t.eval(ctx)?.truthy())
}

fn apply(op: Operator, args: &[Thunk], ctx: &DataContext) -> Result<Value, EvalFault> {
    let v = match op {
        Operator::Add => {
            Value::Number(args.iter().map(|a| num(a, ctx)).sum::<Result<f64, _>>()?)
        }
        Operator::Mul => {
            Value::Number(args.iter().map(|a| num(a, ctx)).product::<Result<f64, _>>()?)
        }
        Operator::Sub => match args {
            [a] => Value::Number(-num(a, ctx)?),
            [a, b, ..] => Value::Number(num(a, ctx)? - num(b, ctx)?),
            [] => Value::Null,
        },
        Operator::Div => Value::Number(num(&args[0], ctx)? / num(&args[1], ctx)?),
        Operator::Mod => Value::Number(num(&args[0], ctx)? % num(&args[1], ctx)?),
        Operator::Eq | Operator::Ne => {
            let eq = args[0].eval(ctx)?.loosely_equals(&args[1].eval(ctx)?);
            Value::Bool(eq == (op == Operator::Eq))
        }
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            let a = args[0].eval(ctx)?;
            let b = args[1].eval(ctx)?;
            let ord = a
                .compare(&b)
                .ok_or_else(|| EvalFault::Type(format!("cannot order {a:?} and {b:?}")))?;
            Value::Bool(match op {
                Operator::Lt => ord.is_lt(),
                Operator::Le => ord.is_le(),
                Operator::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            })
        }
        Operator::All => {
            for a in args {
                if !flag(a, ctx)? {
                    return Ok(Value::Bool(false));
                }
            }
            Value::Bool(true)
        }
        Operator::Any => {
            for a in args {
                if flag(a, ctx)? {
                    return Ok(Value::Bool(true));
                }
            }
            Value::Bool(false)
        }
        Operator::Not => Value::Bool(!flag(&args[0], ctx)?),
        Operator::Case => {
            let (fallback, pairs) = args
                .split_last()
                .ok_or_else(|| EvalFault::Type("empty case".to_string()))?;
            for pair in pairs.chunks(2) {
                if flag(&pair[0], ctx)? {
                    return pair[1].eval(ctx);
                }
            }
            return fallback.eval(ctx);
        }
        Operator::Match => {
            let (input, rest) = args
                .split_first()
                .ok_or_else(|| EvalFault::Type("empty match".to_string()))?;
            let (fallback, pairs) = rest
                .split_last()
                .ok_or_else(|| EvalFault::Type("match without fallback".to_string()))?;
            let input = input.eval(ctx)?;
            for pair in pairs.chunks(2) {
                if input.loosely_equals(&pair[0].eval(ctx)?) {
                    return pair[1].eval(ctx);
                }
            }
            return fallback.eval(ctx);
        }
        Operator::Coalesce => {
            let mut last = Err(EvalFault::Missing("coalesce".to_string()));
            for a in args {
                match a.eval(ctx) {
                    Ok(v) if v.is_present() => return Ok(v),
                    Ok(v) => last = Ok(v),
                    Err(EvalFault::Missing(p)) => last = Err(EvalFault::Missing(p)),
                    Err(e) => return Err(e),
                }
            }
            return last;
        }
        Operator::Concat => {
            let mut out = String::new();
            for a in args {
                out.push_str(&text(a, ctx)?);
            }
            Value::String(out)
        }
        Operator::ToString => Value::String(text(&args[0], ctx)?),
        Operator::Upcase => Value::String(text(&args[0], ctx)?.to_uppercase()),
        Operator::Downcase => Value::String(text(&args[0], ctx)?.to_lowercase()),
        Operator::Substring => {
            let length = match args.get(2) {
                Some(n) => Some(num(n, ctx)?),
                None => None,
            };
            Value::String(substring(&text(&args[0], ctx)?, num(&args[1], ctx)?, length))
        }
        Operator::FormatDate => {
            let pattern = DatePattern::parse(&text(&args[1], ctx)?).map_err(EvalFault::Type)?;
            Value::String(pattern.format(&args[0].eval(ctx)?))
        }
        Operator::FormatNumber => {
            let x = num(&args[0], ctx)?;
            let unit = match args.get(1) {
                Some(u) => text(u, ctx)?,
                None => String::new(),
            };
            let decimals = match args.get(2) {
                Some(d) => num(d, ctx)?.clamp(0.0, 6.0) as u32,
                None => 0,
            };
            Value::String(format_number(x, &unit, decimals))
        }
        Operator::Rgb => Value::Color(Rgba::from_channels(
            num(&args[0], ctx)?,
            num(&args[1], ctx)?,
            num(&args[2], ctx)?,
            1.0,
        )),
        Operator::Rgba => Value::Color(Rgba::from_channels(
            num(&args[0], ctx)?,
            num(&args[1], ctx)?,
            num(&args[2], ctx)?,
            num(&args[3], ctx)?,
        )),
        Operator::InterpolateColor => {
            let from = color(&args[0], ctx)?;
            let to = color(&args[1], ctx)?;
            Value::Color(from.mix(to, num(&args[2], ctx)?))
        }
        Operator::ThemeColor => return args[0].eval(ctx),
    };
    Ok(v)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/interp.rs"]
mod tests;
