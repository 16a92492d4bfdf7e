use crate::expression::ast::{Expr, ExprKind, Operator};
use crate::expression::date::DatePattern;
use crate::expression::types::{ExprType, Typed};
use crate::foundation::core::{Platform, Size};
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::foundation::path::JsonPath;
use crate::layout::binding::{Binding, BindingScope};
use crate::layout::model::{Literal, PropertyValue};
use crate::style::config::StyleConfig;

/// What an unresolved `get` yields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fallback<'a> {
    /// The literal default written in the layout.
    Default(&'a Literal),
    /// The zero value of the requested type.
    Zero,
    /// Nothing; used for `coalesce` operands so the next operand is tried.
    Null,
}

/// Platform-specific leaf emission and operator syntax.
///
/// Typing, arity and coercion decisions are made once by [`ExprCompiler`]; implementations
/// only map already-checked nodes onto their output form (source text, closures, ...).
pub trait Emitter {
    /// Emitted form of one expression.
    type Output: Clone;

    /// Emit a constant.
    fn literal(&mut self, lit: &Literal) -> Self::Output;

    /// Emit a data lookup producing a value of type `want`.
    fn binding(
        &mut self,
        binding: &Binding,
        want: ExprType,
        fallback: Fallback<'_>,
    ) -> WidgetResult<Self::Output>;

    /// Emit a presence test (`has`).
    fn presence(&mut self, binding: &Binding) -> WidgetResult<Self::Output>;

    /// Emit an operator application. Operands are already typed and coerced.
    fn operator(
        &mut self,
        op: Operator,
        operands: Vec<Typed<Self::Output>>,
        result: ExprType,
    ) -> WidgetResult<Self::Output>;

    /// Emit a runtime conversion between two types.
    fn coerce(&mut self, value: Self::Output, from: ExprType, to: ExprType) -> Self::Output;
}

/// Fixed inputs of one compilation: style configuration, platform and canvas size.
#[derive(Clone, Copy, Debug)]
pub struct CompileEnv<'a> {
    /// Palettes and native tables.
    pub config: &'a StyleConfig,
    /// Target platform; selects the palette.
    pub platform: Platform,
    /// Canvas size that `size.*` bindings fold to.
    pub size: Size,
}

/// The single recursion shared by every backend.
pub struct ExprCompiler<'a, E: Emitter> {
    emitter: &'a mut E,
    env: CompileEnv<'a>,
}

/// Compile one property value to the emitter's output, checked against `expected`.
pub fn compile_property_value<E: Emitter>(
    value: &PropertyValue,
    expected: ExprType,
    emitter: &mut E,
    env: CompileEnv<'_>,
    path: &JsonPath,
) -> WidgetResult<Typed<E::Output>> {
    ExprCompiler::new(emitter, env).compile_property_value(value, expected, path)
}

impl<'a, E: Emitter> ExprCompiler<'a, E> {
    /// Create a compiler writing through `emitter`.
    pub fn new(emitter: &'a mut E, env: CompileEnv<'a>) -> Self {
        Self { emitter, env }
    }

    /// Compilation environment.
    pub fn env(&self) -> CompileEnv<'a> {
        self.env
    }

    /// Compile one property value, checked against `expected`.
    pub fn compile_property_value(
        &mut self,
        value: &PropertyValue,
        expected: ExprType,
        path: &JsonPath,
    ) -> WidgetResult<Typed<E::Output>> {
        let typed = match value {
            PropertyValue::Literal(lit) => self.literal(lit, Some(expected), path)?,
            PropertyValue::Binding(b) => self.get(b, None, Some(expected), false, path)?,
            PropertyValue::Setting(key) => {
                self.get(&Binding::setting(key.clone()), None, Some(expected), false, path)?
            }
            PropertyValue::Expression(e) => self.expr(e, Some(expected))?,
        };
        self.fit(typed, expected, path)
    }

    fn expr(&mut self, e: &Expr, want: Option<ExprType>) -> WidgetResult<Typed<E::Output>> {
        match &e.kind {
            ExprKind::Literal(lit) => self.literal(lit, want, &e.path),
            ExprKind::Get { binding, default } => {
                self.get(binding, default.as_ref(), want, false, &e.path)
            }
            ExprKind::Has(binding) => Ok(Typed::new(
                self.emitter.presence(binding)?,
                ExprType::Bool,
            )),
            ExprKind::Op { op, args } => self.op(*op, args, want, &e.path),
        }
    }

    fn literal(
        &mut self,
        lit: &Literal,
        want: Option<ExprType>,
        path: &JsonPath,
    ) -> WidgetResult<Typed<E::Output>> {
        if let (Literal::String(s), Some(ExprType::Color)) = (lit, want) {
            let c = self
                .env
                .config
                .resolve_color(self.env.platform, s)
                .ok_or_else(|| WidgetError::invalid_color(path, s.clone()))?;
            return Ok(Typed::new(
                self.emitter.literal(&Literal::Color(c)),
                ExprType::Color,
            ));
        }
        Ok(Typed::new(self.emitter.literal(lit), lit.ty()))
    }

    fn get(
        &mut self,
        binding: &Binding,
        default: Option<&Literal>,
        want: Option<ExprType>,
        nullable: bool,
        path: &JsonPath,
    ) -> WidgetResult<Typed<E::Output>> {
        if binding.scope == BindingScope::Size {
            let n = match binding.size_axis_is_width() {
                Some(true) => self.env.size.width,
                Some(false) => self.env.size.height,
                None => {
                    return Err(WidgetError::schema(
                        path,
                        format!("unknown size binding '{binding}'"),
                    ));
                }
            };
            return Ok(Typed::new(
                self.emitter.literal(&Literal::Number(n)),
                ExprType::Number,
            ));
        }

        let resolved_default = match (default, want) {
            (Some(Literal::String(s)), Some(ExprType::Color)) => Some(Literal::Color(
                self.env
                    .config
                    .resolve_color(self.env.platform, s)
                    .ok_or_else(|| WidgetError::invalid_color(path, s.clone()))?,
            )),
            (d, _) => d.cloned(),
        };
        let ty = match (&resolved_default, want) {
            (Some(d), _) => d.ty(),
            (None, Some(w)) => w,
            (None, None) => ExprType::Any,
        };
        let fallback = match (&resolved_default, nullable) {
            (_, true) => Fallback::Null,
            (Some(d), false) => Fallback::Default(d),
            (None, false) => Fallback::Zero,
        };
        let out = self.emitter.binding(binding, ty, fallback)?;
        Ok(Typed::new(out, ty))
    }

    /// Compile `e` and fit it to `ty`.
    fn expect(&mut self, e: &Expr, ty: ExprType) -> WidgetResult<Typed<E::Output>> {
        let v = self.expr(e, Some(ty))?;
        self.fit(v, ty, &e.path)
    }

    fn op(
        &mut self,
        op: Operator,
        args: &[Expr],
        want: Option<ExprType>,
        path: &JsonPath,
    ) -> WidgetResult<Typed<E::Output>> {
        op.check_arity(args.len())
            .map_err(|msg| WidgetError::expression_type(path, msg))?;
        let (operands, result) = match op {
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod => {
                (self.expect_all(args, ExprType::Number)?, ExprType::Number)
            }
            Operator::Eq | Operator::Ne => {
                let (a, b) = self.comparable(args, path, false)?;
                (vec![a, b], ExprType::Bool)
            }
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                let (a, b) = self.comparable(args, path, true)?;
                (vec![a, b], ExprType::Bool)
            }
            Operator::All | Operator::Any | Operator::Not => {
                (self.expect_all(args, ExprType::Bool)?, ExprType::Bool)
            }
            Operator::Case => {
                let last = args.len() - 1;
                let mut conds = Vec::with_capacity(last / 2);
                let mut outs = Vec::with_capacity(last / 2 + 1);
                for pair in args[..last].chunks(2) {
                    conds.push(self.expect(&pair[0], ExprType::Bool)?);
                    outs.push((self.expr(&pair[1], want)?, &pair[1].path));
                }
                outs.push((self.expr(&args[last], want)?, &args[last].path));
                let (outs, ty) = self.unify(outs, want)?;
                let mut operands = Vec::with_capacity(args.len());
                let mut outs = outs.into_iter();
                for c in conds {
                    operands.push(c);
                    operands.extend(outs.next());
                }
                operands.extend(outs);
                (operands, ty)
            }
            Operator::Match => return self.match_op(args, want),
            Operator::Coalesce => {
                let last = args.len() - 1;
                let mut outs = Vec::with_capacity(args.len());
                for (i, a) in args.iter().enumerate() {
                    let v = match &a.kind {
                        ExprKind::Get { binding, default } => {
                            self.get(binding, default.as_ref(), want, i < last, &a.path)?
                        }
                        _ => self.expr(a, want)?,
                    };
                    outs.push((v, &a.path));
                }
                self.unify(outs, want)?
            }
            Operator::Concat | Operator::Upcase | Operator::Downcase => {
                (self.expect_all(args, ExprType::String)?, ExprType::String)
            }
            Operator::ToString => {
                let v = self.expr(&args[0], None)?;
                return self.fit(v, ExprType::String, &args[0].path);
            }
            Operator::FormatNumber => {
                let value = self.expect(&args[0], ExprType::Number)?;
                let unit = match args.get(1) {
                    Some(u) => self.expect(u, ExprType::String)?,
                    None => Typed::new(
                        self.emitter.literal(&Literal::String(String::new())),
                        ExprType::String,
                    ),
                };
                let decimals = match args.get(2) {
                    Some(Expr {
                        kind: ExprKind::Literal(Literal::Number(d)),
                        ..
                    }) if d.fract() == 0.0 && (0.0..=6.0).contains(d) => *d,
                    Some(other) => {
                        return Err(WidgetError::expression_type(
                            &other.path,
                            "'format-number' decimals must be an integer literal between 0 and 6",
                        ));
                    }
                    None => 0.0,
                };
                let decimals = Typed::new(
                    self.emitter.literal(&Literal::Number(decimals)),
                    ExprType::Number,
                );
                (vec![value, unit, decimals], ExprType::String)
            }
            Operator::Substring => {
                let mut operands = vec![self.expect(&args[0], ExprType::String)?];
                for a in &args[1..] {
                    operands.push(self.expect(a, ExprType::Number)?);
                }
                (operands, ExprType::String)
            }
            Operator::FormatDate => {
                let pattern = match &args[1].kind {
                    ExprKind::Literal(Literal::String(p)) => p,
                    _ => {
                        return Err(WidgetError::expression_type(
                            &args[1].path,
                            "'format' expects a literal date pattern",
                        ));
                    }
                };
                DatePattern::parse(pattern)
                    .map_err(|msg| WidgetError::expression_type(&args[1].path, msg))?;
                let value = self.expr(&args[0], None)?;
                let pattern = Typed::new(
                    self.emitter.literal(&Literal::String(pattern.clone())),
                    ExprType::String,
                );
                (vec![value, pattern], ExprType::String)
            }
            Operator::Rgb | Operator::Rgba => {
                (self.expect_all(args, ExprType::Number)?, ExprType::Color)
            }
            Operator::InterpolateColor => {
                let from = self.expect(&args[0], ExprType::Color)?;
                let to = self.expect(&args[1], ExprType::Color)?;
                let t = self.expect(&args[2], ExprType::Number)?;
                (vec![from, to, t], ExprType::Color)
            }
            Operator::ThemeColor => {
                let token = match &args[0].kind {
                    ExprKind::Literal(Literal::String(s)) => s,
                    _ => {
                        return Err(WidgetError::expression_type(
                            &args[0].path,
                            "'theme-color' expects a literal token name",
                        ));
                    }
                };
                let c = self
                    .env
                    .config
                    .theme_color(self.env.platform, token)
                    .ok_or_else(|| WidgetError::invalid_color(&args[0].path, token.clone()))?;
                return Ok(Typed::new(
                    self.emitter.literal(&Literal::Color(c)),
                    ExprType::Color,
                ));
            }
        };

        let out = self.emitter.operator(op, operands, result)?;
        Ok(Typed::new(out, result))
    }

    fn expect_all(&mut self, args: &[Expr], ty: ExprType) -> WidgetResult<Vec<Typed<E::Output>>> {
        args.iter().map(|a| self.expect(a, ty)).collect()
    }

    /// Operands of a comparison, coerced to one common type.
    fn comparable(
        &mut self,
        args: &[Expr],
        path: &JsonPath,
        ordered: bool,
    ) -> WidgetResult<(Typed<E::Output>, Typed<E::Output>)> {
        let a = self.expr(&args[0], None)?;
        let b = self.expr(&args[1], None)?;
        let common = match (a.ty, b.ty) {
            (x, y) if x == y => x,
            (ExprType::Any, y) => y,
            (x, ExprType::Any) => x,
            (x, y) => {
                return Err(WidgetError::expression_type(
                    path,
                    format!("cannot compare {x} with {y}"),
                ));
            }
        };
        let common = match (ordered, common) {
            (true, ExprType::Any) => ExprType::Number,
            (true, ExprType::Number | ExprType::String) | (false, _) => common,
            (true, other) => {
                return Err(WidgetError::expression_type(
                    path,
                    format!("ordering needs numbers or strings, found {other}"),
                ));
            }
        };
        let a = self.fit(a, common, &args[0].path)?;
        let b = self.fit(b, common, &args[1].path)?;
        Ok((a, b))
    }

    fn match_op(
        &mut self,
        args: &[Expr],
        want: Option<ExprType>,
    ) -> WidgetResult<Typed<E::Output>> {
        let last = args.len() - 1;
        let mut label_ty = None;
        for pair in args[1..last].chunks(2) {
            let ty = match &pair[0].kind {
                ExprKind::Literal(l @ (Literal::Number(_) | Literal::String(_))) => l.ty(),
                _ => {
                    return Err(WidgetError::expression_type(
                        &pair[0].path,
                        "'match' labels must be literal numbers or strings",
                    ));
                }
            };
            if label_ty.is_some_and(|t| t != ty) {
                return Err(WidgetError::expression_type(
                    &pair[0].path,
                    "'match' labels must all have the same type",
                ));
            }
            label_ty = Some(ty);
        }
        let label_ty = label_ty.unwrap_or(ExprType::String);

        let input = self.expr(&args[0], Some(label_ty))?;
        let input = self.fit(input, label_ty, &args[0].path)?;

        let mut labels = Vec::new();
        let mut outs = Vec::new();
        for pair in args[1..last].chunks(2) {
            labels.push(self.expr(&pair[0], None)?);
            outs.push((self.expr(&pair[1], want)?, &pair[1].path));
        }
        outs.push((self.expr(&args[last], want)?, &args[last].path));
        let (outs, ty) = self.unify(outs, want)?;

        let mut operands = Vec::with_capacity(args.len());
        operands.push(input);
        let mut outs = outs.into_iter();
        for l in labels {
            operands.push(l);
            operands.extend(outs.next());
        }
        operands.extend(outs);
        let out = self.emitter.operator(Operator::Match, operands, ty)?;
        Ok(Typed::new(out, ty))
    }

    /// Bring branch values to one type: the wanted type when given, else their common type.
    fn unify(
        &mut self,
        values: Vec<(Typed<E::Output>, &JsonPath)>,
        want: Option<ExprType>,
    ) -> WidgetResult<(Vec<Typed<E::Output>>, ExprType)> {
        let ty = match want {
            Some(w) if w != ExprType::Any => w,
            _ => {
                let first = values.first().map(|(v, _)| v.ty).unwrap_or(ExprType::Any);
                if values.iter().all(|(v, _)| v.ty == first) {
                    first
                } else {
                    ExprType::Any
                }
            }
        };
        let mut out = Vec::with_capacity(values.len());
        for (v, p) in values {
            out.push(self.fit(v, ty, p)?);
        }
        Ok((out, ty))
    }

    /// Convert `v` to `target`, inserting a runtime coercion where one is allowed.
    fn fit(
        &mut self,
        v: Typed<E::Output>,
        target: ExprType,
        path: &JsonPath,
    ) -> WidgetResult<Typed<E::Output>> {
        let allowed = match (v.ty, target) {
            (a, b) if a == b => return Ok(v),
            (_, ExprType::Any) | (ExprType::Any, _) => true,
            (ExprType::Number | ExprType::Bool | ExprType::Color, ExprType::String) => true,
            (ExprType::String, ExprType::Color) => true,
            _ => false,
        };
        if !allowed {
            return Err(WidgetError::expression_type(
                path,
                format!("expected {target}, found {}", v.ty),
            ));
        }
        let out = self.emitter.coerce(v.value, v.ty, target);
        Ok(Typed::new(out, target))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/compiler.rs"]
mod tests;
