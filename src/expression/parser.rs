use crate::expression::ast::{Expr, ExprKind, Operator};
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::foundation::path::JsonPath;
use crate::layout::binding::{Binding, BindingScope};
use crate::layout::model::Literal;
use serde_json::Value;

/// Parse a `[operator, ...operands]` array into an expression tree.
pub(crate) fn parse_expr(v: &Value, path: &JsonPath) -> WidgetResult<Expr> {
    let Value::Array(items) = v else {
        return parse_operand(v, path);
    };
    let Some(head) = items.first() else {
        return Err(WidgetError::schema(path, "empty expression"));
    };
    let Some(name) = head.as_str() else {
        return Err(WidgetError::schema(
            path,
            "expression operator must be a string",
        ));
    };
    let operands = &items[1..];

    match name {
        "get" => {
            if operands.is_empty() || operands.len() > 2 {
                return Err(WidgetError::expression_type(
                    path,
                    format!("'get' expects 1 to 2 args, got {}", operands.len()),
                ));
            }
            let binding = parse_binding_operand(&operands[0], &path.index(1))?;
            let default = match operands.get(1) {
                Some(d) => Some(parse_literal(d).ok_or_else(|| {
                    WidgetError::expression_type(
                        &path.index(2),
                        "'get' default must be a literal number, string or boolean",
                    )
                })?),
                None => None,
            };
            Ok(Expr {
                kind: ExprKind::Get { binding, default },
                path: path.clone(),
            })
        }
        "has" => {
            if operands.len() != 1 {
                return Err(WidgetError::expression_type(
                    path,
                    format!("'has' expects 1 arg, got {}", operands.len()),
                ));
            }
            let binding = parse_binding_operand(&operands[0], &path.index(1))?;
            Ok(Expr {
                kind: ExprKind::Has(binding),
                path: path.clone(),
            })
        }
        _ => {
            let op = Operator::from_name(name)
                .ok_or_else(|| WidgetError::unsupported_operator(path, name))?;
            op.check_arity(operands.len())
                .map_err(|msg| WidgetError::expression_type(path, msg))?;
            let mut args = Vec::with_capacity(operands.len());
            for (i, a) in operands.iter().enumerate() {
                args.push(parse_expr(a, &path.index(i + 1))?);
            }
            Ok(Expr {
                kind: ExprKind::Op { op, args },
                path: path.clone(),
            })
        }
    }
}

fn parse_operand(v: &Value, path: &JsonPath) -> WidgetResult<Expr> {
    let lit = parse_literal(v).ok_or_else(|| {
        WidgetError::schema(
            path,
            "expression operand must be a number, string, boolean or expression",
        )
    })?;
    Ok(Expr {
        kind: ExprKind::Literal(lit),
        path: path.clone(),
    })
}

fn parse_literal(v: &Value) -> Option<Literal> {
    match v {
        Value::Number(n) => n.as_f64().map(Literal::Number),
        Value::String(s) => Some(Literal::String(s.clone())),
        Value::Bool(b) => Some(Literal::Bool(*b)),
        _ => None,
    }
}

fn parse_binding_operand(v: &Value, path: &JsonPath) -> WidgetResult<Binding> {
    let s = v
        .as_str()
        .ok_or_else(|| WidgetError::expression_type(path, "expected a literal binding path"))?;
    let binding = Binding::parse_path(s)
        .or_else(|| Binding::parse(&format!("item.{s}")))
        .ok_or_else(|| WidgetError::schema(path, format!("invalid binding path '{s}'")))?;
    if binding.scope == BindingScope::Size
        && binding.size_axis_is_width().is_none()
    {
        return Err(WidgetError::schema(
            path,
            format!("unknown size binding '{s}', expected size.width or size.height"),
        ));
    }
    Ok(binding)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
