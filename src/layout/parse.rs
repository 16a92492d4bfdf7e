use crate::codegen::pascal;
use crate::expression::ast::{Expr, ExprKind, Operator};
use crate::expression::parser::parse_expr;
use crate::expression::types::ExprType;
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::foundation::path::JsonPath;
use crate::layout::binding::{
    Binding, BindingScope, TemplatePart, is_identifier, parse_template, setting_key,
};
use crate::layout::fingerprint::fingerprint_document;
use crate::layout::model::{
    ElementKind, LayoutElement, Literal, Prop, PropShape, PropertyValue, SizeSpec, WidgetLayout,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WidgetLayoutDef {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_padding: Option<f64>,
    #[serde(default)]
    supported_sizes: Vec<SizeSpecDef>,
    layout: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SizeSpecDef {
    #[serde(alias = "family")]
    id: String,
    width: f64,
    height: f64,
}

/// Parse and validate a widget layout document.
///
/// Validation is structural and total: every element kind, property key and value shape is
/// checked before any downstream component sees the tree.
#[tracing::instrument(skip(json), fields(bytes = json.len()))]
pub fn parse_layout(json: &str) -> WidgetResult<WidgetLayout> {
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| WidgetError::schema(&JsonPath::root(), format!("invalid JSON: {e}")))?;
    parse_layout_value(&doc)
}

/// Same as [`parse_layout`] for an already-decoded JSON document.
pub fn parse_layout_value(doc: &Value) -> WidgetResult<WidgetLayout> {
    let root = JsonPath::root();
    let def = WidgetLayoutDef::deserialize(doc)
        .map_err(|e| WidgetError::schema(&root, format!("invalid layout document: {e}")))?;

    if !is_identifier(&def.name) {
        return Err(WidgetError::schema(
            &root.field("name"),
            format!("widget name '{}' must be an identifier", def.name),
        ));
    }
    if let Some(p) = def.default_padding
        && (!p.is_finite() || p < 0.0)
    {
        return Err(WidgetError::schema(
            &root.field("defaultPadding"),
            "defaultPadding must be a non-negative number",
        ));
    }

    let sizes = validate_sizes(&def.supported_sizes, &root.field("supportedSizes"))?;
    let layout = parse_element(&def.layout, &root.field("layout"))?;

    let widget = WidgetLayout {
        display_name: def.display_name.unwrap_or_else(|| def.name.clone()),
        description: def.description.unwrap_or_default(),
        name: def.name,
        default_padding: def.default_padding,
        layout,
        supported_sizes: sizes,
        fingerprint: fingerprint_document(doc),
    };
    tracing::debug!(
        widget = %widget.name,
        sizes = widget.supported_sizes.len(),
        "layout parsed"
    );
    Ok(widget)
}

fn validate_sizes(defs: &[SizeSpecDef], path: &JsonPath) -> WidgetResult<Vec<SizeSpec>> {
    if defs.is_empty() {
        return Err(WidgetError::schema(path, "at least one size is required"));
    }
    let mut seen = HashSet::new();
    // Generated code names each size `Size<Pascal>`; distinct ids must stay distinct there.
    let mut symbols: BTreeMap<String, &str> = BTreeMap::new();
    let mut out = Vec::with_capacity(defs.len());
    for (i, d) in defs.iter().enumerate() {
        let p = path.index(i);
        if d.id.trim().is_empty() {
            return Err(WidgetError::schema(&p.field("id"), "size id must not be empty"));
        }
        if !seen.insert(d.id.as_str()) {
            return Err(WidgetError::schema(
                &p.field("id"),
                format!("duplicate size id '{}'", d.id),
            ));
        }
        let symbol = pascal(&d.id);
        if symbol.is_empty() {
            return Err(WidgetError::schema(
                &p.field("id"),
                format!("size id '{}' must contain a letter or digit", d.id),
            ));
        }
        if let Some(other) = symbols.insert(symbol.clone(), d.id.as_str()) {
            return Err(WidgetError::schema(
                &p.field("id"),
                format!("size id '{}' clashes with '{other}' (both name Size{symbol})", d.id),
            ));
        }
        for (name, v) in [("width", d.width), ("height", d.height)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(WidgetError::schema(
                    &p.field(name),
                    format!("size {name} must be a positive number"),
                ));
            }
        }
        out.push(SizeSpec {
            id: d.id.clone(),
            width: d.width,
            height: d.height,
        });
    }
    Ok(out)
}

fn parse_element(v: &Value, path: &JsonPath) -> WidgetResult<LayoutElement> {
    let Value::Object(obj) = v else {
        return Err(WidgetError::schema(path, "element must be an object"));
    };
    let kind_name = obj
        .get("type")
        .ok_or_else(|| WidgetError::schema(path, "element is missing 'type'"))?
        .as_str()
        .ok_or_else(|| WidgetError::schema(&path.field("type"), "'type' must be a string"))?;
    let kind = ElementKind::from_name(kind_name).ok_or_else(|| {
        WidgetError::schema(
            &path.field("type"),
            format!("unknown element type '{kind_name}'"),
        )
    })?;

    let mut el = LayoutElement {
        kind,
        id: None,
        properties: BTreeMap::new(),
        children: Vec::new(),
        path: path.clone(),
    };

    for (key, value) in obj {
        let p = path.field(key);
        match key.as_str() {
            "type" => {}
            "id" => {
                let id = value
                    .as_str()
                    .ok_or_else(|| WidgetError::schema(&p, "'id' must be a string"))?;
                el.id = Some(id.to_string());
            }
            "children" => {
                if !kind.is_container() {
                    return Err(WidgetError::schema(
                        &p,
                        format!("'{}' cannot have children", kind.name()),
                    ));
                }
                let Value::Array(items) = value else {
                    return Err(WidgetError::schema(&p, "'children' must be an array"));
                };
                for (i, c) in items.iter().enumerate() {
                    el.children.push(parse_element(c, &p.index(i))?);
                }
            }
            "itemTemplate" | "then" | "else" => {
                let owner = match key.as_str() {
                    "itemTemplate" => ElementKind::ForEach,
                    _ => ElementKind::Conditional,
                };
                if kind != owner {
                    return Err(WidgetError::schema(
                        &p,
                        format!("'{key}' is not allowed on '{}'", kind.name()),
                    ));
                }
            }
            _ => {
                let prop = Prop::from_name(key).ok_or_else(|| {
                    WidgetError::schema(
                        &p,
                        format!("unknown property '{key}' on '{}'", kind.name()),
                    )
                })?;
                if !kind.allows(prop) {
                    return Err(WidgetError::schema(
                        &p,
                        format!("property '{key}' is not allowed on '{}'", kind.name()),
                    ));
                }
                let parsed = parse_property(value, prop, &p)?;
                if el.properties.insert(prop, parsed).is_some() {
                    return Err(WidgetError::schema(
                        &p,
                        format!("property '{}' is set more than once", prop.name()),
                    ));
                }
            }
        }
    }

    for &req in kind.required() {
        if !el.properties.contains_key(&req) {
            return Err(WidgetError::schema(
                path,
                format!(
                    "'{}' is missing required property '{}'",
                    kind.name(),
                    req.name()
                ),
            ));
        }
    }

    match kind {
        ElementKind::ForEach => {
            let t = required_slot(obj, "itemTemplate", kind, path)?;
            el.children.push(parse_element(t, &path.field("itemTemplate"))?);
        }
        ElementKind::Conditional => {
            let t = required_slot(obj, "then", kind, path)?;
            el.children.push(parse_element(t, &path.field("then"))?);
            if let Some(e) = obj.get("else") {
                el.children.push(parse_element(e, &path.field("else"))?);
            }
        }
        _ => {}
    }

    Ok(el)
}

fn required_slot<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    kind: ElementKind,
    path: &JsonPath,
) -> WidgetResult<&'a Value> {
    obj.get(key).ok_or_else(|| {
        WidgetError::schema(
            path,
            format!("'{}' is missing required property '{key}'", kind.name()),
        )
    })
}

fn parse_property(v: &Value, prop: Prop, path: &JsonPath) -> WidgetResult<PropertyValue> {
    match prop.shape() {
        PropShape::Value(ty) => parse_value(v, ty, path),
        PropShape::Keyword => match v {
            Value::String(s) => Ok(PropertyValue::Literal(Literal::String(s.clone()))),
            _ => Err(WidgetError::schema(
                path,
                format!("'{}' must be a literal keyword", prop.name()),
            )),
        },
        PropShape::Direction => match v.as_str() {
            Some(s @ ("vertical" | "horizontal")) => {
                Ok(PropertyValue::Literal(Literal::String(s.to_string())))
            }
            _ => Err(WidgetError::schema(
                path,
                "'direction' must be 'vertical' or 'horizontal'",
            )),
        },
        PropShape::FontWeight => match v {
            Value::Bool(b) => Ok(PropertyValue::Literal(Literal::Bool(*b))),
            Value::String(_) | Value::Array(_) => parse_value(v, ExprType::Any, path),
            _ => Err(WidgetError::schema(
                path,
                "'fontWeight' must be a keyword, boolean, binding or expression",
            )),
        },
        PropShape::ListBinding => {
            let binding = v
                .as_str()
                .and_then(|s| {
                    Binding::parse(s).or_else(|| Binding::parse(&format!("item.{s}")))
                })
                .filter(|b| matches!(b.scope, BindingScope::Item | BindingScope::Data))
                .ok_or_else(|| {
                    WidgetError::schema(path, "'items' must be an item.* or data.* binding")
                })?;
            Ok(PropertyValue::Binding(binding))
        }
        PropShape::Count => match v.as_u64() {
            Some(n) => Ok(PropertyValue::Literal(Literal::Number(n as f64))),
            None => Err(WidgetError::schema(
                path,
                format!("'{}' must be a non-negative integer", prop.name()),
            )),
        },
        PropShape::Flag => match v {
            Value::Bool(b) => Ok(PropertyValue::Literal(Literal::Bool(*b))),
            _ => Err(WidgetError::schema(
                path,
                format!("'{}' must be a boolean", prop.name()),
            )),
        },
    }
}

/// Classify a raw JSON value into one of the four property value forms.
fn parse_value(v: &Value, ty: ExprType, path: &JsonPath) -> WidgetResult<PropertyValue> {
    match v {
        Value::Number(n) => n
            .as_f64()
            .map(|n| PropertyValue::Literal(Literal::Number(n)))
            .ok_or_else(|| WidgetError::schema(path, "number out of range")),
        Value::Bool(b) => Ok(PropertyValue::Literal(Literal::Bool(*b))),
        Value::String(s) => parse_string_value(s, ty, path),
        Value::Array(_) => Ok(PropertyValue::Expression(parse_expr(v, path)?)),
        Value::Null | Value::Object(_) => Err(WidgetError::schema(
            path,
            "malformed property value: expected a literal, binding, settings reference or expression",
        )),
    }
}

fn parse_string_value(s: &str, ty: ExprType, path: &JsonPath) -> WidgetResult<PropertyValue> {
    if let Some(key) = setting_key(s) {
        return Ok(PropertyValue::Setting(key.to_string()));
    }
    if let Some(binding) = Binding::parse(s) {
        if binding.scope == BindingScope::Size && binding.size_axis_is_width().is_none() {
            return Err(WidgetError::schema(
                path,
                format!("unknown size binding '{s}', expected size.width or size.height"),
            ));
        }
        return Ok(PropertyValue::Binding(binding));
    }
    // Templates only make sense where text is expected.
    if matches!(ty, ExprType::String) {
        let parts = parse_template(s).map_err(|msg| WidgetError::schema(path, msg))?;
        if let Some(parts) = parts {
            return Ok(template_value(parts, path));
        }
    }
    Ok(PropertyValue::Literal(Literal::String(s.to_string())))
}

fn template_value(parts: Vec<TemplatePart>, path: &JsonPath) -> PropertyValue {
    if let [TemplatePart::Binding(b)] = parts.as_slice() {
        return PropertyValue::Binding(b.clone());
    }
    let args = parts
        .into_iter()
        .map(|p| {
            let kind = match p {
                TemplatePart::Text(t) => ExprKind::Literal(Literal::String(t)),
                TemplatePart::Binding(binding) => ExprKind::Op {
                    op: Operator::ToString,
                    args: vec![Expr {
                        kind: ExprKind::Get {
                            binding,
                            default: None,
                        },
                        path: path.clone(),
                    }],
                },
            };
            Expr {
                kind,
                path: path.clone(),
            }
        })
        .collect();
    PropertyValue::Expression(Expr {
        kind: ExprKind::Op {
            op: Operator::Concat,
            args,
        },
        path: path.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/parse.rs"]
mod tests;
