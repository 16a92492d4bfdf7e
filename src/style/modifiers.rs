use crate::expression::compiler::{Emitter, ExprCompiler};
use crate::expression::types::{ExprType, Typed};
use crate::foundation::core::Platform;
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::foundation::path::JsonPath;
use crate::layout::model::{LayoutElement, Literal, Prop, PropShape, PropertyValue};
use crate::style::config::{AlignKeyword, Axis, FontWeight, StyleConfig};

/// Style attributes the builder turns into modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleAttr {
    /// Fixed width.
    Width,
    /// Fill available width.
    FillWidth,
    /// Fixed height.
    Height,
    /// Fill available height.
    FillHeight,
    /// Uniform padding.
    Padding,
    /// Leading and trailing padding.
    PaddingHorizontal,
    /// Top and bottom padding.
    PaddingVertical,
    /// Background fill.
    BackgroundColor,
    /// Corner radius.
    CornerRadius,
    /// Visibility.
    Visible,
    /// Horizontal child alignment.
    Alignment,
    /// Vertical child alignment.
    CrossAlignment,
    /// Gap between children.
    Spacing,
    /// Foreground color (text color, image tint, divider color).
    Color,
    /// Font size.
    FontSize,
    /// Font weight.
    FontWeight,
    /// Text alignment.
    TextAlign,
    /// Maximum text lines.
    MaxLines,
}

impl StyleAttr {
    fn prop(self) -> Prop {
        match self {
            StyleAttr::Width => Prop::Width,
            StyleAttr::FillWidth => Prop::FillWidth,
            StyleAttr::Height => Prop::Height,
            StyleAttr::FillHeight => Prop::FillHeight,
            StyleAttr::Padding => Prop::Padding,
            StyleAttr::PaddingHorizontal => Prop::PaddingHorizontal,
            StyleAttr::PaddingVertical => Prop::PaddingVertical,
            StyleAttr::BackgroundColor => Prop::BackgroundColor,
            StyleAttr::CornerRadius => Prop::CornerRadius,
            StyleAttr::Visible => Prop::Visible,
            StyleAttr::Alignment => Prop::Alignment,
            StyleAttr::CrossAlignment => Prop::CrossAlignment,
            StyleAttr::Spacing => Prop::Spacing,
            StyleAttr::Color => Prop::Color,
            StyleAttr::FontSize => Prop::FontSize,
            StyleAttr::FontWeight => Prop::FontWeight,
            StyleAttr::TextAlign => Prop::TextAlign,
            StyleAttr::MaxLines => Prop::MaxLines,
        }
    }
}

/// Glance: size, then the background, then padding so the fill covers the padded area.
const GLANCE_ORDER: [StyleAttr; 18] = [
    StyleAttr::Width,
    StyleAttr::FillWidth,
    StyleAttr::Height,
    StyleAttr::FillHeight,
    StyleAttr::BackgroundColor,
    StyleAttr::CornerRadius,
    StyleAttr::Padding,
    StyleAttr::PaddingHorizontal,
    StyleAttr::PaddingVertical,
    StyleAttr::Visible,
    StyleAttr::Alignment,
    StyleAttr::CrossAlignment,
    StyleAttr::Spacing,
    StyleAttr::Color,
    StyleAttr::FontSize,
    StyleAttr::FontWeight,
    StyleAttr::TextAlign,
    StyleAttr::MaxLines,
];

/// SwiftUI modifiers wrap outward: padding, frame, then background.
const SWIFT_ORDER: [StyleAttr; 18] = [
    StyleAttr::Padding,
    StyleAttr::PaddingHorizontal,
    StyleAttr::PaddingVertical,
    StyleAttr::Width,
    StyleAttr::FillWidth,
    StyleAttr::Height,
    StyleAttr::FillHeight,
    StyleAttr::BackgroundColor,
    StyleAttr::CornerRadius,
    StyleAttr::Visible,
    StyleAttr::Alignment,
    StyleAttr::CrossAlignment,
    StyleAttr::Spacing,
    StyleAttr::Color,
    StyleAttr::FontSize,
    StyleAttr::FontWeight,
    StyleAttr::TextAlign,
    StyleAttr::MaxLines,
];

const PROPERTY_ORDER: [StyleAttr; 18] = [
    StyleAttr::Width,
    StyleAttr::FillWidth,
    StyleAttr::Height,
    StyleAttr::FillHeight,
    StyleAttr::Padding,
    StyleAttr::PaddingHorizontal,
    StyleAttr::PaddingVertical,
    StyleAttr::BackgroundColor,
    StyleAttr::CornerRadius,
    StyleAttr::Visible,
    StyleAttr::Alignment,
    StyleAttr::CrossAlignment,
    StyleAttr::Spacing,
    StyleAttr::Color,
    StyleAttr::FontSize,
    StyleAttr::FontWeight,
    StyleAttr::TextAlign,
    StyleAttr::MaxLines,
];

/// Fixed modifier order of a platform.
pub fn modifier_order(platform: Platform) -> &'static [StyleAttr] {
    match platform {
        Platform::Glance => &GLANCE_ORDER,
        Platform::SwiftUi => &SWIFT_ORDER,
        Platform::NativeScript | Platform::Html => &PROPERTY_ORDER,
    }
}

/// Value carried by one modifier.
#[derive(Clone, Debug, PartialEq)]
pub enum ModValue<O> {
    /// A native constant looked up in the style tables.
    Native(String),
    /// A set flag (`fillWidth`, `fillHeight`).
    Flag,
    /// A compiled expression.
    Dynamic(Typed<O>),
}

/// One style attribute with its value.
#[derive(Clone, Debug, PartialEq)]
pub struct Modifier<O> {
    /// Attribute.
    pub attr: StyleAttr,
    /// Value.
    pub value: ModValue<O>,
}

/// Modifiers of one element in platform order.
#[derive(Clone, Debug, PartialEq)]
pub struct ModifierChain<O> {
    mods: Vec<Modifier<O>>,
}

impl<O> ModifierChain<O> {
    /// Modifiers in order.
    pub fn iter(&self) -> impl Iterator<Item = &Modifier<O>> {
        self.mods.iter()
    }

    /// Value of one attribute.
    pub fn get(&self, attr: StyleAttr) -> Option<&ModValue<O>> {
        self.mods.iter().find(|m| m.attr == attr).map(|m| &m.value)
    }

    /// Compiled value of a dynamic attribute.
    pub fn dynamic(&self, attr: StyleAttr) -> Option<&Typed<O>> {
        match self.get(attr)? {
            ModValue::Dynamic(t) => Some(t),
            _ => None,
        }
    }

    /// Native constant of a table-backed attribute.
    pub fn native(&self, attr: StyleAttr) -> Option<&str> {
        match self.get(attr)? {
            ModValue::Native(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a flag attribute is set.
    pub fn has_flag(&self, attr: StyleAttr) -> bool {
        matches!(self.get(attr), Some(ModValue::Flag))
    }

    /// Number of modifiers.
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// `true` when no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

/// Compile the style attributes of `element` into a platform-ordered chain.
///
/// Keyword attributes resolve through the style tables; everything else goes through the
/// expression compiler. A literal `visible: true` and unset fill flags produce no modifier.
pub fn build_modifiers<E: Emitter>(
    element: &LayoutElement,
    compiler: &mut ExprCompiler<'_, E>,
) -> WidgetResult<ModifierChain<E::Output>> {
    let env = compiler.env();
    let mut mods = Vec::new();
    for &attr in modifier_order(env.platform) {
        let prop = attr.prop();
        let Some(value) = element.get(prop) else {
            continue;
        };
        let path = element.path.field(prop.name());
        let value = match attr {
            StyleAttr::FillWidth | StyleAttr::FillHeight => match value.as_bool() {
                Some(true) => ModValue::Flag,
                _ => continue,
            },
            StyleAttr::Visible if value.as_bool() == Some(true) => continue,
            StyleAttr::Alignment | StyleAttr::CrossAlignment => {
                let axis = match attr {
                    StyleAttr::Alignment => Axis::Horizontal,
                    _ => Axis::Vertical,
                };
                let kw = value.as_str().unwrap_or_default();
                let native = AlignKeyword::from_name(kw)
                    .and_then(|k| env.config.alignment(env.platform, axis, k))
                    .ok_or_else(|| WidgetError::unsupported_alignment(&path, kw, env.platform))?;
                ModValue::Native(native.to_string())
            }
            StyleAttr::TextAlign => {
                let kw = value.as_str().unwrap_or_default();
                let native = AlignKeyword::from_name(kw)
                    .and_then(|k| env.config.text_align(env.platform, k))
                    .ok_or_else(|| WidgetError::unsupported_alignment(&path, kw, env.platform))?;
                ModValue::Native(native.to_string())
            }
            StyleAttr::FontWeight => match value {
                PropertyValue::Literal(Literal::Bool(b)) => {
                    let w = if *b { FontWeight::Bold } else { FontWeight::Normal };
                    ModValue::Native(font_weight(env.config, env.platform, w, &path)?)
                }
                PropertyValue::Literal(Literal::String(s)) => {
                    let w = FontWeight::from_name(s).ok_or_else(|| {
                        WidgetError::expression_type(&path, format!("unknown font weight '{s}'"))
                    })?;
                    ModValue::Native(font_weight(env.config, env.platform, w, &path)?)
                }
                dynamic => ModValue::Dynamic(compiler.compile_property_value(
                    dynamic,
                    ExprType::Any,
                    &path,
                )?),
            },
            _ => {
                let ty = match prop.shape() {
                    PropShape::Value(ty) => ty,
                    _ => ExprType::Any,
                };
                ModValue::Dynamic(compiler.compile_property_value(value, ty, &path)?)
            }
        };
        mods.push(Modifier { attr, value });
    }
    Ok(ModifierChain { mods })
}

fn font_weight(
    config: &StyleConfig,
    platform: Platform,
    w: FontWeight,
    path: &JsonPath,
) -> WidgetResult<String> {
    config
        .font_weight(platform, w)
        .map(str::to_string)
        .ok_or_else(|| {
            WidgetError::config(format!("no {platform} font weight for {w:?} at {path}"))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/style/modifiers.rs"]
mod tests;
