use crate::expression::ast::Expr;
use crate::expression::types::ExprType;
use crate::foundation::core::{Rgba, Size};
use crate::foundation::path::JsonPath;
use crate::layout::binding::Binding;
use std::collections::BTreeMap;

/// A parsed and validated widget layout.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetLayout {
    /// Widget identity; also the stem of generated type and file names.
    pub name: String,
    /// Name shown to users.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Outer padding applied around the root element, when declared.
    pub default_padding: Option<f64>,
    /// Root element.
    pub layout: LayoutElement,
    /// Declared sizes, at least one, ids unique.
    pub supported_sizes: Vec<SizeSpec>,
    /// Stable hash of the source document.
    pub fingerprint: u64,
}

impl WidgetLayout {
    /// Look up a declared size by id.
    pub fn size(&self, id: &str) -> Option<&SizeSpec> {
        self.supported_sizes.iter().find(|s| s.id == id)
    }

    /// Padding the root receives from `defaultPadding`; none when the root sets its own.
    pub fn root_default_padding(&self) -> Option<f64> {
        self.default_padding
            .filter(|_| self.layout.get(Prop::Padding).is_none())
    }

    /// Declared sizes ordered largest area first; ties by id.
    pub fn sizes_by_area_desc(&self) -> Vec<&SizeSpec> {
        let mut sizes: Vec<&SizeSpec> = self.supported_sizes.iter().collect();
        sizes.sort_by(|a, b| {
            b.size()
                .area()
                .total_cmp(&a.size().area())
                .then_with(|| a.id.cmp(&b.id))
        });
        sizes
    }
}

/// One declared widget size.
#[derive(Clone, Debug, PartialEq)]
pub struct SizeSpec {
    /// Unique id, e.g. `small` or `4x2`.
    pub id: String,
    /// Width in dp/pt.
    pub width: f64,
    /// Height in dp/pt.
    pub height: f64,
}

impl SizeSpec {
    /// Dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Element kinds. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// Vertical container.
    Column,
    /// Horizontal container.
    Row,
    /// Overlapping container.
    Stack,
    /// Scrolling container.
    ScrollView,
    /// Text.
    Label,
    /// Image or icon.
    Image,
    /// Empty space.
    Spacer,
    /// Thin rule.
    Divider,
    /// Repeats `itemTemplate` for each element of a data list.
    ForEach,
    /// Chooses between `then` and `else`.
    Conditional,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [ElementKind; 10] = [
        ElementKind::Column,
        ElementKind::Row,
        ElementKind::Stack,
        ElementKind::ScrollView,
        ElementKind::Label,
        ElementKind::Image,
        ElementKind::Spacer,
        ElementKind::Divider,
        ElementKind::ForEach,
        ElementKind::Conditional,
    ];

    /// Name used in layout JSON.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Column => "column",
            ElementKind::Row => "row",
            ElementKind::Stack => "stack",
            ElementKind::ScrollView => "scrollView",
            ElementKind::Label => "label",
            ElementKind::Image => "image",
            ElementKind::Spacer => "spacer",
            ElementKind::Divider => "divider",
            ElementKind::ForEach => "forEach",
            ElementKind::Conditional => "conditional",
        }
    }

    /// Inverse of [`ElementKind::name`].
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == s)
    }

    /// Kinds that accept a `children` array.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ElementKind::Column | ElementKind::Row | ElementKind::Stack | ElementKind::ScrollView
        )
    }

    /// Whether `prop` may appear on this kind.
    pub fn allows(self, prop: Prop) -> bool {
        if self == ElementKind::Conditional {
            return matches!(prop, Prop::Condition | Prop::Visible);
        }
        if prop.is_common() {
            return true;
        }
        let extra: &[Prop] = match self {
            ElementKind::Column | ElementKind::Row => {
                &[Prop::Spacing, Prop::Alignment, Prop::CrossAlignment]
            }
            ElementKind::Stack => &[Prop::Alignment, Prop::CrossAlignment],
            ElementKind::ScrollView => &[Prop::Direction],
            ElementKind::Label => &[
                Prop::Text,
                Prop::Color,
                Prop::FontSize,
                Prop::FontWeight,
                Prop::MaxLines,
                Prop::TextAlign,
            ],
            ElementKind::Image => &[Prop::Src, Prop::Size, Prop::Color],
            ElementKind::Spacer => &[Prop::Size],
            ElementKind::Divider => &[Prop::Color, Prop::Thickness],
            ElementKind::ForEach => &[
                Prop::Items,
                Prop::Limit,
                Prop::Direction,
                Prop::Spacing,
                Prop::Alignment,
                Prop::CrossAlignment,
            ],
            ElementKind::Conditional => &[],
        };
        extra.contains(&prop)
    }

    /// Properties that must be present.
    pub fn required(self) -> &'static [Prop] {
        match self {
            ElementKind::Label => &[Prop::Text],
            ElementKind::Image => &[Prop::Src],
            ElementKind::ForEach => &[Prop::Items],
            ElementKind::Conditional => &[Prop::Condition],
            _ => &[],
        }
    }
}

/// Element properties. The set is closed; `type`, `id`, `children`, `itemTemplate`, `then` and
/// `else` are structural and not properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prop {
    /// Fixed width.
    Width,
    /// Fixed height.
    Height,
    /// Fill the available width.
    FillWidth,
    /// Fill the available height.
    FillHeight,
    /// Padding on all edges.
    Padding,
    /// Padding on leading and trailing edges.
    PaddingHorizontal,
    /// Padding on top and bottom edges.
    PaddingVertical,
    /// Background fill.
    BackgroundColor,
    /// Corner radius of the background.
    CornerRadius,
    /// Visibility (`visible` or `visibleIf`).
    Visible,
    /// Gap between children.
    Spacing,
    /// Horizontal alignment keyword.
    Alignment,
    /// Vertical alignment keyword.
    CrossAlignment,
    /// `vertical` or `horizontal`.
    Direction,
    /// Label text.
    Text,
    /// Text color or image tint.
    Color,
    /// Font size.
    FontSize,
    /// Font weight keyword or dynamic value.
    FontWeight,
    /// Maximum number of text lines.
    MaxLines,
    /// Text alignment keyword.
    TextAlign,
    /// Image source.
    Src,
    /// Image or spacer size.
    Size,
    /// Divider thickness.
    Thickness,
    /// Data list a `forEach` iterates.
    Items,
    /// Maximum number of repeated items.
    Limit,
    /// Branch selector of a `conditional`.
    Condition,
}

/// Accepted value shape of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropShape {
    /// Any property value of the given type.
    Value(ExprType),
    /// A literal keyword string, resolved by the style builder.
    Keyword,
    /// `vertical` or `horizontal`.
    Direction,
    /// A literal keyword, a boolean, or a dynamic value.
    FontWeight,
    /// A data binding path.
    ListBinding,
    /// A non-negative integer literal.
    Count,
    /// A literal boolean.
    Flag,
}

impl Prop {
    /// Every property, in declaration order.
    pub const ALL: [Prop; 26] = [
        Prop::Width,
        Prop::Height,
        Prop::FillWidth,
        Prop::FillHeight,
        Prop::Padding,
        Prop::PaddingHorizontal,
        Prop::PaddingVertical,
        Prop::BackgroundColor,
        Prop::CornerRadius,
        Prop::Visible,
        Prop::Spacing,
        Prop::Alignment,
        Prop::CrossAlignment,
        Prop::Direction,
        Prop::Text,
        Prop::Color,
        Prop::FontSize,
        Prop::FontWeight,
        Prop::MaxLines,
        Prop::TextAlign,
        Prop::Src,
        Prop::Size,
        Prop::Thickness,
        Prop::Items,
        Prop::Limit,
        Prop::Condition,
    ];

    /// Key used in layout JSON.
    pub fn name(self) -> &'static str {
        match self {
            Prop::Width => "width",
            Prop::Height => "height",
            Prop::FillWidth => "fillWidth",
            Prop::FillHeight => "fillHeight",
            Prop::Padding => "padding",
            Prop::PaddingHorizontal => "paddingHorizontal",
            Prop::PaddingVertical => "paddingVertical",
            Prop::BackgroundColor => "backgroundColor",
            Prop::CornerRadius => "cornerRadius",
            Prop::Visible => "visible",
            Prop::Spacing => "spacing",
            Prop::Alignment => "alignment",
            Prop::CrossAlignment => "crossAlignment",
            Prop::Direction => "direction",
            Prop::Text => "text",
            Prop::Color => "color",
            Prop::FontSize => "fontSize",
            Prop::FontWeight => "fontWeight",
            Prop::MaxLines => "maxLines",
            Prop::TextAlign => "textAlign",
            Prop::Src => "src",
            Prop::Size => "size",
            Prop::Thickness => "thickness",
            Prop::Items => "items",
            Prop::Limit => "limit",
            Prop::Condition => "condition",
        }
    }

    /// Inverse of [`Prop::name`]; `visibleIf` is accepted as an alias of `visible`.
    pub fn from_name(s: &str) -> Option<Self> {
        if s == "visibleIf" {
            return Some(Prop::Visible);
        }
        Self::ALL.into_iter().find(|p| p.name() == s)
    }

    /// Properties accepted on every element kind.
    pub fn is_common(self) -> bool {
        matches!(
            self,
            Prop::Width
                | Prop::Height
                | Prop::FillWidth
                | Prop::FillHeight
                | Prop::Padding
                | Prop::PaddingHorizontal
                | Prop::PaddingVertical
                | Prop::BackgroundColor
                | Prop::CornerRadius
                | Prop::Visible
        )
    }

    /// Value shape accepted by the parser.
    pub fn shape(self) -> PropShape {
        match self {
            Prop::Width
            | Prop::Height
            | Prop::Padding
            | Prop::PaddingHorizontal
            | Prop::PaddingVertical
            | Prop::CornerRadius
            | Prop::Spacing
            | Prop::FontSize
            | Prop::MaxLines
            | Prop::Size
            | Prop::Thickness => PropShape::Value(ExprType::Number),
            Prop::BackgroundColor | Prop::Color => PropShape::Value(ExprType::Color),
            Prop::Visible | Prop::Condition => PropShape::Value(ExprType::Bool),
            Prop::Text | Prop::Src => PropShape::Value(ExprType::String),
            Prop::Alignment | Prop::CrossAlignment | Prop::TextAlign => PropShape::Keyword,
            Prop::Direction => PropShape::Direction,
            Prop::FontWeight => PropShape::FontWeight,
            Prop::Items => PropShape::ListBinding,
            Prop::Limit => PropShape::Count,
            Prop::FillWidth | Prop::FillHeight => PropShape::Flag,
        }
    }
}

/// Literal scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// Number.
    Number(f64),
    /// String.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Resolved color.
    Color(Rgba),
}

impl Literal {
    /// Static type of the literal.
    pub fn ty(&self) -> ExprType {
        match self {
            Literal::Number(_) => ExprType::Number,
            Literal::String(_) => ExprType::String,
            Literal::Bool(_) => ExprType::Bool,
            Literal::Color(_) => ExprType::Color,
        }
    }

    /// Borrow a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Value of a property: exactly one of the four forms.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Constant.
    Literal(Literal),
    /// Data binding such as `item.temperature`.
    Binding(Binding),
    /// `config.settings.<key>` reference, holding the key.
    Setting(String),
    /// Operator expression.
    Expression(Expr),
}

impl PropertyValue {
    /// Literal string value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Literal(l) => l.as_str(),
            _ => None,
        }
    }

    /// Literal number value, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Literal(Literal::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Literal boolean value, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

/// One node of the layout tree.
///
/// Child slots depend on the kind: containers keep their `children`; `forEach` keeps its item
/// template as the only child; `conditional` keeps `then` followed by the optional `else`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutElement {
    /// Element kind.
    pub kind: ElementKind,
    /// Optional author-supplied id.
    pub id: Option<String>,
    /// Properties, keyed and ordered by [`Prop`].
    pub properties: BTreeMap<Prop, PropertyValue>,
    /// Child slots, see the type docs.
    pub children: Vec<LayoutElement>,
    /// Location in the source document.
    pub path: JsonPath,
}

impl LayoutElement {
    /// Property value, if set.
    pub fn get(&self, prop: Prop) -> Option<&PropertyValue> {
        self.properties.get(&prop)
    }

    /// Template of a `forEach`.
    pub fn item_template(&self) -> Option<&LayoutElement> {
        match self.kind {
            ElementKind::ForEach => self.children.first(),
            _ => None,
        }
    }

    /// `then` branch of a `conditional`.
    pub fn then_branch(&self) -> Option<&LayoutElement> {
        match self.kind {
            ElementKind::Conditional => self.children.first(),
            _ => None,
        }
    }

    /// `else` branch of a `conditional`.
    pub fn else_branch(&self) -> Option<&LayoutElement> {
        match self.kind {
            ElementKind::Conditional => self.children.get(1),
            _ => None,
        }
    }

    /// Whether a `forEach` or `scrollView` runs horizontally.
    pub fn is_horizontal(&self) -> bool {
        self.get(Prop::Direction).and_then(PropertyValue::as_str) == Some("horizontal")
    }

    /// Depth-first visit of this element and every descendant.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a LayoutElement)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }

    /// Descendant addressed by child indices.
    pub fn descendant(&self, indices: &[usize]) -> Option<&LayoutElement> {
        let mut cur = self;
        for &i in indices {
            cur = cur.children.get(i)?;
        }
        Some(cur)
    }
}
