use crate::expression::value::{Value, number_to_string};
use crate::foundation::core::{InterpretedPlatform, Platform};
use crate::layout::model::ElementKind;
use crate::style::config::{Axis, FontWeight, StyleConfig};
use crate::style::modifiers::StyleAttr;

/// Direction children are laid out in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Vertical,
    Horizontal,
    Overlay,
}

/// How an evaluated value becomes a native property string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Encoding {
    Number,
    Px,
    Color,
    Text,
    FontWeight,
    /// `visible` / `collapse`.
    Visibility,
    /// HTML `hidden` attribute, removed when visible.
    Hidden,
}

impl Encoding {
    /// Encodings where a missing value reads as `false`.
    pub(crate) fn is_flag(self) -> bool {
        matches!(self, Encoding::Visibility | Encoding::Hidden)
    }
}

/// Where container spacing lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SpacingTarget {
    /// One property on the container.
    Container(&'static str),
    /// A leading margin on every child after the first.
    FollowingChildren(&'static str),
}

/// Native vocabulary of one interpreted platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Dialect {
    platform: InterpretedPlatform,
}

impl Dialect {
    pub(crate) fn new(platform: InterpretedPlatform) -> Self {
        Self { platform }
    }

    pub(crate) fn interpreted(self) -> InterpretedPlatform {
        self.platform
    }

    pub(crate) fn platform(self) -> Platform {
        self.platform.platform()
    }

    fn html(self) -> bool {
        self.platform == InterpretedPlatform::Html
    }

    pub(crate) fn tag(self, kind: ElementKind) -> &'static str {
        use ElementKind as K;
        match self.platform {
            InterpretedPlatform::NativeScript => match kind {
                K::Column | K::Row | K::ForEach => "StackLayout",
                K::Stack => "GridLayout",
                K::ScrollView => "ScrollView",
                K::Label => "Label",
                K::Image => "Image",
                K::Spacer | K::Divider | K::Conditional => "ContentView",
            },
            InterpretedPlatform::Html => match kind {
                K::Label => "span",
                K::Image => "img",
                _ => "div",
            },
        }
    }

    /// Tag of the content node inside a scroll view.
    pub(crate) fn scroll_content_tag(self) -> &'static str {
        if self.html() { "div" } else { "StackLayout" }
    }

    /// Fixed properties of a container laid out in `flow`.
    pub(crate) fn container_props(self, flow: Flow) -> Vec<(&'static str, &'static str)> {
        match (self.html(), flow) {
            (false, Flow::Vertical) => vec![("orientation", "vertical")],
            (false, Flow::Horizontal) => vec![("orientation", "horizontal")],
            (false, Flow::Overlay) => Vec::new(),
            (true, Flow::Vertical) => {
                vec![("style:display", "flex"), ("style:flex-direction", "column")]
            }
            (true, Flow::Horizontal) => {
                vec![("style:display", "flex"), ("style:flex-direction", "row")]
            }
            (true, Flow::Overlay) => vec![("style:display", "grid")],
        }
    }

    /// Fixed properties of a scroll view.
    pub(crate) fn scroll_props(self, flow: Flow) -> Vec<(&'static str, &'static str)> {
        match (self.html(), flow) {
            (false, Flow::Horizontal) => vec![("orientation", "horizontal")],
            (false, _) => vec![("orientation", "vertical")],
            (true, Flow::Horizontal) => vec![("style:overflow-x", "auto")],
            (true, _) => vec![("style:overflow-y", "auto")],
        }
    }

    /// Properties making a conditional wrapper transparent to layout.
    pub(crate) fn wrapper_props(self) -> Vec<(&'static str, &'static str)> {
        if self.html() {
            vec![("style:display", "contents")]
        } else {
            Vec::new()
        }
    }

    /// Properties every child of an overlay container carries.
    pub(crate) fn overlay_child_props(self) -> Vec<(&'static str, String)> {
        if self.html() {
            vec![("style:grid-area", "1 / 1".to_string())]
        } else {
            Vec::new()
        }
    }

    /// Output properties and encoding of a dynamic style attribute on `kind`.
    pub(crate) fn style_outputs(
        self,
        attr: StyleAttr,
        kind: ElementKind,
    ) -> (&'static [&'static str], Encoding) {
        use StyleAttr as A;
        if self.html() {
            match attr {
                A::Width => (&["style:width"], Encoding::Px),
                A::Height => (&["style:height"], Encoding::Px),
                A::Padding => (&["style:padding"], Encoding::Px),
                A::PaddingHorizontal => {
                    (&["style:padding-left", "style:padding-right"], Encoding::Px)
                }
                A::PaddingVertical => {
                    (&["style:padding-top", "style:padding-bottom"], Encoding::Px)
                }
                A::BackgroundColor => (&["style:background-color"], Encoding::Color),
                A::CornerRadius => (&["style:border-radius"], Encoding::Px),
                A::Visible => (&["hidden"], Encoding::Hidden),
                A::Color => match kind {
                    ElementKind::Image => (&["data-tint"], Encoding::Color),
                    ElementKind::Divider => (&["style:background-color"], Encoding::Color),
                    _ => (&["style:color"], Encoding::Color),
                },
                A::FontSize => (&["style:font-size"], Encoding::Px),
                A::FontWeight => (&["style:font-weight"], Encoding::FontWeight),
                A::MaxLines => (&["style:-webkit-line-clamp"], Encoding::Number),
                _ => (&[], Encoding::Text),
            }
        } else {
            match attr {
                A::Width => (&["width"], Encoding::Number),
                A::Height => (&["height"], Encoding::Number),
                A::Padding => (&["padding"], Encoding::Number),
                A::PaddingHorizontal => (&["paddingLeft", "paddingRight"], Encoding::Number),
                A::PaddingVertical => (&["paddingTop", "paddingBottom"], Encoding::Number),
                A::BackgroundColor => (&["backgroundColor"], Encoding::Color),
                A::CornerRadius => (&["borderRadius"], Encoding::Number),
                A::Visible => (&["visibility"], Encoding::Visibility),
                A::Color => match kind {
                    ElementKind::Image => (&["tintColor"], Encoding::Color),
                    ElementKind::Divider => (&["backgroundColor"], Encoding::Color),
                    _ => (&["color"], Encoding::Color),
                },
                A::FontSize => (&["fontSize"], Encoding::Number),
                A::FontWeight => (&["fontWeight"], Encoding::FontWeight),
                A::MaxLines => (&["maxLines"], Encoding::Number),
                _ => (&[], Encoding::Text),
            }
        }
    }

    /// Property set by a `fillWidth` / `fillHeight` flag.
    pub(crate) fn fill_prop(self, attr: StyleAttr) -> (&'static str, &'static str) {
        match (self.html(), attr) {
            (true, StyleAttr::FillHeight) => ("style:height", "100%"),
            (true, _) => ("style:width", "100%"),
            (false, StyleAttr::FillHeight) => ("verticalAlignment", "stretch"),
            (false, _) => ("horizontalAlignment", "stretch"),
        }
    }

    pub(crate) fn text_align_prop(self) -> &'static str {
        if self.html() { "style:text-align" } else { "textAlignment" }
    }

    /// Property carrying a container alignment constant, and whether it goes on the children.
    pub(crate) fn alignment_prop(self, flow: Flow, axis: Axis) -> (&'static str, bool) {
        if !self.html() {
            return match axis {
                Axis::Horizontal => ("horizontalAlignment", true),
                Axis::Vertical => ("verticalAlignment", true),
            };
        }
        let name = match (flow, axis) {
            (Flow::Vertical, Axis::Horizontal) | (Flow::Horizontal, Axis::Vertical) => {
                "style:align-items"
            }
            (Flow::Vertical, Axis::Vertical) | (Flow::Horizontal, Axis::Horizontal) => {
                "style:justify-content"
            }
            (Flow::Overlay, Axis::Horizontal) => "style:justify-items",
            (Flow::Overlay, Axis::Vertical) => "style:align-items",
        };
        (name, false)
    }

    pub(crate) fn spacing(self, flow: Flow) -> (SpacingTarget, Encoding) {
        match (self.html(), flow) {
            (true, _) => (SpacingTarget::Container("style:gap"), Encoding::Px),
            (false, Flow::Horizontal) => {
                (SpacingTarget::FollowingChildren("marginLeft"), Encoding::Number)
            }
            (false, _) => (SpacingTarget::FollowingChildren("marginTop"), Encoding::Number),
        }
    }

    pub(crate) fn text_prop(self) -> &'static str {
        if self.html() { "textContent" } else { "text" }
    }

    /// Width and height properties with their length encoding.
    pub(crate) fn extent_props(self) -> (&'static str, &'static str, Encoding) {
        if self.html() {
            ("style:width", "style:height", Encoding::Px)
        } else {
            ("width", "height", Encoding::Number)
        }
    }

    /// Property making a size-less spacer absorb free space.
    pub(crate) fn flexible_spacer(self) -> Option<(&'static str, &'static str)> {
        if self.html() { Some(("style:flex", "1")) } else { None }
    }

    /// Encode a value; `None` means the property is absent.
    pub(crate) fn encode(self, enc: Encoding, v: &Value, config: &StyleConfig) -> Option<String> {
        match enc {
            Encoding::Number => v.as_number().map(number_to_string),
            Encoding::Px => v.as_number().map(|n| format!("{}px", number_to_string(n))),
            Encoding::Color => v.as_color().map(|c| c.to_hex()),
            Encoding::Text => Some(v.to_display()),
            Encoding::FontWeight => {
                let w = match v {
                    Value::Bool(true) => FontWeight::Bold,
                    Value::Bool(false) => FontWeight::Normal,
                    Value::String(s) => FontWeight::from_name(s)?,
                    _ => return None,
                };
                config.font_weight(self.platform(), w).map(str::to_string)
            }
            Encoding::Visibility => {
                Some(if v.truthy() { "visible" } else { "collapse" }.to_string())
            }
            Encoding::Hidden => (!v.truthy()).then(String::new),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dialect.rs"]
mod tests;
