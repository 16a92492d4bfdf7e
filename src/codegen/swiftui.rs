use crate::codegen::writer::CodeWriter;
use crate::codegen::{Parent, group, header_lines, number_literal, pascal};
use crate::expression::ast::Operator;
use crate::expression::compiler::{
    CompileEnv, Emitter, ExprCompiler, Fallback, compile_property_value,
};
use crate::expression::types::{ExprType, Typed};
use crate::foundation::core::{Platform, Size};
use crate::foundation::error::WidgetResult;
use crate::layout::binding::{Binding, BindingScope, Segment};
use crate::layout::model::{
    ElementKind, LayoutElement, Literal, Prop, PropertyValue, WidgetLayout,
};
use crate::style::color::{DIVIDER_COLOR, named_colors};
use crate::style::config::{AlignKeyword, Axis, FontWeight, StyleConfig};
use crate::style::modifiers::{ModValue, ModifierChain, StyleAttr, build_modifiers};
use std::collections::BTreeSet;

/// Runtime helpers a SwiftUI file may need, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SwiftHelper {
    Lookup,
    Items,
    Str,
    AsNumber,
    AsText,
    AsFlag,
    Truthy,
    Same,
    Present,
    ColorHex,
    ParseColor,
    AsColor,
    FormatNumber,
    Substr,
    FormatDate,
    Rgba,
    MixColor,
    FontWeight,
}

impl SwiftHelper {
    fn name(self) -> &'static str {
        match self {
            SwiftHelper::Lookup => "lookup",
            SwiftHelper::Items => "items",
            SwiftHelper::Str => "str",
            SwiftHelper::AsNumber => "asNumber",
            SwiftHelper::AsText => "asText",
            SwiftHelper::AsFlag => "asFlag",
            SwiftHelper::Truthy => "truthy",
            SwiftHelper::Same => "same",
            SwiftHelper::Present => "present",
            SwiftHelper::ColorHex => "colorHex",
            SwiftHelper::ParseColor => "parseColor",
            SwiftHelper::AsColor => "asColor",
            SwiftHelper::FormatNumber => "formatNumber",
            SwiftHelper::Substr => "substr",
            SwiftHelper::FormatDate => "formatDate",
            SwiftHelper::Rgba => "rgba",
            SwiftHelper::MixColor => "mixColor",
            SwiftHelper::FontWeight => "fontWeight",
        }
    }

    fn deps(self) -> &'static [SwiftHelper] {
        match self {
            SwiftHelper::AsText | SwiftHelper::FontWeight => &[SwiftHelper::Str],
            SwiftHelper::AsFlag => &[SwiftHelper::Truthy],
            SwiftHelper::ParseColor => &[SwiftHelper::ColorHex],
            SwiftHelper::AsColor => &[SwiftHelper::ParseColor],
            SwiftHelper::Same => &[SwiftHelper::AsNumber],
            SwiftHelper::FormatDate => &[SwiftHelper::Str],
            _ => &[],
        }
    }

    fn source(self, config: &StyleConfig) -> String {
        match self {
            SwiftHelper::Lookup => r#"fileprivate func lookup(_ root: Any?, _ path: Any...) -> Any? {
    var cur: Any? = root
    for step in path {
        if let key = step as? String, let map = cur as? [String: Any] {
            cur = map[key]
        } else if let i = step as? Int, let list = cur as? [Any], list.indices.contains(i) {
            cur = list[i]
        } else {
            return nil
        }
    }
    return cur
}"#
            .to_string(),
            SwiftHelper::Items => {
                "fileprivate func items(_ v: Any?) -> [Any] { (v as? [Any]) ?? [] }".to_string()
            }
            SwiftHelper::Str => r#"fileprivate func str(_ v: Any?) -> String {
    guard let v else { return "" }
    switch v {
    case let b as Bool: return b ? "true" : "false"
    case let d as Double:
        if d.isNaN { return "NaN" }
        if d.isInfinite { return d < 0 ? "-inf" : "inf" }
        if d == 0 { return "0" }
        if d.rounded() == d && abs(d) < 1e15 { return String(Int64(d)) }
        return NSDecimalNumber(string: String(d)).stringValue
    case let i as Int: return String(i)
    case let s as String: return s
    default: return "\(v)"
    }
}"#
            .to_string(),
            SwiftHelper::AsNumber => r#"fileprivate func asNumber(_ v: Any?) -> Double? {
    if v is Bool { return nil }
    if let d = v as? Double { return d }
    if let i = v as? Int { return Double(i) }
    if let s = v as? String { return Double(s.trimmingCharacters(in: .whitespaces)) }
    return nil
}"#
            .to_string(),
            SwiftHelper::AsText => r#"fileprivate func asText(_ v: Any?) -> String? {
    guard let v, !(v is NSNull) else { return nil }
    return str(v)
}"#
            .to_string(),
            SwiftHelper::AsFlag => r#"fileprivate func asFlag(_ v: Any?) -> Bool? {
    guard let v, !(v is NSNull) else { return nil }
    return truthy(v)
}"#
            .to_string(),
            SwiftHelper::Truthy => r#"fileprivate func truthy(_ v: Any?) -> Bool {
    guard let v else { return false }
    switch v {
    case let b as Bool: return b
    case let d as Double: return d != 0 && !d.isNaN
    case let i as Int: return i != 0
    case let s as String: return !s.isEmpty
    case is NSNull: return false
    default: return true
    }
}"#
            .to_string(),
            SwiftHelper::Same => r#"fileprivate func same(_ a: Any?, _ b: Any?) -> Bool {
    if !(a is String), !(b is String), let x = asNumber(a), let y = asNumber(b) { return x == y }
    switch (a, b) {
    case (nil, nil): return true
    case let (x as String, y as String): return x == y
    case let (x as Bool, y as Bool): return x == y
    default: return false
    }
}"#
            .to_string(),
            SwiftHelper::Present => r#"fileprivate func present(_ v: Any?) -> Bool {
    guard let v, !(v is NSNull) else { return false }
    if let s = v as? String { return !s.isEmpty }
    return true
}"#
            .to_string(),
            SwiftHelper::ColorHex => r#"fileprivate func colorHex(_ argb: UInt32) -> Color {
    Color(
        .sRGB,
        red: Double((argb >> 16) & 0xFF) / 255.0,
        green: Double((argb >> 8) & 0xFF) / 255.0,
        blue: Double(argb & 0xFF) / 255.0,
        opacity: Double((argb >> 24) & 0xFF) / 255.0
    )
}"#
            .to_string(),
            SwiftHelper::ParseColor => {
                let mut s = String::from(
                    r##"fileprivate func parseColor(_ s: String) -> Color? {
    let t = s.trimmingCharacters(in: .whitespaces)
    if t.hasPrefix("#") {
        let hex = String(t.dropFirst())
        guard hex.allSatisfy(\.isHexDigit), let n = UInt32(hex, radix: 16) else { return nil }
        switch hex.count {
        case 3:
            let r = ((n >> 8) & 0xF) * 0x11_0000
            let g = ((n >> 4) & 0xF) * 0x1100
            return colorHex(0xFF00_0000 | r | g | (n & 0xF) * 0x11)
        case 6: return colorHex(0xFF00_0000 | n)
        case 8: return colorHex(((n & 0xFF) << 24) | (n >> 8))
        default: return nil
        }
    }
    switch t.lowercased() {
"##,
                );
                for (name, c) in named_colors() {
                    s.push_str(&format!(
                        "    case \"{name}\": return colorHex(0x{:08X})\n",
                        c.argb()
                    ));
                }
                s.push_str("    default: return nil\n    }\n}");
                s
            }
            SwiftHelper::AsColor => r#"fileprivate func asColor(_ v: Any?) -> Color? {
    if let c = v as? Color { return c }
    if let s = v as? String { return parseColor(s) }
    return nil
}"#
            .to_string(),
            SwiftHelper::FormatNumber => r#"fileprivate func formatNumber(_ value: Double, _ unit: String, _ decimals: Double) -> String {
    let d = max(0, min(6, Int(decimals)))
    let f = pow(10.0, Double(d))
    var r = (abs(value) * f + 0.5).rounded(.down) / f * (value < 0 ? -1 : 1)
    if r == 0 { r = 0 }
    return String(format: "%.\(d)f", locale: Locale(identifier: "en_US_POSIX"), r) + unit
}"#
            .to_string(),
            SwiftHelper::Substr => r#"fileprivate func substr(_ s: String, _ start: Double, _ length: Double?) -> String {
    let scalars = Array(s.unicodeScalars)
    let count = Double(scalars.count)
    let from = start.isNaN ? 0 : Int(min(max(start.rounded(.towardZero), 0), count))
    var to = scalars.count
    if let length {
        let n = length.isNaN ? 0 : max(length.rounded(.towardZero), 0)
        to = Int(min(Double(from) + n, count))
    }
    var out = String.UnicodeScalarView()
    out.append(contentsOf: scalars[from..<to])
    return String(out)
}"#
            .to_string(),
            SwiftHelper::FormatDate => r#"fileprivate func formatDate(_ v: Any?, _ pattern: String) -> String {
    var date: Date?
    if v is Bool {
        date = nil
    } else if let ms = v as? Double {
        if ms.isFinite && abs(ms) <= 8.64e15 {
            date = Date(timeIntervalSince1970: ms.rounded(.towardZero) / 1000)
        }
    } else if let ms = v as? Int {
        date = Date(timeIntervalSince1970: Double(ms) / 1000)
    } else if let s = v as? String {
        let iso = ISO8601DateFormatter()
        date = iso.date(from: s)
        if date == nil {
            iso.formatOptions.insert(.withFractionalSeconds)
            date = iso.date(from: s)
        }
    }
    guard let date else { return str(v) }
    let f = DateFormatter()
    f.locale = Locale(identifier: "en_US_POSIX")
    f.timeZone = TimeZone(identifier: "UTC")
    f.dateFormat = pattern
    return f.string(from: date)
}"#
            .to_string(),
            SwiftHelper::Rgba => r#"fileprivate func rgba(_ r: Double, _ g: Double, _ b: Double, _ a: Double) -> Color {
    func ch(_ x: Double) -> Double { min(255, max(0, x)).rounded() / 255.0 }
    let alpha = (min(1, max(0, a)) * 255).rounded() / 255.0
    return Color(.sRGB, red: ch(r), green: ch(g), blue: ch(b), opacity: alpha)
}"#
            .to_string(),
            SwiftHelper::MixColor => r#"fileprivate func mixColor(_ from: Color, _ to: Color, _ t: Double) -> Color {
    let k = min(1, max(0, t))
    let a = from.resolve(in: EnvironmentValues())
    let b = to.resolve(in: EnvironmentValues())
    func ch(_ x: Float, _ y: Float) -> Double {
        let x = (Double(x) * 255).rounded()
        let y = (Double(y) * 255).rounded()
        return (x + (y - x) * k).rounded() / 255.0
    }
    return Color(
        .sRGB,
        red: ch(a.red, b.red),
        green: ch(a.green, b.green),
        blue: ch(a.blue, b.blue),
        opacity: ch(a.opacity, b.opacity)
    )
}"#
            .to_string(),
            SwiftHelper::FontWeight => {
                let native = |w| config.font_weight(Platform::SwiftUi, w).unwrap_or_default();
                format!(
                    "fileprivate func fontWeight(_ v: Any?) -> Font.Weight {{\n    \
                     switch (v as? Bool) == true ? \"bold\" : str(v).lowercased() {{\n    \
                     case \"bold\": return {}\n    case \"medium\": return {}\n    \
                     default: return {}\n    }}\n}}",
                    native(FontWeight::Bold),
                    native(FontWeight::Medium),
                    native(FontWeight::Normal),
                )
            }
        }
    }
}

/// [`Emitter`] producing Swift expressions for SwiftUI widget views.
#[derive(Debug)]
pub struct SwiftEmitter {
    item_vars: Vec<String>,
    used: BTreeSet<SwiftHelper>,
}

impl Default for SwiftEmitter {
    fn default() -> Self {
        Self {
            item_vars: vec!["data".to_string()],
            used: BTreeSet::new(),
        }
    }
}

impl SwiftEmitter {
    /// Emitter for the top level of a widget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the helper functions the emitted code calls, in emission order.
    pub fn helpers(&self) -> Vec<&'static str> {
        self.used.iter().map(|h| h.name()).collect()
    }

    fn require(&mut self, h: SwiftHelper) {
        if self.used.insert(h) {
            for d in h.deps() {
                self.require(*d);
            }
        }
    }

    fn lookup(&mut self, b: &Binding) -> String {
        let root = match b.scope {
            BindingScope::Item => self
                .item_vars
                .last()
                .cloned()
                .unwrap_or_else(|| "data".to_string()),
            BindingScope::Data => "data".to_string(),
            BindingScope::Settings => "settings".to_string(),
            BindingScope::Size => return "nil".to_string(),
        };
        self.require(SwiftHelper::Lookup);
        let mut s = format!("lookup({root}");
        for seg in &b.segments {
            match seg {
                Segment::Key(k) => s.push_str(&format!(", {}", swift_string(k))),
                Segment::Index(i) => s.push_str(&format!(", {i}")),
            }
        }
        s.push(')');
        s
    }
}

fn swift_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Emitter for SwiftEmitter {
    type Output = String;

    fn literal(&mut self, lit: &Literal) -> String {
        match lit {
            Literal::Number(n) => number_literal(*n),
            Literal::String(s) => swift_string(s),
            Literal::Bool(b) => b.to_string(),
            Literal::Color(c) => {
                self.require(SwiftHelper::ColorHex);
                format!("colorHex(0x{:08X})", c.argb())
            }
        }
    }

    fn binding(
        &mut self,
        binding: &Binding,
        want: ExprType,
        fallback: Fallback<'_>,
    ) -> WidgetResult<String> {
        let raw = self.lookup(binding);
        let (conv, zero) = match want {
            ExprType::Number => (SwiftHelper::AsNumber, "0.0"),
            ExprType::String => (SwiftHelper::AsText, "\"\""),
            ExprType::Bool => (SwiftHelper::AsFlag, "false"),
            ExprType::Color => (SwiftHelper::AsColor, "Color.clear"),
            ExprType::Any => {
                return Ok(match fallback {
                    Fallback::Default(l) => format!("({raw} ?? {})", self.literal(l)),
                    Fallback::Zero | Fallback::Null => raw,
                });
            }
        };
        self.require(conv);
        let call = format!("{}({raw})", conv.name());
        Ok(match fallback {
            Fallback::Null => call,
            Fallback::Zero => format!("({call} ?? {zero})"),
            Fallback::Default(l) => format!("({call} ?? {})", self.literal(l)),
        })
    }

    fn presence(&mut self, binding: &Binding) -> WidgetResult<String> {
        if binding.scope == BindingScope::Size {
            return Ok("true".to_string());
        }
        let raw = self.lookup(binding);
        self.require(SwiftHelper::Present);
        Ok(format!("present({raw})"))
    }

    fn operator(
        &mut self,
        op: Operator,
        operands: Vec<Typed<String>>,
        _result: ExprType,
    ) -> WidgetResult<String> {
        let any_operand = operands.iter().any(|o| o.ty == ExprType::Any);
        let v: Vec<String> = operands.into_iter().map(|o| o.value).collect();
        let binary = |sym: &str| format!("({} {sym} {})", v[0], v[1]);
        Ok(match op {
            Operator::Add => format!("({})", v.join(" + ")),
            Operator::Mul => format!("({})", v.join(" * ")),
            Operator::Sub if v.len() == 1 => format!("(-{})", v[0]),
            Operator::Sub => binary("-"),
            Operator::Div => binary("/"),
            Operator::Mod => {
                format!("{}.truncatingRemainder(dividingBy: {})", group(&v[0]), v[1])
            }
            Operator::Eq | Operator::Ne if any_operand => {
                self.require(SwiftHelper::Same);
                let call = format!("same({}, {})", v[0], v[1]);
                if op == Operator::Eq { call } else { format!("(!{call})") }
            }
            Operator::Eq => binary("=="),
            Operator::Ne => binary("!="),
            Operator::Lt => binary("<"),
            Operator::Le => binary("<="),
            Operator::Gt => binary(">"),
            Operator::Ge => binary(">="),
            Operator::All => format!("({})", v.join(" && ")),
            Operator::Any => format!("({})", v.join(" || ")),
            Operator::Not => format!("(!{})", group(&v[0])),
            Operator::Case => {
                let last = v.len() - 1;
                let mut s = String::new();
                for pair in v[..last].chunks(2) {
                    s.push_str(&format!("({} ? {} : ", pair[0], pair[1]));
                }
                s.push_str(&v[last]);
                s.push_str(&")".repeat(last / 2));
                s
            }
            Operator::Match => {
                let last = v.len() - 1;
                let input = group(&v[0]);
                let mut s = String::new();
                for pair in v[1..last].chunks(2) {
                    s.push_str(&format!("({input} == {} ? {} : ", pair[0], pair[1]));
                }
                s.push_str(&v[last]);
                s.push_str(&")".repeat((last - 1) / 2));
                s
            }
            Operator::Coalesce => format!("({})", v.join(" ?? ")),
            Operator::Concat if v.len() == 1 => v[0].clone(),
            Operator::Concat => format!("({})", v.join(" + ")),
            Operator::ToString => {
                self.require(SwiftHelper::Str);
                format!("str({})", v[0])
            }
            Operator::Upcase => format!("{}.uppercased()", group(&v[0])),
            Operator::Downcase => format!("{}.lowercased()", group(&v[0])),
            Operator::FormatNumber => {
                self.require(SwiftHelper::FormatNumber);
                format!("formatNumber({})", v.join(", "))
            }
            Operator::Substring => {
                self.require(SwiftHelper::Substr);
                let length = v.get(2).map_or("nil", String::as_str);
                format!("substr({}, {}, {length})", v[0], v[1])
            }
            Operator::FormatDate => {
                self.require(SwiftHelper::FormatDate);
                format!("formatDate({}, {})", v[0], v[1])
            }
            Operator::Rgb => {
                self.require(SwiftHelper::Rgba);
                format!("rgba({}, 1.0)", v.join(", "))
            }
            Operator::Rgba => {
                self.require(SwiftHelper::Rgba);
                format!("rgba({})", v.join(", "))
            }
            Operator::InterpolateColor => {
                self.require(SwiftHelper::MixColor);
                format!("mixColor({})", v.join(", "))
            }
            Operator::ThemeColor => v[0].clone(),
        })
    }

    fn coerce(&mut self, value: String, _from: ExprType, to: ExprType) -> String {
        match to {
            ExprType::Any => value,
            ExprType::String => {
                self.require(SwiftHelper::Str);
                format!("str({value})")
            }
            ExprType::Color => {
                self.require(SwiftHelper::AsColor);
                format!("(asColor({value}) ?? Color.clear)")
            }
            ExprType::Number => {
                self.require(SwiftHelper::AsNumber);
                format!("(asNumber({value}) ?? 0.0)")
            }
            ExprType::Bool => {
                self.require(SwiftHelper::Truthy);
                format!("truthy({value})")
            }
        }
    }
}

struct SwiftGenerator<'a> {
    config: &'a StyleConfig,
    emitter: SwiftEmitter,
    size: Size,
    w: CodeWriter,
}

impl<'a> SwiftGenerator<'a> {
    fn env(&self) -> CompileEnv<'a> {
        CompileEnv {
            config: self.config,
            platform: Platform::SwiftUi,
            size: self.size,
        }
    }

    fn compile(
        &mut self,
        el: &LayoutElement,
        prop: Prop,
        ty: ExprType,
    ) -> WidgetResult<Option<String>> {
        let Some(value) = el.get(prop) else {
            return Ok(None);
        };
        let env = self.env();
        let path = el.path.field(prop.name());
        Ok(Some(
            compile_property_value(value, ty, &mut self.emitter, env, &path)?.value,
        ))
    }

    fn modifiers(&mut self, el: &LayoutElement) -> WidgetResult<ModifierChain<String>> {
        let env = self.env();
        build_modifiers(el, &mut ExprCompiler::new(&mut self.emitter, env))
    }

    fn start(&self, axis: Axis) -> &'a str {
        self.config
            .alignment(Platform::SwiftUi, axis, AlignKeyword::Start)
            .unwrap_or_default()
    }

    /// Layout modifier lines (`.padding`, `.frame`, `.background`, ...) in chain order.
    fn layout_lines(mods: &ModifierChain<String>) -> Vec<String> {
        let mut out = Vec::new();
        for m in mods.iter() {
            let line = match (m.attr, &m.value) {
                (StyleAttr::FillWidth, ModValue::Flag) => ".frame(maxWidth: .infinity)".to_string(),
                (StyleAttr::FillHeight, ModValue::Flag) => {
                    ".frame(maxHeight: .infinity)".to_string()
                }
                (attr, ModValue::Dynamic(Typed { value: v, .. })) => match attr {
                    StyleAttr::Padding => format!(".padding({v})"),
                    StyleAttr::PaddingHorizontal => format!(".padding(.horizontal, {v})"),
                    StyleAttr::PaddingVertical => format!(".padding(.vertical, {v})"),
                    StyleAttr::Width => format!(".frame(width: {v})"),
                    StyleAttr::Height => format!(".frame(height: {v})"),
                    StyleAttr::BackgroundColor => format!(".background({v})"),
                    StyleAttr::CornerRadius => format!(".cornerRadius({v})"),
                    _ => continue,
                },
                _ => continue,
            };
            out.push(line);
        }
        out
    }

    /// Write trailing modifier lines one level deeper than the view they apply to.
    fn modifier_lines(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.w.indent();
        for l in lines {
            self.w.line(l);
        }
        self.w.dedent();
    }

    fn element(
        &mut self,
        el: &LayoutElement,
        parent: Parent,
        extra: &[String],
    ) -> WidgetResult<()> {
        let mods = self.modifiers(el)?;
        let visible = mods.dynamic(StyleAttr::Visible).map(|t| t.value.clone());
        if let Some(v) = &visible {
            self.w.open(format!("if {v} {{"));
        }
        let mut trailing = Vec::new();
        match el.kind {
            ElementKind::Column | ElementKind::Row | ElementKind::Stack => {
                let (open, inner) = self.stack_open(el.kind, &mods);
                self.w.open(open);
                self.children(&el.children, inner)?;
                self.w.close("}");
            }
            ElementKind::ScrollView => {
                let (axis, kind) = if el.is_horizontal() {
                    (".horizontal", ElementKind::Row)
                } else {
                    (".vertical", ElementKind::Column)
                };
                self.w.open(format!("ScrollView({axis}) {{"));
                let (open, inner) = self.stack_open(kind, &mods);
                self.w.open(open);
                self.children(&el.children, inner)?;
                self.w.close("}");
                self.w.close("}");
            }
            ElementKind::Label => {
                let text = self.compile(el, Prop::Text, ExprType::String)?.unwrap_or_default();
                self.w.line(format!("Text({text})"));
                trailing.extend(self.text_lines(&mods));
            }
            ElementKind::Image => {
                let src = self.compile(el, Prop::Src, ExprType::String)?.unwrap_or_default();
                self.w.line(format!("Image({src})"));
                trailing.push(".resizable()".to_string());
                trailing.push(".scaledToFit()".to_string());
                if let Some(s) = self.compile(el, Prop::Size, ExprType::Number)? {
                    trailing.push(format!(".frame(width: {s}, height: {s})"));
                }
                if let Some(c) = mods.dynamic(StyleAttr::Color) {
                    trailing.push(format!(".foregroundColor({})", c.value));
                }
            }
            ElementKind::Spacer => match self.compile(el, Prop::Size, ExprType::Number)? {
                Some(s) => {
                    self.w.line("Color.clear");
                    trailing.push(match parent {
                        Parent::Column => format!(".frame(height: {s})"),
                        Parent::Row => format!(".frame(width: {s})"),
                        Parent::Other => format!(".frame(width: {s}, height: {s})"),
                    });
                }
                None => self.w.line("Spacer()"),
            },
            ElementKind::Divider => {
                let thickness = self
                    .compile(el, Prop::Thickness, ExprType::Number)?
                    .unwrap_or_else(|| number_literal(1.0));
                let color = match mods.dynamic(StyleAttr::Color) {
                    Some(c) => c.value.clone(),
                    None => self.emitter.literal(&Literal::Color(DIVIDER_COLOR)),
                };
                self.w.line("Rectangle()");
                trailing.push(format!(".fill({color})"));
                trailing.push(match parent {
                    Parent::Row => format!(".frame(width: {thickness})"),
                    _ => format!(".frame(height: {thickness})"),
                });
            }
            ElementKind::ForEach => self.for_each(el, &mods)?,
            ElementKind::Conditional => {
                let cond = self
                    .compile(el, Prop::Condition, ExprType::Bool)?
                    .unwrap_or_else(|| "false".to_string());
                self.w.open(format!("if {cond} {{"));
                if let Some(then) = el.then_branch() {
                    self.element(then, parent, &[])?;
                }
                if let Some(other) = el.else_branch() {
                    self.w.reopen("} else {");
                    self.element(other, parent, &[])?;
                }
                self.w.close("}");
            }
        }
        if el.kind != ElementKind::Conditional {
            trailing.extend(Self::layout_lines(&mods));
            trailing.extend(extra.iter().cloned());
            self.modifier_lines(&trailing);
        }
        if visible.is_some() {
            self.w.close("}");
        }
        Ok(())
    }

    fn stack_open(&self, kind: ElementKind, mods: &ModifierChain<String>) -> (String, Parent) {
        let spacing = mods
            .dynamic(StyleAttr::Spacing)
            .map(|t| t.value.clone())
            .unwrap_or_else(|| "0".to_string());
        let h = mods
            .native(StyleAttr::Alignment)
            .unwrap_or_else(|| self.start(Axis::Horizontal));
        let v = mods
            .native(StyleAttr::CrossAlignment)
            .unwrap_or_else(|| self.start(Axis::Vertical));
        match kind {
            ElementKind::Row => (
                format!("HStack(alignment: {v}, spacing: {spacing}) {{"),
                Parent::Row,
            ),
            ElementKind::Stack => (
                format!("ZStack(alignment: Alignment(horizontal: {h}, vertical: {v})) {{"),
                Parent::Other,
            ),
            _ => (
                format!("VStack(alignment: {h}, spacing: {spacing}) {{"),
                Parent::Column,
            ),
        }
    }

    fn children(&mut self, children: &[LayoutElement], parent: Parent) -> WidgetResult<()> {
        for c in children {
            self.element(c, parent, &[])?;
        }
        Ok(())
    }

    fn text_lines(&mut self, mods: &ModifierChain<String>) -> Vec<String> {
        let mut out = Vec::new();
        let size = mods.dynamic(StyleAttr::FontSize).map(|t| t.value.clone());
        let weight = match mods.get(StyleAttr::FontWeight) {
            Some(ModValue::Native(n)) => Some(n.clone()),
            Some(ModValue::Dynamic(t)) => {
                self.emitter.require(SwiftHelper::FontWeight);
                Some(format!("fontWeight({})", t.value))
            }
            _ => None,
        };
        match (size, weight) {
            (Some(s), Some(w)) => out.push(format!(".font(.system(size: {s}, weight: {w}))")),
            (Some(s), None) => out.push(format!(".font(.system(size: {s}))")),
            (None, Some(w)) => out.push(format!(".fontWeight({w})")),
            (None, None) => {}
        }
        if let Some(c) = mods.dynamic(StyleAttr::Color) {
            out.push(format!(".foregroundColor({})", c.value));
        }
        if let Some(n) = mods.dynamic(StyleAttr::MaxLines) {
            out.push(format!(".lineLimit(Int({}))", n.value));
        }
        if let Some(a) = mods.native(StyleAttr::TextAlign) {
            out.push(format!(".multilineTextAlignment({a})"));
        }
        out
    }

    fn for_each(&mut self, el: &LayoutElement, mods: &ModifierChain<String>) -> WidgetResult<()> {
        let kind = if el.is_horizontal() {
            ElementKind::Row
        } else {
            ElementKind::Column
        };
        let (open, inner) = self.stack_open(kind, mods);
        self.w.open(open);

        let source = match el.get(Prop::Items) {
            Some(PropertyValue::Binding(b)) => self.emitter.lookup(b),
            _ => "nil".to_string(),
        };
        self.emitter.require(SwiftHelper::Items);
        let prefix = el
            .get(Prop::Limit)
            .and_then(|v| v.as_number())
            .map(|n| format!(".prefix({})", n as usize))
            .unwrap_or_default();
        let depth = self.emitter.item_vars.len();
        let (index, item) = (format!("index{depth}"), format!("item{depth}"));
        self.w.open(format!(
            "ForEach(Array(items({source}){prefix}.enumerated()), id: \\.offset) \
             {{ {index}, {item} in"
        ));
        self.emitter.item_vars.push(item);
        let result = match el.item_template() {
            Some(t) => self.element(t, inner, &[]),
            None => Ok(()),
        };
        self.emitter.item_vars.pop();
        result?;
        self.w.close("}");
        self.w.close("}");
        Ok(())
    }
}

/// Swift source of one SwiftUI widget view.
pub(crate) fn generate_swiftui(
    layout: &WidgetLayout,
    config: &StyleConfig,
) -> WidgetResult<String> {
    let mut g = SwiftGenerator {
        config,
        emitter: SwiftEmitter::new(),
        size: Size::new(0.0, 0.0),
        w: CodeWriter::new("    "),
    };
    let sizes = layout.sizes_by_area_desc();
    let var_name = |id: &str| format!("size{}", pascal(id));

    g.w.open(format!("struct {}View: View {{", layout.name));
    g.w.line("let data: [String: Any]");
    g.w.line("let settings: [String: Any]");
    g.w.blank();
    g.w.open("var body: some View {");
    g.w.open("GeometryReader { geo in");
    g.w.line("content(for: geo.size)");
    g.w.close("}");
    g.w.close("}");
    g.w.blank();
    g.w.line("@ViewBuilder");
    g.w.open("private func content(for size: CGSize) -> some View {");
    match sizes.as_slice() {
        [only] => g.w.line(var_name(&only.id)),
        _ => {
            let last = sizes.len() - 1;
            for (i, spec) in sizes.iter().enumerate() {
                let name = var_name(&spec.id);
                if i == 0 {
                    g.w.open(format!(
                        "if size.width >= {} && size.height >= {} {{",
                        number_literal(spec.width),
                        number_literal(spec.height)
                    ));
                } else if i == last {
                    g.w.reopen("} else {");
                } else {
                    g.w.reopen(format!(
                        "}} else if size.width >= {} && size.height >= {} {{",
                        number_literal(spec.width),
                        number_literal(spec.height)
                    ));
                }
                g.w.line(name);
            }
            g.w.close("}");
        }
    }
    g.w.close("}");

    for spec in &sizes {
        g.size = spec.size();
        g.w.blank();
        g.w.line("@ViewBuilder");
        g.w.open(format!("private var {}: some View {{", var_name(&spec.id)));
        let extra: Vec<String> = layout
            .root_default_padding()
            .map(|p| format!(".padding({})", number_literal(p)))
            .into_iter()
            .collect();
        g.element(&layout.layout, Parent::Other, &extra)?;
        g.w.close("}");
    }
    g.w.close("}");

    let helpers: Vec<SwiftHelper> = g.emitter.used.iter().copied().collect();
    for h in &helpers {
        g.w.blank();
        g.w.line(h.source(config));
    }

    let mut out = String::new();
    for l in header_lines(layout) {
        out.push_str(&l);
        out.push('\n');
    }
    out.push_str("\nimport SwiftUI\n\n");
    out.push_str(&g.w.finish());
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/swiftui.rs"]
mod tests;
