use crate::codegen::writer::CodeWriter;
use crate::codegen::{GeneratorOptions, Parent, group, header_lines, number_literal, pascal};
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

const BASE_IMPORTS: &[&str] = &[
    "androidx.compose.runtime.Composable",
    "androidx.compose.ui.graphics.Color",
    "androidx.compose.ui.unit.DpSize",
    "androidx.compose.ui.unit.dp",
    "androidx.compose.ui.unit.sp",
    "androidx.glance.ColorFilter",
    "androidx.glance.GlanceModifier",
    "androidx.glance.Image",
    "androidx.glance.ImageProvider",
    "androidx.glance.Visibility",
    "androidx.glance.appwidget.cornerRadius",
    "androidx.glance.appwidget.lazy.LazyColumn",
    "androidx.glance.background",
    "androidx.glance.layout.Alignment",
    "androidx.glance.layout.Box",
    "androidx.glance.layout.Column",
    "androidx.glance.layout.Row",
    "androidx.glance.layout.Spacer",
    "androidx.glance.layout.fillMaxHeight",
    "androidx.glance.layout.fillMaxWidth",
    "androidx.glance.layout.height",
    "androidx.glance.layout.padding",
    "androidx.glance.layout.size",
    "androidx.glance.layout.width",
    "androidx.glance.text.FontWeight",
    "androidx.glance.text.Text",
    "androidx.glance.text.TextAlign",
    "androidx.glance.text.TextStyle",
    "androidx.glance.unit.ColorProvider",
    "androidx.glance.visibility",
];

/// Runtime helpers a Glance file may need, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum KtHelper {
    Lookup,
    Items,
    Str,
    AsNumber,
    AsText,
    AsFlag,
    Truthy,
    Same,
    Present,
    ParseColor,
    AsColor,
    FormatNumber,
    Substr,
    FormatDate,
    Rgba,
    MixColor,
    FontWeight,
}

impl KtHelper {
    fn name(self) -> &'static str {
        match self {
            KtHelper::Lookup => "lookup",
            KtHelper::Items => "items",
            KtHelper::Str => "str",
            KtHelper::AsNumber => "asNumber",
            KtHelper::AsText => "asText",
            KtHelper::AsFlag => "asFlag",
            KtHelper::Truthy => "truthy",
            KtHelper::Same => "same",
            KtHelper::Present => "present",
            KtHelper::ParseColor => "parseColor",
            KtHelper::AsColor => "asColor",
            KtHelper::FormatNumber => "formatNumber",
            KtHelper::Substr => "substr",
            KtHelper::FormatDate => "formatDate",
            KtHelper::Rgba => "rgba",
            KtHelper::MixColor => "mixColor",
            KtHelper::FontWeight => "fontWeight",
        }
    }

    fn deps(self) -> &'static [KtHelper] {
        match self {
            KtHelper::AsText => &[KtHelper::Str],
            KtHelper::AsFlag => &[KtHelper::Truthy],
            KtHelper::AsColor => &[KtHelper::ParseColor],
            KtHelper::FormatDate => &[KtHelper::Str],
            _ => &[],
        }
    }

    fn imports(self) -> &'static [&'static str] {
        match self {
            KtHelper::Str => &[
                "androidx.compose.ui.graphics.toArgb",
                "java.math.BigDecimal",
                "java.util.Locale",
                "kotlin.math.abs",
            ],
            KtHelper::FormatNumber => &[
                "java.util.Locale",
                "kotlin.math.abs",
                "kotlin.math.floor",
                "kotlin.math.pow",
                "kotlin.math.sign",
            ],
            KtHelper::FormatDate => &[
                "java.time.Instant",
                "java.time.OffsetDateTime",
                "java.time.ZoneOffset",
                "java.time.format.DateTimeFormatter",
                "java.util.Locale",
                "kotlin.math.abs",
            ],
            KtHelper::Rgba => &["kotlin.math.roundToInt"],
            KtHelper::MixColor => &[
                "androidx.compose.ui.graphics.toArgb",
                "kotlin.math.roundToInt",
            ],
            _ => &[],
        }
    }

    fn source(self, config: &StyleConfig) -> String {
        match self {
            KtHelper::Lookup => r#"private fun lookup(root: Any?, vararg path: Any): Any? {
    var cur: Any? = root
    for (step in path) {
        cur = when {
            step is String && cur is Map<*, *> -> cur[step]
            step is Int && cur is List<*> -> cur.getOrNull(step)
            else -> return null
        }
    }
    return cur
}"#
            .to_string(),
            KtHelper::Items => {
                "private fun items(v: Any?): List<Any?> = (v as? List<*>)?.toList() ?: emptyList()"
                    .to_string()
            }
            KtHelper::Str => r##"private fun str(v: Any?): String = when (v) {
    null -> ""
    is Double -> when {
        v.isNaN() -> "NaN"
        v.isInfinite() -> if (v > 0) "inf" else "-inf"
        v == 0.0 -> "0"
        v % 1.0 == 0.0 && abs(v) < 1e15 -> v.toLong().toString()
        else -> BigDecimal.valueOf(v).stripTrailingZeros().toPlainString()
    }
    is Float -> str(v.toDouble())
    is Color -> {
        val argb = v.toArgb()
        val rgb = String.format(Locale.US, "%06X", argb and 0xFFFFFF)
        val alpha = (argb ushr 24) and 0xFF
        if (alpha == 0xFF) "#$rgb" else "#$rgb" + String.format(Locale.US, "%02X", alpha)
    }
    else -> v.toString()
}"##
            .to_string(),
            KtHelper::AsNumber => r#"private fun asNumber(v: Any?): Double? = when (v) {
    is Number -> v.toDouble()
    is String -> v.trim().toDoubleOrNull()
    else -> null
}"#
            .to_string(),
            KtHelper::AsText => {
                "private fun asText(v: Any?): String? = v?.let { str(it) }".to_string()
            }
            KtHelper::AsFlag => {
                "private fun asFlag(v: Any?): Boolean? = v?.let { truthy(it) }".to_string()
            }
            KtHelper::Truthy => r#"private fun truthy(v: Any?): Boolean = when (v) {
    null -> false
    is Boolean -> v
    is Number -> v.toDouble().let { it != 0.0 && !it.isNaN() }
    is String -> v.isNotEmpty()
    else -> true
}"#
            .to_string(),
            KtHelper::Same => r#"private fun same(a: Any?, b: Any?): Boolean =
    if (a is Number && b is Number) a.toDouble() == b.toDouble() else a == b"#
                .to_string(),
            KtHelper::Present => {
                r#"private fun present(v: Any?): Boolean = v != null && v != """#.to_string()
            }
            KtHelper::ParseColor => {
                let mut s = String::from(
                    r##"private fun parseColor(s: String): Color? {
    val t = s.trim()
    if (t.startsWith("#")) {
        val hex = t.substring(1)
        if (!hex.all { it in '0'..'9' || it.lowercaseChar() in 'a'..'f' }) return null
        val n = hex.toLongOrNull(16) ?: return null
        return when (hex.length) {
            3 -> Color(
                0xFF000000 or (((n shr 8) and 0xF) * 0x110000) or
                    (((n shr 4) and 0xF) * 0x1100) or ((n and 0xF) * 0x11)
            )
            6 -> Color(0xFF000000 or n)
            8 -> Color(((n and 0xFF) shl 24) or (n shr 8))
            else -> null
        }
    }
    return when (t.lowercase()) {
"##,
                );
                for (name, c) in named_colors() {
                    s.push_str(&format!("        \"{name}\" -> Color(0x{:08X})\n", c.argb()));
                }
                s.push_str("        else -> null\n    }\n}");
                s
            }
            KtHelper::AsColor => r#"private fun asColor(v: Any?): Color? = when (v) {
    is Color -> v
    is String -> parseColor(v)
    else -> null
}"#
            .to_string(),
            KtHelper::FormatNumber => r#"private fun formatNumber(value: Double, unit: String, decimals: Double): String {
    val d = decimals.toInt().coerceIn(0, 6)
    val f = 10.0.pow(d)
    var r = sign(value) * floor(abs(value) * f + 0.5) / f
    if (r == 0.0) r = 0.0
    return String.format(Locale.US, "%.${d}f", r) + unit
}"#
            .to_string(),
            KtHelper::Substr => r#"private fun substr(s: String, start: Double, length: Double?): String {
    val cps = s.codePoints().toArray()
    val from = start.toLong().coerceIn(0L, cps.size.toLong())
    val rest = cps.size.toLong() - from
    val taken = if (length == null) rest else length.toLong().coerceIn(0L, rest)
    return String(cps, from.toInt(), taken.toInt())
}"#
            .to_string(),
            KtHelper::FormatDate => r#"private fun formatDate(v: Any?, pattern: String): String {
    val instant = when (v) {
        is Number -> v.toDouble().takeIf { it.isFinite() && abs(it) <= 8.64e15 }
            ?.let { Instant.ofEpochMilli(it.toLong()) }
        is String -> runCatching { OffsetDateTime.parse(v).toInstant() }.getOrNull()
        else -> null
    } ?: return str(v)
    return DateTimeFormatter.ofPattern(pattern, Locale.US).withZone(ZoneOffset.UTC).format(instant)
}"#
            .to_string(),
            KtHelper::Rgba => r#"private fun rgba(r: Double, g: Double, b: Double, a: Double): Color {
    fun ch(x: Double) = x.coerceIn(0.0, 255.0).roundToInt()
    return Color(ch(r), ch(g), ch(b), (a.coerceIn(0.0, 1.0) * 255.0).roundToInt())
}"#
            .to_string(),
            KtHelper::MixColor => r#"private fun mixColor(from: Color, to: Color, t: Double): Color {
    val k = t.coerceIn(0.0, 1.0)
    val a = from.toArgb()
    val b = to.toArgb()
    fun ch(shift: Int): Int {
        val x = (a ushr shift) and 0xFF
        val y = (b ushr shift) and 0xFF
        return (x + (y - x) * k).roundToInt()
    }
    return Color(ch(16), ch(8), ch(0), ch(24))
}"#
            .to_string(),
            KtHelper::FontWeight => {
                let native = |w| config.font_weight(Platform::Glance, w).unwrap_or_default();
                format!(
                    "private fun fontWeight(v: Any?): FontWeight =\n    \
                     when (if (v == true) \"bold\" else v.toString().lowercase()) {{\n        \
                     \"bold\" -> {}\n        \"medium\" -> {}\n        else -> {}\n    }}",
                    native(FontWeight::Bold),
                    native(FontWeight::Medium),
                    native(FontWeight::Normal),
                )
            }
        }
    }
}

/// [`Emitter`] producing Kotlin expressions for Glance widgets.
///
/// Data is read from `Map<String, Any?>` trees through generated helper functions; the helpers
/// a file uses are recorded and emitted with it.
#[derive(Debug)]
pub struct KotlinEmitter {
    item_vars: Vec<String>,
    used: BTreeSet<KtHelper>,
}

impl Default for KotlinEmitter {
    fn default() -> Self {
        Self {
            item_vars: vec!["data".to_string()],
            used: BTreeSet::new(),
        }
    }
}

impl KotlinEmitter {
    /// Emitter for the top level of a widget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the helper functions the emitted code calls, in emission order.
    pub fn helpers(&self) -> Vec<&'static str> {
        self.used.iter().map(|h| h.name()).collect()
    }

    fn require(&mut self, h: KtHelper) {
        if self.used.insert(h) {
            for d in h.deps() {
                self.require(*d);
            }
        }
    }

    fn item_var(&self) -> &str {
        self.item_vars.last().map(String::as_str).unwrap_or("data")
    }

    fn lookup(&mut self, b: &Binding) -> String {
        let root = match b.scope {
            BindingScope::Item => self.item_var().to_string(),
            BindingScope::Data => "data".to_string(),
            BindingScope::Settings => "settings".to_string(),
            BindingScope::Size => return "null".to_string(),
        };
        self.require(KtHelper::Lookup);
        let mut s = format!("lookup({root}");
        for seg in &b.segments {
            match seg {
                Segment::Key(k) => s.push_str(&format!(", {}", kotlin_string(k))),
                Segment::Index(i) => s.push_str(&format!(", {i}")),
            }
        }
        s.push(')');
        s
    }
}

/// Kotlin string literal.
fn kotlin_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Emitter for KotlinEmitter {
    type Output = String;

    fn literal(&mut self, lit: &Literal) -> String {
        match lit {
            Literal::Number(n) => number_literal(*n),
            Literal::String(s) => kotlin_string(s),
            Literal::Bool(b) => b.to_string(),
            Literal::Color(c) => format!("Color(0x{:08X})", c.argb()),
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
            ExprType::Number => (KtHelper::AsNumber, "0.0"),
            ExprType::String => (KtHelper::AsText, "\"\""),
            ExprType::Bool => (KtHelper::AsFlag, "false"),
            ExprType::Color => (KtHelper::AsColor, "Color(0x00000000)"),
            ExprType::Any => {
                return Ok(match fallback {
                    Fallback::Default(l) => format!("({raw} ?: {})", self.literal(l)),
                    Fallback::Zero | Fallback::Null => raw,
                });
            }
        };
        self.require(conv);
        let call = format!("{}({raw})", conv.name());
        Ok(match fallback {
            Fallback::Null => call,
            Fallback::Zero => format!("({call} ?: {zero})"),
            Fallback::Default(l) => format!("({call} ?: {})", self.literal(l)),
        })
    }

    fn presence(&mut self, binding: &Binding) -> WidgetResult<String> {
        if binding.scope == BindingScope::Size {
            return Ok("true".to_string());
        }
        let raw = self.lookup(binding);
        self.require(KtHelper::Present);
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
            Operator::Mod => binary("%"),
            Operator::Eq | Operator::Ne if any_operand => {
                self.require(KtHelper::Same);
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
                let mut s = String::from("(");
                let last = v.len() - 1;
                for pair in v[..last].chunks(2) {
                    s.push_str(&format!("if ({}) {} else ", pair[0], pair[1]));
                }
                s.push_str(&v[last]);
                s.push(')');
                s
            }
            Operator::Match => {
                let last = v.len() - 1;
                let mut s = format!("(when ({}) {{ ", v[0]);
                for pair in v[1..last].chunks(2) {
                    s.push_str(&format!("{} -> {}; ", pair[0], pair[1]));
                }
                s.push_str(&format!("else -> {} }})", v[last]));
                s
            }
            Operator::Coalesce => format!("({})", v.join(" ?: ")),
            Operator::Concat if v.len() == 1 => v[0].clone(),
            Operator::Concat => format!("({})", v.join(" + ")),
            Operator::ToString => {
                self.require(KtHelper::Str);
                format!("str({})", v[0])
            }
            Operator::Upcase => format!("{}.uppercase()", group(&v[0])),
            Operator::Downcase => format!("{}.lowercase()", group(&v[0])),
            Operator::FormatNumber => {
                self.require(KtHelper::FormatNumber);
                format!("formatNumber({})", v.join(", "))
            }
            Operator::Substring => {
                self.require(KtHelper::Substr);
                let length = v.get(2).map_or("null", String::as_str);
                format!("substr({}, {}, {length})", v[0], v[1])
            }
            Operator::FormatDate => {
                self.require(KtHelper::FormatDate);
                format!("formatDate({}, {})", v[0], v[1])
            }
            Operator::Rgb => {
                self.require(KtHelper::Rgba);
                format!("rgba({}, 1.0)", v.join(", "))
            }
            Operator::Rgba => {
                self.require(KtHelper::Rgba);
                format!("rgba({})", v.join(", "))
            }
            Operator::InterpolateColor => {
                self.require(KtHelper::MixColor);
                format!("mixColor({})", v.join(", "))
            }
            Operator::ThemeColor => v[0].clone(),
        })
    }

    fn coerce(&mut self, value: String, from: ExprType, to: ExprType) -> String {
        match (from, to) {
            (_, ExprType::Any) => value,
            (_, ExprType::String) => {
                self.require(KtHelper::Str);
                format!("str({value})")
            }
            (_, ExprType::Color) => {
                self.require(KtHelper::AsColor);
                format!("(asColor({value}) ?: Color(0x00000000))")
            }
            (_, ExprType::Number) => {
                self.require(KtHelper::AsNumber);
                format!("(asNumber({value}) ?: 0.0)")
            }
            (_, ExprType::Bool) => {
                self.require(KtHelper::Truthy);
                format!("truthy({value})")
            }
        }
    }
}

fn dp(v: &str) -> String {
    format!("{}.dp", group(v))
}

fn sp(v: &str) -> String {
    format!("{}.sp", group(v))
}

struct GlanceGenerator<'a> {
    config: &'a StyleConfig,
    emitter: KotlinEmitter,
    size: Size,
    w: CodeWriter,
}

impl<'a> GlanceGenerator<'a> {
    fn env(&self) -> CompileEnv<'a> {
        CompileEnv {
            config: self.config,
            platform: Platform::Glance,
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

    fn modifier_expr(base: &str, mods: &ModifierChain<String>, extra: &[String]) -> String {
        let mut s = base.to_string();
        for m in mods.iter() {
            let ModValue::Dynamic(Typed { value: v, .. }) = &m.value else {
                match (m.attr, &m.value) {
                    (StyleAttr::FillWidth, ModValue::Flag) => s.push_str(".fillMaxWidth()"),
                    (StyleAttr::FillHeight, ModValue::Flag) => s.push_str(".fillMaxHeight()"),
                    _ => {}
                }
                continue;
            };
            match m.attr {
                StyleAttr::Width => s.push_str(&format!(".width({})", dp(v))),
                StyleAttr::Height => s.push_str(&format!(".height({})", dp(v))),
                StyleAttr::BackgroundColor => s.push_str(&format!(".background({v})")),
                StyleAttr::CornerRadius => s.push_str(&format!(".cornerRadius({})", dp(v))),
                StyleAttr::Padding => s.push_str(&format!(".padding({})", dp(v))),
                StyleAttr::PaddingHorizontal => {
                    s.push_str(&format!(".padding(horizontal = {})", dp(v)))
                }
                StyleAttr::PaddingVertical => {
                    s.push_str(&format!(".padding(vertical = {})", dp(v)))
                }
                StyleAttr::Visible => s.push_str(&format!(
                    ".visibility(if ({v}) Visibility.Visible else Visibility.Gone)"
                )),
                _ => {}
            }
        }
        for e in extra {
            s.push_str(e);
        }
        s
    }

    /// `modifier = ...` argument, omitted when nothing was added to the plain base.
    fn modifier_arg(modifier: String) -> Option<String> {
        (modifier != "GlanceModifier").then(|| format!("modifier = {modifier}"))
    }

    fn call(&mut self, ctor: &str, args: &[String]) {
        let inline = format!("{ctor}({})", args.join(", "));
        if inline.len() <= 80 {
            self.w.line(inline);
            return;
        }
        self.w.open(format!("{ctor}("));
        for a in args {
            self.w.line(format!("{a},"));
        }
        self.w.close(")");
    }

    fn call_block(&mut self, ctor: &str, args: &[String]) {
        if args.is_empty() {
            self.w.open(format!("{ctor} {{"));
            return;
        }
        let inline = format!("{ctor}({}) {{", args.join(", "));
        if inline.len() <= 80 {
            self.w.open(inline);
            return;
        }
        self.w.open(format!("{ctor}("));
        for a in args {
            self.w.line(format!("{a},"));
        }
        self.w.reopen(") {");
    }

    fn element(&mut self, el: &LayoutElement, parent: Parent, base: &str) -> WidgetResult<()> {
        let mods = self.modifiers(el)?;
        match el.kind {
            ElementKind::Column | ElementKind::Row | ElementKind::Stack => {
                let modifier = Self::modifier_expr(base, &mods, &[]);
                let (ctor, inner) = match el.kind {
                    ElementKind::Column => ("Column", Parent::Column),
                    ElementKind::Row => ("Row", Parent::Row),
                    _ => ("Box", Parent::Other),
                };
                let args = self.container_args(ctor, modifier, &mods);
                self.call_block(ctor, &args);
                let spacing = mods.dynamic(StyleAttr::Spacing).map(|t| t.value.clone());
                self.children(&el.children, inner, spacing.as_deref())?;
                self.w.close("}");
            }
            ElementKind::ScrollView => {
                let modifier = Self::modifier_expr(base, &mods, &[]);
                let args: Vec<String> = Self::modifier_arg(modifier).into_iter().collect();
                self.call_block("LazyColumn", &args);
                self.w.open("item {");
                let (ctor, inner) = if el.is_horizontal() {
                    ("Row", Parent::Row)
                } else {
                    ("Column", Parent::Column)
                };
                self.w.open(format!("{ctor} {{"));
                self.children(&el.children, inner, None)?;
                self.w.close("}");
                self.w.close("}");
                self.w.close("}");
            }
            ElementKind::Label => self.label(el, &mods, base)?,
            ElementKind::Image => {
                let src = self.compile(el, Prop::Src, ExprType::String)?.unwrap_or_default();
                let extra: Vec<String> = self
                    .compile(el, Prop::Size, ExprType::Number)?
                    .map(|s| format!(".size({})", dp(&s)))
                    .into_iter()
                    .collect();
                let modifier = Self::modifier_expr(base, &mods, &extra);
                let mut args = vec![
                    format!("provider = images({src})"),
                    "contentDescription = null".to_string(),
                ];
                args.extend(Self::modifier_arg(modifier));
                if let Some(c) = mods.dynamic(StyleAttr::Color) {
                    args.push(format!(
                        "colorFilter = ColorFilter.tint(ColorProvider({}))",
                        c.value
                    ));
                }
                self.call("Image", &args);
            }
            ElementKind::Spacer => {
                let size = self.compile(el, Prop::Size, ExprType::Number)?;
                let sized = mods.get(StyleAttr::Width).is_some()
                    || mods.get(StyleAttr::Height).is_some();
                let extra = match (size, parent) {
                    (Some(s), Parent::Column) => format!(".height({})", dp(&s)),
                    (Some(s), Parent::Row) => format!(".width({})", dp(&s)),
                    (Some(s), Parent::Other) => format!(".size({})", dp(&s)),
                    (None, Parent::Column | Parent::Row) if !sized => {
                        ".defaultWeight()".to_string()
                    }
                    (None, _) => String::new(),
                };
                let modifier = Self::modifier_expr(base, &mods, &[extra]);
                let args: Vec<String> = Self::modifier_arg(modifier).into_iter().collect();
                self.call("Spacer", &args);
            }
            ElementKind::Divider => {
                let thickness = self
                    .compile(el, Prop::Thickness, ExprType::Number)?
                    .unwrap_or_else(|| number_literal(1.0));
                let color = match mods.dynamic(StyleAttr::Color) {
                    Some(c) => c.value.clone(),
                    None => self.emitter.literal(&Literal::Color(DIVIDER_COLOR)),
                };
                let extra = match parent {
                    Parent::Row => format!(".fillMaxHeight().width({})", dp(&thickness)),
                    _ => format!(".fillMaxWidth().height({})", dp(&thickness)),
                };
                let modifier =
                    Self::modifier_expr(base, &mods, &[extra, format!(".background({color})")]);
                self.w.line(format!("Box(modifier = {modifier}) {{}}"));
            }
            ElementKind::ForEach => self.for_each(el, &mods, base)?,
            ElementKind::Conditional => {
                let cond = self
                    .compile(el, Prop::Condition, ExprType::Bool)?
                    .unwrap_or_else(|| "false".to_string());
                let visible = mods.dynamic(StyleAttr::Visible).map(|t| t.value.clone());
                if let Some(v) = &visible {
                    self.w.open(format!("if ({v}) {{"));
                }
                self.w.open(format!("if ({cond}) {{"));
                if let Some(then) = el.then_branch() {
                    self.element(then, parent, "GlanceModifier")?;
                }
                if let Some(other) = el.else_branch() {
                    self.w.reopen("} else {");
                    self.element(other, parent, "GlanceModifier")?;
                }
                self.w.close("}");
                if visible.is_some() {
                    self.w.close("}");
                }
            }
        }
        Ok(())
    }

    fn container_args(
        &self,
        ctor: &str,
        modifier: String,
        mods: &ModifierChain<String>,
    ) -> Vec<String> {
        let mut args: Vec<String> = Self::modifier_arg(modifier).into_iter().collect();
        let h = mods.native(StyleAttr::Alignment);
        let v = mods.native(StyleAttr::CrossAlignment);
        if ctor == "Box" {
            if h.is_some() || v.is_some() {
                let start = |axis| {
                    self.config
                        .alignment(Platform::Glance, axis, AlignKeyword::Start)
                        .unwrap_or_default()
                };
                args.push(format!(
                    "contentAlignment = Alignment(horizontal = {}, vertical = {})",
                    h.unwrap_or_else(|| start(Axis::Horizontal)),
                    v.unwrap_or_else(|| start(Axis::Vertical)),
                ));
            }
            return args;
        }
        if let Some(h) = h {
            args.push(format!("horizontalAlignment = {h}"));
        }
        if let Some(v) = v {
            args.push(format!("verticalAlignment = {v}"));
        }
        args
    }

    fn spacer_line(&mut self, parent: Parent, spacing: &str) {
        let dim = match parent {
            Parent::Row => "width",
            _ => "height",
        };
        self.w.line(format!(
            "Spacer(modifier = GlanceModifier.{dim}({}))",
            dp(spacing)
        ));
    }

    fn children(
        &mut self,
        children: &[LayoutElement],
        parent: Parent,
        spacing: Option<&str>,
    ) -> WidgetResult<()> {
        for (i, c) in children.iter().enumerate() {
            if let (true, Some(s)) = (i > 0, spacing) {
                self.spacer_line(parent, s);
            }
            self.element(c, parent, "GlanceModifier")?;
        }
        Ok(())
    }

    fn label(
        &mut self,
        el: &LayoutElement,
        mods: &ModifierChain<String>,
        base: &str,
    ) -> WidgetResult<()> {
        let text = self.compile(el, Prop::Text, ExprType::String)?.unwrap_or_default();
        let mut style = Vec::new();
        if let Some(c) = mods.dynamic(StyleAttr::Color) {
            style.push(format!("color = ColorProvider({})", c.value));
        }
        if let Some(fs) = mods.dynamic(StyleAttr::FontSize) {
            style.push(format!("fontSize = {}", sp(&fs.value)));
        }
        match mods.get(StyleAttr::FontWeight) {
            Some(ModValue::Native(n)) => style.push(format!("fontWeight = {n}")),
            Some(ModValue::Dynamic(t)) => {
                self.emitter.require(KtHelper::FontWeight);
                style.push(format!("fontWeight = fontWeight({})", t.value));
            }
            _ => {}
        }
        if let Some(n) = mods.native(StyleAttr::TextAlign) {
            style.push(format!("textAlign = {n}"));
        }

        let mut args = vec![format!("text = {text}")];
        args.extend(Self::modifier_arg(Self::modifier_expr(base, mods, &[])));
        if !style.is_empty() {
            args.push(format!("style = TextStyle({})", style.join(", ")));
        }
        if let Some(n) = mods.dynamic(StyleAttr::MaxLines) {
            args.push(format!("maxLines = {}.toInt()", group(&n.value)));
        }
        self.call("Text", &args);
        Ok(())
    }

    fn for_each(
        &mut self,
        el: &LayoutElement,
        mods: &ModifierChain<String>,
        base: &str,
    ) -> WidgetResult<()> {
        let (ctor, inner) = if el.is_horizontal() {
            ("Row", Parent::Row)
        } else {
            ("Column", Parent::Column)
        };
        let modifier = Self::modifier_expr(base, mods, &[]);
        let args = self.container_args(ctor, modifier, mods);
        self.call_block(ctor, &args);

        let source = match el.get(Prop::Items) {
            Some(PropertyValue::Binding(b)) => self.emitter.lookup(b),
            _ => "null".to_string(),
        };
        self.emitter.require(KtHelper::Items);
        let take = el
            .get(Prop::Limit)
            .and_then(|v| v.as_number())
            .map(|n| format!(".take({})", n as usize))
            .unwrap_or_default();
        let depth = self.emitter.item_vars.len();
        let (index, item) = (format!("index{depth}"), format!("item{depth}"));
        self.w.open(format!(
            "items({source}){take}.forEachIndexed {{ {index}, {item} ->"
        ));
        if let Some(s) = mods.dynamic(StyleAttr::Spacing) {
            let s = s.value.clone();
            self.w.open(format!("if ({index} > 0) {{"));
            self.spacer_line(inner, &s);
            self.w.close("}");
        }
        self.emitter.item_vars.push(item);
        let result = match el.item_template() {
            Some(t) => self.element(t, inner, "GlanceModifier"),
            None => Ok(()),
        };
        self.emitter.item_vars.pop();
        result?;
        self.w.close("}");
        self.w.close("}");
        Ok(())
    }
}

const CONTENT_PARAMS: &[&str] = &[
    "data: Map<String, Any?>",
    "settings: Map<String, Any?>",
    "images: (String) -> ImageProvider",
];

/// Kotlin source of one Glance widget.
pub(crate) fn generate_glance(
    layout: &WidgetLayout,
    config: &StyleConfig,
    options: &GeneratorOptions,
) -> WidgetResult<String> {
    let mut g = GlanceGenerator {
        config,
        emitter: KotlinEmitter::new(),
        size: Size::new(0.0, 0.0),
        w: CodeWriter::new("    "),
    };
    let sizes = layout.sizes_by_area_desc();

    g.w.open(format!("object {}Content {{", layout.name));
    g.w.line("@Composable");
    g.w.open("fun Content(");
    g.w.line("data: Map<String, Any?>,");
    g.w.line("settings: Map<String, Any?>,");
    g.w.line("size: DpSize,");
    g.w.line("images: (String) -> ImageProvider,");
    g.w.line("modifier: GlanceModifier = GlanceModifier,");
    g.w.reopen(") {");
    g.w.open("when {");
    let last = sizes.len().saturating_sub(1);
    for (i, spec) in sizes.iter().enumerate() {
        let call = format!("Size{}(data, settings, images, modifier)", pascal(&spec.id));
        if i == last {
            g.w.line(format!("else -> {call}"));
        } else {
            g.w.line(format!(
                "size.width >= {} && size.height >= {} -> {call}",
                dp(&number_literal(spec.width)),
                dp(&number_literal(spec.height)),
            ));
        }
    }
    g.w.close("}");
    g.w.close("}");

    for spec in &sizes {
        g.size = spec.size();
        g.w.blank();
        g.w.line("@Composable");
        g.w.open(format!("private fun Size{}(", pascal(&spec.id)));
        for p in CONTENT_PARAMS {
            g.w.line(format!("{p},"));
        }
        g.w.line("modifier: GlanceModifier,");
        g.w.reopen(") {");
        let base = match layout.root_default_padding() {
            Some(p) => format!("modifier.padding({})", dp(&number_literal(p))),
            None => "modifier".to_string(),
        };
        g.element(&layout.layout, Parent::Other, &base)?;
        g.w.close("}");
    }

    let helpers: Vec<KtHelper> = g.emitter.used.iter().copied().collect();
    for h in &helpers {
        g.w.blank();
        g.w.line(h.source(config));
    }
    g.w.close("}");

    let mut imports: BTreeSet<&str> = BASE_IMPORTS.iter().copied().collect();
    for h in &helpers {
        imports.extend(h.imports().iter().copied());
    }

    let mut out = String::new();
    for l in header_lines(layout) {
        out.push_str(&l);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!("package {}\n\n", options.kotlin_package));
    for i in imports {
        out.push_str(&format!("import {i}\n"));
    }
    out.push('\n');
    out.push_str(&g.w.finish());
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/codegen/glance.rs"]
mod tests;
