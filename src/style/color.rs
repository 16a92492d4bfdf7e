use crate::foundation::core::Rgba;
use std::collections::BTreeMap;

/// Theme tokens of one platform mapped to concrete colors.
pub type Palette = BTreeMap<String, Rgba>;

const NAMED: &[(&str, Rgba)] = &[
    ("black", Rgba::new(0x00, 0x00, 0x00, 0xFF)),
    ("white", Rgba::new(0xFF, 0xFF, 0xFF, 0xFF)),
    ("red", Rgba::new(0xFF, 0x00, 0x00, 0xFF)),
    ("green", Rgba::new(0x00, 0x80, 0x00, 0xFF)),
    ("blue", Rgba::new(0x00, 0x00, 0xFF, 0xFF)),
    ("yellow", Rgba::new(0xFF, 0xFF, 0x00, 0xFF)),
    ("orange", Rgba::new(0xFF, 0xA5, 0x00, 0xFF)),
    ("purple", Rgba::new(0x80, 0x00, 0x80, 0xFF)),
    ("gray", Rgba::new(0x80, 0x80, 0x80, 0xFF)),
    ("grey", Rgba::new(0x80, 0x80, 0x80, 0xFF)),
    ("lightgray", Rgba::new(0xD3, 0xD3, 0xD3, 0xFF)),
    ("darkgray", Rgba::new(0xA9, 0xA9, 0xA9, 0xFF)),
    ("transparent", Rgba::TRANSPARENT),
];

/// Default divider color: `onSurfaceVariant` at 30% opacity.
pub(crate) const DIVIDER_COLOR: Rgba = Rgba::new(0xCA, 0xC4, 0xD0, 0x4D);

/// Named colors understood by [`parse_color`], in table order.
pub(crate) fn named_colors() -> &'static [(&'static str, Rgba)] {
    NAMED
}

/// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a named color. Theme tokens are not resolved here.
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, c)| *c)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nib = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::new(nib(0)? * 17, nib(1)? * 17, nib(2)? * 17, 0xFF)),
        6 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, 0xFF)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Resolve a color string against a palette.
///
/// `@token` and bare token names are looked up first; an unresolved token falls through to hex
/// and named color parsing.
pub fn resolve_color(s: &str, palette: &Palette) -> Option<Rgba> {
    let token = s.strip_prefix('@').unwrap_or(s);
    if let Some(c) = palette.get(token) {
        return Some(*c);
    }
    parse_color(token)
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
