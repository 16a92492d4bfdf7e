use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering target.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Jetpack Glance (Kotlin source).
    Glance,
    /// SwiftUI / WidgetKit (Swift source).
    SwiftUi,
    /// NativeScript view tree, interpreted.
    NativeScript,
    /// HTML DOM tree, interpreted.
    Html,
}

impl Platform {
    /// Every platform, in declaration order.
    pub const ALL: [Platform; 4] = [
        Platform::Glance,
        Platform::SwiftUi,
        Platform::NativeScript,
        Platform::Html,
    ];

    /// Stable lowercase name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Glance => "glance",
            Platform::SwiftUi => "swiftui",
            Platform::NativeScript => "nativescript",
            Platform::Html => "html",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Platforms served by ahead-of-time source generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompiledPlatform {
    /// Kotlin for Jetpack Glance.
    Glance,
    /// Swift for SwiftUI.
    SwiftUi,
}

impl CompiledPlatform {
    /// Both compiled platforms.
    pub const ALL: [CompiledPlatform; 2] = [CompiledPlatform::Glance, CompiledPlatform::SwiftUi];

    /// The general platform tag.
    pub fn platform(self) -> Platform {
        match self {
            CompiledPlatform::Glance => Platform::Glance,
            CompiledPlatform::SwiftUi => Platform::SwiftUi,
        }
    }
}

/// Platforms served by runtime interpretation of the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InterpretedPlatform {
    /// NativeScript view classes.
    NativeScript,
    /// HTML elements.
    Html,
}

impl InterpretedPlatform {
    /// The general platform tag.
    pub fn platform(self) -> Platform {
        match self {
            InterpretedPlatform::NativeScript => Platform::NativeScript,
            InterpretedPlatform::Html => Platform::Html,
        }
    }
}

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    /// Build a color from channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from float channels (0-255 for color, 0-1 for alpha), clamping each.
    pub fn from_channels(r: f64, g: f64, b: f64, a: f64) -> Self {
        fn chan(x: f64) -> u8 {
            if x.is_nan() {
                return 0;
            }
            x.clamp(0.0, 255.0).round() as u8
        }
        Self::new(chan(r), chan(g), chan(b), chan(a * 255.0))
    }

    /// `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.r, self.g, self.b, self.a
            )
        }
    }

    /// Packed `0xAARRGGBB`.
    pub fn argb(self) -> u32 {
        (u32::from(self.a) << 24)
            | (u32::from(self.r) << 16)
            | (u32::from(self.g) << 8)
            | u32::from(self.b)
    }

    /// Linear per-channel blend; `t` is clamped to `[0, 1]`.
    pub fn mix(self, other: Rgba, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        fn lerp(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }
        Rgba::new(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
            lerp(self.a, other.a, t),
        )
    }
}

/// Canvas size in platform units (dp / pt / px).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size {
    /// Build a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width * height`.
    pub fn area(self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
