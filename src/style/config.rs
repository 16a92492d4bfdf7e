use crate::foundation::core::{Platform, Rgba};
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::style::color::{Palette, parse_color, resolve_color};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Alignment keywords accepted in layouts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlignKeyword {
    /// Leading / top edge.
    Start,
    /// Centered.
    Center,
    /// Trailing / bottom edge.
    End,
    /// Fill the cross axis where the platform supports it.
    Stretch,
}

impl AlignKeyword {
    /// Every keyword.
    pub const ALL: [AlignKeyword; 4] = [
        AlignKeyword::Start,
        AlignKeyword::Center,
        AlignKeyword::End,
        AlignKeyword::Stretch,
    ];

    /// Name used in layouts.
    pub fn name(self) -> &'static str {
        match self {
            AlignKeyword::Start => "start",
            AlignKeyword::Center => "center",
            AlignKeyword::End => "end",
            AlignKeyword::Stretch => "stretch",
        }
    }

    /// Parse a keyword. `left`/`top` and `right`/`bottom` are accepted as synonyms.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "start" | "left" | "top" | "leading" => Some(AlignKeyword::Start),
            "center" => Some(AlignKeyword::Center),
            "end" | "right" | "bottom" | "trailing" => Some(AlignKeyword::End),
            "stretch" => Some(AlignKeyword::Stretch),
            _ => None,
        }
    }
}

/// Layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

/// Font weight keywords accepted in layouts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    Normal,
    /// Medium weight.
    Medium,
    /// Bold weight.
    Bold,
}

impl FontWeight {
    /// Every weight.
    pub const ALL: [FontWeight; 3] = [FontWeight::Normal, FontWeight::Medium, FontWeight::Bold];

    /// Parse a keyword; `regular` is a synonym for `normal`.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "normal" | "regular" => Some(FontWeight::Normal),
            "medium" => Some(FontWeight::Medium),
            "bold" => Some(FontWeight::Bold),
            _ => None,
        }
    }
}

/// Native alignment constants of one platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentTable {
    /// Horizontal axis constants.
    #[serde(default)]
    pub horizontal: BTreeMap<AlignKeyword, String>,
    /// Vertical axis constants.
    #[serde(default)]
    pub vertical: BTreeMap<AlignKeyword, String>,
}

impl AlignmentTable {
    fn axis(&self, axis: Axis) -> &BTreeMap<AlignKeyword, String> {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StyleConfigDef {
    /// `"builtin"` overlays this file onto [`StyleConfig::builtin`].
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    palettes: BTreeMap<Platform, BTreeMap<String, String>>,
    #[serde(default)]
    alignment: BTreeMap<Platform, AlignmentTable>,
    #[serde(default)]
    text_align: BTreeMap<Platform, BTreeMap<AlignKeyword, String>>,
    #[serde(default)]
    font_weights: BTreeMap<Platform, BTreeMap<FontWeight, String>>,
}

/// Immutable style configuration: theme palettes, alignment and font weight tables.
///
/// Built once and passed explicitly to the style builder. Every table is total over
/// platforms and keywords; incomplete configurations are rejected when loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig {
    palettes: BTreeMap<Platform, Palette>,
    alignment: BTreeMap<Platform, AlignmentTable>,
    text_align: BTreeMap<Platform, BTreeMap<AlignKeyword, String>>,
    font_weights: BTreeMap<Platform, BTreeMap<FontWeight, String>>,
}

const THEME: &[(&str, Rgba)] = &[
    ("onSurface", Rgba::new(0xE6, 0xE1, 0xE5, 0xFF)),
    ("onSurfaceVariant", Rgba::new(0xCA, 0xC4, 0xD0, 0xFF)),
    ("primary", Rgba::new(0xD0, 0xBC, 0xFF, 0xFF)),
    ("error", Rgba::new(0xF2, 0xB8, 0xB5, 0xFF)),
    ("widgetBackground", Rgba::new(0x1C, 0x1B, 0x1F, 0xFF)),
    ("surface", Rgba::new(0x2B, 0x29, 0x30, 0xFF)),
];

fn table<K: Ord + Copy>(entries: &[(K, &str)]) -> BTreeMap<K, String> {
    entries.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

impl StyleConfig {
    /// Built-in dark Material theme and native constant tables for the four platforms.
    pub fn builtin() -> Self {
        use AlignKeyword::{Center, End, Start, Stretch};
        use FontWeight::{Bold, Medium, Normal};

        let palette: Palette = THEME.iter().map(|(k, c)| (k.to_string(), *c)).collect();
        let palettes = Platform::ALL.iter().map(|p| (*p, palette.clone())).collect();

        let mut alignment = BTreeMap::new();
        alignment.insert(
            Platform::Glance,
            AlignmentTable {
                horizontal: table(&[
                    (Start, "Alignment.Horizontal.Start"),
                    (Center, "Alignment.Horizontal.CenterHorizontally"),
                    (End, "Alignment.Horizontal.End"),
                    (Stretch, "Alignment.Horizontal.Start"),
                ]),
                vertical: table(&[
                    (Start, "Alignment.Vertical.Top"),
                    (Center, "Alignment.Vertical.CenterVertically"),
                    (End, "Alignment.Vertical.Bottom"),
                    (Stretch, "Alignment.Vertical.Top"),
                ]),
            },
        );
        alignment.insert(
            Platform::SwiftUi,
            AlignmentTable {
                horizontal: table(&[
                    (Start, ".leading"),
                    (Center, ".center"),
                    (End, ".trailing"),
                    (Stretch, ".leading"),
                ]),
                vertical: table(&[
                    (Start, ".top"),
                    (Center, ".center"),
                    (End, ".bottom"),
                    (Stretch, ".top"),
                ]),
            },
        );
        alignment.insert(
            Platform::NativeScript,
            AlignmentTable {
                horizontal: table(&[
                    (Start, "left"),
                    (Center, "center"),
                    (End, "right"),
                    (Stretch, "stretch"),
                ]),
                vertical: table(&[
                    (Start, "top"),
                    (Center, "middle"),
                    (End, "bottom"),
                    (Stretch, "stretch"),
                ]),
            },
        );
        let css = table(&[
            (Start, "flex-start"),
            (Center, "center"),
            (End, "flex-end"),
            (Stretch, "stretch"),
        ]);
        alignment.insert(
            Platform::Html,
            AlignmentTable {
                horizontal: css.clone(),
                vertical: css,
            },
        );

        let mut text_align = BTreeMap::new();
        text_align.insert(
            Platform::Glance,
            table(&[
                (Start, "TextAlign.Start"),
                (Center, "TextAlign.Center"),
                (End, "TextAlign.End"),
                (Stretch, "TextAlign.Justify"),
            ]),
        );
        text_align.insert(
            Platform::SwiftUi,
            table(&[
                (Start, ".leading"),
                (Center, ".center"),
                (End, ".trailing"),
                (Stretch, ".leading"),
            ]),
        );
        let plain = table(&[
            (Start, "left"),
            (Center, "center"),
            (End, "right"),
            (Stretch, "justify"),
        ]);
        text_align.insert(Platform::NativeScript, plain.clone());
        text_align.insert(Platform::Html, plain);

        let mut font_weights = BTreeMap::new();
        font_weights.insert(
            Platform::Glance,
            table(&[
                (Normal, "FontWeight.Normal"),
                (Medium, "FontWeight.Medium"),
                (Bold, "FontWeight.Bold"),
            ]),
        );
        font_weights.insert(
            Platform::SwiftUi,
            table(&[(Normal, ".regular"), (Medium, ".medium"), (Bold, ".bold")]),
        );
        font_weights.insert(
            Platform::NativeScript,
            table(&[(Normal, "normal"), (Medium, "500"), (Bold, "bold")]),
        );
        font_weights.insert(
            Platform::Html,
            table(&[(Normal, "400"), (Medium, "500"), (Bold, "700")]),
        );

        Self {
            palettes,
            alignment,
            text_align,
            font_weights,
        }
    }

    /// Parse a JSON configuration document and validate it.
    pub fn from_json(json: &str) -> WidgetResult<Self> {
        let def: StyleConfigDef = serde_json::from_str(json)
            .map_err(|e| WidgetError::config(format!("invalid style config: {e}")))?;
        Self::from_def(def)
    }

    /// Load a JSON configuration file.
    pub fn from_path(path: &Path) -> WidgetResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read style config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    fn from_def(def: StyleConfigDef) -> WidgetResult<Self> {
        let mut cfg = match def.extends.as_deref() {
            None => Self {
                palettes: BTreeMap::new(),
                alignment: BTreeMap::new(),
                text_align: BTreeMap::new(),
                font_weights: BTreeMap::new(),
            },
            Some("builtin") => Self::builtin(),
            Some(other) => {
                return Err(WidgetError::config(format!(
                    "unknown base configuration '{other}'"
                )));
            }
        };

        for (platform, entries) in def.palettes {
            let palette = cfg.palettes.entry(platform).or_default();
            for (token, hex) in entries {
                let c = parse_color(&hex).ok_or_else(|| {
                    WidgetError::config(format!(
                        "{platform} palette token '{token}' has invalid color '{hex}'"
                    ))
                })?;
                palette.insert(token, c);
            }
        }
        for (platform, t) in def.alignment {
            let slot = cfg.alignment.entry(platform).or_default();
            slot.horizontal.extend(t.horizontal);
            slot.vertical.extend(t.vertical);
        }
        for (platform, t) in def.text_align {
            cfg.text_align.entry(platform).or_default().extend(t);
        }
        for (platform, t) in def.font_weights {
            cfg.font_weights.entry(platform).or_default().extend(t);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every table is total over platforms and keywords.
    pub fn validate(&self) -> WidgetResult<()> {
        for p in Platform::ALL {
            let table = self.alignment.get(&p);
            for axis in [Axis::Horizontal, Axis::Vertical] {
                for kw in AlignKeyword::ALL {
                    if table.and_then(|t| t.axis(axis).get(&kw)).is_none() {
                        return Err(WidgetError::config(format!(
                            "alignment table has no {p} {} mapping for '{}'",
                            axis.name(),
                            kw.name()
                        )));
                    }
                }
            }
            for kw in AlignKeyword::ALL {
                if self.text_align.get(&p).and_then(|t| t.get(&kw)).is_none() {
                    return Err(WidgetError::config(format!(
                        "text alignment table has no {p} mapping for '{}'",
                        kw.name()
                    )));
                }
            }
            for w in FontWeight::ALL {
                if self.font_weights.get(&p).and_then(|t| t.get(&w)).is_none() {
                    return Err(WidgetError::config(format!(
                        "font weight table has no {p} mapping for '{w:?}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Theme palette of a platform (empty when none is configured).
    pub fn palette(&self, platform: Platform) -> &Palette {
        static EMPTY: Palette = BTreeMap::new();
        self.palettes.get(&platform).unwrap_or(&EMPTY)
    }

    /// Resolve a theme token only.
    pub fn theme_color(&self, platform: Platform, token: &str) -> Option<Rgba> {
        let token = token.strip_prefix('@').unwrap_or(token);
        self.palette(platform).get(token).copied()
    }

    /// Resolve a color string (theme token, hex or name) for a platform.
    pub fn resolve_color(&self, platform: Platform, s: &str) -> Option<Rgba> {
        resolve_color(s, self.palette(platform))
    }

    /// Native alignment constant.
    pub fn alignment(&self, platform: Platform, axis: Axis, kw: AlignKeyword) -> Option<&str> {
        self.alignment
            .get(&platform)
            .and_then(|t| t.axis(axis).get(&kw))
            .map(String::as_str)
    }

    /// Native text alignment constant.
    pub fn text_align(&self, platform: Platform, kw: AlignKeyword) -> Option<&str> {
        self.text_align
            .get(&platform)
            .and_then(|t| t.get(&kw))
            .map(String::as_str)
    }

    /// Native font weight constant.
    pub fn font_weight(&self, platform: Platform, w: FontWeight) -> Option<&str> {
        self.font_weights
            .get(&platform)
            .and_then(|t| t.get(&w))
            .map(String::as_str)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/config.rs"]
mod tests;
