//! Style tokens: colors and fonts
//!
//! Components carry presentation as plain string tokens. A color token is a
//! semantic palette name (`secondary`, `warning`, `critical`), a strict hex
//! value (`#RRGGBB` or `#RRGGBBAA`), or one of the no-fill literals
//! `transparent` and `clear`. A font token names a text style, optionally
//! followed by a weight (`headline`, `caption.bold`).
//!
//! Style problems never fail a render: the resolver falls back to the
//! palette's primary color or the body font and reports the parse error so
//! the binder can record a diagnostic.

use crate::cache::Fingerprint;
use crate::context::Scope;
use crate::error::StyleParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A resolved presentation color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// No fill. Background application skips it entirely.
    Clear,
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgba { r, g, b, a: 255 }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// Strict hex parse: `#RRGGBB` or `#RRGGBBAA`, nothing else.
    pub fn from_hex(token: &str) -> Result<Self, StyleParseError> {
        let malformed = || StyleParseError::MalformedHex(token.to_string());
        let digits = token.strip_prefix('#').ok_or_else(malformed)?;
        if !(digits.len() == 6 || digits.len() == 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(malformed());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed());
        Ok(Self::Rgba {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => f.write_str("clear"),
            Self::Rgba { r, g, b, a: 255 } => write!(f, "#{r:02X}{g:02X}{b:02X}"),
            Self::Rgba { r, g, b, a } => write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}"),
        }
    }
}

impl FromStr for Color {
    type Err = StyleParseError;

    /// Parses a literal color: hex or a no-fill literal. Palette names need a
    /// [`StyleResolver`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if is_no_fill(token) {
            Ok(Self::Clear)
        } else {
            Self::from_hex(token)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn is_no_fill(token: &str) -> bool {
    token.eq_ignore_ascii_case("clear") || token.eq_ignore_ascii_case("transparent")
}

/// Semantic color names. Lookup is case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: BTreeMap<String, Color>,
}

impl Palette {
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Color> {
        self.colors.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn insert(&mut self, name: &str, color: Color) {
        self.colors.insert(name.to_ascii_lowercase(), color);
    }

    pub fn with(mut self, name: &str, color: Color) -> Self {
        self.insert(name, color);
        self
    }

    /// Identifies the name to color mapping; equal palettes hash equally.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::builder()
            .strs(
                self.colors
                    .iter()
                    .flat_map(|(name, color)| [name.clone(), color.to_string()]),
            )
            .finish()
    }

    /// Apply `name = "#hex"` overrides, e.g. from a config file.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<(), StyleParseError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, token) in overrides {
            let color = token.parse()?;
            self.insert(name, color);
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        let critical = Color::rgb(0xDC, 0x26, 0x26);
        Self::empty()
            .with("primary", Color::rgb(0x11, 0x18, 0x27))
            .with("secondary", Color::rgb(0x6B, 0x72, 0x80))
            .with("accent", Color::rgb(0x25, 0x63, 0xEB))
            .with("success", Color::rgb(0x16, 0xA3, 0x4A))
            .with("warning", Color::rgb(0xF5, 0x9E, 0x0B))
            .with("critical", critical)
            .with("danger", critical)
            .with("error", critical)
            .with("info", Color::rgb(0x0E, 0xA5, 0xE9))
            .with("muted", Color::rgb(0x9C, 0xA3, 0xAF))
            .with("background", Color::rgb(0xFF, 0xFF, 0xFF))
            .with("surface", Color::rgb(0xF3, 0xF4, 0xF6))
            .with("onPrimary", Color::rgb(0xFF, 0xFF, 0xFF))
    }
}

/// Named text styles with their default point sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextStyle {
    LargeTitle,
    Title,
    Title2,
    Title3,
    Headline,
    Subheadline,
    Body,
    Callout,
    Footnote,
    Caption,
    Caption2,
}

impl TextStyle {
    pub const ALL: [TextStyle; 11] = [
        Self::LargeTitle,
        Self::Title,
        Self::Title2,
        Self::Title3,
        Self::Headline,
        Self::Subheadline,
        Self::Body,
        Self::Callout,
        Self::Footnote,
        Self::Caption,
        Self::Caption2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeTitle => "largeTitle",
            Self::Title => "title",
            Self::Title2 => "title2",
            Self::Title3 => "title3",
            Self::Headline => "headline",
            Self::Subheadline => "subheadline",
            Self::Body => "body",
            Self::Callout => "callout",
            Self::Footnote => "footnote",
            Self::Caption => "caption",
            Self::Caption2 => "caption2",
        }
    }

    pub fn default_size(&self) -> u16 {
        match self {
            Self::LargeTitle => 34,
            Self::Title => 28,
            Self::Title2 => 22,
            Self::Title3 => 20,
            Self::Headline | Self::Body => 17,
            Self::Subheadline => 15,
            Self::Callout => 16,
            Self::Footnote => 13,
            Self::Caption => 12,
            Self::Caption2 => 11,
        }
    }

    pub fn default_weight(&self) -> FontWeight {
        match self {
            Self::Headline => FontWeight::Semibold,
            _ => FontWeight::Regular,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

impl FontWeight {
    const ALL: [FontWeight; 9] = [
        Self::UltraLight,
        Self::Thin,
        Self::Light,
        Self::Regular,
        Self::Medium,
        Self::Semibold,
        Self::Bold,
        Self::Heavy,
        Self::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UltraLight => "ultraLight",
            Self::Thin => "thin",
            Self::Light => "light",
            Self::Regular => "regular",
            Self::Medium => "medium",
            Self::Semibold => "semibold",
            Self::Bold => "bold",
            Self::Heavy => "heavy",
            Self::Black => "black",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|weight| weight.as_str().eq_ignore_ascii_case(name))
    }
}

/// A resolved presentation font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    pub style: TextStyle,
    pub size: u16,
    pub weight: FontWeight,
}

impl From<TextStyle> for Font {
    fn from(style: TextStyle) -> Self {
        Self {
            style,
            size: style.default_size(),
            weight: style.default_weight(),
        }
    }
}

/// Maps style tokens to presentation values.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    palette: Palette,
}

impl StyleResolver {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.palette.fingerprint()
    }

    /// Fallback for unusable color tokens.
    pub fn primary(&self) -> Color {
        self.palette
            .get("primary")
            .unwrap_or(Color::rgb(0x00, 0x00, 0x00))
    }

    /// Fallback for unusable font tokens.
    pub fn default_font(&self) -> Font {
        Font::from(TextStyle::Body)
    }

    /// Parse a color token without any placeholder substitution.
    pub fn parse_color(&self, token: &str) -> Result<Color, StyleParseError> {
        let token = token.trim();
        if is_no_fill(token) {
            return Ok(Color::Clear);
        }
        if token.starts_with('#') {
            return Color::from_hex(token);
        }
        self.palette
            .get(token)
            .ok_or_else(|| StyleParseError::UnknownColor(token.to_string()))
    }

    /// Resolve a color token, substituting `{{path}}` placeholders from the
    /// scope first (`"{{statusColor}}"` inside a job row).
    pub fn try_resolve_color(&self, token: &str, scope: &Scope<'_>) -> Result<Color, StyleParseError> {
        if token.contains("{{") {
            let substituted = scope.interpolate_scoped(token);
            return self.parse_color(&substituted.text);
        }
        self.parse_color(token)
    }

    /// Resolve a color token, falling back to the primary color.
    pub fn resolve_color(&self, token: &str, scope: &Scope<'_>) -> Color {
        self.try_resolve_color(token, scope).unwrap_or_else(|error| {
            debug!(token, %error, "Color token fell back to primary");
            self.primary()
        })
    }

    /// Background fill for a token; `None` means paint nothing.
    pub fn background_fill(&self, token: &str, scope: &Scope<'_>) -> Option<Color> {
        Some(self.resolve_color(token, scope)).filter(|color| !color.is_clear())
    }

    pub fn parse_font(&self, token: &str) -> Result<Font, StyleParseError> {
        let token = token.trim();
        let (style_name, weight_name) = match token.split_once('.') {
            Some((style, weight)) => (style, Some(weight)),
            None => (token, None),
        };
        let style = TextStyle::parse(style_name)
            .ok_or_else(|| StyleParseError::UnknownFont(token.to_string()))?;
        let mut font = Font::from(style);
        if let Some(weight_name) = weight_name {
            font.weight = FontWeight::parse(weight_name)
                .ok_or_else(|| StyleParseError::UnknownWeight(weight_name.to_string()))?;
        }
        Ok(font)
    }

    /// Resolve a font token, falling back to the body font.
    pub fn resolve_font(&self, token: &str) -> Font {
        self.parse_font(token).unwrap_or_else(|error| {
            debug!(token, %error, "Font token fell back to body");
            self.default_font()
        })
    }
}
