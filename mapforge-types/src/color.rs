//! RGBA colors and their textual forms.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Color representation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl FromStr for Color {
    type Err = TypesError;

    /// Parses hex codes (`#RGB`, `#RRGGBB`, `#RRGGBBAA`) and color names (`steelblue`,
    /// `tab:orange`, `r`). Names are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            return Self::try_from_hex(trimmed).ok_or_else(|| TypesError::InvalidColor(s.into()));
        }

        Self::from_name(trimmed).ok_or_else(|| TypesError::InvalidColor(s.into()))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Green color: `#008000FF`
    pub const GREEN: Color = Color::rgba(0, 128, 0, 255);
    /// Blue color: `#0000FFFF`
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Gray color: `#808080FF`
    pub const GRAY: Color = Color::rgba(128, 128, 128, 255);

    /// Default color cycle used when a layer doesn't specify its color (the `tab10` palette).
    pub const CYCLE: [Color; 10] = [
        Color::from_hex("#1f77b4"),
        Color::from_hex("#ff7f0e"),
        Color::from_hex("#2ca02c"),
        Color::from_hex("#d62728"),
        Color::from_hex("#9467bd"),
        Color::from_hex("#8c564b"),
        Color::from_hex("#e377c2"),
        Color::from_hex("#7f7f7f"),
        Color::from_hex("#bcbd22"),
        Color::from_hex("#17becf"),
    ];

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the `index`-th color of the default cycle, wrapping around.
    pub fn cycle(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    /// Converts the color into u8 array (RGBA).
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Converts the color into a CSS color value, ignoring opacity: `#rrggbb`.
    pub fn to_css_rgb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Opacity as a number in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Parses a color from the hex string. Hex string can be HEX3 (`#RGB`), HEX6 (`#RRGGBB`) or
    /// HEX8 (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if !hex_string.is_ascii() || hex_string.chars().next()? != '#' {
            return None;
        }

        if hex_string.len() == 4 {
            let channel = |i: usize| u8::from_str_radix(&hex_string[i..i + 1], 16).ok();
            let (r, g, b) = (channel(1)?, channel(2)?, channel(3)?);
            return Some(Self::rgba(r * 17, g * 17, b * 17, 255));
        }

        if hex_string.len() != 7 && hex_string.len() != 9 {
            return None;
        }

        let r = u8::from_str_radix(&hex_string[1..3], 16).ok()?;
        let g = u8::from_str_radix(&hex_string[3..5], 16).ok()?;
        let b = u8::from_str_radix(&hex_string[5..7], 16).ok()?;
        let a = if hex_string.len() == 9 {
            u8::from_str_radix(&hex_string[7..9], 16).ok()?
        } else {
            255
        };

        Some(Self { r, g, b, a })
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`).
    ///
    /// # Panics
    ///
    /// Panics if the parsing fails.
    pub const fn from_hex(hex_string: &'static str) -> Self {
        let bytes = hex_string.as_bytes();
        if bytes.len() != 7 && bytes.len() != 9 || bytes[0] != b'#' {
            panic!("Invalid color hex string");
        }

        let r = decode_byte(&[bytes[1], bytes[2]]);
        let g = decode_byte(&[bytes[3], bytes[4]]);
        let b = decode_byte(&[bytes[5], bytes[6]]);
        let a = if hex_string.len() == 9 {
            decode_byte(&[bytes[7], bytes[8]])
        } else {
            255
        };

        Self { r, g, b, a }
    }

    /// Looks up a named color. Accepts CSS names, matplotlib single letter names and the `tab:`
    /// palette.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if let Some(tab) = name.strip_prefix("tab:") {
            let index = TAB_NAMES.iter().position(|n| *n == tab)?;
            return Some(Self::CYCLE[index]);
        }

        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, hex)| Self::from_hex(*hex))
    }

    /// Returns a new color instance, copied from the base one but with the given alpha channel.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Returns a new color with its alpha multiplied by `opacity` (`0.0..=1.0`).
    pub fn with_opacity(&self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }

    /// Returns true if the color is fully transparent (`a == 0`).
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red component of the color in RGBA space.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green component of the color in RGBA space.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue component of the color in RGBA space.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Opacity component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Alpha blends `self` color with the given foreground one using foreground color alpha.
    pub fn blend(&self, fore: Color) -> Color {
        let a = fore.a as f32 / 255.0;
        let mix = |back: u8, fore: u8| {
            ((back as f32 / 255.0 * (1.0 - a) + fore as f32 / 255.0 * a) * 255.0).round() as u8
        };
        let back_a = self.a as f32 / 255.0;

        Color {
            r: mix(self.r, fore.r),
            g: mix(self.g, fore.g),
            b: mix(self.b, fore.b),
            a: ((a + back_a * (1.0 - a)) * 255.0).round() as u8,
        }
    }
}

const TAB_NAMES: [&str; 10] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray", "olive", "cyan",
];

const NAMED_COLORS: &[(&str, &str)] = &[
    ("b", "#0000ff"),
    ("g", "#008000"),
    ("r", "#ff0000"),
    ("c", "#00bfbf"),
    ("m", "#bf00bf"),
    ("y", "#bfbf00"),
    ("k", "#000000"),
    ("w", "#ffffff"),
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("darkred", "#8b0000"),
    ("crimson", "#dc143c"),
    ("salmon", "#fa8072"),
    ("pink", "#ffc0cb"),
    ("orange", "#ffa500"),
    ("darkorange", "#ff8c00"),
    ("gold", "#ffd700"),
    ("yellow", "#ffff00"),
    ("khaki", "#f0e68c"),
    ("olive", "#808000"),
    ("green", "#008000"),
    ("darkgreen", "#006400"),
    ("lime", "#00ff00"),
    ("lightgreen", "#90ee90"),
    ("forestgreen", "#228b22"),
    ("seagreen", "#2e8b57"),
    ("teal", "#008080"),
    ("cyan", "#00ffff"),
    ("aqua", "#00ffff"),
    ("turquoise", "#40e0d0"),
    ("blue", "#0000ff"),
    ("navy", "#000080"),
    ("darkblue", "#00008b"),
    ("lightblue", "#add8e6"),
    ("skyblue", "#87ceeb"),
    ("steelblue", "#4682b4"),
    ("royalblue", "#4169e1"),
    ("dodgerblue", "#1e90ff"),
    ("purple", "#800080"),
    ("violet", "#ee82ee"),
    ("magenta", "#ff00ff"),
    ("fuchsia", "#ff00ff"),
    ("indigo", "#4b0082"),
    ("brown", "#a52a2a"),
    ("maroon", "#800000"),
    ("chocolate", "#d2691e"),
    ("tan", "#d2b48c"),
    ("beige", "#f5f5dc"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("darkgray", "#a9a9a9"),
    ("darkgrey", "#a9a9a9"),
    ("lightgray", "#d3d3d3"),
    ("lightgrey", "#d3d3d3"),
    ("silver", "#c0c0c0"),
];

const fn decode_byte(chars: &[u8]) -> u8 {
    debug_assert!(chars.len() == 2);
    let first = decode_char(chars[0]);
    let second = decode_char(chars[1]);

    first * 16 + second
}

const fn decode_char(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => panic!("Invalid hex character"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn color_serialization() {
        let hex = "#FF1000AA";
        let color = Color::try_from_hex(hex).unwrap();
        assert_eq!(&color.to_hex(), hex);

        assert_eq!(Color::from_hex(hex), color);
    }

    #[test]
    fn parses_short_hex() {
        assert_eq!("#f00".parse::<Color>().unwrap(), Color::RED);
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!("blue".parse::<Color>().unwrap(), Color::BLUE);
        assert_eq!("SteelBlue".parse::<Color>().unwrap().to_css_rgb(), "#4682b4");
        assert_eq!("tab:orange".parse::<Color>().unwrap(), Color::cycle(1));
        assert_eq!("k".parse::<Color>().unwrap(), Color::BLACK);
    }

    #[test]
    fn rejects_unknown_color() {
        assert_matches!("blurple".parse::<Color>(), Err(TypesError::InvalidColor(_)));
        assert_matches!("#12345".parse::<Color>(), Err(TypesError::InvalidColor(_)));
    }

    #[test]
    fn deserializes_from_string() {
        let color: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(color, Color::rgba(0, 255, 0, 255));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn blend_with_opacity() {
        let blended = Color::WHITE.blend(Color::BLACK.with_opacity(0.5));
        assert!((127..=128).contains(&blended.r()));
        assert_eq!(blended.a(), 255);
    }

    #[test]
    fn cycle_wraps() {
        assert_eq!(Color::cycle(10), Color::cycle(0));
    }
}
