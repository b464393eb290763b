//! Text shaping for figure titles, tick labels and legend entries.

use std::path::Path;

use lyon::path::Path as LyonPath;
use mapforge_types::{Color, Rect};
use nalgebra::Point2;

mod font_provider;
mod rustybuzz;

pub use font_provider::{FontFace, FontProvider, FontdbFontProvider};

/// Ratio of average glyph advance to font size, used when no font is available.
const FALLBACK_ADVANCE: f64 = 0.6;

/// Style of a text label in the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Size of the font in pixels.
    pub font_size: f64,
    /// Color of the font.
    pub font_color: Color,
    /// Alignment of label along horizontal axis.
    pub horizontal_alignment: HorizontalAlignment,
    /// Alignment of label along vertical axis.
    pub vertical_alignment: VerticalAlignment,
    /// Weight of the font.
    pub weight: FontWeight,
}

impl TextStyle {
    /// Black text anchored at its baseline start.
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            font_color: Color::BLACK,
            horizontal_alignment: HorizontalAlignment::Left,
            vertical_alignment: VerticalAlignment::Baseline,
            weight: FontWeight::NORMAL,
        }
    }

    /// Sets the anchor of the text.
    pub fn with_alignment(
        mut self,
        horizontal: HorizontalAlignment,
        vertical: VerticalAlignment,
    ) -> Self {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
        self
    }
}

/// Horizontal alignment.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub enum HorizontalAlignment {
    /// Align to left.
    Left,
    /// Align to center.
    #[default]
    Center,
    /// Align to right.
    Right,
}

/// Vertical alignment.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub enum VerticalAlignment {
    /// Anchor is at the top of the ascender.
    Top,
    /// Anchor is halfway between the top and the bottom.
    Middle,
    /// Anchor is on the baseline.
    #[default]
    Baseline,
    /// Anchor is at the bottom of the descender.
    Bottom,
}

/// Font weight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontWeight(pub(crate) u16);

impl FontWeight {
    /// Normal font.
    pub const NORMAL: Self = FontWeight(400);
    /// Bold font.
    pub const BOLD: Self = FontWeight(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Properties used to select a font face.
#[derive(Debug, Default, Copy, Clone)]
pub struct FontProperties {
    /// Font weight.
    pub weight: FontWeight,
}

/// Size of a shaped line of text, in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextMetrics {
    /// Advance of the whole line.
    pub width: f64,
    /// Distance from the baseline to the top of the line.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line.
    pub descent: f64,
}

impl TextMetrics {
    /// Line height.
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }

    fn estimate(text: &str, font_size: f64) -> Self {
        Self {
            width: text.chars().count() as f64 * font_size * FALLBACK_ADVANCE,
            ascent: font_size * 0.76,
            descent: font_size * 0.24,
        }
    }
}

/// Text with its alignment resolved into a baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    /// Text to draw.
    pub text: String,
    /// Left end of the baseline, in pixels.
    pub origin: Point2<f64>,
    /// Font size in pixels.
    pub font_size: f64,
    /// Text color.
    pub color: Color,
    /// Font weight.
    pub weight: FontWeight,
    /// Area covered by the line.
    pub bounds: Rect,
}

/// Shapes text with the faces of a [`FontProvider`].
///
/// When the provider has no usable face, sizes are estimated and [`TextShaper::outline`] returns
/// `None`.
pub struct TextShaper {
    provider: Box<dyn FontProvider>,
    families: Vec<String>,
}

impl TextShaper {
    /// Creates a shaper using the given font families in order of preference.
    pub fn new(provider: Box<dyn FontProvider>, families: Vec<String>) -> Self {
        Self { provider, families }
    }

    /// Shaper with the system fonts and, if given, the fonts from `fonts_dir`.
    pub fn with_system_fonts(families: Vec<String>, fonts_dir: Option<&Path>) -> Self {
        let mut provider = FontdbFontProvider::with_system_fonts();
        if let Some(dir) = fonts_dir {
            provider.load_fonts_folder(dir);
        }

        Self::new(Box::new(provider), families)
    }

    /// Font families in order of preference.
    pub fn families(&self) -> &[String] {
        &self.families
    }

    fn select_face(&self, text: &str, weight: FontWeight) -> Option<FontFace> {
        self.provider
            .select_face(text, &self.families, FontProperties { weight })
    }

    /// Measures a single line of text.
    pub fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        self.select_face(text, style.weight)
            .and_then(|face| rustybuzz::measure(&face.data, face.index, text, style.font_size))
            .unwrap_or_else(|| TextMetrics::estimate(text, style.font_size))
    }

    /// Resolves the alignment of `style` relative to `anchor`.
    pub fn place(&self, text: &str, anchor: Point2<f64>, style: &TextStyle) -> PlacedText {
        let metrics = self.measure(text, style);

        let x = anchor.x
            - match style.horizontal_alignment {
                HorizontalAlignment::Left => 0.0,
                HorizontalAlignment::Center => metrics.width / 2.0,
                HorizontalAlignment::Right => metrics.width,
            };

        let y = anchor.y
            + match style.vertical_alignment {
                VerticalAlignment::Top => metrics.ascent,
                VerticalAlignment::Middle => (metrics.ascent - metrics.descent) / 2.0,
                VerticalAlignment::Baseline => 0.0,
                VerticalAlignment::Bottom => -metrics.descent,
            };

        PlacedText {
            text: text.to_string(),
            origin: Point2::new(x, y),
            font_size: style.font_size,
            color: style.font_color,
            weight: style.weight,
            bounds: Rect::new(
                x,
                y - metrics.ascent,
                x + metrics.width,
                y + metrics.descent,
            ),
        }
    }

    /// Glyph outlines of the placed text in pixel coordinates.
    pub fn outline(&self, text: &PlacedText) -> Option<LyonPath> {
        let face = self.select_face(&text.text, text.weight)?;
        rustybuzz::outline(&face.data, face.index, &text.text, text.font_size, text.origin)
    }
}
