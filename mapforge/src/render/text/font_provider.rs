//! Source of font faces used by the text shaper.

use std::path::Path;
use std::sync::Arc;

use super::FontProperties;

mod font_db;
pub use font_db::FontdbFontProvider;

/// Binary font data and the index of the face inside it.
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Font file contents.
    pub data: Arc<Vec<u8>>,
    /// Index of the face inside a font collection.
    pub index: u32,
}

/// Source of font faces for text shaping.
pub trait FontProvider {
    /// Face to shape `text` with.
    ///
    /// The first of `families` with glyphs for every character of the text wins. Otherwise the
    /// face with glyphs for the most characters is returned. `None` if no face has any of them.
    fn select_face(
        &self,
        text: &str,
        families: &[String],
        properties: FontProperties,
    ) -> Option<FontFace>;

    /// Adds all fonts of the directory.
    fn load_fonts_folder(&mut self, path: &Path);

    /// Adds a font from its binary data.
    fn load_font_data(&mut self, font_data: Vec<u8>);
}
