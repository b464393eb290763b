//! Font provider backed by a `fontdb` database.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, ID};
use rustybuzz::ttf_parser;

use super::{FontFace, FontProvider};
use crate::render::text::{FontProperties, FontWeight};

/// Font provider backed by a `fontdb` database.
///
/// Face data is read when a face is first selected and kept for the lifetime of the provider.
pub struct FontdbFontProvider {
    db: Database,
    loaded: RefCell<HashMap<ID, Arc<Vec<u8>>>>,
}

impl FontdbFontProvider {
    /// Creates a provider without any fonts.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            loaded: RefCell::new(HashMap::new()),
        }
    }

    /// Creates a provider with the fonts installed in the system.
    pub fn with_system_fonts() -> Self {
        let mut provider = Self::new();
        provider.db.load_system_fonts();
        log::debug!("Loaded {} system font faces", provider.db.len());
        provider
    }

    /// Number of font faces known to the provider.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Faces to try for the text: one per requested family, then the generic sans-serif face.
    fn candidates(&self, families: &[String], weight: FontWeight) -> Vec<ID> {
        let mut ids: Vec<ID> = vec![];
        let requested = families
            .iter()
            .map(|name| Family::Name(name.as_str()))
            .chain([Family::SansSerif]);

        for family in requested {
            let query = Query {
                families: &[family],
                weight: weight.into(),
                ..Query::default()
            };
            if let Some(id) = self.db.query(&query) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        ids
    }

    /// Number of characters of `text` the face has glyphs for.
    fn coverage(&self, id: ID, text: &str) -> usize {
        self.db
            .with_face_data(id, |data, index| {
                ttf_parser::Face::parse(data, index)
                    .map(|face| {
                        text.chars()
                            .filter(|c| face.glyph_index(*c).is_some())
                            .count()
                    })
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    fn face(&self, id: ID) -> Option<FontFace> {
        let index = self.db.face(id)?.index;
        if let Some(data) = self.loaded.borrow().get(&id) {
            return Some(FontFace {
                data: data.clone(),
                index,
            });
        }

        let data = Arc::new(self.db.with_face_data(id, |data, _| data.to_vec())?);
        self.loaded.borrow_mut().insert(id, data.clone());
        Some(FontFace { data, index })
    }
}

impl Default for FontdbFontProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FontProvider for FontdbFontProvider {
    fn select_face(
        &self,
        text: &str,
        families: &[String],
        properties: FontProperties,
    ) -> Option<FontFace> {
        let char_count = text.chars().count();
        let mut best: Option<(ID, usize)> = None;

        let mut candidates = self.candidates(families, properties.weight);
        if candidates.is_empty() {
            // No family matched, any face may still have the glyphs.
            candidates = self.db.faces().map(|face| face.id).collect();
        }

        for id in candidates {
            let covered = self.coverage(id, text);
            if covered > best.map_or(0, |(_, count)| count) {
                best = Some((id, covered));
            }
            if covered == char_count {
                break;
            }
        }

        let (id, covered) = best?;
        log::trace!("Face {id:?} has glyphs for {covered} of {char_count} characters of '{text}'");
        self.face(id)
    }

    fn load_fonts_folder(&mut self, path: &Path) {
        let before = self.db.len();
        self.db.load_fonts_dir(path);
        log::debug!(
            "Loaded {} font faces from {}",
            self.db.len() - before,
            path.display()
        );
    }

    fn load_font_data(&mut self, font_data: Vec<u8>) {
        self.db.load_font_data(font_data);
    }
}

impl From<FontWeight> for fontdb::Weight {
    fn from(value: FontWeight) -> Self {
        Self(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_has_no_face() {
        let provider = FontdbFontProvider::new();
        assert_eq!(provider.face_count(), 0);
        assert!(provider
            .select_face("abc", &["DejaVu Sans".into()], FontProperties::default())
            .is_none());
    }

    #[test]
    fn invalid_font_data_is_ignored() {
        let mut provider = FontdbFontProvider::new();
        provider.load_font_data(vec![0, 1, 2, 3]);
        assert_eq!(provider.face_count(), 0);
        assert!(provider
            .select_face("abc", &[], FontProperties::default())
            .is_none());
    }

    #[test]
    fn empty_fonts_dir_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = FontdbFontProvider::new();
        provider.load_fonts_folder(dir.path());
        assert_eq!(provider.face_count(), 0);
        assert!(provider.candidates(&["Arial".into()], FontWeight::BOLD).is_empty());
    }
}
