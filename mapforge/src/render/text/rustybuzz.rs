//! Text shaping with `rustybuzz`.

use lyon::path::path::Builder;
use lyon::path::Path;
use nalgebra::Point2;
use rustybuzz::ttf_parser::{self, GlyphId, OutlineBuilder};
use rustybuzz::{GlyphBuffer, UnicodeBuffer};

use super::TextMetrics;

struct ShapedLine<'a> {
    face: rustybuzz::Face<'a>,
    glyphs: GlyphBuffer,
    scale: f64,
}

impl ShapedLine<'_> {
    fn metrics(&self) -> TextMetrics {
        let advance: i32 = self
            .glyphs
            .glyph_positions()
            .iter()
            .map(|position| position.x_advance)
            .sum();

        TextMetrics {
            width: advance as f64 * self.scale,
            ascent: self.face.ascender() as f64 * self.scale,
            descent: -(self.face.descender() as f64) * self.scale,
        }
    }
}

fn shape<'a>(
    font_data: &'a [u8],
    index: u32,
    text: &str,
    font_size: f64,
) -> Option<ShapedLine<'a>> {
    let face = ttf_parser::Face::parse(font_data, index).ok()?;
    let face = rustybuzz::Face::from_face(face);

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();

    let units = face.units_per_em() as f64;
    if units <= 0.0 {
        return None;
    }

    let glyphs = rustybuzz::shape(&face, &[], buffer);
    Some(ShapedLine {
        face,
        glyphs,
        scale: font_size / units,
    })
}

pub(super) fn measure(
    font_data: &[u8],
    index: u32,
    text: &str,
    font_size: f64,
) -> Option<TextMetrics> {
    shape(font_data, index, text, font_size).map(|line| line.metrics())
}

/// Outlines of all glyphs of the line, with the baseline starting at `origin`. The y axis points
/// down.
pub(super) fn outline(
    font_data: &[u8],
    index: u32,
    text: &str,
    font_size: f64,
    origin: Point2<f64>,
) -> Option<Path> {
    let line = shape(font_data, index, text, font_size)?;
    let mut builder = GlyphPathBuilder::new(line.scale as f32);

    let mut advance_x = 0.0;
    for (position, info) in line
        .glyphs
        .glyph_positions()
        .iter()
        .zip(line.glyphs.glyph_infos())
    {
        builder.offset = [
            (origin.x + advance_x + position.x_offset as f64 * line.scale) as f32,
            (origin.y - position.y_offset as f64 * line.scale) as f32,
        ];
        line.face
            .outline_glyph(GlyphId(info.glyph_id as u16), &mut builder);
        builder.close_open();

        advance_x += position.x_advance as f64 * line.scale;
    }

    Some(builder.builder.build())
}

struct GlyphPathBuilder {
    builder: Builder,
    scale: f32,
    offset: [f32; 2],
    is_open: bool,
}

impl GlyphPathBuilder {
    fn new(scale: f32) -> Self {
        Self {
            builder: Path::builder(),
            scale,
            offset: [0.0, 0.0],
            is_open: false,
        }
    }

    fn point(&self, x: f32, y: f32) -> lyon::math::Point {
        lyon::geom::point(
            self.offset[0] + x * self.scale,
            self.offset[1] - y * self.scale,
        )
    }

    fn close_open(&mut self) {
        if self.is_open {
            self.builder.end(true);
            self.is_open = false;
        }
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.close_open();
        let point = self.point(x, y);
        self.builder.begin(point);
        self.is_open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = self.point(x, y);
        self.builder.line_to(point);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let ctrl = self.point(x1, y1);
        let to = self.point(x, y);
        self.builder.quadratic_bezier_to(ctrl, to);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let ctrl1 = self.point(x1, y1);
        let ctrl2 = self.point(x2, y2);
        let to = self.point(x, y);
        self.builder.cubic_bezier_to(ctrl1, ctrl2, to);
    }

    fn close(&mut self) {
        self.close_open();
    }
}
