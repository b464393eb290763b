//! Canvas drawing into an RGBA image.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use lyon::path::FillRule;
use mapforge_types::{Color, Rect};
use nalgebra::Point2;

use super::tessellation::{self, Mesh};
use super::text::{PlacedText, TextShaper};
use super::{Canvas, LinePaint, OutputFormat, Paint, PointPaint};
use crate::error::MapError;

const JPEG_QUALITY: u8 = 90;

/// Software rasterizer drawing into an RGBA image.
///
/// Shapes are tessellated with lyon and every covered pixel center is blended once per shape.
pub struct RasterCanvas<'a> {
    image: RgbaImage,
    clip: Option<Rect>,
    text_shaper: &'a TextShaper,
}

impl<'a> RasterCanvas<'a> {
    /// Creates a canvas filled with the background color.
    pub fn new(width: u32, height: u32, background: Color, text_shaper: &'a TextShaper) -> Self {
        let background = Rgba(background.to_u8_array());
        Self {
            image: RgbaImage::from_pixel(width, height, background),
            clip: None,
            text_shaper,
        }
    }

    /// Rendered pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encodes the image. JPEG drops the alpha channel.
    pub fn encode(self, format: OutputFormat) -> Result<Vec<u8>, MapError> {
        let mut bytes = Cursor::new(Vec::new());
        match format {
            OutputFormat::Png => {
                DynamicImage::ImageRgba8(self.image).write_to(&mut bytes, ImageOutputFormat::Png)?
            }
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(self.image).to_rgb8();
                DynamicImage::ImageRgb8(rgb)
                    .write_to(&mut bytes, ImageOutputFormat::Jpeg(JPEG_QUALITY))?
            }
            OutputFormat::Svg => {
                return Err(MapError::Encode(
                    "raster canvas cannot produce svg output".into(),
                ))
            }
        }

        Ok(bytes.into_inner())
    }

    /// Pixel range `(x_min, y_min, x_max, y_max)` (exclusive max) that may be painted.
    fn paint_area(&self, bounds: Rect) -> Option<(u32, u32, u32, u32)> {
        let mut area = Rect::new(
            0.0,
            0.0,
            self.image.width() as f64,
            self.image.height() as f64,
        );
        if let Some(clip) = self.clip {
            if !area.intersects(&clip) {
                return None;
            }
            area = Rect::new(
                area.x_min().max(clip.x_min()),
                area.y_min().max(clip.y_min()),
                area.x_max().min(clip.x_max()),
                area.y_max().min(clip.y_max()),
            );
        }
        if !area.intersects(&bounds) {
            return None;
        }

        let x_min = area.x_min().max(bounds.x_min()).floor().max(0.0) as u32;
        let y_min = area.y_min().max(bounds.y_min()).floor().max(0.0) as u32;
        let x_max = area.x_max().min(bounds.x_max()).ceil() as u32;
        let y_max = area.y_max().min(bounds.y_max()).ceil() as u32;
        let x_max = x_max.min(self.image.width());
        let y_max = y_max.min(self.image.height());

        (x_min < x_max && y_min < y_max).then_some((x_min, y_min, x_max, y_max))
    }

    fn in_clip(&self, x: f64, y: f64) -> bool {
        self.clip.map_or(true, |clip| {
            x >= clip.x_min() && x < clip.x_max() && y >= clip.y_min() && y < clip.y_max()
        })
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        let pixel = self.image.get_pixel_mut(x, y);
        let [r, g, b, a] = pixel.0;
        let blended = Color::rgba(r, g, b, a).blend(color);
        *pixel = Rgba(blended.to_u8_array());
    }

    fn fill_mesh(&mut self, mesh: &Mesh, color: Color) {
        if color.is_transparent() || mesh.indices.is_empty() {
            return;
        }

        let Some(bounds) = Rect::from_points(
            mesh.vertices
                .iter()
                .map(|v| geo_types::Coord { x: v[0] as f64, y: v[1] as f64 }),
        ) else {
            return;
        };
        let Some((x_min, y_min, x_max, y_max)) = self.paint_area(bounds) else {
            return;
        };

        let width = (x_max - x_min) as usize;
        let mut coverage = vec![false; width * (y_max - y_min) as usize];

        for triangle in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| {
                let v = mesh.vertices[triangle[i] as usize];
                Point2::new(v[0] as f64, v[1] as f64)
            });
            let area = edge(&a, &b, &c);
            if area == 0.0 {
                continue;
            }

            let tx_min = (a.x.min(b.x).min(c.x).floor().max(x_min as f64)) as u32;
            let ty_min = (a.y.min(b.y).min(c.y).floor().max(y_min as f64)) as u32;
            let tx_max = (a.x.max(b.x).max(c.x).ceil().min(x_max as f64)) as u32;
            let ty_max = (a.y.max(b.y).max(c.y).ceil().min(y_max as f64)) as u32;

            for y in ty_min..ty_max {
                for x in tx_min..tx_max {
                    let p = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                    let w0 = edge(&b, &c, &p) * area.signum();
                    let w1 = edge(&c, &a, &p) * area.signum();
                    let w2 = edge(&a, &b, &p) * area.signum();
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        coverage[(y - y_min) as usize * width + (x - x_min) as usize] = true;
                    }
                }
            }
        }

        for (index, covered) in coverage.into_iter().enumerate() {
            if covered {
                let x = x_min + (index % width) as u32;
                let y = y_min + (index / width) as u32;
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn stroke_contour(&mut self, points: &[Point2<f64>], closed: bool, paint: &LinePaint) {
        if paint.width <= 0.0 || points.len() < 2 {
            return;
        }

        let mut contour = points.to_vec();
        if closed {
            contour.push(points[0]);
        }

        let pieces = match &paint.dash {
            Some(pattern) => tessellation::dash(&contour, pattern),
            None => vec![contour],
        };

        let Some(path) = tessellation::build_path(&pieces, false) else {
            return;
        };
        let mesh = tessellation::stroke(&path, paint);
        self.fill_mesh(&mesh, paint.color);
    }
}

fn edge(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl Canvas for RasterCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let area = (!paint.color.is_transparent())
            .then(|| self.paint_area(rect))
            .flatten();
        if let Some((x_min, y_min, x_max, y_max)) = area {
            for y in y_min..y_max {
                for x in x_min..x_max {
                    if rect.contains(geo_types::Coord {
                        x: x as f64 + 0.5,
                        y: y as f64 + 0.5,
                    }) {
                        self.blend_pixel(x, y, paint.color);
                    }
                }
            }
        }

        if let Some(edge) = &paint.edge {
            let corners = rect
                .into_quadrangle()
                .map(|corner| Point2::new(corner.x, corner.y));
            self.stroke_contour(&corners, true, edge);
        }
    }

    fn draw_polygon(&mut self, rings: &[Vec<Point2<f64>>], paint: &Paint) {
        if let Some(path) = tessellation::build_path(rings, true) {
            let mesh = tessellation::fill(&path, FillRule::EvenOdd);
            self.fill_mesh(&mesh, paint.color);
        }

        if let Some(edge) = &paint.edge {
            for ring in rings {
                self.stroke_contour(ring, true, edge);
            }
        }
    }

    fn draw_line(&mut self, points: &[Point2<f64>], paint: &LinePaint) {
        self.stroke_contour(points, false, paint);
    }

    fn draw_point(&mut self, position: Point2<f64>, paint: &PointPaint) {
        let shape = tessellation::point_shape(position, paint.size, paint.shape);
        let fill = Paint {
            color: paint.color,
            edge: paint.edge.clone(),
        };
        self.draw_polygon(&[shape], &fill);
    }

    fn draw_image(&mut self, image: &RgbaImage, bbox: Rect) -> Result<(), MapError> {
        if image.width() == 0 || image.height() == 0 || bbox.width() <= 0.0 || bbox.height() <= 0.0
        {
            return Ok(());
        }
        let Some((x_min, y_min, x_max, y_max)) = self.paint_area(bbox) else {
            return Ok(());
        };

        let scale_x = image.width() as f64 / bbox.width();
        let scale_y = image.height() as f64 / bbox.height();
        for y in y_min..y_max {
            for x in x_min..x_max {
                let (cx, cy) = (x as f64 + 0.5, y as f64 + 0.5);
                if !bbox.contains(geo_types::Coord { x: cx, y: cy }) || !self.in_clip(cx, cy) {
                    continue;
                }

                let sx = (((cx - bbox.x_min()) * scale_x) as u32).min(image.width() - 1);
                let sy = (((cy - bbox.y_min()) * scale_y) as u32).min(image.height() - 1);
                let [r, g, b, a] = image.get_pixel(sx, sy).0;
                self.blend_pixel(x, y, Color::rgba(r, g, b, a));
            }
        }

        Ok(())
    }

    fn draw_text(&mut self, text: &PlacedText) {
        let Some(path) = self.text_shaper.outline(text) else {
            log::warn!("No font available, text '{}' is not drawn", text.text);
            return;
        };

        let mesh = tessellation::fill(&path, FillRule::NonZero);
        self.fill_mesh(&mesh, text.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::FontdbFontProvider;
    use crate::render::{LineCap, PointShape};

    fn shaper() -> TextShaper {
        TextShaper::new(Box::new(FontdbFontProvider::new()), vec![])
    }

    #[test]
    fn fill_rect_with_clip() {
        let shaper = shaper();
        let mut canvas = RasterCanvas::new(10, 10, Color::WHITE, &shaper);
        canvas.set_clip(Some(Rect::new(0.0, 0.0, 5.0, 10.0)));
        canvas.fill_rect(Rect::new(2.0, 2.0, 8.0, 8.0), &Paint::fill(Color::RED));

        assert_eq!(canvas.image().get_pixel(3, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.image().get_pixel(6, 3), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.image().get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn polygon_with_hole() {
        let shaper = shaper();
        let mut canvas = RasterCanvas::new(20, 20, Color::WHITE, &shaper);
        let square = |min: f64, max: f64| {
            vec![
                Point2::new(min, min),
                Point2::new(max, min),
                Point2::new(max, max),
                Point2::new(min, max),
            ]
        };
        canvas.draw_polygon(&[square(2.0, 18.0), square(8.0, 12.0)], &Paint::fill(Color::BLUE));

        assert_eq!(canvas.image().get_pixel(4, 4), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.image().get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn overlapping_stroke_is_blended_once() {
        let shaper = shaper();
        let mut canvas = RasterCanvas::new(20, 20, Color::WHITE, &shaper);
        let paint =
            LinePaint::solid(Color::BLACK.with_alpha(128), 4.0).with_line_cap(LineCap::Round);
        canvas.draw_line(
            &[
                Point2::new(2.0, 10.0),
                Point2::new(10.0, 10.0),
                Point2::new(18.0, 10.0),
            ],
            &paint,
        );

        assert_eq!(canvas.image().get_pixel(10, 10), &Rgba([127, 127, 127, 255]));
    }

    #[test]
    fn point_marker() {
        let shaper = shaper();
        let mut canvas = RasterCanvas::new(20, 20, Color::WHITE, &shaper);
        canvas.draw_point(
            Point2::new(10.0, 10.0),
            &PointPaint {
                color: Color::GREEN,
                size: 8.0,
                shape: PointShape::Circle,
                edge: None,
            },
        );

        assert_eq!(canvas.image().get_pixel(10, 10), &Rgba([0, 128, 0, 255]));
        assert_eq!(canvas.image().get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn image_is_stretched() {
        let shaper = shaper();
        let mut canvas = RasterCanvas::new(4, 4, Color::WHITE, &shaper);
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        canvas
            .draw_image(&image, Rect::new(0.0, 0.0, 4.0, 4.0))
            .unwrap();

        assert_eq!(canvas.image().get_pixel(0, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.image().get_pixel(3, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn encode_png_and_jpeg() {
        let shaper = shaper();
        let png = RasterCanvas::new(4, 4, Color::WHITE, &shaper)
            .encode(OutputFormat::Png)
            .unwrap();
        assert_eq!(&png[..4], b"\x89PNG");

        let jpeg = RasterCanvas::new(4, 4, Color::WHITE, &shaper)
            .encode(OutputFormat::Jpeg)
            .unwrap();
        assert_eq!(&jpeg[..2], b"\xFF\xD8");
    }
}
