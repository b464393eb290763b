//! Canvas writing an SVG document.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use mapforge_types::{Color, Rect};
use nalgebra::Point2;

use super::text::{FontWeight, PlacedText};
use super::{Canvas, LinePaint, Paint, PointPaint, PointShape};
use crate::error::MapError;

/// Canvas writing an SVG document.
///
/// Coordinates are written in pixels, the document size is set in points so that the figure keeps
/// its physical size in viewers.
pub struct SvgCanvas {
    width: u32,
    height: u32,
    dpi: f64,
    font_family: String,
    defs: Vec<String>,
    elements: Vec<String>,
    clip_group_open: bool,
}

impl SvgCanvas {
    /// Creates an empty document with a background rectangle.
    pub fn new(width: u32, height: u32, dpi: f64, background: Color, families: &[String]) -> Self {
        let mut font_family: Vec<String> = families
            .iter()
            .map(|family| format!("'{}'", escape_xml(family)))
            .collect();
        font_family.push("sans-serif".into());

        let mut canvas = Self {
            width,
            height,
            dpi,
            font_family: font_family.join(", "),
            defs: vec![],
            elements: vec![],
            clip_group_open: false,
        };

        if !background.is_transparent() {
            canvas.fill_rect(
                Rect::new(0.0, 0.0, width as f64, height as f64),
                &Paint::fill(background),
            );
        }

        canvas
    }

    /// Build the final SVG document.
    pub fn build(mut self) -> String {
        self.close_clip_group();

        let to_pt = |px: u32| px as f64 * 72.0 / self.dpi;
        let mut svg = String::new();
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push('\n');
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}pt" height="{}pt" viewBox="0 0 {} {}">"#,
            num(to_pt(self.width)),
            num(to_pt(self.height)),
            self.width,
            self.height
        ));
        svg.push('\n');

        if !self.defs.is_empty() {
            svg.push_str("  <defs>\n");
            for def in &self.defs {
                svg.push_str("    ");
                svg.push_str(def);
                svg.push('\n');
            }
            svg.push_str("  </defs>\n");
        }

        for element in &self.elements {
            svg.push_str(element);
            svg.push('\n');
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn close_clip_group(&mut self) {
        if self.clip_group_open {
            self.elements.push("  </g>".into());
            self.clip_group_open = false;
        }
    }

    fn indent(&self) -> &'static str {
        if self.clip_group_open {
            "    "
        } else {
            "  "
        }
    }

    fn push_path(&mut self, d: String, fill: Option<(Color, &str)>, stroke: Option<&LinePaint>) {
        let fill_attrs = match fill {
            Some((color, rule)) => format!(
                r#" fill="{}"{} fill-rule="{rule}""#,
                color.to_css_rgb(),
                opacity_attr("fill-opacity", color)
            ),
            None => r#" fill="none""#.to_string(),
        };

        self.elements.push(format!(
            r#"{}<path d="{d}"{fill_attrs}{}/>"#,
            self.indent(),
            stroke_attrs(stroke)
        ));
    }
}

impl Canvas for SvgCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.close_clip_group();

        if let Some(clip) = clip {
            let id = format!("clip{}", self.defs.len());
            self.defs.push(format!(
                r#"<clipPath id="{id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
                num(clip.x_min()),
                num(clip.y_min()),
                num(clip.width()),
                num(clip.height())
            ));
            self.elements
                .push(format!(r#"  <g clip-path="url(#{id})">"#));
            self.clip_group_open = true;
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let fill = if paint.color.is_transparent() {
            r#" fill="none""#.to_string()
        } else {
            format!(
                r#" fill="{}"{}"#,
                paint.color.to_css_rgb(),
                opacity_attr("fill-opacity", paint.color)
            )
        };

        self.elements.push(format!(
            r#"{}<rect x="{}" y="{}" width="{}" height="{}"{fill}{}/>"#,
            self.indent(),
            num(rect.x_min()),
            num(rect.y_min()),
            num(rect.width()),
            num(rect.height()),
            stroke_attrs(paint.edge.as_ref())
        ));
    }

    fn draw_polygon(&mut self, rings: &[Vec<Point2<f64>>], paint: &Paint) {
        let d = rings
            .iter()
            .filter(|ring| !ring.is_empty())
            .map(|ring| format!("{} Z", path_to_d(ring)))
            .collect::<Vec<_>>()
            .join(" ");
        if d.is_empty() {
            return;
        }

        let fill = (!paint.color.is_transparent()).then_some((paint.color, "evenodd"));
        self.push_path(d, fill, paint.edge.as_ref());
    }

    fn draw_line(&mut self, points: &[Point2<f64>], paint: &LinePaint) {
        if points.len() < 2 {
            return;
        }

        self.push_path(path_to_d(points), None, Some(paint));
    }

    fn draw_point(&mut self, position: Point2<f64>, paint: &PointPaint) {
        let fill = format!(
            r#" fill="{}"{}"#,
            paint.color.to_css_rgb(),
            opacity_attr("fill-opacity", paint.color)
        );
        let stroke = stroke_attrs(paint.edge.as_ref());

        let element = match paint.shape {
            PointShape::Circle => format!(
                r#"{}<circle cx="{}" cy="{}" r="{}"{fill}{stroke}/>"#,
                self.indent(),
                num(position.x),
                num(position.y),
                num(paint.size / 2.0)
            ),
            PointShape::Square => format!(
                r#"{}<rect x="{}" y="{}" width="{}" height="{}"{fill}{stroke}/>"#,
                self.indent(),
                num(position.x - paint.size / 2.0),
                num(position.y - paint.size / 2.0),
                num(paint.size),
                num(paint.size)
            ),
        };
        self.elements.push(element);
    }

    fn draw_image(&mut self, image: &RgbaImage, bbox: Rect) -> Result<(), MapError> {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image.clone()).write_to(&mut png, ImageOutputFormat::Png)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png.into_inner());

        self.elements.push(format!(
            r#"{}<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" style="image-rendering:pixelated" xlink:href="data:image/png;base64,{encoded}"/>"#,
            self.indent(),
            num(bbox.x_min()),
            num(bbox.y_min()),
            num(bbox.width()),
            num(bbox.height())
        ));

        Ok(())
    }

    fn draw_text(&mut self, text: &PlacedText) {
        let weight = if text.weight >= FontWeight::BOLD {
            r#" font-weight="bold""#
        } else {
            ""
        };

        self.elements.push(format!(
            r#"{}<text x="{}" y="{}" font-size="{}" font-family="{}"{weight} fill="{}"{}>{}</text>"#,
            self.indent(),
            num(text.origin.x),
            num(text.origin.y),
            num(text.font_size),
            self.font_family,
            text.color.to_css_rgb(),
            opacity_attr("fill-opacity", text.color),
            escape_xml(&text.text)
        ));
    }
}

fn stroke_attrs(paint: Option<&LinePaint>) -> String {
    let Some(paint) = paint else {
        return String::new();
    };

    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}" stroke-linecap="{}" stroke-linejoin="round"{}"#,
        paint.color.to_css_rgb(),
        num(paint.width),
        paint.line_cap.svg_name(),
        opacity_attr("stroke-opacity", paint.color)
    );

    if let Some(dash) = &paint.dash {
        let pattern = dash.iter().map(|v| num(*v)).collect::<Vec<_>>().join(",");
        attrs.push_str(&format!(r#" stroke-dasharray="{pattern}""#));
    }

    attrs
}

fn opacity_attr(name: &str, color: Color) -> String {
    if color.a() == 255 {
        String::new()
    } else {
        format!(r#" {name}="{}""#, num(color.opacity()))
    }
}

fn path_to_d(path: &[Point2<f64>]) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut d = format!("M{} {}", num(path[0].x), num(path[0].y));
    for point in &path[1..] {
        d.push_str(&format!(" L{} {}", num(point.x), num(point.y)));
    }
    d
}

/// Formats a number with at most two decimals.
fn num(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::TextStyle;

    #[test]
    fn number_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(1.256), "1.26");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(10.50), "10.5");
    }

    #[test]
    fn document_with_clipped_shapes() {
        let mut canvas = SvgCanvas::new(100, 50, 72.0, Color::WHITE, &["DejaVu Sans".into()]);
        canvas.set_clip(Some(Rect::new(10.0, 10.0, 90.0, 40.0)));
        canvas.draw_line(
            &[Point2::new(0.0, 0.0), Point2::new(50.0, 25.0)],
            &LinePaint::solid(Color::RED, 2.0).with_dash(Some(vec![3.0, 1.5])),
        );
        canvas.set_clip(None);
        canvas.draw_text(&PlacedText {
            text: "Rivers & <Lakes>".into(),
            origin: Point2::new(5.0, 45.0),
            font_size: 10.0,
            color: Color::BLACK,
            weight: TextStyle::new(10.0).weight,
            bounds: Rect::new(5.0, 35.0, 60.0, 47.0),
        });

        let svg = canvas.build();
        assert!(svg.contains(r#"width="100pt" height="50pt" viewBox="0 0 100 50""#));
        assert!(svg.contains(r#"<clipPath id="clip0"><rect x="10" y="10" width="80" height="30"/></clipPath>"#));
        assert!(svg.contains(r#"<g clip-path="url(#clip0)">"#));
        assert!(svg.contains(r#"stroke-dasharray="3,1.5""#));
        assert!(svg.contains("Rivers &amp; &lt;Lakes&gt;</text>"));
        assert!(svg.contains("font-family=\"'DejaVu Sans', sans-serif\""));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    }

    #[test]
    fn embeds_images_as_png() {
        let mut canvas = SvgCanvas::new(10, 10, 300.0, Color::WHITE, &[]);
        canvas
            .draw_image(&RgbaImage::new(2, 2), Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();

        assert!(canvas.build().contains("data:image/png;base64,"));
    }
}
