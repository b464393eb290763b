//! Tessellation of paths into triangles for the raster canvas.

use lyon::path::{FillRule, Path};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, LineJoin, StrokeOptions,
    StrokeTessellator, StrokeVertex, VertexBuffers,
};
use nalgebra::Point2;

use super::{LinePaint, PointShape};

/// Triangles in pixel coordinates.
pub(crate) type Mesh = VertexBuffers<[f32; 2], u32>;

const TOLERANCE: f32 = 0.1;

fn point(p: &Point2<f64>) -> lyon::math::Point {
    lyon::math::Point::new(p.x as f32, p.y as f32)
}

/// Builds a path with one sub-path per contour. Contours with less than two points are skipped.
pub(crate) fn build_path(contours: &[Vec<Point2<f64>>], closed: bool) -> Option<Path> {
    let mut builder = Path::builder();
    let mut is_empty = true;
    for contour in contours.iter().filter(|contour| contour.len() > 1) {
        builder.begin(point(&contour[0]));
        for p in &contour[1..] {
            builder.line_to(point(p));
        }
        builder.end(closed);
        is_empty = false;
    }

    (!is_empty).then(|| builder.build())
}

pub(crate) fn fill(path: &Path, fill_rule: FillRule) -> Mesh {
    let mut mesh = Mesh::new();
    let mut tessellator = FillTessellator::new();
    if let Err(err) = tessellator.tessellate_path(
        path,
        &FillOptions::DEFAULT
            .with_fill_rule(fill_rule)
            .with_tolerance(TOLERANCE),
        &mut BuffersBuilder::new(&mut mesh, |vertex: FillVertex| {
            vertex.position().to_array()
        }),
    ) {
        log::error!("Tessellation failed: {err:?}");
    }

    mesh
}

pub(crate) fn stroke(path: &Path, paint: &LinePaint) -> Mesh {
    let mut mesh = Mesh::new();
    let mut tessellator = StrokeTessellator::new();
    if let Err(err) = tessellator.tessellate_path(
        path,
        &StrokeOptions::DEFAULT
            .with_line_cap(paint.line_cap.into())
            .with_line_width(paint.width as f32)
            .with_line_join(LineJoin::Round)
            .with_tolerance(TOLERANCE),
        &mut BuffersBuilder::new(&mut mesh, |vertex: StrokeVertex| {
            vertex.position().to_array()
        }),
    ) {
        log::error!("Tessellation failed: {err:?}");
    }

    mesh
}

/// Splits a polyline into the visible segments of a dash pattern.
pub(crate) fn dash(points: &[Point2<f64>], pattern: &[f64]) -> Vec<Vec<Point2<f64>>> {
    let pattern_len: f64 = pattern.iter().sum();
    if points.len() < 2 || pattern.is_empty() || pattern.iter().any(|v| *v <= 0.0) {
        return vec![points.to_vec()];
    }
    if !pattern_len.is_finite() {
        return vec![points.to_vec()];
    }

    let mut dashes = vec![];
    let mut current = vec![points[0]];
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut visible = true;

    for segment in points.windows(2) {
        let (mut from, to) = (segment[0], segment[1]);
        let mut length = (to - from).norm();

        while length > remaining {
            let split = from + (to - from) * (remaining / length);
            if visible {
                current.push(split);
                dashes.push(std::mem::take(&mut current));
            } else {
                current = vec![split];
            }

            length -= remaining;
            from = split;
            visible = !visible;
            index = (index + 1) % pattern.len();
            remaining = pattern[index];
        }

        remaining -= length;
        if visible {
            current.push(to);
        }
    }

    if visible && current.len() > 1 {
        dashes.push(current);
    }

    dashes
}

/// Closed contour of a marker centered at `center`.
pub(crate) fn point_shape(center: Point2<f64>, size: f64, shape: PointShape) -> Vec<Point2<f64>> {
    let half = size / 2.0;
    match shape {
        PointShape::Square => vec![
            Point2::new(center.x - half, center.y - half),
            Point2::new(center.x - half, center.y + half),
            Point2::new(center.x + half, center.y + half),
            Point2::new(center.x + half, center.y - half),
        ],
        PointShape::Circle => circle(center, half),
    }
}

fn circle(center: Point2<f64>, radius: f64) -> Vec<Point2<f64>> {
    let tolerance = TOLERANCE as f64;
    if radius <= tolerance {
        return vec![center];
    }

    let steps = (std::f64::consts::PI / ((radius - tolerance) / (radius + tolerance)).acos())
        .ceil()
        .max(8.0) as usize;
    let step = std::f64::consts::PI * 2.0 / steps as f64;

    (0..steps)
        .map(|i| {
            let angle = step * i as f64;
            Point2::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dash_straight_line() {
        let line = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let dashes = dash(&line, &[3.0, 1.0]);

        assert_eq!(dashes.len(), 3);
        assert_abs_diff_eq!(dashes[0][1].x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dashes[1][0].x, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dashes[2][0].x, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dashes[2][1].x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn dash_keeps_corners() {
        let line = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
        ];
        let dashes = dash(&line, &[3.0, 10.0]);

        assert_eq!(dashes.len(), 1);
        assert_eq!(dashes[0].len(), 3);
        assert_abs_diff_eq!(dashes[0][2].y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_pattern_draws_solid() {
        let line = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert_eq!(dash(&line, &[0.0, 1.0]), vec![line.to_vec()]);
    }

    #[test]
    fn fill_square() {
        let square = point_shape(Point2::new(5.0, 5.0), 2.0, PointShape::Square);
        let path = build_path(&[square], true).unwrap();
        let mesh = fill(&path, FillRule::NonZero);

        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn circle_is_closed_polygon_around_center() {
        let contour = point_shape(Point2::new(0.0, 0.0), 10.0, PointShape::Circle);
        assert!(contour.len() >= 8);
        for p in contour {
            assert_abs_diff_eq!(p.coords.norm(), 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn empty_contours_build_nothing() {
        assert!(build_path(&[vec![Point2::new(0.0, 0.0)]], false).is_none());
    }
}
