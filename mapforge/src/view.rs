//! Mapping between data coordinates and figure pixels.

use geo_types::Coord;
use mapforge_types::Rect;
use nalgebra::{Matrix3, Point2, Vector2};

/// Transformation from data coordinates into the pixel area of the axes.
///
/// The data y axis points up, the pixel y axis points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureView {
    data: Rect,
    screen: Rect,
    transform: Matrix3<f64>,
}

impl FigureView {
    /// Creates a view mapping `data` onto `screen`. Both rectangles must have non-zero size.
    pub fn new(data: Rect, screen: Rect) -> Self {
        let scale = Matrix3::new_nonuniform_scaling(&Vector2::new(
            screen.width() / data.width(),
            -screen.height() / data.height(),
        ));
        let to_origin = Matrix3::new_translation(&Vector2::new(-data.x_min(), -data.y_max()));
        let to_screen = Matrix3::new_translation(&Vector2::new(screen.x_min(), screen.y_min()));

        Self {
            data,
            screen,
            transform: to_screen * scale * to_origin,
        }
    }

    /// Pixel rectangle of the axes.
    pub fn screen_rect(&self) -> Rect {
        self.screen
    }

    /// Projects a data point into canvas pixels.
    pub fn map_to_screen(&self, point: Coord<f64>) -> Point2<f64> {
        self.transform.transform_point(&Point2::new(point.x, point.y))
    }

    /// Pixel rectangle covered by a data rectangle.
    pub fn map_rect_to_screen(&self, rect: Rect) -> Rect {
        let a = self.map_to_screen(Coord {
            x: rect.x_min(),
            y: rect.y_min(),
        });
        let b = self.map_to_screen(Coord {
            x: rect.x_max(),
            y: rect.y_max(),
        });

        Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Same view with the pixel area shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.data, self.screen.translate(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn view() -> FigureView {
        FigureView::new(
            Rect::new(-10.0, 0.0, 10.0, 20.0),
            Rect::new(100.0, 50.0, 300.0, 250.0),
        )
    }

    #[test]
    fn corners() {
        let view = view();
        let top_left = view.map_to_screen(Coord { x: -10.0, y: 20.0 });
        assert_abs_diff_eq!(top_left.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(top_left.y, 50.0, epsilon = 1e-9);

        let bottom_right = view.map_to_screen(Coord { x: 10.0, y: 0.0 });
        assert_abs_diff_eq!(bottom_right.x, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bottom_right.y, 250.0, epsilon = 1e-9);

    }

    #[test]
    fn rect_and_translation() {
        let view = view().translate(-100.0, -50.0);
        let rect = view.map_rect_to_screen(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_abs_diff_eq!(rect.x_min(), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.y_min(), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.x_max(), 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.y_max(), 200.0, epsilon = 1e-9);
    }
}
