//! Axis aligned rectangles.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Axis aligned rectangle in data (or pixel) coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x_min: f64,
    /// Lower edge in data coordinates, top edge in pixel coordinates.
    pub y_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Upper edge in data coordinates, bottom edge in pixel coordinates.
    pub y_max: f64,
}

impl Rect {
    /// Creates a rectangle from its edges.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Left edge.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right edge.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Bottom edge.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Top edge.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Size along the x axis.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Size along the y axis.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Smallest rectangle containing both rectangles.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Merges all the rectangles of the iterator. Returns `None` for an empty iterator.
    pub fn merge_all(rects: impl IntoIterator<Item = Rect>) -> Option<Self> {
        rects.into_iter().reduce(|acc, rect| acc.merge(rect))
    }

    /// Zero-sized rectangle at the point.
    pub fn from_point(p: Coord<f64>) -> Self {
        Self {
            x_min: p.x,
            x_max: p.x,
            y_min: p.y,
            y_max: p.y,
        }
    }

    /// Bounding rectangle of the points. Non-finite coordinates are ignored.
    pub fn from_points(points: impl IntoIterator<Item = Coord<f64>>) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(Self::from_point)
            .reduce(|acc, rect| acc.merge(rect))
    }

    /// Whether the point is inside the rectangle or on its boundary.
    pub fn contains(&self, point: Coord<f64>) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Whether the rectangles overlap or touch.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }

    /// Grows the rectangle by `amount` on every side. Negative amount shrinks it.
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            x_min: self.x_min - amount,
            x_max: self.x_max + amount,
            y_min: self.y_min - amount,
            y_max: self.y_max + amount,
        }
    }

    /// Same rectangle shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x_min: self.x_min + dx,
            x_max: self.x_max + dx,
            y_min: self.y_min + dy,
            y_max: self.y_max + dy,
        }
    }

    /// Center point.
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.x_min + self.x_max) / 2.0,
            y: (self.y_min + self.y_max) / 2.0,
        }
    }

    /// Corners, counter-clockwise in data coordinates starting from `(x_min, y_min)`.
    pub fn into_quadrangle(self) -> [Coord<f64>; 4] {
        [
            Coord {
                x: self.x_min,
                y: self.y_min,
            },
            Coord {
                x: self.x_min,
                y: self.y_max,
            },
            Coord {
                x: self.x_max,
                y: self.y_max,
            },
            Coord {
                x: self.x_max,
                y: self.y_min,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn from_points_skips_non_finite() {
        let rect = Rect::from_points([
            Coord { x: 1.0, y: 2.0 },
            Coord {
                x: f64::NAN,
                y: 100.0,
            },
            Coord { x: -3.0, y: 5.0 },
        ])
        .unwrap();

        assert_eq!(rect, Rect::new(-3.0, 2.0, 1.0, 5.0));
    }

    #[test]
    fn from_no_points() {
        assert!(Rect::from_points(std::iter::empty()).is_none());
        assert!(Rect::merge_all(Vec::new()).is_none());
    }

    #[test]
    fn expand_and_center() {
        let rect = Rect::new(0.0, 0.0, 10.0, 4.0).expand(1.0);
        assert_eq!(rect, Rect::new(-1.0, -1.0, 11.0, 5.0));
        assert_abs_diff_eq!(rect.center().x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.center().y, 2.0, epsilon = 1e-9);
    }
}
