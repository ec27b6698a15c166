//! Axis-aligned bounding boxes.
//!
//! Elements may be rotated or skewed, so [`Bounds::transformed`] maps all
//! four corners and takes their envelope. The result stays axis-aligned and
//! is conservative for anything that is not a pure translate/scale.

use crate::{Point, Transform};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box represented by minimum and maximum points.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Top-left corner (smallest x and y).
    pub min: Point,
    /// Bottom-right corner (largest x and y).
    pub max: Point,
}

impl Bounds {
    /// Creates bounds from minimum and maximum points.
    ///
    /// Does not reorder; use [`Bounds::from_corners`] for arbitrary corners.
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_origin_size(origin: Point, size: DVec2) -> Self {
        Self::from_corners(origin, origin + size)
    }

    pub fn from_center_half_size(center: Point, half_size: DVec2) -> Self {
        Self::from_corners(center - half_size, center + half_size)
    }

    /// Creates bounds from two corner points, ordering them.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest bounds containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.min(p),
            max: bounds.max.max(p),
        }))
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// The four corners, clockwise from `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    /// Tests if two bounds overlap. Touching edges count as overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// The smallest bounds containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Tests if a point is inside. Points on the boundary are contained.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Grows the bounds by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        let delta = DVec2::splat(amount);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Axis-aligned envelope of these bounds mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let [a, b, c, d] = self.corners().map(|corner| transform.apply(corner));
        Self::from_points([a, b, c, d]).unwrap_or(*self)
    }
}
