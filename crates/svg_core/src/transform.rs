//! Affine 2D transforms.
//!
//! A [`Transform`] is the SVG `matrix(a b c d e f)`:
//!
//! ```text
//! | a c e |
//! | b d f |
//! | 0 0 1 |
//! ```
//!
//! Composition is matrix multiplication and therefore not commutative:
//! `a.compose(&b)` applies `b` first, then `a`.

use crate::{GeometryError, Point, EPSILON};
use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Determinants smaller than this are treated as zero.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A 2D affine transform (linear part plus translation).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 6]", from = "[f64; 6]")]
pub struct Transform(DAffine2);

impl Transform {
    pub const IDENTITY: Self = Self(DAffine2::IDENTITY);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Creates a transform from the SVG matrix components.
    pub fn from_matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self(DAffine2::from_cols_array(&[a, b, c, d, e, f]))
    }

    /// Returns the SVG matrix components `[a, b, c, d, e, f]`.
    pub fn to_matrix(&self) -> [f64; 6] {
        self.0.to_cols_array()
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self(DAffine2::from_translation(DVec2::new(tx, ty)))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(DAffine2::from_scale(DVec2::new(sx, sy)))
    }

    /// Rotation about the origin, in degrees (SVG `rotate(a)`).
    pub fn rotate(degrees: f64) -> Self {
        Self(DAffine2::from_angle(degrees.to_radians()))
    }

    /// Rotation about `pivot`, in degrees (SVG `rotate(a cx cy)`).
    pub fn rotate_about(degrees: f64, pivot: Point) -> Self {
        Self::translate(pivot.x, pivot.y)
            .compose(&Self::rotate(degrees))
            .compose(&Self::translate(-pivot.x, -pivot.y))
    }

    /// Scale about `pivot`.
    pub fn scale_about(sx: f64, sy: f64, pivot: Point) -> Self {
        Self::translate(pivot.x, pivot.y)
            .compose(&Self::scale(sx, sy))
            .compose(&Self::translate(-pivot.x, -pivot.y))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::from_matrix(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::from_matrix(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Matrix product `self · other`: `other` is applied first.
    pub fn compose(&self, other: &Transform) -> Transform {
        Self(self.0 * other.0)
    }

    /// Applies `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        next.compose(self)
    }

    pub fn determinant(&self) -> f64 {
        self.0.matrix2.determinant()
    }

    /// Returns the inverse transform.
    ///
    /// Fails with [`GeometryError::SingularTransform`] when the linear part
    /// collapses space (determinant close to zero).
    pub fn inverse(&self) -> Result<Transform, GeometryError> {
        let determinant = self.determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULAR_EPSILON {
            return Err(GeometryError::SingularTransform { determinant });
        }
        Ok(Self(self.0.inverse()))
    }

    /// Maps a point (translation applies).
    pub fn apply(&self, point: Point) -> Point {
        self.0.transform_point2(point)
    }

    /// Maps a vector (translation ignored).
    pub fn apply_vector(&self, vector: DVec2) -> DVec2 {
        self.0.transform_vector2(vector)
    }

    pub fn translation(&self) -> DVec2 {
        self.0.translation
    }

    pub fn is_finite(&self) -> bool {
        self.to_matrix().iter().all(|v| v.is_finite())
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, EPSILON)
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Transform, tolerance: f64) -> bool {
        self.to_matrix()
            .iter()
            .zip(other.to_matrix().iter())
            .all(|(a, b)| (a - b).abs() < tolerance)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for [f64; 6] {
    fn from(transform: Transform) -> Self {
        transform.to_matrix()
    }
}

impl From<[f64; 6]> for Transform {
    fn from([a, b, c, d, e, f]: [f64; 6]) -> Self {
        Self::from_matrix(a, b, c, d, e, f)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.to_matrix();
        write!(f, "matrix({} {} {} {} {} {})", a, b, c, d, e, g)
    }
}

/// Parses an SVG transform list such as
/// `translate(10, 20) rotate(45 50 50) scale(2)`.
///
/// Functions are composed left to right, so the rightmost one applies to
/// the element first.
impl FromStr for Transform {
    type Err = GeometryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || GeometryError::InvalidTransform(input.to_string());

        let mut result = Transform::IDENTITY;
        let mut rest = input.trim();
        while !rest.is_empty() {
            let open = rest.find('(').ok_or_else(invalid)?;
            let close = rest[open..].find(')').ok_or_else(invalid)? + open;
            let name = rest[..open].trim();
            let args = parse_numbers(&rest[open + 1..close]).ok_or_else(invalid)?;

            let step = match (name, args.as_slice()) {
                ("matrix", &[a, b, c, d, e, f]) => Transform::from_matrix(a, b, c, d, e, f),
                ("translate", &[tx]) => Transform::translate(tx, 0.0),
                ("translate", &[tx, ty]) => Transform::translate(tx, ty),
                ("scale", &[s]) => Transform::scale(s, s),
                ("scale", &[sx, sy]) => Transform::scale(sx, sy),
                ("rotate", &[angle]) => Transform::rotate(angle),
                ("rotate", &[angle, cx, cy]) => Transform::rotate_about(angle, Point::new(cx, cy)),
                ("skewX", &[angle]) => Transform::skew_x(angle),
                ("skewY", &[angle]) => Transform::skew_y(angle),
                _ => return Err(invalid()),
            };
            result = result.compose(&step);

            rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        }

        Ok(result)
    }
}

fn parse_numbers(args: &str) -> Option<SmallVec<[f64; 6]>> {
    args.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}
