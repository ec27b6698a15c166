//! # Geometry primitives for the SVG builder
//!
//! Pure value types shared by the rest of the workspace: points, affine
//! transforms, axis-aligned bounds and colors. Nothing in here has side
//! effects or knows about elements.

pub mod bounds;
pub mod color;
pub mod transform;

mod error;

pub use bounds::Bounds;
pub use color::Color;
pub use error::GeometryError;
pub use transform::Transform;

/// A point (or vector) in document space.
pub type Point = glam::DVec2;

/// Absolute tolerance used when comparing numeric attributes.
pub const EPSILON: f64 = 1e-6;

/// Compares two numbers with an absolute tolerance.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}
