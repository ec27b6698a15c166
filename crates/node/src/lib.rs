//! Element and document model for the SVG builder.
//!
//! Elements form a tree: groups own an ordered list of children, and an
//! element's position in that list is its z-order (later draws on top).
//! Everything here is plain data; the scene graph owns the live tree.

mod document;
mod element;
mod element_id;
mod error;
pub mod path;
mod style;

pub use document::{validate_dimensions, Document};
pub use element::{Element, ElementKind, ElementTag};
pub use element_id::{DocumentId, ElementId, IdGenerator};
pub use error::ValidationError;
pub use path::{PathData, PathSegment};
pub use style::Style;

/// Re-exported geometry so downstream crates need a single import path.
pub use svg_core::{Bounds, Color, Point, Transform};
