use crate::error::positive;
use crate::{Color, DocumentId, Element, ElementId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A complete SVG document: canvas size, background and the root elements
/// in z-order.
///
/// This is the immutable snapshot that crosses the persistence boundary.
/// The live, editable tree is the scene graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub background: Color,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Document {
    pub const DEFAULT_WIDTH: f64 = 800.0;
    pub const DEFAULT_HEIGHT: f64 = 600.0;
    pub const DEFAULT_BACKGROUND: Color = Color::WHITE;
    pub const DEFAULT_NAME: &'static str = "Untitled";

    /// Creates an empty document, rejecting non-positive dimensions.
    pub fn new(
        name: impl Into<String>,
        width: f64,
        height: f64,
        background: Color,
    ) -> Result<Self, ValidationError> {
        validate_dimensions(width, height)?;
        Ok(Self {
            id: DocumentId::new(),
            name: name.into(),
            width,
            height,
            background,
            elements: Vec::new(),
        })
    }

    /// An empty 800 × 600 document with a white background.
    pub fn blank() -> Self {
        Self {
            id: DocumentId::new(),
            name: Self::DEFAULT_NAME.to_string(),
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            background: Self::DEFAULT_BACKGROUND,
            elements: Vec::new(),
        }
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    /// Every element in pre-order, descending into groups.
    pub fn walk(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter().flat_map(|element| element.walk())
    }

    pub fn element_count(&self) -> usize {
        self.walk().count()
    }

    /// The largest element id in use, for seeding an id generator.
    pub fn max_element_id(&self) -> Option<ElementId> {
        self.walk().map(|element| element.id).max()
    }

    /// Checks dimensions, every element, and id uniqueness across the tree.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dimensions(self.width, self.height)?;
        let mut seen = HashSet::new();
        for element in &self.elements {
            element.validate()?;
        }
        for element in self.walk() {
            if !seen.insert(element.id) {
                return Err(ValidationError::DuplicateId(element.id));
            }
        }
        Ok(())
    }

    /// Compares documents structurally with a numeric tolerance. The
    /// document id is not compared.
    pub fn approx_eq(&self, other: &Document, tolerance: f64) -> bool {
        self.name == other.name
            && (self.width - other.width).abs() < tolerance
            && (self.height - other.height).abs() < tolerance
            && self.background == other.background
            && self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::blank()
    }
}

pub fn validate_dimensions(width: f64, height: f64) -> Result<(), ValidationError> {
    positive("width", width)?;
    positive("height", height)
}
