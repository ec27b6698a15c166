use crate::StoreError;
use chrono::{DateTime, Utc};
use node::{validate_dimensions, Color, Document, DocumentId};
use serde::{Deserialize, Serialize};

/// A stored document: its markup plus listing metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SvgRecord {
    pub id: DocumentId,
    pub name: String,
    pub svg_content: String,
    pub width: f64,
    pub height: f64,
    pub background_color: Color,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl SvgRecord {
    /// A fresh record with a new id and the default size and background.
    pub fn new(name: impl Into<String>, svg_content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            name: name.into(),
            svg_content: svg_content.into(),
            width: Document::DEFAULT_WIDTH,
            height: Document::DEFAULT_HEIGHT,
            background_color: Document::DEFAULT_BACKGROUND,
            created_at: now,
            modified_at: now,
        }
    }

    /// A record describing `document`, keeping its id.
    pub fn for_document(document: &Document, svg_content: impl Into<String>) -> Self {
        Self {
            id: document.id,
            name: document.name.clone(),
            width: document.width,
            height: document.height,
            background_color: document.background,
            ..Self::new(document.name.clone(), svg_content)
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background_color = background;
        self
    }

    /// Replaces the markup and bumps `modified_at`.
    pub fn update_svg(&mut self, svg_content: impl Into<String>) {
        self.svg_content = svg_content.into();
        self.modified_at = Utc::now().max(self.created_at);
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::MissingName);
        }
        validate_dimensions(self.width, self.height)?;
        Ok(())
    }
}
