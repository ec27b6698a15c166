//! Persistence boundary for SVG documents.
//!
//! A [`DocumentStore`] keeps [`SvgRecord`]s: the serialized markup of a
//! document plus the metadata needed to list it without parsing.
//!
//! Two stores ship with the crate:
//! - [`MemoryStore`] keeps records in a map, for tests and scratch sessions.
//! - [`FolderStore`] writes one `<id>.svg` and one `<id>.kdl` manifest per
//!   document into a directory.
//!
//! # Manifest format
//!
//! ```kdl
//! document version="1" {
//!   id "5f0c6a52-5a1e-4d39-9d0e-0d7f0a3b1c2e"
//!   name "Poster"
//!   size width=800.0 height=600.0
//!   background "#ffffff"
//!   created "2026-01-01T12:00:00.000000000Z"
//!   modified "2026-01-01T12:00:00.000000000Z"
//!   content "5f0c6a52-5a1e-4d39-9d0e-0d7f0a3b1c2e.svg"
//! }
//! ```

mod error;
mod folder;
mod manifest;
mod memory;
mod record;

pub use error::StoreError;
pub use folder::FolderStore;
pub use memory::MemoryStore;
pub use record::SvgRecord;

use node::{Color, DocumentId};
use std::future::Future;

/// Manifest format version written by [`FolderStore`].
pub const MANIFEST_VERSION: &str = "1";

/// Asynchronous storage for [`SvgRecord`]s.
///
/// Saving a record with an existing id replaces it but keeps the original
/// creation time.
pub trait DocumentStore: Send + Sync {
    fn save(&self, record: SvgRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fails with [`StoreError::NotFound`] when no record has this id.
    fn load(&self, id: DocumentId) -> impl Future<Output = Result<SvgRecord, StoreError>> + Send;

    /// All records, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<SvgRecord>, StoreError>> + Send;

    /// Creates and saves a new record. Size and background fall back to the
    /// document defaults.
    fn create_svg(
        &self,
        name: String,
        svg_content: String,
        size: Option<(f64, f64)>,
        background: Option<Color>,
    ) -> impl Future<Output = Result<SvgRecord, StoreError>> + Send {
        async move {
            let mut record = SvgRecord::new(name, svg_content);
            if let Some((width, height)) = size {
                record = record.with_size(width, height);
            }
            if let Some(background) = background {
                record = record.with_background(background);
            }
            record.validate()?;
            self.save(record.clone()).await?;
            Ok(record)
        }
    }

    /// Replaces the markup of an existing record.
    fn update_svg(
        &self,
        id: DocumentId,
        svg_content: String,
    ) -> impl Future<Output = Result<SvgRecord, StoreError>> + Send {
        async move {
            let mut record = self.load(id).await?;
            record.update_svg(svg_content);
            self.save(record.clone()).await?;
            Ok(record)
        }
    }
}

/// Orders records newest first, breaking ties by id so listings are stable.
pub(crate) fn sort_newest_first(records: &mut [SvgRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.to_uuid_string().cmp(&b.id.to_uuid_string()))
    });
}
