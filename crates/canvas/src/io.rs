//! Save and load jobs.
//!
//! The editor hands out a job from `begin_save`/`begin_load`, the caller runs
//! it against a [`DocumentStore`] on whatever executor it likes, and feeds the
//! outcome back through `finish_save`/`finish_load`. Jobs own their data and
//! are `Send`.

use crate::EditorError;
use interchange::{from_markup, to_markup, ParseWarning, Parsed};
use log::debug;
use node::{Document, DocumentId};
use project::{DocumentStore, SvgRecord};

/// A snapshot of the document waiting to be written.
#[derive(Clone, Debug)]
pub struct SaveJob {
    document: Document,
}

impl SaveJob {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serializes the snapshot and stores it.
    pub async fn run<S: DocumentStore>(self, store: &S) -> Result<SvgRecord, EditorError> {
        let markup = to_markup(&self.document)?;
        let record = SvgRecord::for_document(&self.document, markup);
        debug!("saving {} ({} bytes)", record.id, record.svg_content.len());
        store.save(record.clone()).await?;
        Ok(record)
    }
}

#[derive(Clone, Debug)]
pub struct LoadJob {
    id: DocumentId,
}

/// A document read back from a store.
#[derive(Clone, Debug)]
pub struct Loaded {
    pub document: Document,
    /// Parts of the stored markup that were dropped or replaced.
    pub warnings: Vec<ParseWarning>,
}

impl LoadJob {
    pub(crate) fn new(id: DocumentId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Fetches the record and parses its markup. The record's id and name
    /// win over whatever the markup says.
    pub async fn run<S: DocumentStore>(self, store: &S) -> Result<Loaded, EditorError> {
        let record = store.load(self.id).await?;
        let Parsed { mut document, warnings } = from_markup(&record.svg_content)?;
        document.id = record.id;
        document.name = record.name;
        debug!("loaded {} with {} warnings", self.id, warnings.len());
        Ok(Loaded { document, warnings })
    }
}
