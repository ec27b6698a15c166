use crate::{sort_newest_first, DocumentStore, StoreError, SvgRecord};
use node::DocumentId;
use smol::lock::Mutex;
use std::collections::HashMap;

/// Keeps records in memory. Cloning a record out is the only way to read it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<DocumentId, SvgRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    async fn save(&self, mut record: SvgRecord) -> Result<(), StoreError> {
        record.validate()?;
        let mut records = self.records.lock().await;
        if let Some(previous) = records.get(&record.id) {
            record.created_at = previous.created_at;
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn load(&self, id: DocumentId) -> Result<SvgRecord, StoreError> {
        self.records
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<SvgRecord>, StoreError> {
        let mut records: Vec<_> = self.records.lock().await.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }
}
