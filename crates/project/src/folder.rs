use crate::manifest::Manifest;
use crate::{sort_newest_first, DocumentStore, StoreError, SvgRecord};
use log::{info, warn};
use node::DocumentId;
use smol::fs;
use smol::stream::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MANIFEST_EXTENSION: &str = "kdl";

/// Stores each record as `<id>.svg` plus a `<id>.kdl` manifest in one
/// directory, created on first save.
#[derive(Clone, Debug)]
pub struct FolderStore {
    root: PathBuf,
}

impl FolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self, id: DocumentId) -> PathBuf {
        self.root.join(format!("{}.{}", id, MANIFEST_EXTENSION))
    }

    async fn read_manifest(&self, path: &Path) -> Result<Manifest, StoreError> {
        let text = fs::read_to_string(path).await?;
        Manifest::from_kdl(&text).map_err(|message| StoreError::Manifest {
            path: path.to_path_buf(),
            message,
        })
    }

    async fn read_record(&self, manifest: Manifest) -> Result<SvgRecord, StoreError> {
        let content = fs::read_to_string(self.root.join(&manifest.content)).await?;
        Ok(manifest.into_record(content))
    }
}

impl DocumentStore for FolderStore {
    async fn save(&self, mut record: SvgRecord) -> Result<(), StoreError> {
        record.validate()?;
        fs::create_dir_all(&self.root).await?;

        let manifest_path = self.manifest_path(record.id);
        match self.read_manifest(&manifest_path).await {
            Ok(previous) => record.created_at = previous.created_at,
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("overwriting unreadable manifest: {}", err),
        }

        // Markup first: a manifest only ever points at content that exists.
        let content = format!("{}.svg", record.id);
        fs::write(self.root.join(&content), &record.svg_content).await?;
        let manifest = Manifest::for_record(&record, content);
        fs::write(&manifest_path, manifest.to_kdl()).await?;

        info!("saved {} ({}) to {}", record.name, record.id, self.root.display());
        Ok(())
    }

    async fn load(&self, id: DocumentId) -> Result<SvgRecord, StoreError> {
        let manifest = match self.read_manifest(&self.manifest_path(id)).await {
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id)),
            other => other?,
        };
        let record = self.read_record(manifest).await?;
        info!("loaded {} ({}) from {}", record.name, record.id, self.root.display());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<SvgRecord>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next().await {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != MANIFEST_EXTENSION) {
                continue;
            }
            let manifest = self.read_manifest(&path).await?;
            records.push(self.read_record(manifest).await?);
        }
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use node::Color;

    #[test]
    fn test_save_writes_markup_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path().join("drawings"));
        let record = SvgRecord::new("Logo", "<svg/>").with_background(Color::BLACK);

        smol::block_on(async {
            store.save(record.clone()).await.unwrap();
            let svg = dir.path().join("drawings").join(format!("{}.svg", record.id));
            let kdl = dir.path().join("drawings").join(format!("{}.kdl", record.id));
            assert_eq!(std::fs::read_to_string(svg).unwrap(), "<svg/>");
            assert!(std::fs::read_to_string(kdl).unwrap().contains("Logo"));

            assert_eq!(store.load(record.id).await.unwrap(), record);
        });
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path());
        let id = DocumentId::new();
        smol::block_on(async {
            assert!(matches!(store.load(id).await, Err(StoreError::NotFound(missing)) if missing == id));
        });
    }

    #[test]
    fn test_list_newest_first_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path());
        std::fs::write(dir.path().join("notes.txt"), "not a drawing").unwrap();

        smol::block_on(async {
            let now = Utc::now();
            for (name, age) in [("old", 20), ("new", 10)] {
                let mut record = SvgRecord::new(name, "<svg/>");
                record.created_at = now - Duration::seconds(age);
                store.save(record).await.unwrap();
            }
            let names: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.name).collect();
            assert_eq!(names, vec!["new", "old"]);
        });
    }

    #[test]
    fn test_list_of_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path().join("nowhere"));
        assert!(smol::block_on(store.list()).unwrap().is_empty());
    }

    #[test]
    fn test_resave_keeps_creation_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path());
        smol::block_on(async {
            let created = store.create_svg("Badge".into(), "<svg/>".into(), None, None).await.unwrap();
            let mut replacement = SvgRecord::new("Badge v2", "<svg></svg>");
            replacement.id = created.id;
            store.save(replacement).await.unwrap();

            let loaded = store.load(created.id).await.unwrap();
            assert_eq!(loaded.name, "Badge v2");
            assert_eq!(loaded.created_at, created.created_at);
            assert_eq!(store.list().await.unwrap().len(), 1);
        });
    }

    #[test]
    fn test_corrupt_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path());
        let id = DocumentId::new();
        std::fs::write(dir.path().join(format!("{}.kdl", id)), "document {").unwrap();
        smol::block_on(async {
            assert!(matches!(store.load(id).await, Err(StoreError::Manifest { .. })));
        });
    }
}
