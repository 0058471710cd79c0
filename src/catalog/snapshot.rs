//! # File-Backed Item Repository
//!
//! Keeps items in memory and rewrites a JSON snapshot after every successful
//! mutation. Each write goes to a sibling temp file which is fsynced and then
//! renamed over the snapshot, so a crash leaves either the old or the new
//! snapshot on disk, never a torn one.
//!
//! A failed snapshot write restores the in-memory tables to their state
//! before the mutation and reports `Backend`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::errors::{RepositoryError, RepositoryResult};
use super::item::{ItemKind, MarketingItem};
use super::repository::{InMemoryItemRepository, ItemFilter, ItemRepository, Tables};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    tables: Tables,
}

/// JSON snapshot item repository
#[derive(Debug)]
pub struct FileItemRepository {
    path: PathBuf,
    inner: InMemoryItemRepository,
    /// Serializes mutate-then-persist sequences
    write_guard: Mutex<()>,
}

fn backend(context: &str, path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Backend(format!("{}: {}: {}", context, path.display(), err))
}

impl FileItemRepository {
    /// Open the snapshot at `path`, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| backend("Failed to create data directory", parent, e))?;
            }
        }

        let tables = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| backend("Failed to read snapshot", &path, e))?;
            let snapshot: SnapshotFile = serde_json::from_str(&raw)
                .map_err(|e| backend("Corrupt snapshot", &path, e))?;
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(backend(
                    "Unsupported snapshot version",
                    &path,
                    snapshot.version,
                ));
            }
            snapshot.tables
        } else {
            Tables::new()
        };

        Ok(Self {
            path,
            inner: InMemoryItemRepository::from_tables(tables),
            write_guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> RepositoryResult<()> {
        let snapshot = SnapshotFile {
            version: SNAPSHOT_VERSION,
            tables: self.inner.tables()?,
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| backend("Failed to encode snapshot", &self.path, e))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file =
            File::create(&tmp).map_err(|e| backend("Failed to create temp snapshot", &tmp, e))?;
        file.write_all(&json)
            .map_err(|e| backend("Failed to write temp snapshot", &tmp, e))?;
        file.sync_all()
            .map_err(|e| backend("Failed to fsync temp snapshot", &tmp, e))?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .map_err(|e| backend("Failed to replace snapshot", &self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            // Directory fsync is not supported everywhere
            if let Ok(dir) = OpenOptions::new().read(true).open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    /// Apply `op` and persist; on a failed persist, put the tables back
    fn mutate<T>(
        &self,
        op: impl FnOnce(&InMemoryItemRepository) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| RepositoryError::Backend("Lock poisoned".to_string()))?;

        let before = self.inner.tables()?;
        let out = op(&self.inner)?;

        if let Err(err) = self.persist() {
            self.inner.replace_tables(before)?;
            return Err(err);
        }
        Ok(out)
    }
}

impl ItemRepository for FileItemRepository {
    fn get(&self, kind: ItemKind, id: u64) -> RepositoryResult<Option<MarketingItem>> {
        self.inner.get(kind, id)
    }

    fn list(&self, kind: ItemKind, filter: &ItemFilter) -> RepositoryResult<Vec<MarketingItem>> {
        self.inner.list(kind, filter)
    }

    fn insert(&self, kind: ItemKind, item: MarketingItem) -> RepositoryResult<MarketingItem> {
        self.mutate(|repo| repo.insert(kind, item))
    }

    fn update(&self, kind: ItemKind, current: &MarketingItem, item: &MarketingItem) -> RepositoryResult<()> {
        self.mutate(|repo| repo.update(kind, current, item))
    }

    fn delete(&self, kind: ItemKind, id: u64) -> RepositoryResult<()> {
        self.mutate(|repo| repo.delete(kind, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::tests::sample;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("items.json");

        {
            let repo = FileItemRepository::open(&path).unwrap();
            repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();
            let b = repo.insert(ItemKind::Brochure, sample("A-002", "b")).unwrap();
            repo.insert(ItemKind::Service, sample("S-001", "s")).unwrap();
            repo.delete(ItemKind::Brochure, b.id).unwrap();
        }

        let repo = FileItemRepository::open(&path).unwrap();
        let brochures = repo.list(ItemKind::Brochure, &ItemFilter::all()).unwrap();
        assert_eq!(brochures.len(), 1);
        assert_eq!(brochures[0].code, "A-001");
        assert_eq!(repo.list(ItemKind::Service, &ItemFilter::all()).unwrap().len(), 1);

        // The id sequence is persisted too; deleted ids are not reused
        let c = repo.insert(ItemKind::Brochure, sample("A-003", "c")).unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let repo = FileItemRepository::open(data_dir.join("items.json")).unwrap();
        repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();

        fs::remove_dir_all(&data_dir).unwrap();

        let err = repo
            .insert(ItemKind::Brochure, sample("A-002", "b"))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));
        assert_eq!(repo.list(ItemKind::Brochure, &ItemFilter::all()).unwrap().len(), 1);
        assert_eq!(repo.get(ItemKind::Brochure, 2).unwrap(), None);
    }

    #[test]
    fn test_conflict_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        let repo = FileItemRepository::open(&path).unwrap();
        repo.insert(ItemKind::Brochure, sample("A-001", "a")).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(repo.insert(ItemKind::Brochure, sample("A-001", "z")).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_corrupt_snapshot_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileItemRepository::open(&path),
            Err(RepositoryError::Backend(_))
        ));
    }
}
