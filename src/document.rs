//! Persistence of the times document.
//!
//! The whole document is loaded and rewritten on every mutation. Two locks
//! cover the load-mutate-persist unit:
//! - an in-process `RwLock` for threads sharing one `DocumentStore`
//! - an advisory file lock next to the document for other handles and
//!   other processes pointed at the same file
//!
//! Writers take both exclusively; readers take both shared. Because the file
//! is replaced with an atomic rename, a reader never observes a half-written
//! document either way.

use crate::error::{Result, StoreError};
use crate::fsutil::{self, FileLock};
use crate::types::Document;
use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the backing file of the times document.
pub struct DocumentStore {
    /// Path to the document.
    path: PathBuf,

    /// Sidecar file used for cross-process locking.
    lock_path: PathBuf,

    /// Whether to pretty-print the persisted JSON.
    pretty: bool,

    /// Serializes access between threads of this process.
    access: RwLock<()>,
}

impl DocumentStore {
    /// Create a handle for the document at `path`. Nothing is read yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let lock_path = fsutil::sibling(&path, "lock");
        Self {
            path,
            lock_path,
            pretty: true,
            access: RwLock::new(()),
        }
    }

    /// Toggle two-space indented output (on by default).
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document without taking any lock.
    pub fn load(&self) -> Result<Document> {
        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "times document failed to parse");
            StoreError::Corruption(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Replace the whole document under the exclusive lock.
    ///
    /// Use [`with_exclusive_access`](Self::with_exclusive_access) to change a
    /// document based on its current content; a plain replace can overwrite
    /// a concurrent mutation.
    pub fn persist(&self, doc: &Document) -> Result<()> {
        let _guard = self.access.write();
        let _file_lock = FileLock::exclusive(&self.lock_path)?;
        self.write(doc)
    }

    /// Serialize and atomically replace the document. Callers hold the
    /// exclusive lock.
    fn write(&self, doc: &Document) -> Result<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)?
        } else {
            serde_json::to_vec(doc)?
        };
        fsutil::write_atomic(&self.path, &bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "persisted times document");
        Ok(())
    }

    /// Write `defaults` if no document exists yet. Returns whether it did.
    ///
    /// The existence check runs under the exclusive lock so two first-run
    /// callers cannot both seed the file.
    pub fn initialize_if_absent(&self, defaults: &Document) -> Result<bool> {
        let _guard = self.access.write();
        let _file_lock = FileLock::exclusive(&self.lock_path)?;

        match fs::metadata(&self.path) {
            Ok(_) => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.write(defaults)?;
                info!(
                    path = %self.path.display(),
                    cubes = defaults.cubes.len(),
                    "seeded times document"
                );
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load, mutate and persist as one unit that no other exclusive access
    /// can overlap.
    ///
    /// If `f` returns an error nothing is written and the error is passed
    /// through, so a rejected mutation leaves the document as it was.
    pub fn with_exclusive_access<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let _guard = self.access.write();
        let _file_lock = FileLock::exclusive(&self.lock_path)?;

        let mut doc = self.load()?;
        let out = f(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }

    /// Run a read-only view over the current document. Readers only exclude
    /// writers, not each other.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Document) -> T,
    {
        let _guard = self.access.read();
        let _file_lock = FileLock::shared(&self.lock_path)?;

        let doc = self.load()?;
        Ok(f(&doc))
    }

    /// Snapshot of the current document under shared access.
    pub fn snapshot(&self) -> Result<Document> {
        self.read(|doc| doc.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{NewTime, TimeId};
    use serde_json::json;
    use tempfile::TempDir;

    fn seeded(dir: &TempDir) -> DocumentStore {
        let store = DocumentStore::new(dir.path().join("times.json"));
        store
            .initialize_if_absent(&Document::with_cubes(["3x3", "4x4"]))
            .unwrap();
        store
    }

    #[test]
    fn test_initialize_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        store
            .with_exclusive_access(|doc| {
                doc.cubes.push("Clock".into());
                Ok(())
            })
            .unwrap();

        let seeded_again = store
            .initialize_if_absent(&Document::with_cubes(["2x2"]))
            .unwrap();
        assert!(!seeded_again);
        assert_eq!(store.snapshot().unwrap().cubes, vec!["3x3", "4x4", "Clock"]);
    }

    #[test]
    fn test_load_missing_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("absent.json"));

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_load_garbage_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("times.json");
        fs::write(&path, b"{\"times\": [").unwrap();

        let store = DocumentStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corruption(_)));
    }

    #[test]
    fn test_load_wrong_shape_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("times.json");
        fs::write(&path, br#"{"times": {}, "records": [], "cubes": "3x3"}"#).unwrap();

        let store = DocumentStore::new(&path);
        assert_eq!(store.load().unwrap_err().kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn test_failed_mutation_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let result: Result<()> = store.with_exclusive_access(|doc| {
            doc.cubes.clear();
            Err(StoreError::InvalidPayload("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.snapshot().unwrap().cubes, vec!["3x3", "4x4"]);
    }

    #[test]
    fn test_persist_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = seeded(&dir);

        let mut doc = store.load().unwrap();
        let id = doc.allocate_time_id();
        doc.times.push(
            NewTime::for_cube("3x3")
                .with_attribute("ms", 12340)
                .with_attribute("scramble", "F2 U' R")
                .into_entry(id),
        );
        doc.records.insert("3x3".into(), json!({"best": 12.34}));
        store.persist(&doc).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.times[0].id, TimeId(1));

        store.persist(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn test_compact_output() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("times.json")).with_pretty(false);
        store.initialize_if_absent(&Document::with_cubes(["3x3"])).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(!text.contains('\n'));
    }
}
