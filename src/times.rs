//! Solve-time collection.

use crate::document::DocumentStore;
use crate::error::Result;
use crate::types::{CubeName, NewTime, TimeEntry, TimeId};
use std::sync::Arc;

/// CRUD over the ordered list of solve times.
#[derive(Clone)]
pub struct TimesRepository {
    doc: Arc<DocumentStore>,
}

impl TimesRepository {
    pub fn new(doc: Arc<DocumentStore>) -> Self {
        Self { doc }
    }

    /// All times in insertion order.
    pub fn list_all(&self) -> Result<Vec<TimeEntry>> {
        self.doc.read(|doc| doc.times.clone())
    }

    /// Get a time by id.
    pub fn get(&self, id: TimeId) -> Result<Option<TimeEntry>> {
        self.doc
            .read(|doc| doc.times.iter().find(|t| t.id == id).cloned())
    }

    /// Times tagged with the given cube, in insertion order.
    pub fn list_for_cube(&self, cube: &str) -> Result<Vec<TimeEntry>> {
        self.doc.read(|doc| {
            doc.times
                .iter()
                .filter(|t| t.is_cube(cube))
                .cloned()
                .collect()
        })
    }

    /// Append a time and return it as stored.
    ///
    /// The id is one past the highest id this document has ever assigned;
    /// the timestamp defaults to now. The cube is not checked against the
    /// catalog. Attributes named `id`, `cube` or `timestamp` are rejected
    /// with [`StoreError::InvalidPayload`](crate::StoreError::InvalidPayload).
    pub fn add(&self, input: NewTime) -> Result<TimeEntry> {
        input.validate()?;
        self.doc.with_exclusive_access(|doc| {
            let id = doc.allocate_time_id();
            let entry = input.into_entry(id);
            doc.times.push(entry.clone());
            Ok(entry)
        })
    }

    /// Remove a time. Returns whether an entry was removed; a missing id is
    /// not an error.
    pub fn delete(&self, id: TimeId) -> Result<bool> {
        self.doc.with_exclusive_access(|doc| {
            let before = doc.times.len();
            doc.times.retain(|t| t.id != id);
            Ok(doc.times.len() != before)
        })
    }

    /// Retag a time with another cube (or none). Returns whether the id was
    /// found. The new cube is not checked against the catalog.
    pub fn update_type(&self, id: TimeId, cube: Option<CubeName>) -> Result<bool> {
        self.doc.with_exclusive_access(|doc| {
            match doc.times.iter_mut().find(|t| t.id == id) {
                Some(entry) => {
                    entry.cube = cube;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    /// Drop every time. Catalog and records are left alone.
    pub fn clear_all(&self) -> Result<()> {
        self.doc.with_exclusive_access(|doc| {
            doc.times.clear();
            Ok(())
        })
    }
}
