//! Cross-collection cascades.
//!
//! Renaming or removing a cube touches the catalog, the times that reference
//! it, and (for rename) the records keyed by it. Each cascade runs inside a
//! single exclusive access so no other mutation can interleave with it.

use crate::document::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::{validate_cube_name, Document, RecordMap};
use std::sync::Arc;
use tracing::debug;

/// What a rename touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Catalog entries rewritten (0 if the old name was not in the catalog).
    pub catalog_entries: usize,
    /// Times retagged.
    pub times: usize,
    /// Whether a record moved to the new name.
    pub record_moved: bool,
}

/// Runs the cascades that keep the three collections consistent.
#[derive(Clone)]
pub struct ConsistencyCoordinator {
    doc: Arc<DocumentStore>,
}

impl ConsistencyCoordinator {
    pub fn new(doc: Arc<DocumentStore>) -> Self {
        Self { doc }
    }

    /// Remove a cube from the catalog together with every time tagged with
    /// it.
    ///
    /// Returns the number of times removed rather than a plain success flag;
    /// `Ok(0)` still means the cube was removed. A name missing from the
    /// catalog is [`StoreError::CubeNotFound`]. A record under the removed
    /// name stays where it is.
    pub fn remove_cube(&self, name: &str) -> Result<usize> {
        let removed = self
            .doc
            .with_exclusive_access(|doc| remove_cube_in(doc, name))?;
        debug!(cube = name, times = removed, "removed cube");
        Ok(removed)
    }

    /// Rename a cube everywhere it is referenced.
    ///
    /// Missing `old` in the catalog is not an error; times and records are
    /// still rewritten. If `new` is already in the catalog the catalog ends up
    /// holding it twice. If both names have a record, the one from `old`
    /// survives under `new`. Renaming a cube to itself changes nothing.
    pub fn rename_cube(&self, old: &str, new: &str) -> Result<RenameOutcome> {
        validate_cube_name(new)?;
        let outcome = self
            .doc
            .with_exclusive_access(|doc| Ok(rename_cube_in(doc, old, new)))?;
        debug!(from = old, to = new, ?outcome, "renamed cube");
        Ok(outcome)
    }
}

pub(crate) fn remove_cube_in(doc: &mut Document, name: &str) -> Result<usize> {
    let position = doc
        .cubes
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| StoreError::CubeNotFound(name.to_string()))?;
    doc.cubes.remove(position);

    let before = doc.times.len();
    doc.times.retain(|t| !t.is_cube(name));
    Ok(before - doc.times.len())
}

pub(crate) fn rename_cube_in(doc: &mut Document, old: &str, new: &str) -> RenameOutcome {
    let mut outcome = RenameOutcome::default();

    for cube in doc.cubes.iter_mut().filter(|c| c.as_str() == old) {
        *cube = new.to_string();
        outcome.catalog_entries += 1;
    }

    for entry in doc.times.iter_mut().filter(|t| t.is_cube(old)) {
        entry.cube = Some(new.to_string());
        outcome.times += 1;
    }

    outcome.record_moved = doc.records.contains_key(old);
    doc.records = rekey_records(std::mem::take(&mut doc.records), old, new);

    outcome
}

/// Move the record under `old` to `new`.
///
/// A record already under `new` is dropped even when `old` has none.
fn rekey_records(records: RecordMap, old: &str, new: &str) -> RecordMap {
    let mut out = RecordMap::new();
    for (cube, value) in records {
        if cube == old {
            out.insert(new.to_string(), value);
        } else if cube != new {
            out.insert(cube, value);
        }
    }
    out
}
