//! Cube-type catalog.

use crate::coordinator::{ConsistencyCoordinator, RenameOutcome};
use crate::document::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::{validate_cube_name, CubeName};
use std::sync::Arc;

/// CRUD over the list of cube names. Removal and rename cascade through
/// [`ConsistencyCoordinator`].
#[derive(Clone)]
pub struct CubeCatalog {
    doc: Arc<DocumentStore>,
    coordinator: ConsistencyCoordinator,
}

impl CubeCatalog {
    pub fn new(doc: Arc<DocumentStore>) -> Self {
        let coordinator = ConsistencyCoordinator::new(Arc::clone(&doc));
        Self { doc, coordinator }
    }

    /// Catalog names in insertion order.
    pub fn list(&self) -> Result<Vec<CubeName>> {
        self.doc.read(|doc| doc.cubes.clone())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        self.doc.read(|doc| doc.has_cube(name))
    }

    /// Append a cube name. Fails with [`StoreError::CubeExists`] if it is
    /// already listed.
    pub fn add(&self, name: impl Into<CubeName>) -> Result<()> {
        let name = name.into();
        validate_cube_name(&name)?;

        self.doc.with_exclusive_access(|doc| {
            if doc.has_cube(&name) {
                return Err(StoreError::CubeExists(name));
            }
            doc.cubes.push(name);
            Ok(())
        })
    }

    /// Remove a cube and every time tagged with it. Records are untouched.
    ///
    /// Returns how many times were deleted instead of a bare success flag;
    /// `Ok(0)` means the cube was removed and had no times. Fails with
    /// [`StoreError::CubeNotFound`] if the cube is not in the catalog.
    pub fn remove(&self, name: &str) -> Result<usize> {
        self.coordinator.remove_cube(name)
    }

    /// Rename a cube across catalog, times and records.
    pub fn rename(&self, old: &str, new: &str) -> Result<RenameOutcome> {
        self.coordinator.rename_cube(old, new)
    }
}
