//! Best-time records, one opaque value per cube name.

use crate::document::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::{json_type_name, RecordMap, RecordValue};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct RecordsLedger {
    doc: Arc<DocumentStore>,
}

impl RecordsLedger {
    pub fn new(doc: Arc<DocumentStore>) -> Self {
        Self { doc }
    }

    pub fn get_all(&self) -> Result<RecordMap> {
        self.doc.read(|doc| doc.records.clone())
    }

    pub fn get(&self, cube: &str) -> Result<Option<RecordValue>> {
        self.doc.read(|doc| doc.records.get(cube).cloned())
    }

    /// Replace the whole mapping. Keys are not checked against the catalog.
    pub fn replace_all(&self, records: RecordMap) -> Result<()> {
        self.doc.with_exclusive_access(|doc| {
            doc.records = records;
            Ok(())
        })
    }

    /// Replace the whole mapping from an untyped request body, which must be
    /// a JSON object.
    pub fn replace_all_json(&self, payload: Value) -> Result<()> {
        match payload {
            Value::Object(records) => self.replace_all(records),
            other => Err(StoreError::InvalidPayload(format!(
                "records payload must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.doc.with_exclusive_access(|doc| {
            doc.records.clear();
            Ok(())
        })
    }
}
