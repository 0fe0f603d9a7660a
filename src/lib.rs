//! # Cube Store
//!
//! Persistent store behind a speedcubing timer: solve times, best-time
//! records per cube type, and the catalog of cube types, all kept in one
//! JSON document.
//!
//! ## Core Concepts
//!
//! - **Times**: Ordered solve attempts with store-assigned ids and an open attribute bag
//! - **Catalog**: Unique cube-type names; rename and remove cascade to times
//! - **Records**: One opaque value per cube name, replaced wholesale by the caller
//! - **Exclusive access**: Every mutation is a locked load-mutate-persist unit
//!   with an atomic file replace
//!
//! ## Example
//!
//! ```ignore
//! use cubestore::{NewTime, Store, StoreConfig};
//!
//! let store = Store::open_or_create(StoreConfig {
//!     path: "./data".into(),
//!     ..Default::default()
//! })?;
//!
//! let time = store.times().add(NewTime::for_cube("3x3").with_attribute("ms", 9870))?;
//! store.cubes().rename("3x3", "3x3x3")?;
//! ```

pub mod catalog;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod fsutil;
pub mod ledger;
pub mod settings;
pub mod store;
pub mod times;
pub mod types;

// Re-exports
pub use catalog::CubeCatalog;
pub use coordinator::{ConsistencyCoordinator, RenameOutcome};
pub use document::DocumentStore;
pub use error::{ErrorKind, Result, StoreError};
pub use ledger::RecordsLedger;
pub use settings::{default_settings, SettingsStore};
pub use store::{Store, StoreConfig, DEFAULT_CUBES, SETTINGS_FILE, TIMES_FILE};
pub use times::TimesRepository;
pub use types::*;
