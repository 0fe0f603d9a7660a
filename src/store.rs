//! Main Store struct tying all components together.

use crate::catalog::CubeCatalog;
use crate::document::DocumentStore;
use crate::error::Result;
use crate::ledger::RecordsLedger;
use crate::settings::SettingsStore;
use crate::times::TimesRepository;
use crate::types::{CubeName, Document};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// File name of the times document inside the data directory.
pub const TIMES_FILE: &str = "times.json";

/// File name of the settings document inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Catalog a fresh store starts with.
pub const DEFAULT_CUBES: &[&str] = &[
    "2x2", "3x3", "4x4", "5x5", "Pyraminx", "Megaminx", "Skewb", "Square-1", "Clock",
];

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Data directory holding the times and settings documents.
    pub path: PathBuf,

    /// Whether to create the directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Catalog written when the times document is first created.
    pub default_cubes: Vec<CubeName>,

    /// Indent persisted JSON.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
            create_if_missing: true,
            default_cubes: DEFAULT_CUBES.iter().map(|c| c.to_string()).collect(),
            pretty: true,
        }
    }
}

/// The cube store.
///
/// Hands out the repositories over one shared times document:
/// - [`TimesRepository`] for solve times
/// - [`CubeCatalog`] for cube names, with cascading rename/remove
/// - [`RecordsLedger`] for best-time records
///
/// Handles are cheap to clone and safe to use from many threads. Several
/// `Store`s (or processes) opened on the same directory also serialize their
/// writes through the document's lock file.
pub struct Store {
    /// Store configuration.
    config: StoreConfig,

    /// Times document shared by every repository.
    doc: Arc<DocumentStore>,

    times: TimesRepository,

    /// Also the only way to reach the rename/remove cascades.
    cubes: CubeCatalog,

    records: RecordsLedger,

    settings: SettingsStore,
}

impl Store {
    /// Open an existing store or create a new one.
    pub fn open_or_create(config: StoreConfig) -> Result<Self> {
        if config.path.exists() {
            Self::open(config)
        } else if config.create_if_missing {
            Self::create(config)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("data directory {} does not exist", config.path.display()),
            )
            .into())
        }
    }

    /// Create the data directory and open the store in it.
    pub fn create(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.path)?;
        Self::open(config)
    }

    /// Open a store in an existing directory, seeding any missing document.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let doc = Arc::new(
            DocumentStore::new(config.path.join(TIMES_FILE)).with_pretty(config.pretty),
        );
        doc.initialize_if_absent(&Document::with_cubes(config.default_cubes.iter().cloned()))?;

        let settings =
            SettingsStore::new(config.path.join(SETTINGS_FILE)).with_pretty(config.pretty);
        settings.initialize_if_absent()?;

        Ok(Self {
            times: TimesRepository::new(Arc::clone(&doc)),
            cubes: CubeCatalog::new(Arc::clone(&doc)),
            records: RecordsLedger::new(Arc::clone(&doc)),
            settings,
            doc,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn times(&self) -> &TimesRepository {
        &self.times
    }

    pub fn cubes(&self) -> &CubeCatalog {
        &self.cubes
    }

    pub fn records(&self) -> &RecordsLedger {
        &self.records
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// The backing times document, for callers that need their own
    /// exclusive-access unit.
    pub fn document(&self) -> &Arc<DocumentStore> {
        &self.doc
    }

    /// Consistent copy of all three collections.
    pub fn snapshot(&self) -> Result<Document> {
        self.doc.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> StoreConfig {
        StoreConfig {
            path: dir.path().join("data"),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_seeds_defaults() {
        let dir = TempDir::new().unwrap();
        let store = Store::open_or_create(test_config(&dir)).unwrap();

        assert_eq!(store.cubes().list().unwrap(), DEFAULT_CUBES.to_vec());
        assert!(store.times().list_all().unwrap().is_empty());
        assert!(store.records().get_all().unwrap().is_empty());
        assert!(dir.path().join("data").join(TIMES_FILE).exists());
        assert!(dir.path().join("data").join(SETTINGS_FILE).exists());
    }

    #[test]
    fn test_missing_dir_without_create() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            create_if_missing: false,
            ..test_config(&dir)
        };

        let err = Store::open_or_create(config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        {
            let store = Store::open_or_create(test_config(&dir)).unwrap();
            store.cubes().add("Gear Cube").unwrap();
        }

        let config = StoreConfig {
            default_cubes: vec!["ignored".into()],
            ..test_config(&dir)
        };
        let store = Store::open_or_create(config).unwrap();
        let cubes = store.cubes().list().unwrap();
        assert_eq!(cubes.last().map(String::as_str), Some("Gear Cube"));
        assert!(!cubes.contains(&"ignored".to_string()));
    }

    #[test]
    fn test_custom_default_cubes() {
        let dir = TempDir::new().unwrap();
        let store = Store::open_or_create(StoreConfig {
            default_cubes: vec!["3x3".into(), "OH".into()],
            ..test_config(&dir)
        })
        .unwrap();

        assert_eq!(store.cubes().list().unwrap(), vec!["3x3", "OH"]);
    }
}
