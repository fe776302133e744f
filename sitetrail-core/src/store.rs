// Record set persistence

use crate::config::{Settings, StoreKind};
use crate::data::Database;
use crate::error::{Result, StoreError};
use crate::graph::find_seed;
use crate::identity::{CacheKey, normalize_identity};
use sitetrail_scanner::record::{CrawlRecord, RecordSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where record sets live between runs, keyed by [`CacheKey`].
pub trait RecordStore {
    /// `Ok(None)` when nothing is stored for `key`.
    fn load(&self, key: &CacheKey) -> Result<Option<RecordSet>>;

    /// Store `records` under `key`, replacing any previous set.
    fn save(&self, key: &CacheKey, identity: &str, records: &RecordSet) -> Result<()>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&self, key: &CacheKey) -> Result<()>;

    /// Normalized seed identities of every stored set, sorted.
    fn list_known_identities(&self) -> Result<Vec<String>>;
}

/// One pretty-printed JSON array per seed: `<dir>/crawled_data_<hex>.json`.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn stored_keys(&self) -> Result<Vec<CacheKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(key) = entry.file_name().to_str().and_then(CacheKey::from_file_name) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

impl RecordStore for JsonStore {
    fn load(&self, key: &CacheKey) -> Result<Option<RecordSet>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        // Only a non-array file is corrupt; bad entries are dropped one by one
        let mut records = RecordSet::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<CrawlRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed record {} in {}: {}", idx, path.display(), e),
            }
        }

        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Some(records))
    }

    fn save(&self, key: &CacheKey, identity: &str, records: &RecordSet) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(records)?;

        // The target is only ever replaced whole, by rename
        let tmp = self.dir.join(format!(".{}.tmp", key.file_name()));
        if let Err(e) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!(
            "Saved {} records for {} to {}",
            records.len(),
            identity,
            path.display()
        );
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// File names only carry the hash, so each set's identity is recovered
    /// from its seed record. Unreadable files are skipped.
    fn list_known_identities(&self) -> Result<Vec<String>> {
        let mut identities = Vec::new();
        for key in self.stored_keys()? {
            match self.load(&key) {
                Ok(Some(records)) => match find_seed(&records) {
                    Some(seed) => identities.push(normalize_identity(seed)),
                    None => warn!("No seed record in {}", self.path_for(&key).display()),
                },
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", key.file_name(), e),
            }
        }
        identities.sort();
        identities.dedup();
        Ok(identities)
    }
}

/// The store selected by [`Settings::store`].
pub enum StoreBackend {
    Json(JsonStore),
    Sqlite(Database),
}

impl StoreBackend {
    /// Open the configured store under the data directory, creating it if
    /// missing.
    pub fn open(settings: &Settings) -> Result<Self> {
        match settings.store {
            StoreKind::Json => Ok(StoreBackend::Json(JsonStore::open(&settings.json_store_dir())?)),
            StoreKind::Sqlite => {
                fs::create_dir_all(settings.data_dir())?;
                Ok(StoreBackend::Sqlite(Database::new(&settings.database_path())?))
            }
        }
    }
}

impl RecordStore for StoreBackend {
    fn load(&self, key: &CacheKey) -> Result<Option<RecordSet>> {
        match self {
            StoreBackend::Json(store) => store.load(key),
            StoreBackend::Sqlite(db) => db.load(key),
        }
    }

    fn save(&self, key: &CacheKey, identity: &str, records: &RecordSet) -> Result<()> {
        match self {
            StoreBackend::Json(store) => store.save(key, identity, records),
            StoreBackend::Sqlite(db) => db.save(key, identity, records),
        }
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        match self {
            StoreBackend::Json(store) => store.remove(key),
            StoreBackend::Sqlite(db) => db.remove(key),
        }
    }

    fn list_known_identities(&self) -> Result<Vec<String>> {
        match self {
            StoreBackend::Json(store) => store.list_known_identities(),
            StoreBackend::Sqlite(db) => db.list_known_identities(),
        }
    }
}
