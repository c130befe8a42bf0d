use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::version::error::CacheError;

const OFFLINE_GAME_VERSION_KEY: &str = "OfflineGameVersion";

/// Last-known-good versions persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct VersionRecord {
    /// Last successfully resolved game version, used as the offline fallback
    pub offline_game_version: String,
    /// Version of the locally installed add-on. Never written by this crate.
    pub mod_version: String,
}

/// Trait for reading and updating the persisted version record
#[cfg_attr(test, automock)]
pub trait VersionStorer: Send + Sync {
    /// Current record
    fn record(&self) -> Result<VersionRecord, CacheError>;

    /// Replace the offline game version and persist the record
    fn update_game_version(&self, version: &str) -> Result<(), CacheError>;
}

/// JSON-file backed version record
pub struct VersionCache {
    path: PathBuf,
    record: Mutex<VersionRecord>,
}

impl VersionCache {
    /// Load the record at `path`.
    ///
    /// A missing or unreadable file yields an empty seed record instead of an error.
    pub fn load(path: &Path) -> Self {
        info!("Loading version record from {:?}", path);

        let record = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Version record {:?} is corrupt, using seed: {}", path, e);
                VersionRecord::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No version record at {:?}, using seed", path);
                VersionRecord::default()
            }
            Err(e) => {
                warn!("Failed to read version record {:?}, using seed: {}", path, e);
                VersionRecord::default()
            }
        };

        Self {
            path: path.to_path_buf(),
            record: Mutex::new(record),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire record lock with proper error handling
    fn lock_record(&self) -> Result<MutexGuard<'_, VersionRecord>, CacheError> {
        self.record.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Set `OfflineGameVersion` in the file on disk, keeping every other key as found
    ///
    /// The file is re-read so values written by other tools since `load` survive.
    /// The result goes to a sibling temp file that is renamed over the target.
    fn persist_game_version(&self, version: &str) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut on_disk = match fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
        {
            Some(Value::Object(map)) => map,
            _ => match serde_json::to_value(VersionRecord::default())? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        };
        on_disk.insert(
            OFFLINE_GAME_VERSION_KEY.to_string(),
            Value::String(version.to_string()),
        );

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, &on_disk)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Version record written to {:?}", self.path);
        Ok(())
    }
}

impl VersionStorer for VersionCache {
    fn record(&self) -> Result<VersionRecord, CacheError> {
        Ok(self.lock_record()?.clone())
    }

    fn update_game_version(&self, version: &str) -> Result<(), CacheError> {
        let mut record = self.lock_record()?;
        record.offline_game_version = version.to_string();
        self.persist_game_version(version)
    }
}
