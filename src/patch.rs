//! Injection of the resolved version into the host's core config

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid core config: {0}")]
    Json(#[from] serde_json::Error),
}

/// A host-owned record that carries a version label and a version string
pub trait VersionedConfig {
    fn label(&self) -> &str;
    fn version(&self) -> &str;
    fn set_label(&mut self, label: &str);
    fn set_version(&mut self, version: &str);
}

/// Set the label and version fields of `config`, leaving everything else untouched.
///
/// An empty `version` is accepted and means "version unknown".
pub fn apply<C: VersionedConfig + ?Sized>(config: &mut C, label: &str, version: &str) {
    config.set_label(label);
    config.set_version(version);
}

/// The server's core config. Unknown fields are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    /// Label field shown next to the version
    #[serde(default)]
    pub aki_version: String,
    /// Field that receives the game version
    #[serde(default)]
    pub project_name: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl CoreConfig {
    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the config back through a sibling temp file and rename
    pub fn save(&self, path: &Path) -> Result<(), PatchError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, self)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        debug!("Core config written to {:?}", path);
        Ok(())
    }
}

impl VersionedConfig for CoreConfig {
    fn label(&self) -> &str {
        &self.aki_version
    }

    fn version(&self) -> &str {
        &self.project_name
    }

    fn set_label(&mut self, label: &str) {
        self.aki_version = label.to_string();
    }

    fn set_version(&mut self, version: &str) {
        self.project_name = version.to_string();
    }
}
