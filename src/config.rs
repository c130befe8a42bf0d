use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::version::source::VersionSource;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for the DNS reachability check in milliseconds (3 seconds)
pub const DNS_TIMEOUT_MS: u64 = 3_000;

/// Timeout for the HEAD reachability check in milliseconds (5 seconds)
pub const HTTP_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Timeout for fetching a version document in milliseconds (15 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 15_000;

// =============================================================================
// Remote endpoints
// =============================================================================

/// Hostname resolved by the DNS reachability check
pub const DEFAULT_DNS_HOST: &str = "google.com";

/// Endpoint hit by the HEAD reachability check
pub const DEFAULT_HTTP_PROBE_URL: &str = "https://www.google.com";

/// Changelog page carrying the current game version
pub const DEFAULT_GAME_URL: &str = "https://escapefromtarkov.fandom.com/wiki/Changelog";

/// The changelog marks the current entry as a link to itself
pub const DEFAULT_GAME_SELECTOR: &str = "strong.mw-selflink.selflink";

/// Hub listing page of the add-on
pub const DEFAULT_MOD_URL: &str = "https://hub.sp-tarkov.com/files/file/1428-edit-game-version/";

pub const DEFAULT_MOD_SELECTOR: &str = ".filebaseVersionNumber";

/// Version-shaped token: a digit, optional dots, then the rest of the line
pub const DEFAULT_VERSION_PATTERN: &str = r"\d\.*.*";

/// Label written next to the resolved version in the core config
pub const DEFAULT_LABEL: &str = "Beta version";

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub logger: LoggerConfig,
    pub probe: ProbeConfig,
    pub sources: SourcesConfig,
    /// Timeout for document fetches in milliseconds
    pub fetch_timeout_ms: u64,
    pub label: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            probe: ProbeConfig::default(),
            sources: SourcesConfig::default(),
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from a JSON file.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Verbosity gates for operator-facing notices
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoggerConfig {
    /// Emit diagnostic notices (connectivity, config values before and after patching)
    pub dev_logger: bool,
    /// Emit success notices
    pub success_logger: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            dev_logger: false,
            success_logger: true,
        }
    }
}

/// Connectivity probe configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeConfig {
    pub dns_host: String,
    pub http_url: String,
    pub dns_timeout_ms: u64,
    pub http_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            dns_host: DEFAULT_DNS_HOST.to_string(),
            http_url: DEFAULT_HTTP_PROBE_URL.to_string(),
            dns_timeout_ms: DNS_TIMEOUT_MS,
            http_timeout_ms: HTTP_PROBE_TIMEOUT_MS,
        }
    }
}

/// Remote version sources
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SourcesConfig {
    pub game: VersionSource,
    pub mod_page: VersionSource,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            game: VersionSource::new(
                DEFAULT_GAME_URL,
                DEFAULT_GAME_SELECTOR,
                DEFAULT_VERSION_PATTERN,
            ),
            mod_page: VersionSource::new(
                DEFAULT_MOD_URL,
                DEFAULT_MOD_SELECTOR,
                DEFAULT_VERSION_PATTERN,
            ),
        }
    }
}

/// Returns the path to the data directory for game-version-sync.
/// Uses $XDG_DATA_HOME/game-version-sync if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/game-version-sync,
/// or ./game-version-sync if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the persisted version record.
pub fn cache_path() -> PathBuf {
    data_dir().join("versions.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("game-version-sync.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("game-version-sync")
}
