use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Failure of a single fetch-and-extract pass.
///
/// Each variant points at a different operational problem: network outage,
/// page redesign, or version format change.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to fetch document: {0}")]
    Fetch(#[from] FetchError),

    #[error("No element matches selector {0:?}")]
    ElementMissing(String),

    #[error("Text {text:?} does not match pattern {pattern:?}")]
    PatternUnmatched { text: String, pattern: String },

    #[error("Invalid selector {0:?}")]
    InvalidSelector(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
