//! Remote version sources and document extraction
//!
//! A [`VersionSource`] bundles the three things needed to pull a version out of
//! a web page: where the page lives, which element holds the version, and what
//! a version looks like. The same policy drives both the game changelog and
//! the add-on listing page.

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::{FetchError, ResolveError};

/// Where and how to find a version token
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VersionSource {
    /// Document URL
    pub url: String,
    /// CSS selector of the element whose text carries the version
    pub selector: String,
    /// Regex applied to the element text; the first match is the version
    pub pattern: String,
}

impl VersionSource {
    pub fn new(url: &str, selector: &str, pattern: &str) -> Self {
        Self {
            url: url.to_string(),
            selector: selector.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Trait for fetching a remote document as text
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the document body at `url`
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches documents over HTTP with a bounded timeout and no retry
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl HttpDocumentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("game-version-sync")
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("Version source returned status {}: {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Extract a version token from an HTML document
///
/// Selects the first element matching `source.selector`, takes its text
/// content, and returns the first match of `source.pattern` in it.
pub fn extract_version(html: &str, source: &VersionSource) -> Result<String, ResolveError> {
    let selector = Selector::parse(&source.selector)
        .map_err(|_| ResolveError::InvalidSelector(source.selector.clone()))?;
    let pattern = Regex::new(&source.pattern)?;

    let document = Html::parse_document(html);
    let text = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .ok_or_else(|| ResolveError::ElementMissing(source.selector.clone()))?;

    pattern
        .find(&text)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ResolveError::PatternUnmatched {
            text,
            pattern: source.pattern.clone(),
        })
}
