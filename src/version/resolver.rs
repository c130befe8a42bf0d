//! Remote version resolution with cached fallback
//!
//! Resolution degrades in three independent stages, each with its own warning:
//! - no connectivity (or the fetch itself fails): the cached fallback is used
//! - the selector finds nothing: the page was redesigned, the version is empty
//! - the pattern finds nothing: the version format changed, the version is empty

use std::sync::Arc;

use crate::logging::Notices;
use crate::version::cache::VersionStorer;
use crate::version::error::ResolveError;
use crate::version::source::{DocumentFetcher, VersionSource, extract_version};

/// Fetches version documents and turns them into version strings
pub struct VersionResolver {
    fetcher: Arc<dyn DocumentFetcher>,
    notices: Notices,
}

impl VersionResolver {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, notices: Notices) -> Self {
        Self { fetcher, notices }
    }

    pub fn notices(&self) -> Notices {
        self.notices
    }

    /// Fetch the document of `source` and extract its version token
    pub async fn fetch_version(&self, source: &VersionSource) -> Result<String, ResolveError> {
        let html = self.fetcher.fetch_document(&source.url).await?;
        extract_version(&html, source)
    }

    /// Resolve the current game version.
    ///
    /// Never fails. Only a successful online extraction reaches
    /// `storer.update_game_version`; every other path leaves the record alone.
    pub async fn resolve<S: VersionStorer + ?Sized>(
        &self,
        connected: bool,
        fallback: &str,
        source: &VersionSource,
        storer: &S,
    ) -> String {
        if !connected {
            self.notices.diagnostic(format_args!(
                "No network connection, using cached game version {:?}",
                fallback
            ));
            return fallback.to_string();
        }

        match self.fetch_version(source).await {
            Ok(version) => {
                self.notices.success(format_args!(
                    "Found latest game version at {}\nLatest version: {}",
                    source.url, version
                ));
                if let Err(e) = storer.update_game_version(&version) {
                    self.notices.error(format_args!(
                        "Failed to persist game version {:?}: {}",
                        version, e
                    ));
                }
                version
            }
            Err(ResolveError::Fetch(e)) => {
                self.notices.warning(format_args!(
                    "Could not fetch the current game version, using cached {:?}: {}",
                    fallback, e
                ));
                fallback.to_string()
            }
            Err(e) => {
                self.report_failure("game version", &e);
                String::new()
            }
        }
    }

    /// Log an extraction failure with a message specific to its stage
    pub fn report_failure(&self, subject: &str, error: &ResolveError) {
        match error {
            ResolveError::Fetch(e) => self
                .notices
                .warning(format_args!("Could not fetch the current {}: {}", subject, e)),
            ResolveError::ElementMissing(selector) => self.notices.warning(format_args!(
                "Could not find the current {} (no element matches {:?})",
                subject, selector
            )),
            ResolveError::PatternUnmatched { text, .. } => self.notices.warning(format_args!(
                "Could not match the current {} with Regex in {:?}",
                subject, text
            )),
            ResolveError::InvalidSelector(_) | ResolveError::InvalidPattern(_) => {
                self.notices.warning(format_args!(
                    "Invalid extraction policy for the current {}: {}",
                    subject, error
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::cache::MockVersionStorer;
    use crate::version::error::{CacheError, FetchError};
    use crate::version::source::MockDocumentFetcher;

    const CHANGELOG: &str = r#"<html><body>
        <strong class="mw-selflink selflink">0.15.5.3 (change list)</strong>
    </body></html>"#;

    fn source() -> VersionSource {
        VersionSource::new(
            "https://wiki.example/Changelog",
            "strong.mw-selflink.selflink",
            r"\d.*",
        )
    }

    fn resolver_with(fetcher: MockDocumentFetcher) -> VersionResolver {
        VersionResolver::new(Arc::new(fetcher), Notices::default())
    }

    fn fetcher_returning(body: &'static str) -> MockDocumentFetcher {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch_document()
            .withf(|url| url == "https://wiki.example/Changelog")
            .times(1)
            .returning(move |_| Ok(body.to_string()));
        fetcher
    }

    #[tokio::test]
    async fn resolve_offline_returns_fallback_without_fetch_or_update() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch_document().never();
        let mut storer = MockVersionStorer::new();
        storer.expect_update_game_version().never();

        let result = resolver_with(fetcher)
            .resolve(false, "1.2.3", &source(), &storer)
            .await;

        assert_eq!(result, "1.2.3");
    }

    #[tokio::test]
    async fn resolve_online_extracts_version_and_updates_cache() {
        let mut storer = MockVersionStorer::new();
        storer
            .expect_update_game_version()
            .withf(|version| version == "0.15.5.3 (change list)")
            .times(1)
            .returning(|_| Ok(()));

        let result = resolver_with(fetcher_returning(CHANGELOG))
            .resolve(true, "0.14.0.0", &source(), &storer)
            .await;

        assert_eq!(result, "0.15.5.3 (change list)");
    }

    #[tokio::test]
    async fn resolve_returns_empty_when_selector_missing() {
        let mut storer = MockVersionStorer::new();
        storer.expect_update_game_version().never();

        let result = resolver_with(fetcher_returning("<html><body></body></html>"))
            .resolve(true, "0.14.0.0", &source(), &storer)
            .await;

        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn resolve_returns_empty_when_pattern_unmatched() {
        let mut storer = MockVersionStorer::new();
        storer.expect_update_game_version().never();

        let result = resolver_with(fetcher_returning(
            r#"<strong class="mw-selflink selflink">Changelog</strong>"#,
        ))
        .resolve(true, "0.14.0.0", &source(), &storer)
        .await;

        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn resolve_falls_back_when_fetch_fails() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch_document().times(1).returning(|url| {
            Err(FetchError::Status {
                status: 502,
                url: url.to_string(),
            })
        });
        let mut storer = MockVersionStorer::new();
        storer.expect_update_game_version().never();

        let result = resolver_with(fetcher)
            .resolve(true, "0.14.0.0", &source(), &storer)
            .await;

        assert_eq!(result, "0.14.0.0");
    }

    #[tokio::test]
    async fn resolve_returns_fresh_version_even_when_persist_fails() {
        let mut storer = MockVersionStorer::new();
        storer
            .expect_update_game_version()
            .times(1)
            .returning(|_| Err(CacheError::LockPoisoned));

        let result = resolver_with(fetcher_returning(CHANGELOG))
            .resolve(true, "0.14.0.0", &source(), &storer)
            .await;

        assert_eq!(result, "0.15.5.3 (change list)");
    }

    #[tokio::test]
    async fn fetch_version_distinguishes_missing_element_from_unmatched_pattern() {
        let missing = resolver_with(fetcher_returning("<p>moved</p>"))
            .fetch_version(&source())
            .await;
        let unmatched = resolver_with(fetcher_returning(
            r#"<strong class="mw-selflink selflink">TBA</strong>"#,
        ))
        .fetch_version(&source())
        .await;

        assert!(matches!(missing, Err(ResolveError::ElementMissing(_))));
        assert!(matches!(
            unmatched,
            Err(ResolveError::PatternUnmatched { .. })
        ));
    }
}
