//! Read-only update check for the add-on itself

use crate::version::resolver::VersionResolver;
use crate::version::source::VersionSource;

/// Result of comparing the published add-on version to the installed one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModCheckOutcome {
    /// No network; nothing was fetched
    Offline,
    /// The listing page could not be fetched or parsed
    Unavailable,
    /// Published version equals the installed one
    UpToDate,
    /// A different version is published
    UpdateAvailable { latest: String },
}

/// Compares the add-on's published version with the locally recorded one
///
/// Only logs; never mutates the version record.
pub struct ModVersionChecker<'a> {
    resolver: &'a VersionResolver,
}

impl<'a> ModVersionChecker<'a> {
    pub fn new(resolver: &'a VersionResolver) -> Self {
        Self { resolver }
    }

    pub async fn check(
        &self,
        connected: bool,
        local_mod_version: &str,
        source: &VersionSource,
    ) -> ModCheckOutcome {
        if !connected {
            return ModCheckOutcome::Offline;
        }

        let notices = self.resolver.notices();
        let latest = match self.resolver.fetch_version(source).await {
            Ok(latest) => latest,
            Err(e) => {
                self.resolver.report_failure("mod version", &e);
                return ModCheckOutcome::Unavailable;
            }
        };

        if latest == local_mod_version {
            notices.diagnostic(format_args!("Mod is up to date ({})", local_mod_version));
            return ModCheckOutcome::UpToDate;
        }

        notices.success(format_args!(
            "New version available: {} (installed: {})",
            latest, local_mod_version
        ));
        ModCheckOutcome::UpdateAvailable { latest }
    }
}
