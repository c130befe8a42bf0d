//! One synchronization run
//!
//! Stages run strictly in order: connectivity probe, add-on update check,
//! game version resolution, config patch. Every stage handles its own
//! failures, so a run always completes and always patches the config.

use tracing::error;

use crate::config::AppConfig;
use crate::network::ConnectivityCheck;
use crate::patch::{VersionedConfig, apply};
use crate::version::cache::{VersionRecord, VersionStorer};
use crate::version::checker::{ModCheckOutcome, ModVersionChecker};
use crate::version::resolver::VersionResolver;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub connected: bool,
    pub mod_check: ModCheckOutcome,
    /// Version written into the config: fresh, cached, or empty
    pub game_version: String,
}

pub async fn run<S, C>(
    connectivity: &dyn ConnectivityCheck,
    resolver: &VersionResolver,
    storer: &S,
    config: &AppConfig,
    target: &mut C,
) -> RunReport
where
    S: VersionStorer + ?Sized,
    C: VersionedConfig + ?Sized,
{
    let notices = resolver.notices();

    let connected = connectivity.is_connected().await;
    notices.diagnostic(format_args!("Network available: {}", connected));

    let record = storer.record().unwrap_or_else(|e| {
        error!("Failed to read version record, using seed: {}", e);
        VersionRecord::default()
    });

    let mod_check = ModVersionChecker::new(resolver)
        .check(connected, &record.mod_version, &config.sources.mod_page)
        .await;

    let game_version = resolver
        .resolve(
            connected,
            &record.offline_game_version,
            &config.sources.game,
            storer,
        )
        .await;

    notices.diagnostic(format_args!(
        "Original core config:\nlabel: {}\nversion: {}",
        target.label(),
        target.version()
    ));

    apply(target, &config.label, &game_version);

    notices.diagnostic(format_args!(
        "Changed core config:\nlabel: {}\nversion: {}",
        target.label(),
        target.version()
    ));
    notices.success(format_args!(
        "Changed the server version back to the latest game version: {} {}",
        target.version(),
        target.label()
    ));

    RunReport {
        connected,
        mod_check,
        game_version,
    }
}
