use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockito::{Server, ServerGuard};
use tempfile::TempDir;

use game_version_sync::config::{AppConfig, LoggerConfig, SourcesConfig};
use game_version_sync::logging::Notices;
use game_version_sync::network::ConnectivityCheck;
use game_version_sync::patch::CoreConfig;
use game_version_sync::version::cache::{VersionCache, VersionStorer};
use game_version_sync::version::checker::ModCheckOutcome;
use game_version_sync::version::resolver::VersionResolver;
use game_version_sync::version::source::{HttpDocumentFetcher, VersionSource};
use game_version_sync::workflow::run;

struct FixedConnectivity(bool);

#[async_trait]
impl ConnectivityCheck for FixedConnectivity {
    async fn is_connected(&self) -> bool {
        self.0
    }
}

fn app_config(server: &ServerGuard) -> AppConfig {
    AppConfig {
        logger: LoggerConfig {
            dev_logger: true,
            success_logger: true,
        },
        sources: SourcesConfig {
            game: VersionSource::new(
                &format!("{}/wiki/Changelog", server.url()),
                "strong.mw-selflink.selflink",
                r"\d\.*.*",
            ),
            mod_page: VersionSource::new(
                &format!("{}/files/edit-game-version", server.url()),
                ".filebaseVersionNumber",
                r"\d\.*.*",
            ),
        },
        ..AppConfig::default()
    }
}

fn resolver(config: &AppConfig) -> VersionResolver {
    VersionResolver::new(
        Arc::new(HttpDocumentFetcher::new(Duration::from_secs(5)).unwrap()),
        Notices::new(config.logger),
    )
}

fn seeded_cache(temp_dir: &TempDir) -> VersionCache {
    let path = temp_dir.path().join("versions.json");
    std::fs::write(
        &path,
        r#"{ "OfflineGameVersion": "0.14.9.5", "ModVersion": "1.3.0" }"#,
    )
    .unwrap();
    VersionCache::load(&path)
}

#[tokio::test]
async fn online_run_persists_version_and_offline_run_reuses_it() {
    let mut server = Server::new_async().await;
    let changelog = server
        .mock("GET", "/wiki/Changelog")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(r#"<ul><li><strong class="mw-selflink selflink">0.15.5.3 (change list)</strong></li></ul>"#)
        .expect(1)
        .create_async()
        .await;
    let listing = server
        .mock("GET", "/files/edit-game-version")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(r#"<span class="filebaseVersionNumber">1.4.0</span>"#)
        .expect(1)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);
    let config = app_config(&server);
    let resolver = resolver(&config);

    let mut core = CoreConfig::default();
    let report = run(&FixedConnectivity(true), &resolver, &cache, &config, &mut core).await;

    changelog.assert_async().await;
    listing.assert_async().await;
    assert_eq!(report.game_version, "0.15.5.3 (change list)");
    assert_eq!(
        report.mod_check,
        ModCheckOutcome::UpdateAvailable {
            latest: "1.4.0".to_string()
        }
    );
    assert_eq!(core.project_name, "0.15.5.3 (change list)");
    assert_eq!(core.aki_version, "Beta version");

    let reloaded = VersionCache::load(cache.path());
    let record = reloaded.record().unwrap();
    assert_eq!(record.offline_game_version, "0.15.5.3 (change list)");
    assert_eq!(record.mod_version, "1.3.0");

    let mut offline_core = CoreConfig::default();
    let offline = run(
        &FixedConnectivity(false),
        &resolver,
        &reloaded,
        &config,
        &mut offline_core,
    )
    .await;

    assert_eq!(offline.game_version, "0.15.5.3 (change list)");
    assert_eq!(offline.mod_check, ModCheckOutcome::Offline);
    assert_eq!(offline_core.project_name, "0.15.5.3 (change list)");
}

#[tokio::test]
async fn redesigned_changelog_patches_empty_version_and_keeps_cache() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/wiki/Changelog")
        .with_status(200)
        .with_body("<html><body><h1>Changelog</h1></body></html>")
        .create_async()
        .await;
    server
        .mock("GET", "/files/edit-game-version")
        .with_status(200)
        .with_body(r#"<span class="filebaseVersionNumber">1.3.0</span>"#)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);
    let config = app_config(&server);

    let mut core = CoreConfig::default();
    let report = run(
        &FixedConnectivity(true),
        &resolver(&config),
        &cache,
        &config,
        &mut core,
    )
    .await;

    assert_eq!(report.game_version, "");
    assert_eq!(report.mod_check, ModCheckOutcome::UpToDate);
    assert_eq!(core.project_name, "");
    assert_eq!(
        VersionCache::load(cache.path())
            .record()
            .unwrap()
            .offline_game_version,
        "0.14.9.5"
    );
}

#[tokio::test]
async fn unreachable_source_falls_back_to_cached_version() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/wiki/Changelog")
        .with_status(503)
        .create_async()
        .await;
    server
        .mock("GET", "/files/edit-game-version")
        .with_status(503)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let cache = seeded_cache(&temp_dir);
    let config = app_config(&server);

    let mut core = CoreConfig::default();
    let report = run(
        &FixedConnectivity(true),
        &resolver(&config),
        &cache,
        &config,
        &mut core,
    )
    .await;

    assert_eq!(report.game_version, "0.14.9.5");
    assert_eq!(report.mod_check, ModCheckOutcome::Unavailable);
    assert_eq!(core.project_name, "0.14.9.5");
}
