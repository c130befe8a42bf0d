use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use game_version_sync::config::{AppConfig, cache_path, config_path, log_path};
use game_version_sync::logging::{Notices, init_logging};
use game_version_sync::network::ConnectivityProbe;
use game_version_sync::patch::CoreConfig;
use game_version_sync::runtime::{SHUTDOWN_TIMEOUT, build_runtime, run_to_completion};
use game_version_sync::version::cache::{VersionCache, VersionStorer};
use game_version_sync::version::checker::{ModCheckOutcome, ModVersionChecker};
use game_version_sync::version::resolver::VersionResolver;
use game_version_sync::version::source::HttpDocumentFetcher;
use game_version_sync::workflow;

#[derive(Parser)]
#[command(name = "game-version-sync")]
#[command(version, about = "Inject the live game version into the server core config")]
struct Cli {
    /// Configuration file (defaults to the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Persisted version record (defaults to the data directory)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Log file (defaults to the data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the game version and patch the core config
    Run {
        /// Core config JSON file to patch in place
        #[arg(long)]
        core_config: PathBuf,
    },
    /// Report whether the network is reachable
    Probe,
    /// Print the persisted version record
    Cache,
    /// Check whether a newer add-on version is published
    CheckMod,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config.clone().unwrap_or_else(config_path))?;
    let _guard = init_logging(&cli.log_file.clone().unwrap_or_else(log_path))?;

    run_to_completion(build_runtime()?, execute(cli, config), SHUTDOWN_TIMEOUT)
}

fn build_resolver(config: &AppConfig) -> anyhow::Result<VersionResolver> {
    let fetcher = HttpDocumentFetcher::new(Duration::from_millis(config.fetch_timeout_ms))?;
    Ok(VersionResolver::new(
        Arc::new(fetcher),
        Notices::new(config.logger),
    ))
}

async fn execute(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let cache_path = cli.cache.unwrap_or_else(cache_path);

    match cli.command {
        Command::Run { core_config } => {
            let mut core = CoreConfig::load(&core_config)?;
            let cache = VersionCache::load(&cache_path);
            let probe = ConnectivityProbe::from_config(&config.probe)?;
            let resolver = build_resolver(&config)?;

            let report = workflow::run(&probe, &resolver, &cache, &config, &mut core).await;

            core.save(&core_config)?;
            info!(
                "Run finished: connected={} game_version={:?} mod_check={:?}",
                report.connected, report.game_version, report.mod_check
            );
        }
        Command::Probe => {
            let probe = ConnectivityProbe::from_config(&config.probe)?;
            let status = if probe.probe().await {
                "online"
            } else {
                "offline"
            };
            println!("{}", status);
        }
        Command::Cache => {
            let cache = VersionCache::load(&cache_path);
            println!("{}", serde_json::to_string_pretty(&cache.record()?)?);
        }
        Command::CheckMod => {
            let cache = VersionCache::load(&cache_path);
            let probe = ConnectivityProbe::from_config(&config.probe)?;
            let resolver = build_resolver(&config)?;

            let connected = probe.probe().await;
            let local = cache.record()?.mod_version;
            let outcome = ModVersionChecker::new(&resolver)
                .check(connected, &local, &config.sources.mod_page)
                .await;

            match outcome {
                ModCheckOutcome::Offline => println!("offline"),
                ModCheckOutcome::Unavailable => println!("unavailable"),
                ModCheckOutcome::UpToDate => println!("up to date ({})", local),
                ModCheckOutcome::UpdateAvailable { latest } => {
                    println!("update available: {} (installed: {})", latest, local)
                }
            }
        }
    }

    Ok(())
}
