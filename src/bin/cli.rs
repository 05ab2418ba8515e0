//! Indiefolio classificados CLI
//!
//! Local entry point for validation, change tracking, statistics and releases.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use classificados::{
    error::Result,
    models::Config,
    pipeline::{self, ReleaseOutcome, ValidationRun},
    services::GitCli,
    storage::{LocalStorage, RecordStore},
    utils::SystemClock,
};

/// Classificados - dataset tooling for the Indiefolio classified ads
#[derive(Parser, Debug)]
#[command(
    name = "classificados",
    version,
    about = "Validation, change log, statistics and release tooling for classified ads"
)]
struct Cli {
    /// Directory holding the dataset documents and config.toml
    #[arg(short, long, default_value = ".")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the record document against the schema and business rules
    Validate {
        /// Only validate when the record document is staged
        #[arg(long)]
        incremental: bool,
    },

    /// Diff against the last snapshot, update history and CHANGELOG.md
    Changelog,

    /// Recompute estatisticas.json
    Stats,

    /// Backfill missing timestamps
    Timestamps {
        /// Stamp every active record with the current time instead
        #[arg(long)]
        touch_active: bool,
    },

    /// Assign ids to records that have none
    Ids,

    /// Bump the version, tag and push when the dataset changed
    Release {
        /// Report the would-be version without writing or pushing
        #[arg(long)]
        dry_run: bool,
    },

    /// Serve the dataset documents over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration and dataset info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    config.validate()?;

    log::debug!("Loaded configuration from {}", config_path.display());

    let storage = LocalStorage::new(&cli.storage_dir);
    let clock = SystemClock;

    match cli.command {
        Command::Validate { incremental } => {
            let validator = pipeline::build_validator(&config, &storage)?;
            let git = GitCli::new(&cli.storage_dir);
            let scm = incremental.then_some(&git);

            match pipeline::run_validation(&config, &storage, &validator, scm)? {
                ValidationRun::Skipped => {}
                ValidationRun::Valid(summary) => {
                    log::info!("✓ {} records valid", summary.total);
                    log::info!(
                        "  ativo: {}, pausado: {}, finalizado: {}",
                        summary.active,
                        summary.paused,
                        summary.finished
                    );
                    log::info!("  Roles: {}", summary.roles.join(", "));
                    log::info!("  Genres: {}", summary.genres.join(", "));
                    log::info!("  States: {}", summary.states.join(", "));
                    log::info!("  Cities: {}", summary.cities.join(", "));
                }
            }
        }

        Command::Changelog => {
            let run = pipeline::run_changelog(&config, &storage, clock)?;
            if let Some(len) = run.ledger_len {
                log::info!("History now holds {len} snapshot(s)");
            }
        }

        Command::Stats => {
            let stats = pipeline::run_stats(&config, &storage, &clock)?;
            log::info!(
                "Total: {}, ativos: {}, expirados: {}, recentes (30 dias): {}",
                stats.total_classificados,
                stats.classificados_ativos,
                stats.classificados_expirados,
                stats.classificados_recentes
            );
        }

        Command::Timestamps { touch_active } => {
            pipeline::run_timestamps(&config, &storage, &clock, touch_active)?;
        }

        Command::Ids => {
            pipeline::run_ids(&config, &storage)?;
        }

        Command::Release { dry_run } => {
            let git = GitCli::new(&cli.storage_dir);
            match pipeline::run_release(&config, &storage, &git, dry_run)? {
                ReleaseOutcome::Planned { to, .. } => log::info!("Next version: {to}"),
                ReleaseOutcome::Released { to, .. } => log::info!("Version {to} tagged and pushed"),
                ReleaseOutcome::Unavailable | ReleaseOutcome::Unchanged => {}
            }
        }

        #[cfg(feature = "server")]
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(classificados::server::serve(&config, &cli.storage_dir, port))?;
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!(
                "Config: {}",
                if config_path.exists() {
                    "config.toml"
                } else {
                    "defaults"
                }
            );

            let store = RecordStore::new(&storage, config.paths.records.as_str());
            match store.load() {
                Ok(records) => log::info!(
                    "Records: {} ({} active)",
                    records.len(),
                    records.iter().filter(|r| r.is_active()).count()
                ),
                Err(e) => log::info!("Records: unavailable ({e})"),
            }

            let ledger = pipeline::HistoryLedger::new(
                &storage,
                config.paths.history.as_str(),
                config.history.max_snapshots,
                clock,
            );
            match ledger.load().last() {
                Some(last) => log::info!("Last snapshot: {} ({} records)", last.timestamp, last.total),
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
