//! Foldersync Daemon - Periodic one-way folder mirroring service
//!
//! This binary handles:
//! - Command-line parsing and configuration merging
//! - Logging to the console and an append-only log file
//! - Startup validation of the root pair and interval
//! - Periodic reconciliation passes
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! After startup validation the daemon hands control to the
//! [`Scheduler`], which runs passes until a `CancellationToken` is
//! triggered on receipt of SIGTERM or SIGINT. Startup failures make the
//! process exit with a non-zero status before the first pass.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use foldersync_core::{
    config::{Config, ConfigBuilder},
    ports::outcome_reporter::IOutcomeReporter,
};
use foldersync_sync::{
    filesystem::LocalFileSystemAdapter,
    reconciler::Reconciler,
    reporter::TracingReporter,
    scheduler::{preflight, Scheduler},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// Command-line arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "foldersync",
    version,
    about = "Periodically mirror a source directory onto a replica"
)]
struct Cli {
    /// Directory tree to mirror from
    #[arg(long, value_name = "PATH")]
    source: Option<PathBuf>,

    /// Directory tree to mirror into (created if absent)
    #[arg(long, value_name = "PATH")]
    replica: Option<PathBuf>,

    /// Seconds between the starts of two passes
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Log file; records are appended
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ============================================================================
// Configuration
// ============================================================================

/// Loads the config file, layers the command-line values on top, resolves
/// relative paths against `cwd`, and validates the result
fn resolve_config(cli: &Cli, cwd: &Path) -> Result<Config> {
    let file_config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path()),
    };

    let mut config = apply_cli_overrides(file_config, cli);
    config.absolutize(cwd);

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", details.join("\n  "));
    }

    Ok(config)
}

fn apply_cli_overrides(config: Config, cli: &Cli) -> Config {
    let mut builder = ConfigBuilder::from_config(config);
    if let Some(source) = &cli.source {
        builder = builder.sync_source(source.clone());
    }
    if let Some(replica) = &cli.replica {
        builder = builder.sync_replica(replica.clone());
    }
    if let Some(interval) = cli.interval {
        builder = builder.sync_interval_secs(interval);
    }
    if let Some(log) = &cli.log {
        builder = builder.logging_file(log.clone());
    }
    builder.build()
}

// ============================================================================
// Logging
// ============================================================================

/// Level directive for the given configured level and `-v` count
fn log_filter(level: &str, verbose: u8) -> &str {
    match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the console and log file layers
///
/// `RUST_LOG` takes precedence over both the configured level and `-v`.
fn init_tracing(level: &str, verbose: u8, log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(level, verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    Ok(())
}

// ============================================================================
// DaemonService struct
// ============================================================================

/// Main daemon service that validates the setup and drives the scheduler
struct DaemonService {
    /// Merged and validated configuration
    config: Config,
    /// Token for signalling graceful shutdown
    shutdown: CancellationToken,
}

impl DaemonService {
    fn new(config: Config, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    /// Runs startup validation, then either one pass or the periodic loop
    async fn run(&self, once: bool) -> Result<()> {
        let roots = self.config.roots().context("Invalid root pair")?;
        let interval = self.config.interval();

        preflight(&roots, interval)
            .await
            .context("Startup validation failed")?;

        info!(
            source = %roots.source().display(),
            replica = %roots.replica().display(),
            interval_secs = interval.as_secs(),
            inaccessible_source = %self.config.sync.inaccessible_source,
            "Starting mirror"
        );

        let reporter: Arc<dyn IOutcomeReporter> = Arc::new(TracingReporter::new());
        let reconciler = Reconciler::new(
            roots,
            Arc::new(LocalFileSystemAdapter::new()),
            reporter.clone(),
        )
        .with_inaccessible_source_policy(self.config.sync.inaccessible_source);
        let mut scheduler = Scheduler::new(reconciler, reporter, interval);

        if !once {
            scheduler.run(self.shutdown.clone()).await;
            return Ok(());
        }

        match scheduler.run_once(&self.shutdown).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_cancelled() => {
                info!("Synchronization process interrupted");
                Ok(())
            }
            Err(e) => Err(e).context("Synchronization pass failed"),
        }
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = resolve_config(&cli, &cwd)?;

    init_tracing(&config.logging.level, cli.verbose, &config.logging.file)?;
    info!(
        log_file = %config.logging.file.display(),
        "Foldersync starting"
    );

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = DaemonService::new(config, shutdown_token);
    let result = service.run(cli.once).await;

    match &result {
        Ok(()) => info!("Foldersync shut down gracefully"),
        Err(e) => error!(error = %format!("{e:#}"), "Foldersync exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
