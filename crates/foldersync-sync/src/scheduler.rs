//! Sync scheduler - runs reconciliation passes on a fixed interval
//!
//! The [`Scheduler`] owns the [`Reconciler`] and drives it until shutdown
//! is requested through a [`CancellationToken`].
//!
//! ## Flow
//!
//! ```text
//! preflight() ──→ Scheduler::run ──→ pass ──→ sleep_until(start + interval) ──→ pass ...
//!                        │                              │
//!                 CancellationToken ────────────────────┘
//! ```
//!
//! The interval is measured from the start of one pass to the start of the
//! next. A pass that overruns the interval is followed immediately by the
//! next one. Passes never overlap.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use foldersync_core::{
    domain::{outcome::PassSummary, roots::MirrorRoots},
    ports::outcome_reporter::IOutcomeReporter,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{reconciler::Reconciler, SyncError};

// ============================================================================
// Startup checks
// ============================================================================

/// Name of the file written and removed to prove the replica is writable
const WRITE_PROBE_NAME: &str = ".foldersync-write-probe";

/// Verifies the startup preconditions before the first pass
///
/// - the interval is non-zero
/// - the source root exists, is a directory, and can be listed
/// - the replica root, or its nearest existing ancestor when it does not
///   exist yet, is a directory that accepts new files
///
/// # Errors
/// Returns `SyncError::Preflight` describing the first violated precondition.
pub async fn preflight(roots: &MirrorRoots, interval: Duration) -> Result<(), SyncError> {
    if interval.is_zero() {
        return Err(SyncError::Preflight(
            "interval must be greater than zero".into(),
        ));
    }

    check_source(roots.source()).await?;
    check_replica(roots.replica()).await?;

    debug!(roots = %roots, "Startup checks passed");
    Ok(())
}

async fn check_source(source: &Path) -> Result<(), SyncError> {
    match tokio::fs::metadata(source).await {
        Ok(m) if m.is_dir() => {}
        Ok(_) => {
            return Err(SyncError::Preflight(format!(
                "source is not a directory: {}",
                source.display()
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::Preflight(format!(
                "source directory does not exist: {}",
                source.display()
            )))
        }
        Err(e) => {
            return Err(SyncError::Preflight(format!(
                "cannot access source directory {}: {e}",
                source.display()
            )))
        }
    }

    if let Err(e) = tokio::fs::read_dir(source).await {
        return Err(SyncError::Preflight(format!(
            "source directory is not readable: {}: {e}",
            source.display()
        )));
    }

    Ok(())
}

async fn check_replica(replica: &Path) -> Result<(), SyncError> {
    let location = nearest_existing(replica).await.ok_or_else(|| {
        SyncError::Preflight(format!(
            "no existing ancestor for replica directory: {}",
            replica.display()
        ))
    })?;

    let is_dir = tokio::fs::metadata(&location)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(SyncError::Preflight(format!(
            "replica location is not a directory: {}",
            location.display()
        )));
    }

    let probe = location.join(WRITE_PROBE_NAME);
    if let Err(e) = tokio::fs::write(&probe, b"").await {
        return Err(SyncError::Preflight(format!(
            "replica location is not writable: {}: {e}",
            location.display()
        )));
    }
    if let Err(e) = tokio::fs::remove_file(&probe).await {
        return Err(SyncError::Preflight(format!(
            "cannot remove write probe {}: {e}",
            probe.display()
        )));
    }

    Ok(())
}

/// The path itself if it exists, otherwise its closest existing ancestor
async fn nearest_existing(path: &Path) -> Option<PathBuf> {
    for candidate in path.ancestors() {
        if tokio::fs::symlink_metadata(candidate).await.is_ok() {
            return Some(candidate.to_path_buf());
        }
    }
    None
}

// ============================================================================
// Scheduler struct
// ============================================================================

/// Runs reconciliation passes back to back, at most once per interval
pub struct Scheduler {
    reconciler: Reconciler,
    reporter: Arc<dyn IOutcomeReporter>,
    interval: Duration,
    /// Number of passes started so far
    passes: u64,
}

impl Scheduler {
    /// Creates a new `Scheduler`
    ///
    /// # Arguments
    /// * `reconciler` - Performs one pass per call
    /// * `reporter` - Receives the pass boundary events
    /// * `interval` - Minimum time between the starts of two passes
    pub fn new(
        reconciler: Reconciler,
        reporter: Arc<dyn IOutcomeReporter>,
        interval: Duration,
    ) -> Self {
        info!(
            roots = %reconciler.roots(),
            interval_secs = interval.as_secs(),
            "Creating sync scheduler"
        );
        Self {
            reconciler,
            reporter,
            interval,
            passes: 0,
        }
    }

    /// Number of passes started so far
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Runs a single pass and reports its boundaries
    ///
    /// # Errors
    /// Propagates the pass-fatal error or cancellation from the reconciler.
    pub async fn run_once(&mut self, cancel: &CancellationToken) -> Result<PassSummary, SyncError> {
        self.passes += 1;
        let pass = self.passes;

        self.reporter.pass_started(pass);
        let summary = self.reconciler.reconcile(cancel).await?;
        self.reporter.pass_finished(pass, &summary);

        Ok(summary)
    }

    /// Main loop: runs passes until `cancel` fires
    ///
    /// A pass-fatal error is logged and the loop waits for the next
    /// interval. Cancellation is observed between mutations and while
    /// waiting between passes.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("Sync scheduler starting");

        loop {
            let started = Instant::now();

            match self.run_once(&cancel).await {
                Ok(_) => {}
                Err(SyncError::Cancelled) => {
                    info!(pass = self.passes, "Synchronization process interrupted");
                    break;
                }
                Err(e) => {
                    error!(pass = self.passes, error = %e, "Sync pass aborted");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Synchronization process interrupted");
                    break;
                }
                _ = tokio::time::sleep_until(started + self.interval) => {}
            }
        }

        info!(passes = self.passes, "Sync scheduler stopped");
    }
}
