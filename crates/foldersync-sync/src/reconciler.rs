//! One-way reconciliation of a replica tree against its source
//!
//! A pass runs two phases, strictly in order:
//!
//! 1. **Delete** - walk the replica post-order and remove every entry whose
//!    source counterpart is gone or has a different kind. Children go
//!    before their parent.
//! 2. **Copy** - ensure the replica root exists, then walk the source
//!    pre-order, creating directories and copying files that are newer
//!    than their replica counterpart. Parents go before their children.
//!
//! Each phase snapshots its tree before mutating anything. The shutdown
//! token is checked before every mutation; an interrupted pass leaves the
//! replica partially updated and the next pass converges it.

use std::sync::Arc;
use std::time::Instant;

use foldersync_core::{
    config::InaccessibleSourcePolicy,
    domain::{
        entry::{EntryKind, EntryState},
        outcome::PassSummary,
        roots::MirrorRoots,
    },
    ports::{mirror_filesystem::IMirrorFileSystem, outcome_reporter::IOutcomeReporter},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    mutations::MutationPrimitives,
    walker::{TreeWalker, VisitOrder, WalkEntry},
    SyncError,
};

// ============================================================================
// Reconciler struct
// ============================================================================

/// Runs reconciliation passes for one root pair
///
/// ## Dependencies
///
/// - `fs`: Classification and listing of both trees, mutation of the replica
/// - `reporter`: Receives one record per mutation attempt
pub struct Reconciler {
    roots: MirrorRoots,
    fs: Arc<dyn IMirrorFileSystem>,
    walker: TreeWalker,
    primitives: MutationPrimitives,
    inaccessible_source: InaccessibleSourcePolicy,
}

/// What phase 1 does with one replica entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplicaVerdict {
    Keep,
    Delete,
}

impl Reconciler {
    /// Creates a reconciler with the default inaccessible-source policy
    pub fn new(
        roots: MirrorRoots,
        fs: Arc<dyn IMirrorFileSystem>,
        reporter: Arc<dyn IOutcomeReporter>,
    ) -> Self {
        Self {
            roots,
            walker: TreeWalker::new(fs.clone()),
            primitives: MutationPrimitives::new(fs.clone(), reporter),
            fs,
            inaccessible_source: InaccessibleSourcePolicy::default(),
        }
    }

    /// Sets what happens to replica entries whose source cannot be inspected
    #[must_use]
    pub fn with_inaccessible_source_policy(mut self, policy: InaccessibleSourcePolicy) -> Self {
        self.inaccessible_source = policy;
        self
    }

    /// The root pair this reconciler mirrors
    #[must_use]
    pub fn roots(&self) -> &MirrorRoots {
        &self.roots
    }

    // ========================================================================
    // Pass
    // ========================================================================

    /// Runs one full pass: delete phase, then copy phase
    ///
    /// # Errors
    /// - `SyncError::Cancelled` if `cancel` fires before a mutation
    /// - `SyncError::Mutation` / `SyncError::Walk` for pass-fatal I/O errors
    #[instrument(skip(self, cancel), fields(roots = %self.roots))]
    pub async fn reconcile(&self, cancel: &CancellationToken) -> Result<PassSummary, SyncError> {
        let started = Instant::now();
        let mut summary = PassSummary::default();

        self.delete_phase(cancel, &mut summary).await?;
        self.copy_phase(cancel, &mut summary).await?;

        summary.duration_ms = started.elapsed().as_millis() as u64;
        Ok(summary)
    }

    /// Phase 1: remove replica entries with no matching source entry
    async fn delete_phase(
        &self,
        cancel: &CancellationToken,
        summary: &mut PassSummary,
    ) -> Result<(), SyncError> {
        let entries = self
            .walker
            .walk(self.roots.replica(), VisitOrder::PostOrder)
            .await?;
        debug!(count = entries.len(), "Delete phase: replica snapshot taken");

        for entry in &entries {
            let source_path = self.roots.to_source(&entry.path)?;
            let source_state = self.fs.classify(&source_path).await;

            if self.judge_replica_entry(entry, &source_state) == ReplicaVerdict::Keep {
                continue;
            }

            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let outcome = match entry.kind {
                EntryKind::Directory => self.primitives.delete_dir_subtree(&entry.path).await?,
                EntryKind::File | EntryKind::Other => {
                    self.primitives.delete_file(&entry.path).await?
                }
            };
            summary.tally(outcome);
        }

        Ok(())
    }

    fn judge_replica_entry(&self, entry: &WalkEntry, source_state: &EntryState) -> ReplicaVerdict {
        match source_state {
            EntryState::Absent => ReplicaVerdict::Delete,
            EntryState::Inaccessible(kind) => match self.inaccessible_source {
                InaccessibleSourcePolicy::PreserveReplica => {
                    error!(
                        path = %entry.path.display(),
                        error = ?kind,
                        "Source counterpart cannot be inspected, keeping replica entry"
                    );
                    ReplicaVerdict::Keep
                }
                InaccessibleSourcePolicy::TreatAsAbsent => {
                    warn!(
                        path = %entry.path.display(),
                        error = ?kind,
                        "Source counterpart cannot be inspected, treating it as deleted"
                    );
                    ReplicaVerdict::Delete
                }
            },
            state => {
                if state.kind() == Some(entry.kind) {
                    ReplicaVerdict::Keep
                } else {
                    info!(
                        path = %entry.path.display(),
                        replica = %entry.kind,
                        source = %state,
                        "Replica entry kind differs from source, replacing"
                    );
                    ReplicaVerdict::Delete
                }
            }
        }
    }

    /// Phase 2: create directories and copy newer files into the replica
    async fn copy_phase(
        &self,
        cancel: &CancellationToken,
        summary: &mut PassSummary,
    ) -> Result<(), SyncError> {
        let entries = self
            .walker
            .walk(self.roots.source(), VisitOrder::PreOrder)
            .await?;
        debug!(count = entries.len(), "Copy phase: source snapshot taken");

        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        let outcome = self
            .primitives
            .create_dir_if_absent(self.roots.replica())
            .await?;
        summary.tally(outcome);

        for entry in &entries {
            let target = self.roots.to_replica(&entry.path)?;

            let kind = match entry.kind {
                // Listing does not follow links; classify resolves file links.
                EntryKind::Other => self
                    .fs
                    .classify(&entry.path)
                    .await
                    .kind()
                    .unwrap_or(EntryKind::Other),
                kind => kind,
            };

            if kind == EntryKind::Other {
                debug!(path = %entry.path.display(), "Skipping special entry");
                continue;
            }

            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let outcome = match kind {
                EntryKind::Directory => self.primitives.create_dir_if_absent(&target).await?,
                _ => {
                    self.primitives
                        .copy_file_if_newer(&entry.path, &target)
                        .await?
                }
            };
            summary.tally(outcome);
        }

        Ok(())
    }
}
