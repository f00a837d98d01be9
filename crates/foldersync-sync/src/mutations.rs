//! Mutation primitives
//!
//! The only code that changes the replica. Every call reports exactly one
//! [`MutationRecord`] and returns its outcome.
//!
//! ## Error containment
//!
//! | underlying error         | result                                 |
//! |--------------------------|----------------------------------------|
//! | none                     | `Applied` / `SkippedUpToDate`          |
//! | `PermissionDenied`       | `FailedPermission`, pass continues     |
//! | `NotFound` (vanished)    | `SkippedAbsent`, pass continues        |
//! | anything else            | `SyncError::Mutation`, pass aborts     |

use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use foldersync_core::{
    domain::{
        entry::EntryState,
        outcome::{MutationOperation, MutationOutcome, MutationRecord},
    },
    ports::{mirror_filesystem::IMirrorFileSystem, outcome_reporter::IOutcomeReporter},
};
use tracing::{instrument, warn};

use crate::SyncError;

/// Applies single mutations to the replica and reports their outcomes
#[derive(Clone)]
pub struct MutationPrimitives {
    fs: Arc<dyn IMirrorFileSystem>,
    reporter: Arc<dyn IOutcomeReporter>,
}

impl MutationPrimitives {
    /// Creates the primitives over a filesystem and an outcome sink
    pub fn new(fs: Arc<dyn IMirrorFileSystem>, reporter: Arc<dyn IOutcomeReporter>) -> Self {
        Self { fs, reporter }
    }

    // ========================================================================
    // copy-file-if-newer
    // ========================================================================

    /// Copies `source` over `target` when the source is strictly newer
    ///
    /// A missing target always counts as older. Equal timestamps leave the
    /// target untouched.
    ///
    /// # Errors
    /// Returns `SyncError::Mutation` on any failure other than a permission
    /// error or a vanished source.
    #[instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    pub async fn copy_file_if_newer(
        &self,
        source: &Path,
        target: &Path,
    ) -> Result<MutationOutcome, SyncError> {
        let op = MutationOperation::CopyFile;

        let source_modified = match self.fs.classify(source).await {
            EntryState::File { modified } => modified,
            EntryState::Inaccessible(kind) => {
                let err = io::Error::from(kind);
                return self.contain(op, Some(source), target, err);
            }
            _ => return Ok(self.report(op, Some(source), target, MutationOutcome::SkippedAbsent)),
        };

        if let EntryState::File { modified } = self.classify_target(target).await {
            if source_modified <= modified {
                return Ok(self.report(op, Some(source), target, MutationOutcome::SkippedUpToDate));
            }
        }

        match self.fs.copy_file(source, target).await {
            Ok(()) => Ok(self.report(op, Some(source), target, MutationOutcome::Applied)),
            Err(e) => self.contain(op, Some(source), target, e),
        }
    }

    // ========================================================================
    // create-directory-if-absent
    // ========================================================================

    /// Creates `target` and any missing parents unless something is already there
    ///
    /// # Errors
    /// Returns `SyncError::Mutation` on any failure other than a permission error.
    #[instrument(skip(self), fields(target = %target.display()))]
    pub async fn create_dir_if_absent(&self, target: &Path) -> Result<MutationOutcome, SyncError> {
        let op = MutationOperation::CreateDirectory;

        if !self.classify_target(target).await.is_absent_for_comparison() {
            return Ok(self.report(op, None, target, MutationOutcome::SkippedUpToDate));
        }

        match self.fs.create_dir_all(target).await {
            Ok(()) => Ok(self.report(op, None, target, MutationOutcome::Applied)),
            Err(e) => self.contain(op, None, target, e),
        }
    }

    // ========================================================================
    // delete-file / delete-directory-subtree
    // ========================================================================

    /// Removes a single non-directory entry
    ///
    /// # Errors
    /// Returns `SyncError::Mutation` on any failure other than a permission
    /// error or an already-missing target.
    #[instrument(skip(self), fields(target = %target.display()))]
    pub async fn delete_file(&self, target: &Path) -> Result<MutationOutcome, SyncError> {
        let op = MutationOperation::DeleteFile;

        match self.fs.remove_file(target).await {
            Ok(()) => Ok(self.report(op, None, target, MutationOutcome::Applied)),
            Err(e) => self.contain(op, None, target, e),
        }
    }

    /// Removes a directory and everything beneath it
    ///
    /// # Errors
    /// Returns `SyncError::Mutation` on any failure other than a permission
    /// error or an already-missing target.
    #[instrument(skip(self), fields(target = %target.display()))]
    pub async fn delete_dir_subtree(&self, target: &Path) -> Result<MutationOutcome, SyncError> {
        let op = MutationOperation::DeleteDirectory;

        match self.fs.remove_dir_all(target).await {
            Ok(()) => Ok(self.report(op, None, target, MutationOutcome::Applied)),
            Err(e) => self.contain(op, None, target, e),
        }
    }

    /// Classifies a replica path, warning when it has to be compared as absent
    /// only because it cannot be inspected
    async fn classify_target(&self, target: &Path) -> EntryState {
        let state = self.fs.classify(target).await;
        if let EntryState::Inaccessible(kind) = state {
            warn!(
                path = %target.display(),
                error = ?kind,
                "Replica entry cannot be inspected, treating it as absent"
            );
        }
        state
    }

    // ========================================================================
    // Reporting helpers
    // ========================================================================

    fn report(
        &self,
        operation: MutationOperation,
        source: Option<&Path>,
        target: &Path,
        outcome: MutationOutcome,
    ) -> MutationOutcome {
        let mut record = MutationRecord::new(operation, target, outcome);
        if let Some(source) = source {
            record = record.with_source(source);
        }
        self.reporter.record(&record);
        outcome
    }

    /// Turns a failed filesystem call into a reported outcome or a pass-fatal error
    fn contain(
        &self,
        operation: MutationOperation,
        source: Option<&Path>,
        target: &Path,
        err: io::Error,
    ) -> Result<MutationOutcome, SyncError> {
        let outcome = match err.kind() {
            ErrorKind::PermissionDenied => MutationOutcome::FailedPermission,
            ErrorKind::NotFound => MutationOutcome::SkippedAbsent,
            _ => {
                return Err(SyncError::Mutation {
                    operation,
                    path: target.to_path_buf(),
                    source: err,
                })
            }
        };

        let mut record = MutationRecord::new(operation, target, outcome);
        if let Some(source) = source {
            record = record.with_source(source);
        }
        if outcome.is_failure() {
            record = record.with_detail(err.to_string());
        }
        self.reporter.record(&record);
        Ok(outcome)
    }
}
