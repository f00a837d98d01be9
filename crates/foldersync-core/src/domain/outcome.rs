//! Mutation operations and their outcomes
//!
//! Every mutation primitive produces exactly one [`MutationRecord`], which
//! is handed to the injected outcome reporter. The reconciler never
//! branches on these values.

use std::path::{Path, PathBuf};

/// The four filesystem mutations the engine performs on the replica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperation {
    /// Copy a source file over its replica counterpart when newer
    CopyFile,
    /// Create a replica directory (and missing parents) when absent
    CreateDirectory,
    /// Remove a single replica file
    DeleteFile,
    /// Remove a replica directory and everything beneath it
    DeleteDirectory,
}

impl std::fmt::Display for MutationOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MutationOperation::CopyFile => "copy_file",
            MutationOperation::CreateDirectory => "create_directory",
            MutationOperation::DeleteFile => "delete_file",
            MutationOperation::DeleteDirectory => "delete_directory",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one mutation primitive call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOutcome {
    /// The mutation was performed
    Applied,
    /// Nothing to do: the replica already matches
    SkippedUpToDate,
    /// Nothing to do: the target no longer exists
    SkippedAbsent,
    /// The filesystem refused the mutation with a permission error
    FailedPermission,
}

impl MutationOutcome {
    /// Returns true if the replica was modified
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }

    /// Returns true for outcomes that should be surfaced as errors
    pub fn is_failure(&self) -> bool {
        matches!(self, MutationOutcome::FailedPermission)
    }
}

impl std::fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MutationOutcome::Applied => "applied",
            MutationOutcome::SkippedUpToDate => "skipped-up-to-date",
            MutationOutcome::SkippedAbsent => "skipped-absent",
            MutationOutcome::FailedPermission => "failed-permission",
        };
        write!(f, "{}", s)
    }
}

/// One reported mutation: what was attempted, on which path(s), and how it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The attempted operation
    pub operation: MutationOperation,
    /// Source path, for operations that read from the source tree
    pub source: Option<PathBuf>,
    /// The replica path being mutated
    pub target: PathBuf,
    /// How the attempt ended
    pub outcome: MutationOutcome,
    /// Underlying error description for failures
    pub detail: Option<String>,
}

impl MutationRecord {
    /// Creates a record for a mutation of `target`
    pub fn new(operation: MutationOperation, target: impl Into<PathBuf>, outcome: MutationOutcome) -> Self {
        Self {
            operation,
            source: None,
            target: target.into(),
            outcome,
            detail: None,
        }
    }

    /// Sets the source path
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the error description
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The replica path being mutated
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Per-outcome tally of one pass, used for the pass-finished log line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Mutations performed
    pub applied: u32,
    /// Items already in sync
    pub skipped_up_to_date: u32,
    /// Targets that vanished before they could be mutated
    pub skipped_absent: u32,
    /// Mutations refused with a permission error
    pub failed_permission: u32,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl PassSummary {
    /// Counts one outcome
    pub fn tally(&mut self, outcome: MutationOutcome) {
        match outcome {
            MutationOutcome::Applied => self.applied += 1,
            MutationOutcome::SkippedUpToDate => self.skipped_up_to_date += 1,
            MutationOutcome::SkippedAbsent => self.skipped_absent += 1,
            MutationOutcome::FailedPermission => self.failed_permission += 1,
        }
    }

    /// Total number of primitive calls made during the pass
    pub fn total(&self) -> u32 {
        self.applied + self.skipped_up_to_date + self.skipped_absent + self.failed_permission
    }
}
