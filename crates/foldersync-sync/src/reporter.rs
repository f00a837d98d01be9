//! TracingReporter - outcome reporter backed by `tracing`
//!
//! Writes one event per mutation and one per pass boundary. Whatever
//! subscriber the daemon installs (console, log file, or both) decides
//! where the events end up.
//!
//! | outcome              | level  |
//! |----------------------|--------|
//! | `Applied`            | INFO   |
//! | `SkippedUpToDate`    | DEBUG  |
//! | `SkippedAbsent`      | DEBUG  |
//! | `FailedPermission`   | ERROR  |

use chrono::Local;
use foldersync_core::{
    domain::outcome::{MutationOperation, MutationOutcome, MutationRecord, PassSummary},
    ports::outcome_reporter::IOutcomeReporter,
};
use tracing::{debug, error, info};

/// Timestamp format used in the pass boundary events
const PASS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reporter that turns mutation records into `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Creates a new `TracingReporter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Human-readable message for an applied mutation
fn applied_message(operation: MutationOperation) -> &'static str {
    match operation {
        MutationOperation::CopyFile => "Copied file",
        MutationOperation::CreateDirectory => "Created directory",
        MutationOperation::DeleteFile => "Deleted file",
        MutationOperation::DeleteDirectory => "Deleted directory",
    }
}

impl IOutcomeReporter for TracingReporter {
    fn record(&self, record: &MutationRecord) {
        let target = record.target.display();
        let source = record.source.as_deref().map(|p| p.display().to_string());

        match record.outcome {
            MutationOutcome::Applied => {
                info!(
                    operation = %record.operation,
                    path = %target,
                    source = source.as_deref().unwrap_or("-"),
                    "{}",
                    applied_message(record.operation)
                );
            }
            MutationOutcome::SkippedUpToDate => {
                debug!(operation = %record.operation, path = %target, "Up to date");
            }
            MutationOutcome::SkippedAbsent => {
                debug!(operation = %record.operation, path = %target, "Target vanished, skipped");
            }
            MutationOutcome::FailedPermission => {
                error!(
                    operation = %record.operation,
                    path = %target,
                    source = source.as_deref().unwrap_or("-"),
                    error = record.detail.as_deref().unwrap_or("permission denied"),
                    "Permission denied"
                );
            }
        }
    }

    fn pass_started(&self, pass: u64) {
        info!(
            pass,
            started_at = %Local::now().format(PASS_TIMESTAMP_FORMAT),
            "Synchronization started"
        );
    }

    fn pass_finished(&self, pass: u64, summary: &PassSummary) {
        info!(
            pass,
            finished_at = %Local::now().format(PASS_TIMESTAMP_FORMAT),
            applied = summary.applied,
            up_to_date = summary.skipped_up_to_date,
            vanished = summary.skipped_absent,
            permission_failures = summary.failed_permission,
            duration_ms = summary.duration_ms,
            "Synchronization finished"
        );
    }
}
