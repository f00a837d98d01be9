//! Outcome reporter port (driven/secondary port)
//!
//! The reconciliation engine reports every mutation outcome and every pass
//! boundary through this trait instead of writing to a process-wide
//! logger. The daemon injects a tracing-backed implementation; tests inject
//! recorders and assert on what was reported.
//!
//! ## Design Notes
//!
//! - Methods are synchronous and infallible: reporting must never change
//!   the course of a pass.
//! - Implementations must be `Send + Sync` because the engine holds the
//!   reporter behind an `Arc` across await points.

use crate::domain::outcome::{MutationRecord, PassSummary};

/// Sink for mutation outcomes and pass lifecycle events
pub trait IOutcomeReporter: Send + Sync {
    /// Called exactly once per mutation primitive invocation
    fn record(&self, record: &MutationRecord);

    /// Called when a pass begins
    fn pass_started(&self, _pass: u64) {}

    /// Called when both phases of a pass completed
    fn pass_finished(&self, _pass: u64, _summary: &PassSummary) {}
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl IOutcomeReporter for NullReporter {
    fn record(&self, _record: &MutationRecord) {}
}
