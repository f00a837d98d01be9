//! Foldersync Sync - One-way replica reconciliation engine
//!
//! Provides:
//! - A local filesystem adapter preserving modification times on copy
//! - Deterministic pre-order / post-order tree walks
//! - The four mutation primitives with permission-error containment
//! - The two-phase reconciler (delete, then copy/create)
//! - A fixed-interval scheduler with startup checks and cancellation
//!
//! ## Modules
//!
//! - [`filesystem`] - Local filesystem adapter (`tokio::fs` + `filetime`)
//! - [`walker`] - Snapshot tree walks in a fixed visit order
//! - [`mutations`] - Copy / create / delete primitives and outcome reporting
//! - [`reconciler`] - One reconciliation pass over a root pair
//! - [`reporter`] - `tracing`-backed outcome reporter
//! - [`scheduler`] - Periodic passes, startup checks, shutdown

pub mod filesystem;
pub mod mutations;
pub mod reconciler;
pub mod reporter;
pub mod scheduler;
pub mod walker;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use foldersync_core::domain::{errors::DomainError, outcome::MutationOperation};
use thiserror::Error;

/// Errors that abort a reconciliation pass
///
/// Permission errors on individual mutations never surface here; they are
/// reported as outcomes and the pass continues.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A mutation failed for a reason other than permissions or absence
    #[error("Failed to {operation} {path}: {source}")]
    Mutation {
        operation: MutationOperation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be listed during a walk
    #[error("Failed to list directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A startup precondition does not hold
    #[error("Startup check failed: {0}")]
    Preflight(String),

    /// The pass was interrupted by a shutdown request
    #[error("Pass interrupted")]
    Cancelled,

    /// A domain-level error propagated from foldersync-core
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}

impl SyncError {
    /// Returns true if the pass stopped because shutdown was requested
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}
