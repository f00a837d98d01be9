//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including root validation failures and path mapping errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A path handed to the mapper does not live under the expected root
    #[error("Path {path} is not under root {root}")]
    PathNotUnderRoot {
        /// The offending path
        path: String,
        /// The root it was expected to be under
        root: String,
    },

    /// The source and replica roots are the same directory or nested
    #[error("Source root {source_root} and replica root {replica_root} overlap")]
    OverlappingRoots {
        /// The configured source root
        source_root: String,
        /// The configured replica root
        replica_root: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
