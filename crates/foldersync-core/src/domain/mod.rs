//! Domain entities and business logic
//!
//! This module contains the core domain types for foldersync:
//! - Root pair and path mapping between the source and replica trees
//! - Entry classification results
//! - Mutation operations and their outcomes
//! - Domain-specific error types

pub mod entry;
pub mod errors;
pub mod outcome;
pub mod roots;

// Re-export commonly used types
pub use entry::{EntryKind, EntryState};
pub use errors::DomainError;
pub use outcome::{MutationOperation, MutationOutcome, MutationRecord, PassSummary};
pub use roots::{map_path, relative_path, MirrorRoots};
