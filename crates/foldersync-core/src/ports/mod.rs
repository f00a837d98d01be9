//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! reconciliation engine. Ports are interfaces that the engine depends on,
//! but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IMirrorFileSystem`] - Classification, listing and mutation of local trees
//! - [`IOutcomeReporter`] - Sink for mutation outcomes and pass boundaries

pub mod mirror_filesystem;
pub mod outcome_reporter;

pub use mirror_filesystem::{DirEntry, IMirrorFileSystem};
pub use outcome_reporter::{IOutcomeReporter, NullReporter};
