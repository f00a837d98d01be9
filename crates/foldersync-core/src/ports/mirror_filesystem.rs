//! Mirror filesystem port (driven/secondary port)
//!
//! This module defines the interface the reconciliation engine uses to
//! inspect and mutate the source and replica trees.
//!
//! ## Design Notes
//!
//! - Mutations return `std::io::Result` rather than `anyhow::Result`: the
//!   error kind decides whether a failure is contained (permission denied)
//!   or aborts the pass, so it must survive the port boundary intact.
//! - `classify` never fails. Absence and inaccessibility are variants of
//!   [`EntryState`], not errors.
//! - Each method performs exactly one logical filesystem operation; the
//!   policy around it (newer-than checks, containment, reporting) lives in
//!   the engine.

use std::path::{Path, PathBuf};

use crate::domain::entry::{EntryKind, EntryState};

// ============================================================================
// DirEntry struct
// ============================================================================

/// A single child found while listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the child (the listed directory joined with its name)
    pub path: PathBuf,
    /// Kind as reported by the listing, without following symbolic links
    pub kind: EntryKind,
}

impl DirEntry {
    /// Creates a new directory entry
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

// ============================================================================
// IMirrorFileSystem trait
// ============================================================================

/// Port trait for the filesystem operations of the reconciliation engine
///
/// ## Implementation Notes
///
/// - All paths are absolute.
/// - `copy_file` must preserve the source's permission bits and
///   last-modified timestamp on the target.
/// - `create_dir_all` has `mkdir -p` semantics.
/// - Implementations should not retry internally; a failed call is final
///   for the current pass.
#[async_trait::async_trait]
pub trait IMirrorFileSystem: Send + Sync {
    /// Classifies the entry at `path`
    ///
    /// Follows symbolic links. A missing path (including a dangling link)
    /// is [`EntryState::Absent`]; any other metadata failure is
    /// [`EntryState::Inaccessible`].
    async fn classify(&self, path: &Path) -> EntryState;

    /// Lists the direct children of a directory, in no particular order
    ///
    /// # Errors
    /// Returns the underlying error if the directory cannot be read
    async fn list_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntry>>;

    /// Copies `source` to `target`, replacing `target` if it exists
    ///
    /// The copy carries the source's permission bits and modification time.
    async fn copy_file(&self, source: &Path, target: &Path) -> std::io::Result<()>;

    /// Creates a directory and all missing parents
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Removes a single non-directory entry
    async fn remove_file(&self, path: &Path) -> std::io::Result<()>;

    /// Removes a directory and everything beneath it
    async fn remove_dir_all(&self, path: &Path) -> std::io::Result<()>;
}
