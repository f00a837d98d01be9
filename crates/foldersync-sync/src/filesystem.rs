//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`IMirrorFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **File links are files**: [`classify`](IMirrorFileSystem::classify)
//!   follows a link to a regular file, so both reconciliation phases see
//!   the target's content and timestamp. A link to a directory is `Other`
//!   and is never mirrored. A dangling link is absent.
//! - **Listing does not follow links**: directory entries report their own
//!   file type, which keeps walks from escaping the tree through a link.
//! - **Timestamps**: `tokio::fs::copy` carries permission bits; access and
//!   modification times are applied afterwards with `filetime`.
//! - **In-place copy**: the target is overwritten directly, with no
//!   temporary file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use foldersync_core::{
    domain::entry::{EntryKind, EntryState},
    ports::mirror_filesystem::{DirEntry, IMirrorFileSystem},
};
use tracing::{debug, instrument};

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`IMirrorFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the path arguments. The root pair lives in the reconciler.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Maps a `std::fs::FileType` to the engine's entry kind.
fn entry_kind(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

/// Errors that mean "nothing is there" rather than "cannot look".
///
/// `NotADirectory` shows up when an ancestor of the path is a file, which
/// happens while a replica directory is being replaced by a source file.
fn is_absence(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NotFound | ErrorKind::NotADirectory)
}

// ============================================================================
// IMirrorFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl IMirrorFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn classify(&self, path: &Path) -> EntryState {
        let is_link = match tokio::fs::symlink_metadata(path).await {
            Ok(m) => m.file_type().is_symlink(),
            Err(e) if is_absence(e.kind()) => {
                debug!("path not found");
                return EntryState::Absent;
            }
            Err(e) => {
                debug!(error = %e, "metadata query failed");
                return EntryState::Inaccessible(e.kind());
            }
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if is_absence(e.kind()) => {
                debug!("link target not found");
                return EntryState::Absent;
            }
            Err(e) => {
                debug!(error = %e, "metadata query failed");
                return EntryState::Inaccessible(e.kind());
            }
        };

        let state = if metadata.is_dir() && is_link {
            EntryState::Other
        } else if metadata.is_dir() {
            EntryState::Directory
        } else if metadata.is_file() {
            match metadata.modified() {
                Ok(modified) => EntryState::File { modified },
                Err(e) => EntryState::Inaccessible(e.kind()),
            }
        } else {
            EntryState::Other
        };

        debug!(state = %state, "classified");
        state
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn list_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntry>> {
        let mut reader = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let kind = match entry.file_type().await {
                Ok(file_type) => entry_kind(file_type),
                // Removed between readdir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            entries.push(DirEntry::new(entry.path(), kind));
        }

        debug!(count = entries.len(), "directory listed");
        Ok(entries)
    }

    #[instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    async fn copy_file(&self, source: &Path, target: &Path) -> std::io::Result<()> {
        debug!("copying file");
        let bytes = tokio::fs::copy(source, target).await?;

        let metadata = tokio::fs::metadata(source).await?;
        let atime = FileTime::from_last_access_time(&metadata);
        let mtime = FileTime::from_last_modification_time(&metadata);

        let target_owned: PathBuf = target.to_path_buf();
        tokio::task::spawn_blocking(move || filetime::set_file_times(&target_owned, atime, mtime))
            .await
            .map_err(std::io::Error::other)??;

        debug!(bytes, "copy complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        debug!("creating directory");
        tokio::fs::create_dir_all(path).await?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        debug!("removing file");
        tokio::fs::remove_file(path).await
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_dir_all(&self, path: &Path) -> std::io::Result<()> {
        debug!("removing directory recursively");
        tokio::fs::remove_dir_all(path).await
    }
}

// ============================================================================
// Unit tests
// ============================================================================
