//! Deterministic tree walks
//!
//! A walk lists a whole tree up front and returns the entries as a
//! snapshot. The reconciler then mutates one tree while iterating over the
//! snapshot, so no directory handle is ever held across a mutation.
//!
//! Siblings are visited in byte order of their names. The root itself is
//! never part of the result.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use foldersync_core::{domain::entry::EntryKind, ports::mirror_filesystem::IMirrorFileSystem};
use tracing::{debug, error};

use crate::SyncError;

/// Position of a directory relative to its descendants in the walk result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOrder {
    /// Directory before its contents (creation order)
    PreOrder,
    /// Directory after its contents (deletion order)
    PostOrder,
}

/// One entry in a walk snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Kind as listed, without following symbolic links
    pub kind: EntryKind,
}

/// Walks a tree through the [`IMirrorFileSystem`] port
#[derive(Clone)]
pub struct TreeWalker {
    fs: Arc<dyn IMirrorFileSystem>,
}

impl TreeWalker {
    /// Creates a walker over the given filesystem
    pub fn new(fs: Arc<dyn IMirrorFileSystem>) -> Self {
        Self { fs }
    }

    /// Returns every entry strictly below `root` in the requested order
    ///
    /// A missing root yields an empty walk. A subdirectory that cannot be
    /// listed for lack of permission is logged and its subtree skipped.
    ///
    /// # Errors
    /// Returns `SyncError::Walk` if a directory listing fails for any
    /// other reason.
    pub async fn walk(&self, root: &Path, order: VisitOrder) -> Result<Vec<WalkEntry>, SyncError> {
        let mut entries = Vec::new();
        self.walk_directory(root, order, &mut entries).await?;
        debug!(root = %root.display(), ?order, count = entries.len(), "Walk complete");
        Ok(entries)
    }

    fn walk_directory<'a>(
        &'a self,
        dir: &'a Path,
        order: VisitOrder,
        entries: &'a mut Vec<WalkEntry>,
    ) -> Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + 'a>> {
        Box::pin(async move {
            let mut children = match self.fs.list_dir(dir).await {
                Ok(children) => children,
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                    debug!(path = %dir.display(), "Directory vanished during walk");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    error!(
                        path = %dir.display(),
                        error = %e,
                        "Cannot list directory, skipping its contents"
                    );
                    return Ok(());
                }
                Err(source) => {
                    return Err(SyncError::Walk {
                        path: dir.to_path_buf(),
                        source,
                    })
                }
            };

            children.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

            for child in children {
                let entry = WalkEntry {
                    path: child.path,
                    kind: child.kind,
                };

                if order == VisitOrder::PreOrder {
                    entries.push(entry.clone());
                }
                if entry.kind == EntryKind::Directory {
                    self.walk_directory(&entry.path, order, entries).await?;
                }
                if order == VisitOrder::PostOrder {
                    entries.push(entry);
                }
            }

            Ok(())
        })
    }
}
