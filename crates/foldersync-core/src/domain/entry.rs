//! Entry classification
//!
//! The result of asking the filesystem "what is at this path?". Absence is
//! an ordinary variant rather than an error, so callers branch on it
//! instead of catching a failure.

use std::io::ErrorKind;
use std::time::SystemTime;

/// Kind of an entry found while listing a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Anything else (symlink, FIFO, socket, device)
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Classification of a single path, recomputed on every query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Nothing exists at the path
    Absent,
    /// The metadata query failed for a reason other than absence
    /// (typically permission denied on a parent directory)
    Inaccessible(ErrorKind),
    /// A directory
    Directory,
    /// A regular file with its last-modified timestamp
    File {
        /// Last modification time
        modified: SystemTime,
    },
    /// Exists, but is neither a regular file nor a directory
    Other,
}

impl EntryState {
    /// Returns true when the entry must be compared as if it did not exist
    ///
    /// Both true absence and an inaccessible path qualify; use
    /// [`is_inaccessible`](Self::is_inaccessible) to tell them apart.
    pub fn is_absent_for_comparison(&self) -> bool {
        matches!(self, EntryState::Absent | EntryState::Inaccessible(_))
    }

    /// Returns true if the metadata query failed for a reason other than absence
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, EntryState::Inaccessible(_))
    }

    /// The entry kind, if something accessible exists at the path
    pub fn kind(&self) -> Option<EntryKind> {
        match self {
            EntryState::Absent | EntryState::Inaccessible(_) => None,
            EntryState::Directory => Some(EntryKind::Directory),
            EntryState::File { .. } => Some(EntryKind::File),
            EntryState::Other => Some(EntryKind::Other),
        }
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryState::Absent => write!(f, "absent"),
            EntryState::Inaccessible(kind) => write!(f, "inaccessible ({kind:?})"),
            EntryState::Directory => write!(f, "directory"),
            EntryState::File { .. } => write!(f, "file"),
            EntryState::Other => write!(f, "other"),
        }
    }
}
