//! Root pair and path mapping
//!
//! Every decision the reconciler makes depends on correlating an entry in
//! one tree with its counterpart in the other. Two entries with the same
//! path relative to their roots denote the same logical item. The mapping
//! is purely lexical: nothing here touches the filesystem.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};

use super::errors::DomainError;

// ============================================================================
// Path mapping primitives
// ============================================================================

/// Returns `path` relative to `root`
///
/// The root itself maps to the empty path.
///
/// # Errors
/// Returns `DomainError::PathNotUnderRoot` if `path` is not lexically under `root`
pub fn relative_path<'a>(path: &'a Path, root: &Path) -> Result<&'a Path, DomainError> {
    path.strip_prefix(root)
        .map_err(|_| DomainError::PathNotUnderRoot {
            path: path.display().to_string(),
            root: root.display().to_string(),
        })
}

/// Maps `path` from under `from_root` to the corresponding path under `to_root`
///
/// `map_path(from_root/a/b, from_root, to_root) == to_root/a/b`, and the
/// root itself maps to the other root exactly (no trailing separator).
///
/// # Errors
/// Returns `DomainError::PathNotUnderRoot` if `path` is not under `from_root`
pub fn map_path(path: &Path, from_root: &Path, to_root: &Path) -> Result<PathBuf, DomainError> {
    let relative = relative_path(path, from_root)?;

    if relative.as_os_str().is_empty() {
        return Ok(to_root.to_path_buf());
    }

    Ok(to_root.join(relative))
}

/// Normalize an absolute path by resolving `.` and `..` components
///
/// We don't use `fs::canonicalize()` as the replica root might not exist yet.
fn normalize_path(path: &Path) -> Result<PathBuf, DomainError> {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => normalized.push(p.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(DomainError::InvalidPath(format!(
                        "Path escapes filesystem root via ..: {}",
                        path.display()
                    )));
                }
            }
            Component::Normal(c) => normalized.push(c),
        }
    }

    Ok(normalized)
}

// ============================================================================
// MirrorRoots
// ============================================================================

/// The (source, replica) root pair, fixed for the lifetime of the process
///
/// Both roots are absolute and lexically normalized, and neither contains
/// the other: a replica nested inside its own source would be mirrored
/// into itself on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorRoots {
    source: PathBuf,
    replica: PathBuf,
}

impl MirrorRoots {
    /// Create a validated root pair
    ///
    /// # Errors
    /// - `DomainError::InvalidPath` if either root is relative
    /// - `DomainError::OverlappingRoots` if the roots are equal or nested
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let source = Self::validate_root(source.into(), "source")?;
        let replica = Self::validate_root(replica.into(), "replica")?;

        if source.starts_with(&replica) || replica.starts_with(&source) {
            return Err(DomainError::OverlappingRoots {
                source_root: source.display().to_string(),
                replica_root: replica.display().to_string(),
            });
        }

        Ok(Self { source, replica })
    }

    fn validate_root(root: PathBuf, label: &str) -> Result<PathBuf, DomainError> {
        if !root.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "{label} root must be absolute: {}",
                root.display()
            )));
        }
        normalize_path(&root)
    }

    /// The source root
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The replica root
    #[must_use]
    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Maps a path under the source root to its replica counterpart
    ///
    /// # Errors
    /// Returns `DomainError::PathNotUnderRoot` if `source_path` is outside the source root
    pub fn to_replica(&self, source_path: &Path) -> Result<PathBuf, DomainError> {
        map_path(source_path, &self.source, &self.replica)
    }

    /// Maps a path under the replica root to its source counterpart
    ///
    /// # Errors
    /// Returns `DomainError::PathNotUnderRoot` if `replica_path` is outside the replica root
    pub fn to_source(&self, replica_path: &Path) -> Result<PathBuf, DomainError> {
        map_path(replica_path, &self.replica, &self.source)
    }
}

impl Display for MirrorRoots {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.replica.display())
    }
}
