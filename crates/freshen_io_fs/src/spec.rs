//! Sync specification models and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for the candidate file-name pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSyncPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

/// Copy decision for one source candidate against its destination counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSyncFileDecision {
    /// Destination file is missing.
    CopyMissing,
    /// Destination file is strictly older than the source.
    CopyOutdated,
    /// Destination file is as new as the source, or newer.
    KeepCurrent,
    /// Destination file exists and overwriting is disabled.
    KeepProtected,
}

impl EnumSyncFileDecision {
    pub fn is_copy(self) -> bool {
        matches!(self, Self::CopyMissing | Self::CopyOutdated)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `sync_tree`.
#[derive(Debug, Clone)]
pub struct SpecSyncOptions {
    /// Pattern applied to source file basenames.
    pub pattern: String,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumSyncPatternMode,
    /// Delete leaf directories that stay empty after a pass with nothing copied.
    pub if_delete_empty: bool,
    /// Delete leaf directories that are empty before any copy is attempted.
    pub if_delete_empty_before: bool,
    /// Never overwrite an existing destination file.
    pub if_maintain_original: bool,
    /// Apply source permissions, timestamps and xattrs to copied files.
    pub if_keep_metadata: bool,
}

impl Default for SpecSyncOptions {
    fn default() -> Self {
        Self {
            pattern: "?older.*".to_string(),
            rule_pattern: EnumSyncPatternMode::Glob,
            if_delete_empty: false,
            if_delete_empty_before: false,
            if_maintain_original: false,
            if_keep_metadata: false,
        }
    }
}

/// One sync failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSyncError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors (input validation / traversal setup).
#[derive(Debug)]
pub enum SyncTreeError {
    /// Invalid candidate pattern.
    InvalidPattern(String),
    /// Source path is not a directory.
    SourceNotDirectory(PathBuf),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    SourceDestinationOverlap {
        /// Normalized source directory.
        source: PathBuf,
        /// Normalized destination directory.
        destination: PathBuf,
    },
    /// Destination root could not be walked at all.
    DestinationUnreadable {
        /// Destination root path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl fmt::Display for SyncTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::SourceNotDirectory(path) => {
                write!(f, "Source is not a directory: {}", path.display())
            }
            Self::SourceDestinationOverlap {
                source,
                destination,
            } => write!(
                f,
                "Source and destination directories overlap: {} <-> {}",
                source.display(),
                destination.display()
            ),
            Self::DestinationUnreadable { path, source } => {
                write!(f, "Failed to walk destination {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SyncTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DestinationUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Deletion cascade refusal or failure on the first directory.
#[derive(Debug)]
pub enum PruneError {
    /// Path is missing or not a directory.
    NotADirectory(PathBuf),
    /// `remove_dir` failed (usually because the directory is not empty).
    RemoveFailed {
        /// Directory that could not be removed.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl fmt::Display for PruneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADirectory(path) => {
                write!(f, "Specified path is not a directory: {}", path.display())
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "Failed to remove {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PruneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RemoveFailed { source, .. } => Some(source),
            Self::NotADirectory(_) => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
