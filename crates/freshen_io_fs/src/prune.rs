//! Upward deletion of empty destination directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::spec::PruneError;

/// Remove `path_dir` if empty, then keep removing newly empty ancestors.
///
/// The walk stops at `path_dir_root` (never removed), at the first ancestor
/// that cannot be removed, or at any path outside `path_dir_root`. Only
/// `remove_dir` is used, so a non-empty directory is never deleted.
///
/// Returns the removed directories in removal order. An empty list means
/// `path_dir` was the root (or outside it) and nothing was touched. A failure
/// to remove `path_dir` itself is returned as [`PruneError::RemoveFailed`];
/// failures further up only end the walk.
pub fn prune_empty_dirs<P, Q>(path_dir: P, path_dir_root: Q) -> Result<Vec<PathBuf>, PruneError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir = path_dir.as_ref();
    let path_dir_root = path_dir_root.as_ref();
    if !path_dir.is_dir() {
        return Err(PruneError::NotADirectory(path_dir.to_path_buf()));
    }

    let mut l_removed: Vec<PathBuf> = Vec::new();
    let mut path_cursor = path_dir.to_path_buf();
    loop {
        if path_cursor == path_dir_root || !path_cursor.starts_with(path_dir_root) {
            break;
        }

        if let Err(e) = fs::remove_dir(&path_cursor) {
            if l_removed.is_empty() {
                return Err(PruneError::RemoveFailed {
                    path: path_cursor,
                    source: e,
                });
            }
            tracing::debug!("Cascade stopped at {} ({e})", path_cursor.display());
            break;
        }
        tracing::info!("Deleted empty folder: {}", path_cursor.display());
        l_removed.push(path_cursor.clone());

        let Some(path_parent) = path_cursor.parent() else {
            break;
        };
        if !path_parent.is_dir() {
            break;
        }
        path_cursor = path_parent.to_path_buf();
    }
    Ok(l_removed)
}
