//! Destination tree traversal and leaf dispatch.

use std::io;
use std::path::Path;

use crate::report::{ReportSync, ReportSyncBuilder};
use crate::spec::{SpecSyncOptions, SyncTreeError};
use crate::sync::{SpecSyncContext, sync_leaf};
use crate::util::{SpecDirChild, SpecSyncPattern, is_overlap, list_dir_children};

/// Freshen the leaf directories of `dir_destination` from `dir_source`.
///
/// Both trees must share the same structure below their roots. The
/// destination is walked depth-first with children in name order; every
/// directory without subdirectories is a leaf and is synced exactly once:
/// - files matching the pattern in the mapped source leaf are copied when the
///   destination copy is missing or strictly older (unless
///   `if_maintain_original`),
/// - empty leaves are removed with their newly empty ancestors when
///   `if_delete_empty` / `if_delete_empty_before` ask for it.
///
/// Returns [`ReportSync`] when the walk completes (leaf-level failures are
/// stored in the report). Returns [`SyncTreeError`] for invalid input and
/// when the destination root cannot be listed.
pub fn sync_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_sync_options: SpecSyncOptions,
) -> Result<ReportSync, SyncTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    let spec_sync_pattern =
        SpecSyncPattern::from_raw(&spec_sync_options.pattern, spec_sync_options.rule_pattern)?;
    if !path_dir_src.is_dir() {
        return Err(SyncTreeError::SourceNotDirectory(path_dir_src));
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(SyncTreeError::SourceDestinationOverlap {
            source: path_dir_src,
            destination: path_dir_dst,
        });
    }
    let l_children_root =
        list_dir_children(&path_dir_dst).map_err(|e| SyncTreeError::DestinationUnreadable {
            path: path_dir_dst.clone(),
            source: e,
        })?;

    tracing::debug!(
        "Syncing {} -> {} (pattern={})",
        path_dir_src.display(),
        path_dir_dst.display(),
        spec_sync_options.pattern
    );
    let mut spec_sync_ctx = SpecSyncContext {
        path_dir_src,
        path_dir_dst: path_dir_dst.clone(),
        spec_sync_options,
        spec_sync_pattern,
        builder_sync_report: ReportSyncBuilder::default(),
    };

    visit_directory(&path_dir_dst, Ok(l_children_root), &mut spec_sync_ctx);
    Ok(spec_sync_ctx.builder_sync_report.build())
}

fn walk_directory(path_dir: &Path, spec_sync_ctx: &mut SpecSyncContext) {
    let res_children = list_dir_children(path_dir);
    visit_directory(path_dir, res_children, spec_sync_ctx);
}

fn visit_directory(
    path_dir: &Path,
    res_children: io::Result<Vec<SpecDirChild>>,
    spec_sync_ctx: &mut SpecSyncContext,
) {
    let opt_children = match res_children {
        Ok(v) => Some(v),
        Err(e) => {
            let message = format!(
                "Failed to read directory {} ({e}); treated as leaf",
                path_dir.display()
            );
            tracing::warn!("{message}");
            spec_sync_ctx.builder_sync_report.add_warning(message);
            None
        }
    };

    let b_has_subdirs = opt_children
        .as_ref()
        .is_some_and(|l| l.iter().any(|c| c.if_is_dir));
    if !b_has_subdirs {
        sync_leaf(path_dir, opt_children.as_deref(), spec_sync_ctx);
        return;
    }

    let l_dirs = opt_children.into_iter().flatten().filter(|c| c.if_is_dir);
    for _dir_child in l_dirs {
        if _dir_child.if_is_symlink {
            let message = format!(
                "Symlinked directory not followed: {}",
                _dir_child.path_entry.display()
            );
            tracing::warn!("{message}");
            spec_sync_ctx.builder_sync_report.add_warning(message);
            continue;
        }
        // removed by an earlier cascade
        if !_dir_child.path_entry.is_dir() {
            continue;
        }
        walk_directory(&_dir_child.path_entry, spec_sync_ctx);
    }
}
