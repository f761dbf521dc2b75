//! Per-leaf copy/skip/delete decisions.

use std::path::{Path, PathBuf};

use crate::prune::prune_empty_dirs;
use crate::report::ReportSyncBuilder;
use crate::spec::SpecSyncOptions;
use crate::util::{
    SpecDirChild, SpecSyncPattern, copy_file_with_metadata, decide_file_copy,
    derive_source_leaf, list_matching_files,
};

#[derive(Debug)]
pub(crate) struct SpecSyncContext {
    pub(crate) path_dir_src: PathBuf,
    pub(crate) path_dir_dst: PathBuf,
    pub(crate) spec_sync_options: SpecSyncOptions,
    pub(crate) spec_sync_pattern: SpecSyncPattern,
    pub(crate) builder_sync_report: ReportSyncBuilder,
}

/// Sync one destination leaf from its source counterpart.
///
/// `opt_children` is the walker's listing of the leaf, `None` when it could
/// not be read. Every call lands the leaf in exactly one outcome: files
/// copied, skipped, no match, deleted, or failed copies.
pub(crate) fn sync_leaf(
    path_dir_leaf: &Path,
    opt_children: Option<&[SpecDirChild]>,
    spec_sync_ctx: &mut SpecSyncContext,
) {
    spec_sync_ctx.builder_sync_report.add_leaf();

    let Some(path_dir_src_leaf) = derive_source_leaf(
        path_dir_leaf,
        &spec_sync_ctx.path_dir_dst,
        &spec_sync_ctx.path_dir_src,
    ) else {
        spec_sync_ctx.builder_sync_report.add_error(
            path_dir_leaf.to_path_buf(),
            format!(
                "Leaf is not below destination root: {} (root={})",
                path_dir_leaf.display(),
                spec_sync_ctx.path_dir_dst.display()
            ),
        );
        return;
    };

    let if_delete_empty = spec_sync_ctx.spec_sync_options.if_delete_empty;
    let if_delete_empty_before = spec_sync_ctx.spec_sync_options.if_delete_empty_before;
    let if_maintain_original = spec_sync_ctx.spec_sync_options.if_maintain_original;
    let if_keep_metadata = spec_sync_ctx.spec_sync_options.if_keep_metadata;

    if if_delete_empty_before {
        match opt_children {
            Some(l_children) if l_children.is_empty() => {
                if try_prune_leaf(path_dir_leaf, spec_sync_ctx) {
                    return;
                }
            }
            Some(_) => {}
            // an unreadable leaf is never assumed empty
            None => warn_leaf(
                spec_sync_ctx,
                format!(
                    "Destination leaf {} could not be listed; not treated as empty",
                    path_dir_leaf.display()
                ),
            ),
        }
    }

    let l_candidates =
        match list_matching_files(&path_dir_src_leaf, &spec_sync_ctx.spec_sync_pattern) {
            Ok(v) => v,
            Err(e) => {
                warn_leaf(
                    spec_sync_ctx,
                    format!(
                        "Failed to list source directory {} ({e})",
                        path_dir_src_leaf.display()
                    ),
                );
                Vec::new()
            }
        };

    if l_candidates.is_empty() {
        if if_delete_empty && try_prune_leaf(path_dir_leaf, spec_sync_ctx) {
            return;
        }
        tracing::info!("No matching file(s) found: {}", path_dir_leaf.display());
        spec_sync_ctx.builder_sync_report.add_no_match();
        return;
    }

    let mut n_copied_leaf: u64 = 0;
    let mut n_failed_leaf: u64 = 0;
    for spec_candidate in l_candidates {
        let path_file_dst = path_dir_leaf.join(&spec_candidate.name_file);
        let enum_decision = match decide_file_copy(
            &spec_candidate.path_file_src,
            &path_file_dst,
            if_maintain_original,
        ) {
            Ok(v) => v,
            Err(e) => {
                spec_sync_ctx
                    .builder_sync_report
                    .add_failed(path_file_dst, format!("Failed to compare files ({e})"));
                n_failed_leaf += 1;
                continue;
            }
        };
        if !enum_decision.is_copy() {
            tracing::trace!("{enum_decision:?}: {}", path_file_dst.display());
            continue;
        }

        match copy_file_with_metadata(
            &spec_candidate.path_file_src,
            &path_file_dst,
            if_keep_metadata,
        ) {
            Ok(_) => {
                tracing::debug!("{enum_decision:?}: {}", path_file_dst.display());
                spec_sync_ctx.builder_sync_report.add_copied();
                n_copied_leaf += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to copy {}: {e}", path_file_dst.display());
                spec_sync_ctx
                    .builder_sync_report
                    .add_failed(path_file_dst, e.to_string());
                n_failed_leaf += 1;
            }
        }
    }

    if n_copied_leaf > 0 {
        tracing::info!(
            "Copied {n_copied_leaf} file(s): {}",
            path_dir_leaf.display()
        );
        return;
    }
    if n_failed_leaf > 0 {
        tracing::warn!(
            "Failed to copy {n_failed_leaf} file(s): {}",
            path_dir_leaf.display()
        );
        return;
    }
    if if_delete_empty && try_prune_leaf(path_dir_leaf, spec_sync_ctx) {
        return;
    }
    tracing::info!(
        "Already contains matching file(s): {}",
        path_dir_leaf.display()
    );
    spec_sync_ctx.builder_sync_report.add_skipped();
}

/// Run the deletion cascade on a leaf; `true` when at least the leaf was removed.
fn try_prune_leaf(path_dir_leaf: &Path, spec_sync_ctx: &mut SpecSyncContext) -> bool {
    match prune_empty_dirs(path_dir_leaf, &spec_sync_ctx.path_dir_dst) {
        Ok(l_removed) if !l_removed.is_empty() => {
            spec_sync_ctx
                .builder_sync_report
                .add_deleted(l_removed.len() as u64);
            true
        }
        Ok(_) => false,
        Err(e) => {
            tracing::debug!("Leaf kept: {e}");
            false
        }
    }
}

fn warn_leaf(spec_sync_ctx: &mut SpecSyncContext, message: String) {
    tracing::warn!("{message}");
    spec_sync_ctx.builder_sync_report.add_warning(message);
}
