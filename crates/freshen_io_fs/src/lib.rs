//! `freshen_io_fs` v1:
//! Rust-side leaf-directory freshen engine.
//!
//! Module layout:
//! - `walk`   : destination traversal and leaf dispatch
//! - `sync`   : per-leaf copy/skip/delete decisions
//! - `prune`  : upward deletion of empty directories
//! - `spec`   : enums/options/errors
//! - `report` : run-time report model
//! - `util`   : shared helper functions

pub mod prune;
pub mod report;
pub mod spec;
mod sync;
mod util;
pub mod walk;

pub use prune::prune_empty_dirs;
pub use report::{ReportSync, ReportSyncBuilder};
pub use spec::{
    EnumSyncFileDecision, EnumSyncPatternMode, PruneError, SpecSyncError, SpecSyncOptions,
    SyncTreeError,
};
pub use walk::sync_tree;
