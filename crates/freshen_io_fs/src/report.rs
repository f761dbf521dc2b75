//! Sync report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecSyncError;

/// Aggregate counters and diagnostics for one `sync_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportSync {
    /// Number of leaf directories handed to the sync engine.
    pub cnt_leaves: u64,
    /// Number of files copied into destination leaves.
    pub cnt_copied: u64,
    /// Number of leaves where every candidate was already current or protected.
    pub cnt_skipped: u64,
    /// Number of leaves whose source counterpart had no matching file.
    pub cnt_no_match: u64,
    /// Number of destination directories removed by the deletion cascade.
    pub cnt_deleted: u64,
    /// Number of files whose copy failed.
    pub cnt_failed: u64,
    /// Non-fatal warnings collected during traversal/sync.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecSyncError>,
}

impl ReportSync {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_leaves".to_string(), self.cnt_leaves);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_no_match".to_string(), self.cnt_no_match);
        dict_counts.insert("cnt_deleted".to_string(), self.cnt_deleted);
        dict_counts.insert("cnt_failed".to_string(), self.cnt_failed);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} leaves={} copied={} skipped={} no_match={} deleted={} failed={} warnings={}",
            self.cnt_leaves,
            self.cnt_copied,
            self.cnt_skipped,
            self.cnt_no_match,
            self.cnt_deleted,
            self.cnt_failed,
            self.warning_count()
        )
    }

    /// End-of-run summary line printed by the CLI.
    pub fn format_summary(&self) -> String {
        format!(
            "Copied: {}    Skipped: {}    No Match Found: {}    Deleted: {}    Failed: {}",
            self.cnt_copied, self.cnt_skipped, self.cnt_no_match, self.cnt_deleted, self.cnt_failed
        )
    }
}

impl fmt::Display for ReportSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SYNC]"))
    }
}

/// Mutable accumulator for sync statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportSyncBuilder {
    /// See [`ReportSync::cnt_leaves`].
    pub cnt_leaves: u64,
    /// See [`ReportSync::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportSync::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportSync::cnt_no_match`].
    pub cnt_no_match: u64,
    /// See [`ReportSync::cnt_deleted`].
    pub cnt_deleted: u64,
    /// See [`ReportSync::cnt_failed`].
    pub cnt_failed: u64,
    /// See [`ReportSync::errors`].
    pub errors: Vec<SpecSyncError>,
    /// See [`ReportSync::warnings`].
    pub warnings: Vec<String>,
}

impl ReportSyncBuilder {
    pub fn add_leaf(&mut self) {
        self.cnt_leaves += 1;
    }

    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    pub fn add_no_match(&mut self) {
        self.cnt_no_match += 1;
    }

    /// Add the number of directories removed by one cascade.
    pub fn add_deleted(&mut self, value: u64) {
        self.cnt_deleted += value;
    }

    /// Record one failed copy and its path-scoped error.
    pub fn add_failed(&mut self, path: PathBuf, exception: String) {
        self.cnt_failed += 1;
        self.add_error(path, exception);
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecSyncError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportSync {
        ReportSync {
            cnt_leaves: self.cnt_leaves,
            cnt_copied: self.cnt_copied,
            cnt_skipped: self.cnt_skipped,
            cnt_no_match: self.cnt_no_match,
            cnt_deleted: self.cnt_deleted,
            cnt_failed: self.cnt_failed,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
