//! Command-line surface for `freshen`.
//!
//! Parses flags, hands a [`SpecSyncOptions`] to [`sync_tree`] and prints the
//! end-of-run summary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use freshen_io_fs::{EnumSyncPatternMode, ReportSync, SpecSyncOptions, SyncTreeError, sync_tree};

/// Pattern interpretation accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternModeArg {
    Glob,
    Regex,
    Literal,
}

impl From<PatternModeArg> for EnumSyncPatternMode {
    fn from(value: PatternModeArg) -> Self {
        match value {
            PatternModeArg::Glob => EnumSyncPatternMode::Glob,
            PatternModeArg::Regex => EnumSyncPatternMode::Regex,
            PatternModeArg::Literal => EnumSyncPatternMode::Literal,
        }
    }
}

/// Copy matching files from a source tree into the leaf directories of a
/// destination tree with the same layout.
///
/// If your music lives in `Music/<Artist>/<Album>/<files>`, point `--dest` at
/// the library `Music` directory and `--source` at the `Music` directory that
/// holds the replacement files.
#[derive(Debug, Parser)]
#[command(name = "freshen", version, about, long_about = None)]
pub struct Cli {
    /// Root of the source tree (same hierarchy as the destination)
    #[arg(long, value_name = "DIR", env = "FRESHEN_SOURCE")]
    pub source: Option<PathBuf>,

    /// Root of the destination tree (same hierarchy as the source)
    #[arg(long, value_name = "DIR", env = "FRESHEN_DEST")]
    pub dest: Option<PathBuf>,

    /// File-name pattern to copy from each source leaf
    #[arg(long, value_name = "PATTERN", default_value = "?older.*", env = "FRESHEN_EXT")]
    pub ext: String,

    /// How `--ext` is interpreted
    #[arg(long, value_enum, default_value_t = PatternModeArg::Glob)]
    pub pattern_mode: PatternModeArg,

    /// Delete destination leaves that remain empty after copying
    #[arg(long)]
    pub delete: bool,

    /// Delete destination leaves that are empty before copying
    #[arg(long)]
    pub before: bool,

    /// Never overwrite files that already exist in the destination
    #[arg(long)]
    pub maintain: bool,

    /// Give copied files the source permissions, timestamps and xattrs
    #[arg(long)]
    pub keep_metadata: bool,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings, errors and the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn to_sync_options(&self) -> SpecSyncOptions {
        SpecSyncOptions {
            pattern: self.ext.clone(),
            rule_pattern: self.pattern_mode.into(),
            if_delete_empty: self.delete,
            if_delete_empty_before: self.before,
            if_maintain_original: self.maintain,
            if_keep_metadata: self.keep_metadata,
        }
    }

    pub fn run(self) -> Result<ExitCode> {
        let Some(dir_source) = self.source.as_deref() else {
            println!(
                "No source folder specified. Use the \"--source\" option to set, or \"--help\" for help. Exiting..."
            );
            return Ok(ExitCode::FAILURE);
        };
        let Some(dir_destination) = self.dest.as_deref() else {
            println!(
                "No destination folder specified. Use the \"--dest\" option to set, or \"--help\" for help. Exiting..."
            );
            return Ok(ExitCode::FAILURE);
        };

        freshen_log::init_logging(self.verbose, self.quiet);

        let report = match sync_tree(dir_source, dir_destination, self.to_sync_options()) {
            Ok(v) => v,
            // best-effort: a failed walk is reported, not an exit failure
            Err(e @ SyncTreeError::DestinationUnreadable { .. }) => {
                println!("An error occurred: {e}");
                ReportSync::default()
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Run counters: {:?}", report.to_dict());
        println!("{}", report.format_summary());
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use freshen_io_fs::EnumSyncPatternMode;

    use super::Cli;

    #[test]
    fn defaults_match_original_flags() {
        let cli = Cli::try_parse_from(["freshen", "--source", "/orig", "--dest", "/music"])
            .expect("parse");
        let spec_sync_options = cli.to_sync_options();
        assert_eq!(spec_sync_options.pattern, "?older.*");
        assert_eq!(spec_sync_options.rule_pattern, EnumSyncPatternMode::Glob);
        assert!(!spec_sync_options.if_delete_empty);
        assert!(!spec_sync_options.if_delete_empty_before);
        assert!(!spec_sync_options.if_maintain_original);
        assert!(!spec_sync_options.if_keep_metadata);
    }

    #[test]
    fn flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "freshen",
            "--source",
            "/orig",
            "--dest",
            "/music",
            "--ext",
            "*.flac",
            "--pattern-mode",
            "literal",
            "--delete",
            "--before",
            "--maintain",
            "--keep-metadata",
        ])
        .expect("parse");
        let spec_sync_options = cli.to_sync_options();
        assert_eq!(spec_sync_options.pattern, "*.flac");
        assert_eq!(spec_sync_options.rule_pattern, EnumSyncPatternMode::Literal);
        assert!(spec_sync_options.if_delete_empty);
        assert!(spec_sync_options.if_delete_empty_before);
        assert!(spec_sync_options.if_maintain_original);
        assert!(spec_sync_options.if_keep_metadata);
    }

    #[test]
    fn source_and_dest_are_optional_at_parse_time() {
        let cli = Cli::try_parse_from(["freshen"]).expect("parse");
        assert!(cli.source.is_none());
        assert!(cli.dest.is_none());
    }
}
