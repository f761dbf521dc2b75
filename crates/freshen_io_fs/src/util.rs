use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumSyncFileDecision, EnumSyncPatternMode, SyncTreeError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum SpecSyncPattern {
    Literal(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

impl SpecSyncPattern {
    pub(crate) fn from_raw(
        pattern: &str,
        rule_pattern: EnumSyncPatternMode,
    ) -> Result<Self, SyncTreeError> {
        match rule_pattern {
            EnumSyncPatternMode::Literal => Ok(Self::Literal(pattern.to_string())),
            EnumSyncPatternMode::Glob => {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        SyncTreeError::InvalidPattern(format!("Invalid file pattern: {e}"))
                    })?
                    .compile_matcher();
                Ok(Self::Glob(matcher))
            }
            EnumSyncPatternMode::Regex => {
                let regex = Regex::new(pattern).map_err(|e| {
                    SyncTreeError::InvalidPattern(format!("Invalid file pattern: {e}"))
                })?;
                Ok(Self::Regex(regex))
            }
        }
    }

    pub(crate) fn is_match(&self, name_file: &str) -> bool {
        match self {
            Self::Literal(v) => name_file.contains(v.as_str()),
            Self::Glob(v) => v.is_match(name_file),
            Self::Regex(v) => v.is_match(name_file),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Map a destination leaf onto the structurally matching source directory.
///
/// The relative key is `path_dir_leaf` with `path_dir_dst_root` stripped
/// component-wise, so separators never matter. Returns `None` when the leaf is
/// not below the destination root.
///
/// # Examples
/// ```ignore
/// use std::path::Path;
/// let path_src = derive_source_leaf(
///     Path::new("/music/B/Album2"),
///     Path::new("/music"),
///     Path::new("/orig"),
/// );
/// assert_eq!(path_src.as_deref(), Some(Path::new("/orig/B/Album2")));
/// ```
pub(crate) fn derive_source_leaf(
    path_dir_leaf: &Path,
    path_dir_dst_root: &Path,
    path_dir_src_root: &Path,
) -> Option<PathBuf> {
    let path_key = path_dir_leaf.strip_prefix(path_dir_dst_root).ok()?;
    if path_key.as_os_str().is_empty() {
        return Some(path_dir_src_root.to_path_buf());
    }
    Some(path_dir_src_root.join(path_key))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Listing

#[derive(Debug, Clone)]
pub(crate) struct SpecDirChild {
    pub(crate) path_entry: PathBuf,
    pub(crate) name_entry: OsString,
    pub(crate) if_is_dir: bool,
    pub(crate) if_is_symlink: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct SpecFileCandidate {
    pub(crate) path_file_src: PathBuf,
    pub(crate) name_file: OsString,
}

/// Direct children of `path_dir`, sorted by name.
///
/// Symlinks are classified by their target so a link to a directory counts as
/// a subdirectory. Entries that vanish mid-listing are dropped.
pub(crate) fn list_dir_children(path_dir: &Path) -> io::Result<Vec<SpecDirChild>> {
    let mut l_children = Vec::new();
    for _entry_res in fs::read_dir(path_dir)? {
        let entry = _entry_res?;
        let path_entry = entry.path();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        let b_is_symlink = cfg_file_type.is_symlink();
        let b_is_dir = cfg_file_type.is_dir() || (b_is_symlink && path_entry.is_dir());
        l_children.push(SpecDirChild {
            path_entry,
            name_entry: entry.file_name(),
            if_is_dir: b_is_dir,
            if_is_symlink: b_is_symlink,
        });
    }
    l_children.sort_by(|a, b| a.name_entry.cmp(&b.name_entry));
    Ok(l_children)
}

/// Regular files directly inside `path_dir_src` whose names match `spec_pattern`,
/// sorted by name.
pub(crate) fn list_matching_files(
    path_dir_src: &Path,
    spec_pattern: &SpecSyncPattern,
) -> io::Result<Vec<SpecFileCandidate>> {
    let mut l_candidates = Vec::new();
    for _entry_res in fs::read_dir(path_dir_src)? {
        let entry = _entry_res?;
        let name_file = entry.file_name();
        if !spec_pattern.is_match(&name_file.to_string_lossy()) {
            continue;
        }
        let path_file_src = entry.path();
        // follows symlinks
        if !path_file_src.is_file() {
            continue;
        }
        l_candidates.push(SpecFileCandidate {
            path_file_src,
            name_file,
        });
    }
    l_candidates.sort_by(|a, b| a.name_file.cmp(&b.name_file));
    Ok(l_candidates)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyDecision

/// Decide whether `path_file_src` should replace `path_file_dst`.
///
/// Outdated means strictly older: equal modification times keep the target.
pub(crate) fn decide_file_copy(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_maintain_original: bool,
) -> io::Result<EnumSyncFileDecision> {
    let stat_dst = match fs::metadata(path_file_dst) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(EnumSyncFileDecision::CopyMissing);
        }
        Err(e) => return Err(e),
    };
    if if_maintain_original {
        return Ok(EnumSyncFileDecision::KeepProtected);
    }

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_src = FileTime::from_last_modification_time(&stat_src);
    let file_time_dst = FileTime::from_last_modification_time(&stat_dst);
    if file_time_dst < file_time_src {
        Ok(EnumSyncFileDecision::CopyOutdated)
    } else {
        Ok(EnumSyncFileDecision::KeepCurrent)
    }
}

/// Overwrite `path_file_dst` with the full contents of `path_file_src`.
///
/// The destination is created or truncated; both handles are closed before
/// returning on every path.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_keep_metadata: bool,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    if if_keep_metadata {
        apply_metadata(path_file_src, path_file_dst)?;
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::set_file_times;

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use filetime::{FileTime, set_file_mtime};
    use tempfile::TempDir;

    use super::{
        SpecSyncPattern, copy_file_with_metadata, decide_file_copy, derive_source_leaf,
        is_overlap, list_dir_children, list_matching_files,
    };
    use crate::spec::{EnumSyncFileDecision, EnumSyncPatternMode, SyncTreeError};

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    fn set_mtime(path: &Path, n_secs: i64) {
        set_file_mtime(path, FileTime::from_unix_time(n_secs, 0)).expect("set mtime");
    }

    #[test]
    fn derive_source_leaf_swaps_roots() {
        let cases = [
            ("/music/B/Album2", "/music", "/orig", Some("/orig/B/Album2")),
            ("/music/B/Album2", "/music/", "/orig/", Some("/orig/B/Album2")),
            ("/music/A", "/music", "/data/orig", Some("/data/orig/A")),
            ("/music", "/music", "/orig", Some("/orig")),
            ("/other/A", "/music", "/orig", None),
            ("/musicals/A", "/music", "/orig", None),
        ];
        for (leaf, dst_root, src_root, expected) in cases {
            let path_src = derive_source_leaf(Path::new(leaf), Path::new(dst_root), Path::new(src_root));
            assert_eq!(path_src, expected.map(PathBuf::from), "leaf={leaf} root={dst_root}");
        }
    }

    #[test]
    fn glob_pattern_matches_basenames_only() {
        let spec_pattern =
            SpecSyncPattern::from_raw("?older.*", EnumSyncPatternMode::Glob).expect("glob");
        assert!(spec_pattern.is_match("folder.jpg"));
        assert!(spec_pattern.is_match("Folder.png"));
        assert!(!spec_pattern.is_match("cover.jpg"));
        assert!(!spec_pattern.is_match("older.jpg"));
    }

    #[test]
    fn literal_and_regex_patterns() {
        let spec_literal =
            SpecSyncPattern::from_raw("flac", EnumSyncPatternMode::Literal).expect("literal");
        assert!(spec_literal.is_match("song.flac"));
        assert!(!spec_literal.is_match("song.mp3"));

        let spec_regex =
            SpecSyncPattern::from_raw(r"^\d+ .*\.flac$", EnumSyncPatternMode::Regex).expect("re");
        assert!(spec_regex.is_match("01 intro.flac"));
        assert!(!spec_regex.is_match("intro.flac"));
    }

    #[test]
    fn invalid_patterns_rejected() {
        let err = SpecSyncPattern::from_raw("[", EnumSyncPatternMode::Glob).expect_err("glob");
        assert!(matches!(err, SyncTreeError::InvalidPattern(_)));
        let err = SpecSyncPattern::from_raw("(", EnumSyncPatternMode::Regex).expect_err("regex");
        assert!(matches!(err, SyncTreeError::InvalidPattern(_)));
    }

    #[test]
    fn list_dir_children_sorted_and_classified() {
        let tmp = TempDir::new().expect("tempdir");
        write_text(&tmp.path().join("b.txt"), "b");
        write_text(&tmp.path().join("a.txt"), "a");
        std::fs::create_dir_all(tmp.path().join("c")).expect("mkdir");

        let l_children = list_dir_children(tmp.path()).expect("list");
        let l_names: Vec<_> = l_children
            .iter()
            .map(|c| c.name_entry.to_string_lossy().to_string())
            .collect();
        assert_eq!(l_names, vec!["a.txt", "b.txt", "c"]);
        assert!(!l_children[0].if_is_dir);
        assert!(l_children[2].if_is_dir);
        assert!(!l_children[2].if_is_symlink);
    }

    #[test]
    fn list_dir_children_missing_dir_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        assert!(list_dir_children(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn list_matching_files_skips_directories_and_non_matches() {
        let tmp = TempDir::new().expect("tempdir");
        write_text(&tmp.path().join("b.flac"), "b");
        write_text(&tmp.path().join("a.flac"), "a");
        write_text(&tmp.path().join("a.mp3"), "a");
        std::fs::create_dir_all(tmp.path().join("dir.flac")).expect("mkdir");

        let spec_pattern =
            SpecSyncPattern::from_raw("*.flac", EnumSyncPatternMode::Glob).expect("glob");
        let l_candidates = list_matching_files(tmp.path(), &spec_pattern).expect("list");
        let l_names: Vec<_> = l_candidates
            .iter()
            .map(|c| c.name_file.to_string_lossy().to_string())
            .collect();
        assert_eq!(l_names, vec!["a.flac", "b.flac"]);
    }

    #[test]
    fn decide_file_copy_table() {
        let tmp = TempDir::new().expect("tempdir");
        let path_src = tmp.path().join("src.flac");
        let path_dst = tmp.path().join("dst.flac");
        write_text(&path_src, "src");
        set_mtime(&path_src, 1_600_000_000);

        let decide = |if_maintain| decide_file_copy(&path_src, &path_dst, if_maintain).expect("decide");

        assert_eq!(decide(false), EnumSyncFileDecision::CopyMissing);
        assert_eq!(decide(true), EnumSyncFileDecision::CopyMissing);

        write_text(&path_dst, "dst");
        set_mtime(&path_dst, 1_500_000_000);
        assert_eq!(decide(false), EnumSyncFileDecision::CopyOutdated);
        assert_eq!(decide(true), EnumSyncFileDecision::KeepProtected);

        set_mtime(&path_dst, 1_600_000_000);
        assert_eq!(decide(false), EnumSyncFileDecision::KeepCurrent);

        set_mtime(&path_dst, 1_700_000_000);
        assert_eq!(decide(false), EnumSyncFileDecision::KeepCurrent);
        assert_eq!(decide(true), EnumSyncFileDecision::KeepProtected);
    }

    #[test]
    fn copy_truncates_longer_destination() {
        let tmp = TempDir::new().expect("tempdir");
        let path_src = tmp.path().join("src.txt");
        let path_dst = tmp.path().join("dst.txt");
        write_text(&path_src, "new");
        write_text(&path_dst, "old and much longer");

        copy_file_with_metadata(&path_src, &path_dst, false).expect("copy");
        assert_eq!(std::fs::read_to_string(&path_dst).expect("read"), "new");
    }

    #[test]
    fn copy_keeps_modification_time_when_requested() {
        let tmp = TempDir::new().expect("tempdir");
        let path_src = tmp.path().join("src.txt");
        let path_dst = tmp.path().join("dst.txt");
        write_text(&path_src, "meta");
        set_mtime(&path_src, 1_700_000_020);

        copy_file_with_metadata(&path_src, &path_dst, true).expect("copy");
        let stat_src = std::fs::metadata(&path_src).expect("src metadata");
        let stat_dst = std::fs::metadata(&path_dst).expect("dst metadata");
        assert_eq!(
            FileTime::from_last_modification_time(&stat_src),
            FileTime::from_last_modification_time(&stat_dst)
        );
    }

    #[test]
    fn overlap_detected_for_nested_roots() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).expect("mkdir");
        assert!(is_overlap(&src, &src.join("nested")));
        assert!(is_overlap(&src.join("nested"), &src));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));
    }
}
