use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// The concrete files one invocation works on.
///
/// Order is the directory traversal order and is not sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// A set holding exactly `path`, whether or not it exists.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Final path segment of every file, in set order.
    pub fn base_names(&self) -> Vec<String> {
        self.paths.iter().map(|p| base_name(p)).collect()
    }
}

impl From<Vec<PathBuf>> for FileSet {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

/// Resolve `root` and an optional filename pattern into the files to process.
///
/// Without a pattern the result is `root` itself, unchecked; a missing file is
/// reported later by the metadata engine. With a pattern every non-directory
/// entry below `root` whose relative path matches `**/<pattern>` is returned,
/// so `*.jpg` finds JPEGs at any depth and `2025/*.jpg` those in any `2025`
/// directory. A missing or unreadable `root` yields an empty set.
///
/// # Example
///
/// ```rust,no_run
/// use exif_labels::resolver::resolve;
/// use std::path::Path;
///
/// let files = resolve(Path::new("/home/user/pictures"), Some("*.JPG")).unwrap();
/// println!("{} picture(s)", files.len());
/// ```
pub fn resolve(root: &Path, pattern: Option<&str>) -> Result<FileSet> {
    let Some(pattern) = pattern else {
        return Ok(FileSet::single(root));
    };

    let matcher = compile_pattern(pattern)?;
    let mut paths = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        // Links are not followed, but a linked directory must not reach the engine either.
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            paths.push(entry.into_path());
        }
    }

    log::debug!(
        "Resolved {} file(s) under {} matching {pattern:?}",
        paths.len(),
        root.display()
    );
    Ok(FileSet { paths })
}

/// Final path segment, including the extension.
pub fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let recursive = format!("**/{}", pattern.trim_start_matches("./"));
    GlobBuilder::new(&recursive)
        .literal_separator(true)
        .case_insensitive(cfg!(windows))
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
