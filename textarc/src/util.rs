use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// How [`collect_files`] turns a tree on disk into archive entries.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub recursive: bool,
    pub follow: bool,
    pub trim: bool,
    pub name: Option<glob::Pattern>,
    pub depth: Option<usize>,
}

/// Walk `root` and yield `(entry name, bytes)` pairs in deterministic
/// (sorted) order.
///
/// Symbolic links are skipped unless `follow` is set, so a link cannot pull
/// content from outside the scanned tree. `trim` stores paths relative to
/// `root` (the base name when `root` is itself a file); otherwise the path
/// is stored as given.
pub fn collect_files(root: &Path, opts: &CollectOptions) -> Result<Vec<(String, Vec<u8>)>> {
    let mut max_depth = opts.depth.unwrap_or(usize::MAX);
    if !opts.recursive {
        max_depth = max_depth.min(1);
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(opts.follow)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| Error::WalkDirectory {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if !opts.follow && entry.path_is_symlink() {
            continue;
        }
        if let Some(pattern) = &opts.name {
            if !pattern.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }
        }

        let stored: PathBuf = if opts.trim {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if rel.as_os_str().is_empty() {
                PathBuf::from(entry.file_name())
            } else {
                rel.to_path_buf()
            }
        } else {
            entry.path().to_path_buf()
        };

        let data = fs::read(entry.path()).map_err(|source| Error::ReadFile {
            path: entry.path().to_path_buf(),
            source,
        })?;
        out.push((archive_name(&stored)?, data));
    }

    tracing::debug!(root = %root.display(), entries = out.len(), "collected files");
    Ok(out)
}

/// Convert a filesystem path to an archive entry name, mapping the
/// platform separator to `/`.
pub fn archive_name(path: &Path) -> Result<String> {
    let raw = path.to_str().ok_or_else(|| Error::UnrepresentableName {
        path: path.to_path_buf(),
    })?;
    if MAIN_SEPARATOR == '/' {
        Ok(raw.to_string())
    } else {
        Ok(raw
            .split(MAIN_SEPARATOR)
            .collect::<Vec<_>>()
            .join("/"))
    }
}

/// Whether a requested name contains glob metacharacters.
pub fn is_glob(name: &str) -> bool {
    name.contains(['*', '?', '[', ']'])
}

pub fn compile_pattern(pattern: &str) -> Result<glob::Pattern> {
    glob::Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
