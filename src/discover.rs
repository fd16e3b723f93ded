// src/discover.rs
// =============================================================================
// Finds the markdown files to check when none are given on the command line.
//
// Walks the root recursively, skipping hidden directories (.git, .next, ...)
// and any directory named in the exclude list (node_modules by default).
// Entries are visited in file-name order so the report is stable from run
// to run.
// =============================================================================

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Extensions the checker treats as documentation.
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "mdx"];

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

pub fn discover_markdown_files(root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, exclude))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_markdown(entry.path()))
        .map(DirEntry::into_path)
        .collect();

    debug!(root = %root.display(), files = files.len(), "discovered markdown files");
    files
}

fn is_skipped_dir(entry: &DirEntry, exclude: &[String]) -> bool {
    // Never skip the root itself, even if it is "." or hidden
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.') || exclude.iter().any(|skip| skip == name))
}
