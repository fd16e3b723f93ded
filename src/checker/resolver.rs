// src/checker/resolver.rs
// =============================================================================
// This module decides whether a local link points at an existing page.
//
// Documentation links usually leave the extension off, or point at a
// directory that has an index page. A candidate path is therefore tried
// against five layout variants, in priority order:
//
//   1. path            (as written, must be a file)
//   2. path.mdx
//   3. path.md
//   4. path/index.mdx
//   5. path/index.md
//
// All five are probed concurrently, but the winner is always the earliest
// variant (in the order above) that exists, never just the fastest probe.
//
// Results are memoized per candidate for the lifetime of one run. The cache
// is an explicit object owned by the run coordinator, so separate runs (and
// separate tests) never share state.
// =============================================================================

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::CheckError;

/// Outcome of resolving one candidate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The first layout variant that exists
    Found(PathBuf),
    /// None of the variants exist
    NotFound,
    /// No variant exists and at least one probe failed unexpectedly
    /// (anything other than "not found"), so we can't call it dead
    Failed(CheckError),
}

/// Run-scoped, memoizing path resolver.
///
/// Each candidate gets its own `OnceCell`: the first caller runs the probes,
/// concurrent callers for the same candidate wait on that same in-flight
/// resolution instead of probing the filesystem again. Entries are only ever
/// inserted, never replaced.
#[derive(Debug, Default)]
pub struct PathResolver {
    cache: Mutex<HashMap<PathBuf, Arc<OnceCell<Resolution>>>>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&self, candidate: &Path) -> Resolution {
        // The std mutex is only held to look up/insert the cell, never
        // across an await
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(candidate.to_path_buf()).or_default())
        };

        cell.get_or_init(|| probe_variants(candidate)).await.clone()
    }

    /// Number of distinct candidates seen so far in this run.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// The five layout variants for a candidate, highest priority first.
pub fn layout_variants(candidate: &Path) -> [PathBuf; 5] {
    let with_suffix = |suffix: &str| {
        let mut raw = candidate.as_os_str().to_os_string();
        raw.push(suffix);
        PathBuf::from(raw)
    };

    [
        candidate.to_path_buf(),
        with_suffix(".mdx"),
        with_suffix(".md"),
        candidate.join("index.mdx"),
        candidate.join("index.md"),
    ]
}

async fn probe_variants(candidate: &Path) -> Resolution {
    debug!(candidate = %candidate.display(), "resolving path (cache miss)");

    let variants = layout_variants(candidate);

    // join_all keeps the outcomes in the same order as the variants, so
    // walking them front to back gives us priority order regardless of
    // which probe finished first
    let outcomes = join_all(variants.iter().map(|variant| is_file(variant))).await;

    let mut failure: Option<io::Error> = None;
    for (variant, outcome) in variants.into_iter().zip(outcomes) {
        match outcome {
            Ok(true) => return Resolution::Found(variant),
            Ok(false) => {}
            Err(err) => {
                failure.get_or_insert(err);
            }
        }
    }

    match failure {
        Some(err) => Resolution::Failed(CheckError::Resolve {
            path: candidate.to_path_buf(),
            reason: err.to_string(),
        }),
        None => Resolution::NotFound,
    }
}

// Ok(false) for "plainly not there": missing, a directory, or a path that
// runs through a regular file ("page.md/index.md")
async fn is_file(path: &Path) -> io::Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::sync::OnceCell instead of just a HashMap of results?
//    - With a plain map, two files linking to the same page at the same
//      moment would both miss the cache and both hit the filesystem
//    - get_or_init() lets the first caller run the probes while everyone
//      else awaits the same result
//
// 2. Why a std Mutex in async code?
//    - It guards a quick map lookup and is released before any .await
//    - Holding a std Mutex across .await is the thing to avoid
//
// 3. Why join_all and not "first one wins"?
//    - join_all returns outputs in input order, not completion order
//    - So priority is decided by position, and a fast index.md can never
//      beat a slower guide.md
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, relative: &str) {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "# page\n").unwrap();
    }

    #[test]
    fn test_layout_variant_order() {
        let variants = layout_variants(Path::new("docs/guide"));
        assert_eq!(
            variants,
            [
                PathBuf::from("docs/guide"),
                PathBuf::from("docs/guide.mdx"),
                PathBuf::from("docs/guide.md"),
                PathBuf::from("docs/guide/index.mdx"),
                PathBuf::from("docs/guide/index.md"),
            ]
        );
    }

    #[tokio::test]
    async fn test_prefers_extension_over_index() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "foo.md");
        touch(&dir, "foo/index.md");

        let resolver = PathResolver::new();
        let resolution = resolver.resolve(&dir.path().join("foo")).await;
        assert_eq!(resolution, Resolution::Found(dir.path().join("foo.md")));
    }

    #[tokio::test]
    async fn test_prefers_mdx_over_md() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "guide.md");
        touch(&dir, "guide.mdx");

        let resolver = PathResolver::new();
        let resolution = resolver.resolve(&dir.path().join("guide")).await;
        assert_eq!(resolution, Resolution::Found(dir.path().join("guide.mdx")));
    }

    #[tokio::test]
    async fn test_exact_file_wins() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "notes.md");
        touch(&dir, "notes.md.mdx");

        let resolver = PathResolver::new();
        let resolution = resolver.resolve(&dir.path().join("notes.md")).await;
        assert_eq!(resolution, Resolution::Found(dir.path().join("notes.md")));
    }

    #[tokio::test]
    async fn test_directory_falls_through_to_index() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "section/index.mdx");

        let resolver = PathResolver::new();
        let resolution = resolver.resolve(&dir.path().join("section")).await;
        assert_eq!(
            resolution,
            Resolution::Found(dir.path().join("section/index.mdx"))
        );
    }

    #[tokio::test]
    async fn test_missing_everywhere() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new();
        let resolution = resolver.resolve(&dir.path().join("sibling")).await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_path_through_a_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "blocker");

        let resolver = PathResolver::new();
        let resolution = resolver.resolve(&dir.path().join("blocker/child")).await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_unexpected_io_error_is_failed() {
        let dir = TempDir::new().unwrap();
        // Longer than any filesystem allows for a single component
        let candidate = dir.path().join("x".repeat(300));

        let resolver = PathResolver::new();
        match resolver.resolve(&candidate).await {
            Resolution::Failed(CheckError::Resolve { path, reason }) => {
                assert_eq!(path, candidate);
                assert!(!reason.is_empty());
            }
            other => panic!("expected a resolve failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_hit_does_no_io() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "cached.md");
        let candidate = dir.path().join("cached");

        let resolver = PathResolver::new();
        let first = resolver.resolve(&candidate).await;

        // If the second call touched the filesystem it would see nothing
        fs::remove_file(dir.path().join("cached.md")).unwrap();
        let second = resolver.resolve(&candidate).await;

        assert_eq!(first, second);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_share_one_entry() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "shared/index.md");
        let candidate = dir.path().join("shared");

        let resolver = PathResolver::new();
        let results = join_all((0..16).map(|_| resolver.resolve(&candidate))).await;

        let expected = Resolution::Found(dir.path().join("shared/index.md"));
        assert!(results.iter().all(|r| *r == expected));
        assert_eq!(resolver.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_separate_resolvers_do_not_share_state() {
        let dir = TempDir::new().unwrap();
        let candidate = dir.path().join("late");

        let before = PathResolver::new();
        assert_eq!(before.resolve(&candidate).await, Resolution::NotFound);

        touch(&dir, "late.md");
        let after = PathResolver::new();
        assert_eq!(
            after.resolve(&candidate).await,
            Resolution::Found(dir.path().join("late.md"))
        );
    }
}
