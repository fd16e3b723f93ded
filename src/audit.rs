// src/audit.rs
// =============================================================================
// Audits a single documentation file.
//
// 1. Read the file (failure here is fatal for this file only)
// 2. Extract its links and heading anchors
// 3. Check every link concurrently, all with the same anchors and base dir
// 4. Keep only the dead/error results, in extraction order
// =============================================================================

use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::checker::{extract_markdown_links, AnchorSet, CheckResult, LinkChecker};
use crate::error::{serialize_display, FatalFileError};

/// Overall verdict for one file.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FileResult {
    Success {
        file: PathBuf,
    },
    DeadLinks {
        file: PathBuf,
        dead_links: Vec<CheckResult>,
    },
    Fatal {
        file: PathBuf,
        #[serde(serialize_with = "serialize_display")]
        error: FatalFileError,
    },
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FileResult::Success { .. })
    }

    pub fn file(&self) -> &Path {
        match self {
            FileResult::Success { file }
            | FileResult::DeadLinks { file, .. }
            | FileResult::Fatal { file, .. } => file,
        }
    }
}

pub async fn audit_file(path: &Path, checker: &LinkChecker) -> FileResult {
    let content = match read_document(path).await {
        Ok(content) => content,
        Err(error) => {
            warn!(file = %path.display(), %error, "could not read file");
            return FileResult::Fatal {
                file: path.to_path_buf(),
                error,
            };
        }
    };

    let links = extract_markdown_links(&content);
    let anchors = AnchorSet::from_markdown(&content);
    // Only the derived sets are needed from here on
    drop(content);

    debug!(
        file = %path.display(),
        links = links.len(),
        anchors = anchors.len(),
        "extracted links"
    );

    let base_dir = base_dir(path);

    // join_all polls every check at once but hands results back in input
    // order, which is the order the links appear in the file
    let results = join_all(
        links
            .iter()
            .map(|link| checker.check(link, &base_dir, &anchors)),
    )
    .await;

    let dead_links: Vec<CheckResult> = results.into_iter().filter(|r| r.is_broken()).collect();

    if dead_links.is_empty() {
        FileResult::Success {
            file: path.to_path_buf(),
        }
    } else {
        FileResult::DeadLinks {
            file: path.to_path_buf(),
            dead_links,
        }
    }
}

async fn read_document(path: &Path) -> Result<String, FatalFileError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(String::from_utf8(bytes)?)
}

// Directory relative links are resolved from; "a.md" lives in "."
fn base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
