// src/coordinator.rs
// =============================================================================
// Drives a whole run: every file is audited concurrently and independently,
// then the non-successful results are collected into a RunReport.
//
// The path resolver is created here, once per run, and shared by every file
// through the LinkChecker. Nothing outlives the run.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::audit::{audit_file, FileResult};
use crate::checker::{LinkChecker, PathResolver};
use crate::config::CheckerConfig;
use crate::discover::is_markdown;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub files_checked: usize,
    /// Every file that was not a clean success, in audit order
    pub failures: Vec<FileResult>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 when everything checked out, 1 when anything is broken or fatal.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Drops anything that isn't a .md/.mdx file. Not an error, just not ours.
pub fn markdown_files(files: Vec<PathBuf>) -> Vec<PathBuf> {
    files.into_iter().filter(|file| is_markdown(file)).collect()
}

pub async fn run_checks(files: Vec<PathBuf>, config: CheckerConfig) -> Result<RunReport> {
    let files = markdown_files(files);
    info!(
        files = files.len(),
        check_external = config.check_external,
        "checking links"
    );

    let resolver = Arc::new(PathResolver::new());
    let checker =
        LinkChecker::new(config, Arc::clone(&resolver)).context("failed to build HTTP client")?;

    // One audit per file, all in flight together; a failing file only
    // affects its own result
    let results = join_all(files.iter().map(|file| audit_file(file, &checker))).await;

    debug!(paths = resolver.cached_len(), "distinct paths resolved");

    let failures: Vec<FileResult> = results.into_iter().filter(|r| !r.is_success()).collect();

    info!(
        files = files.len(),
        failures = failures.len(),
        "finished checking links"
    );

    Ok(RunReport {
        files_checked: files.len(),
        failures,
    })
}
