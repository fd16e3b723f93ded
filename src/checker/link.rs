// src/checker/link.rs
// =============================================================================
// This module classifies a single link and decides its fate.
//
// Every link string lands in exactly one of four states:
//
//   alive    - the target exists (file, heading anchor, or HTTP success)
//   dead     - confirmed broken (no such file/anchor, HTTP failure status)
//   ignored  - matched an ignore pattern, never looked at
//   error    - we could not find out (network failure, odd I/O error)
//
// The kind of link is decided from its prefix alone:
//
//   "#intro"              -> anchor       (checked against this file's headings)
//   "/docs/guide"         -> absolute-doc (joined onto the docs root)
//   "https://..."         -> external     (HEAD probe)
//   "./sibling", "a/b.md" -> relative     (joined onto the file's directory)
// =============================================================================

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::debug;

use super::http::{ExternalProbe, ProbeOutcome};
use super::markdown::AnchorSet;
use super::resolver::{PathResolver, Resolution};
use crate::config::CheckerConfig;
use crate::error::{serialize_display, CheckError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Anchor,
    AbsoluteDoc,
    Relative,
    External,
}

impl LinkKind {
    pub fn classify(link: &str) -> Self {
        if link.starts_with('#') {
            LinkKind::Anchor
        } else if link.starts_with('/') {
            LinkKind::AbsoluteDoc
        } else if has_scheme(link) {
            LinkKind::External
        } else {
            LinkKind::Relative
        }
    }
}

// RFC 3986 scheme: a letter, then letters, digits, '+', '-' or '.', then ':'
fn has_scheme(link: &str) -> bool {
    let Some((scheme, _rest)) = link.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Outcome of checking one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    Alive {
        /// Filesystem path the link resolved to, for local links
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved: Option<PathBuf>,
    },
    Dead {
        reason: String,
    },
    Ignored,
    Error {
        #[serde(serialize_with = "serialize_display")]
        cause: CheckError,
    },
}

impl LinkStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Alive { .. } => "alive",
            LinkStatus::Dead { .. } => "dead",
            LinkStatus::Ignored => "ignored",
            LinkStatus::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub link: String,
    pub kind: LinkKind,
    #[serde(flatten)]
    pub status: LinkStatus,
}

impl CheckResult {
    /// Dead and error links both count against the file.
    pub fn is_broken(&self) -> bool {
        matches!(self.status, LinkStatus::Dead { .. } | LinkStatus::Error { .. })
    }
}

/// Checks links for one run.
///
/// Holds everything a check needs that is the same for every file: the docs
/// root, ignore patterns, the run's path resolver and the HTTP prober.
#[derive(Debug)]
pub struct LinkChecker {
    config: CheckerConfig,
    resolver: Arc<PathResolver>,
    probe: ExternalProbe,
}

impl LinkChecker {
    pub fn new(config: CheckerConfig, resolver: Arc<PathResolver>) -> Result<Self, reqwest::Error> {
        let probe = ExternalProbe::new(config.timeout, config.max_concurrent_requests)?;
        Ok(Self {
            config,
            resolver,
            probe,
        })
    }

    /// Checks `link` as it appears in a file living in `base_dir`, whose
    /// headings produced `anchors`.
    pub async fn check(&self, link: &str, base_dir: &Path, anchors: &AnchorSet) -> CheckResult {
        let kind = LinkKind::classify(link);

        let status = if self.config.is_ignored(link) {
            LinkStatus::Ignored
        } else {
            match kind {
                LinkKind::Anchor => check_anchor(link, anchors),
                LinkKind::AbsoluteDoc => {
                    let path = local_path(link);
                    let relative = path.trim_start_matches('/');
                    self.check_local(self.config.docs_root.join(relative)).await
                }
                LinkKind::Relative => self.check_local(base_dir.join(&*local_path(link))).await,
                LinkKind::External => self.check_external(link).await,
            }
        };

        debug!(link, ?kind, status = status.label(), "checked link");

        CheckResult {
            link: link.to_string(),
            kind,
            status,
        }
    }

    async fn check_local(&self, candidate: PathBuf) -> LinkStatus {
        match self.resolver.resolve(&candidate).await {
            Resolution::Found(path) => LinkStatus::Alive {
                resolved: Some(path),
            },
            Resolution::NotFound => LinkStatus::Dead {
                reason: format!("no page found at {}", candidate.display()),
            },
            Resolution::Failed(cause) => LinkStatus::Error { cause },
        }
    }

    async fn check_external(&self, link: &str) -> LinkStatus {
        match self.probe.probe(link).await {
            ProbeOutcome::Alive(status) => {
                debug!(link, status = status.as_u16(), "external link answered");
                LinkStatus::Alive { resolved: None }
            }
            ProbeOutcome::Dead(status) => LinkStatus::Dead {
                reason: format!("HTTP {}", status.as_u16()),
            },
            ProbeOutcome::Failed(cause) => LinkStatus::Error { cause },
        }
    }
}

fn check_anchor(link: &str, anchors: &AnchorSet) -> LinkStatus {
    let slug = link.trim_start_matches('#');
    if anchors.contains(slug) {
        LinkStatus::Alive { resolved: None }
    } else if anchors.is_empty() {
        LinkStatus::Dead {
            reason: format!("no heading with anchor `{}` (file has no headings)", slug),
        }
    } else {
        LinkStatus::Dead {
            reason: format!("no heading with anchor `{}`", slug),
        }
    }
}

// Link paths are URL paths: the query string means nothing on the
// filesystem and escapes stand for real characters
//
//   "./page?tab=2"  -> "./page"
//   "./my%20page"   -> "./my page"
fn local_path(link: &str) -> Cow<'_, str> {
    let path = link.split_once('?').map_or(link, |(path, _query)| path);
    percent_decode_str(path).decode_utf8_lossy()
}
