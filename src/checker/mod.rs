// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - markdown: extracts links and heading anchors from markdown/MDX text
// - html: extracts href/src targets from HTML/JSX embedded in markdown
// - resolver: maps local links onto files, memoized per run
// - http: probes external links with HEAD requests
// - link: classifies a link and decides alive/dead/ignored/error
//
// Data flows upward: extraction and resolution know nothing about checking,
// and the checker knows nothing about files or runs.
// =============================================================================

mod html;
mod http;
mod link;
mod markdown;
mod resolver;

pub use link::{CheckResult, LinkChecker, LinkKind, LinkStatus};
pub use markdown::{extract_markdown_links, AnchorSet};
pub use resolver::PathResolver;
