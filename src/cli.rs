// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every option can also come from a DOC_LINK_CHECK_* environment variable,
// which is handy in CI where the invocation is fixed but settings vary.
//
// Parsing only checks shapes (numbers are numbers, etc.). Whether the values
// make sense together is decided in config.rs.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_TIMEOUT_SECS};

#[derive(Parser, Debug)]
#[command(
    name = "doc-link-check",
    version,
    about = "Checks markdown/MDX documentation for broken links and anchors",
    long_about = "doc-link-check extracts every link and heading anchor from markdown/MDX files, \
                  resolves local links against the docs layout, optionally probes external links, \
                  and exits non-zero if anything is broken. Built for CI."
)]
pub struct Cli {
    /// Markdown/MDX files to check
    ///
    /// When omitted, files are discovered recursively under --root.
    /// Files without a .md/.mdx extension are skipped.
    pub files: Vec<PathBuf>,

    /// Directory to discover markdown files in (default: current directory)
    #[arg(long, env = "DOC_LINK_CHECK_ROOT")]
    pub root: Option<PathBuf>,

    /// Base directory for root-relative links (`/docs/guide`)
    #[arg(long, env = "DOC_LINK_CHECK_DOCS_ROOT", default_value = "src/pages")]
    pub docs_root: PathBuf,

    /// Regular expression for links to skip (repeatable)
    #[arg(
        long = "ignore",
        value_name = "REGEX",
        env = "DOC_LINK_CHECK_IGNORE",
        value_delimiter = ','
    )]
    pub ignore: Vec<String>,

    /// Also probe external http(s) links (skipped by default)
    #[arg(long, env = "DOC_LINK_CHECK_EXTERNAL")]
    pub check_external: bool,

    /// Per-request timeout for external probes, in seconds
    #[arg(
        long,
        value_name = "SECS",
        env = "DOC_LINK_CHECK_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub timeout: u64,

    /// Maximum number of external probes in flight at once
    #[arg(
        long,
        value_name = "N",
        env = "DOC_LINK_CHECK_MAX_CONCURRENT_REQUESTS",
        default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS
    )]
    pub max_concurrent_requests: usize,

    /// Directory name to skip during discovery (repeatable)
    #[arg(
        long,
        value_name = "DIR",
        env = "DOC_LINK_CHECK_EXCLUDE",
        value_delimiter = ',',
        default_value = "node_modules"
    )]
    pub exclude: Vec<String>,

    /// Print the report as JSON on stdout
    #[arg(long, env = "DOC_LINK_CHECK_JSON")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, env = "DOC_LINK_CHECK_VERBOSE")]
    pub verbose: bool,
}
