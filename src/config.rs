// src/config.rs
// =============================================================================
// Validated run configuration.
//
// The CLI gives us raw strings and numbers; this module turns them into a
// CheckerConfig (compiled regexes, durations) plus a FileSource describing
// where the files come from. Anything wrong here is a ConfigError and the
// run stops before a single file is read.
//
// External links: by default the checker verifies internal links only, which
// is implemented as an ignore pattern for `^https?://` placed first in the
// list. `--check-external` simply leaves that pattern out.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Ignore pattern applied when external links are not being checked.
pub const EXTERNAL_LINK_PATTERN: &str = r"^https?://";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 50;

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Base directory root-relative links are joined onto
    pub docs_root: PathBuf,
    pub ignore_patterns: Vec<Regex>,
    pub check_external: bool,
    pub timeout: Duration,
    pub max_concurrent_requests: usize,
}

/// Where the list of files to audit comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Explicit(Vec<PathBuf>),
    Discover { root: PathBuf, exclude: Vec<String> },
}

impl CheckerConfig {
    pub fn build(
        docs_root: impl Into<PathBuf>,
        extra_ignore: &[String],
        check_external: bool,
        timeout_secs: u64,
        max_concurrent_requests: usize,
    ) -> Result<Self, ConfigError> {
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if max_concurrent_requests == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let defaults = (!check_external).then_some(EXTERNAL_LINK_PATTERN);
        let ignore_patterns = defaults
            .into_iter()
            .chain(extra_ignore.iter().map(String::as_str))
            .map(compile_pattern)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            docs_root: docs_root.into(),
            ignore_patterns,
            check_external,
            timeout: Duration::from_secs(timeout_secs),
            max_concurrent_requests,
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<(Self, FileSource), ConfigError> {
        let config = Self::build(
            cli.docs_root.clone(),
            &cli.ignore,
            cli.check_external,
            cli.timeout,
            cli.max_concurrent_requests,
        )?;

        let source = match (&cli.root, cli.files.is_empty()) {
            (Some(_), false) => return Err(ConfigError::ConflictingInputs),
            (root, true) => {
                let root = root.clone().unwrap_or_else(|| PathBuf::from("."));
                if !root.is_dir() {
                    return Err(ConfigError::MissingRoot { path: root });
                }
                FileSource::Discover {
                    root,
                    exclude: cli.exclude.clone(),
                }
            }
            (None, false) => FileSource::Explicit(cli.files.clone()),
        };

        Ok((config, source))
    }

    pub fn is_ignored(&self, link: &str) -> bool {
        self.ignore_patterns.iter().any(|pattern| pattern.is_match(link))
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidIgnorePattern {
        pattern: pattern.to_string(),
        source,
    })
}
