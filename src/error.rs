// src/error.rs
// =============================================================================
// Error taxonomy for the checker.
//
// - ConfigError: bad invocation, aborts the run before any file is audited
// - CheckError: a link whose state could not be determined (reported as
//   `error`, never confused with a confirmed `dead` link)
// - FatalFileError: a file that could not be read or decoded; recorded
//   against that file only
//
// Dead links are not errors at all: they are a normal check outcome.
// =============================================================================

use std::path::PathBuf;

use serde::Serializer;

/// Invalid invocation. Surfaced before auditing begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("--timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("--max-concurrent-requests must be at least 1")]
    ZeroConcurrency,

    #[error("--root cannot be combined with an explicit file list")]
    ConflictingInputs,

    #[error("discovery root is not a directory: {}", path.display())]
    MissingRoot { path: PathBuf },
}

/// Indeterminate outcome of a single link check.
///
/// The network variants mirror the categories the HTTP client can tell apart,
/// so the report can say *why* a link could not be verified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("request timed out")]
    Timeout,

    #[error("could not resolve host: {0}")]
    Dns(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("request failed: {0}")]
    Request(String),

    #[error("unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("could not resolve {}: {reason}", path.display())]
    Resolve { path: PathBuf, reason: String },
}

/// The file itself could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum FatalFileError {
    #[error("could not read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Serializes any error through its `Display` message.
///
/// Used by the JSON report, where only the human-readable cause matters.
pub fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
