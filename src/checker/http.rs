// src/checker/http.rs
// =============================================================================
// This module probes external links over HTTP.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - 2xx and 3xx mean alive, any other status means the link is dead
// - Network trouble (timeout, DNS, TLS, refused connection) is NOT "dead":
//   it means we could not tell, and is reported as an error with its cause
// - A semaphore bounds how many probes are in flight at once
//
// Nothing is retried: a flaky host shows up once, as an error.
// =============================================================================

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;
use tracing::warn;
use url::Url;

use crate::error::CheckError;

/// What a single probe found out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Server answered with a success or redirect status
    Alive(StatusCode),
    /// Server answered, and the answer was "no"
    Dead(StatusCode),
    /// We never got a usable answer
    Failed(CheckError),
}

/// Shared HTTP prober for one run.
///
/// `Client` pools connections internally, so one instance serves every
/// external link in the run.
#[derive(Debug, Clone)]
pub struct ExternalProbe {
    client: Client,
    permits: Arc<Semaphore>,
}

impl ExternalProbe {
    pub fn new(timeout: Duration, max_concurrent_requests: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(max_concurrent_requests)),
        })
    }

    pub async fn probe(&self, link: &str) -> ProbeOutcome {
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => return ProbeOutcome::Failed(CheckError::InvalidUrl(e.to_string())),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return ProbeOutcome::Failed(CheckError::UnsupportedScheme(url.scheme().to_string()));
        }

        // Held until the response (or error) is in
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return ProbeOutcome::Failed(CheckError::Request(e.to_string())),
        };

        match self.client.head(url).send().await {
            Ok(response) => analyze_response(response.status()),
            Err(e) => {
                let cause = categorize_error(&e);
                warn!(link, %cause, "could not probe external link");
                ProbeOutcome::Failed(cause)
            }
        }
    }
}

// Maps an HTTP status to alive/dead
//
// - 200-299: Success
// - 300-399: Redirect (left over after the redirect policy gave up following)
// - anything else: the server says the link is broken
fn analyze_response(status: StatusCode) -> ProbeOutcome {
    if status.is_success() || status.is_redirection() {
        ProbeOutcome::Alive(status)
    } else {
        ProbeOutcome::Dead(status)
    }
}

// Categorizes reqwest errors into something an operator can act on
//
// reqwest's top-level message is generic ("error sending request for url")
// and embeds the URL, so keyword matching only looks at the source chain.
// A host named dnsimple.com must not look like a DNS failure.
fn categorize_error(error: &reqwest::Error) -> CheckError {
    let causes = source_chain(error);
    let lowered = causes.to_lowercase();
    let chain = if causes.is_empty() {
        error.to_string()
    } else {
        format!("{}: {}", error, causes)
    };

    if error.is_timeout() {
        CheckError::Timeout
    } else if error.is_redirect() {
        CheckError::TooManyRedirects
    } else if lowered.contains("dns") || lowered.contains("failed to lookup address") {
        CheckError::Dns(chain)
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
        CheckError::Tls(chain)
    } else if error.is_connect() {
        CheckError::Connect(chain)
    } else {
        CheckError::Request(chain)
    }
}

fn source_chain(error: &dyn Error) -> String {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(inner) = source {
        causes.push(inner.to_string());
        source = inner.source();
    }
    causes.join(": ")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does the Semaphore do?
//    - It hands out a fixed number of permits
//    - Each probe holds one while its request is in flight
//    - Everything else waits in acquire(), so a page with 500 links never
//      opens 500 connections at once
//
// 2. Why is a timeout an error and not "dead"?
//    - Dead means the server told us the page is gone
//    - A timeout only tells us we didn't hear back
// -----------------------------------------------------------------------------
