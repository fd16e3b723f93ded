// src/main.rs
// =============================================================================
// Entry point of the doc-link-check CLI.
//
// What happens here:
// 1. Parse command-line arguments and validate them into a config
// 2. Collect the files to check (given explicitly, or discovered)
// 3. Audit every file concurrently and print the report
// 4. Exit with a proper code (0 = clean, 1 = broken links, 2 = error)
// =============================================================================

mod audit;
mod checker;
mod cli;
mod config;
mod coordinator;
mod discover;
mod error;
mod report;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::{CheckerConfig, FileSource};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Bad invocation or an unexpected fault: nothing was verified
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links or unreadable files found
//   Err   = configuration error or unexpected fault
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    let (config, source) = CheckerConfig::from_cli(&cli)?;

    let files = match source {
        FileSource::Explicit(files) => files,
        FileSource::Discover { root, exclude } => {
            discover::discover_markdown_files(&root, &exclude)
        }
    };

    let files = coordinator::markdown_files(files);
    if !cli.json {
        println!("Checking links in {} files", files.len());
    }

    let report = coordinator::run_checks(files, config).await?;

    report::print_report(&report, cli.json)?;

    Ok(report.exit_code())
}

// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool) -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, &directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

// RUST_LOG, when set, replaces the level picked by --verbose
fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_defaults_to_verbosity() {
        assert_eq!(log_filter(false, "").max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true, "").max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_rust_log_level_is_kept() {
        assert_eq!(log_filter(false, "warn").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(true, "error").max_level_hint(), Some(LevelFilter::ERROR));
    }
}
