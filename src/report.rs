// src/report.rs
// =============================================================================
// Turns a RunReport into output.
//
// Human-readable (stderr, only when something is broken):
//
//   Found 2 file(s) with broken links:
//   - docs/a.md:
//     - #missing (dead)
//     - https://slow.example (error: request timed out)
//   - docs/b.md: could not read file: permission denied
//
// JSON (stdout, always): the RunReport serialized as-is.
// =============================================================================

use anyhow::Result;

use crate::audit::FileResult;
use crate::checker::LinkStatus;
use crate::coordinator::RunReport;

pub fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if report.is_success() {
        println!(
            "✅ No broken links in {} file(s)",
            report.files_checked
        );
    } else {
        eprint!("{}", render_failures(report));
    }
    Ok(())
}

/// Failure listing, grouped by file, links in the order they were extracted.
pub fn render_failures(report: &RunReport) -> String {
    let mut out = format!(
        "\n❌ Found {} file(s) with broken links:\n",
        report.failures.len()
    );

    for failure in &report.failures {
        let file = failure.file().display();
        match failure {
            FileResult::DeadLinks { dead_links, .. } => {
                out.push_str(&format!("- {}:\n", file));
                for result in dead_links {
                    out.push_str(&format!("  - {} ({})\n", result.link, describe(&result.status)));
                }
            }
            FileResult::Fatal { error, .. } => {
                out.push_str(&format!("- {}: {}\n", file, error));
            }
            FileResult::Success { .. } => {}
        }
    }

    out
}

// Errors carry their cause so "could not verify" reads differently from "broken"
fn describe(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Error { cause } => format!("error: {}", cause),
        other => other.label().to_string(),
    }
}
