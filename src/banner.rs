//! Startup banner, result display, and session summary.

use std::path::Path;

use crate::consts::{AUTHOR, HOMEPAGE, REPO};
use crate::events::RunId;
use crate::job::Job;
use crate::runner::Outcome;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub engine: &'a Path,
    pub engine_found: bool,
    pub artifact_dir: &'a Path,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    let status = if info.engine_found { "" } else { " (missing)" };
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             S Q U A S H               ║
   ║    compress and decompress, by proxy  ║
   ╚═══════════════════════════════════════╝

   version    {}
   by         {}
   home       {}
   repo       {}
   engine     {}{}
   artifacts  {}

   type /help for commands
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.engine.display(),
        status,
        info.artifact_dir.display(),
    );
}

/// Text shown when a run finishes.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success(text) => {
            format!("Operation Completed Successfully!\n{}", text.trim_end())
        }
        Outcome::Failure(text) => format!("error: {text}"),
    }
}

/// One line per finished run in the REPL.
pub fn render_completion(run: RunId, job: &Job, outcome: &Outcome) -> String {
    let marker = if outcome.is_success() { "✓" } else { "✗" };
    format!(
        "{marker} {run} {job}\n{}",
        indent(&render_outcome(outcome), "  ")
    )
}

/// Counts of finished runs for the summary line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl SessionTally {
    pub fn record(&mut self, outcome: &Outcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Print the session summary (run counts, orphaned engines, farewell).
pub fn print_session_summary(tally: SessionTally, still_running: usize) {
    if tally.total() > 0 {
        println!(
            "session: {} run(s), {} succeeded, {} failed",
            tally.total(),
            tally.succeeded,
            tally.failed
        );
    }
    if still_running > 0 {
        println!(
            "warning: {still_running} run(s) still in flight; their engine processes will finish on their own"
        );
    }
    println!("goodbye.");
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
