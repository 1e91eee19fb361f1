//! Terminal feedback for batch and discovery runs.
//!
//! Everything here writes to stderr; stdout carries only the JSON report.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::models::FindResult;

/// Check if stderr is a terminal.
pub fn is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Outcome of scanning one paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// At least one dataset found
    Found,
    /// Text retrieved, nothing matched
    Empty,
    /// No text, or invalid input
    Error,
}

impl Status {
    pub fn of(result: &FindResult) -> Self {
        if result.error.is_some() {
            Status::Error
        } else if result.has_datasets() {
            Status::Found
        } else {
            Status::Empty
        }
    }
}

pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Found => "✓",
        Status::Empty => "○",
        Status::Error => "✗",
    }
}

/// One line describing a finished paper.
pub fn result_line(result: &FindResult, colored: bool) -> String {
    let status = Status::of(result);
    let icon = status_icon(status);

    let detail = match status {
        Status::Error => result.error.clone().unwrap_or_default(),
        Status::Empty => format!("no datasets ({})", result.source),
        Status::Found => {
            let archives = result
                .archives
                .iter()
                .map(|(name, report)| format!("{}: {}", name, report.dataset_ids.join(", ")))
                .collect::<Vec<_>>()
                .join("; ");
            format!("{} ({})", archives, result.source)
        }
    };

    let mut line = if colored {
        match status {
            Status::Found => format!("{} {}  {}", icon.green().bold(), result.doi.bold(), detail),
            Status::Empty => format!("{} {}  {}", icon.dimmed(), result.doi, detail.dimmed()),
            Status::Error => format!("{} {}  {}", icon.red().bold(), result.doi, detail.red()),
        }
    } else {
        format!("{} {}  {}", icon, result.doi, detail)
    };

    if let Some(citing) = &result.cited_by {
        line.push_str(&format!("  [cited by {}]", citing));
    }
    line
}

/// Closing summary of a run.
pub fn summary_line(results: &[FindResult], elapsed: Duration, colored: bool) -> String {
    let with_datasets = results.iter().filter(|r| r.has_datasets()).count();
    let datasets: usize = results.iter().map(|r| r.dataset_count()).sum();
    let errors = results.iter().filter(|r| r.error.is_some()).count();

    let scanned = format!("Scanned {} papers", format_number(results.len()));
    let rest = format!(
        "{} with datasets, {} datasets, {} failed in {:.1}s",
        format_number(with_datasets),
        format_number(datasets),
        format_number(errors),
        elapsed.as_secs_f64()
    );

    if colored {
        format!("{}: {}", scanned.bold().cyan(), rest)
    } else {
        format!("{}: {}", scanned, rest)
    }
}

/// Format a number with thousands separators.
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Progress bar over the papers of a run.
pub struct ScanProgress {
    pb: ProgressBar,
    visible: bool,
}

impl ScanProgress {
    /// Create a bar on stderr; a hidden bar when `visible` is false.
    pub fn new(len: u64, visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let pb = ProgressBar::with_draw_target(Some(len), target);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {bar:40.cyan/blue} {pos}/{len} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
        );
        if visible {
            pb.enable_steady_tick(Duration::from_millis(100));
        }

        Self { pb, visible }
    }

    /// Discovery can add papers while running.
    pub fn set_length(&self, len: u64) {
        self.pb.set_length(len);
    }

    /// Record a finished paper, printing its line above a visible bar.
    pub fn complete(&self, line: &str) {
        if self.visible {
            self.pb.suspend(|| eprintln!("{}", line));
        }
        self.pb.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
