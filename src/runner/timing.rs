//! Per-task elapsed time reporting

use colored::Colorize;
use std::time::Duration;

/// Elapsed time of every task run in an invocation, in completion order
#[derive(Debug, Clone, Default)]
pub struct Timings {
    entries: Vec<(String, Duration)>,
}

impl Timings {
    /// Record a finished task
    pub fn record(&mut self, task: &str, elapsed: Duration) {
        self.entries.push((task.to_string(), elapsed));
    }

    pub fn entries(&self) -> &[(String, Duration)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the summary table printed after a run
    pub fn summary(&self, total: Duration) -> String {
        let width = self
            .entries
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Total".len());

        let mut out = format!("{}\n", "Execution Time".bold());
        for (name, elapsed) in &self.entries {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                name,
                format_duration(*elapsed),
                width = width
            ));
        }
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            "Total",
            format_duration(total),
            width = width
        ));
        out
    }
}

/// Format a duration the way the summary shows it: `850ms`, `12.3s`, `2m 5s`
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else {
        let secs = elapsed.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
