mod operations_table;

use crate::outcome::RequestOutcome;
use crate::report::summary_report::operations_table::{rate, OperationRow};
use crate::report::ReportCollector;
use crate::summary::{RunSummary, SkippedDeletePolicy};
use std::fmt::Write;
use tabled::settings::Style;
use tabled::Table;

/// Keeps every outcome in memory and prints a summary table plus totals when finalized.
pub struct SummaryReportCollector {
    outcomes: Vec<RequestOutcome>,
    policy: SkippedDeletePolicy,
}

impl SummaryReportCollector {
    pub fn new(policy: SkippedDeletePolicy) -> Self {
        Self {
            outcomes: Vec::new(),
            policy,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes, self.policy)
    }

    pub fn render(&self) -> String {
        render_summary(&self.summary())
    }
}

fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    if summary.operations.is_empty() {
        out.push_str("\nNo requests were recorded\n");
    } else {
        let rows = summary
            .operations
            .iter()
            .map(|op| OperationRow {
                operation: op.operation.to_string(),
                attempted: op.attempted,
                skipped: op.skipped,
                successes: op.successes,
                success_rate: op.success_rate(),
                avg_time_ms: op.average_latency_seconds * 1000.0,
                min_time_ms: op.min_latency_seconds * 1000.0,
                max_time_ms: op.max_latency_seconds * 1000.0,
            })
            .collect::<Vec<_>>();

        let mut table = Table::new(rows);
        table.with(Style::modern());

        let _ = writeln!(out, "\nSummary of operations\n{table}");
    }

    let _ = writeln!(out, "\nTotal requests: {}", summary.total_requests);
    let _ = writeln!(
        out,
        "Attempted requests: {} (skipped {})",
        summary.attempted_requests,
        summary.total_requests - summary.attempted_requests
    );
    let _ = writeln!(
        out,
        "Average response time: {:.2}ms",
        summary.average_latency_seconds * 1000.0
    );
    let _ = writeln!(
        out,
        "Success rate: {} ({}/{})",
        rate(&summary.success_rate()),
        summary.successes(),
        summary.counted()
    );
    for op in &summary.operations {
        let _ = writeln!(
            out,
            "  {}: {}",
            op.operation,
            rate(&op.success_rate())
        );
    }

    out
}

impl ReportCollector for SummaryReportCollector {
    fn add_outcomes(&mut self, outcomes: &[RequestOutcome]) {
        self.outcomes.extend_from_slice(outcomes);
    }

    fn finalize(&self) -> anyhow::Result<()> {
        println!("{}", self.render());
        Ok(())
    }
}
