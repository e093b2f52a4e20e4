use crate::outcome::RequestOutcome;
use loadgen_core::prelude::Operation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How operations that were skipped by policy, rather than attempted, are counted in success
/// rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkippedDeletePolicy {
    /// A skipped operation counts towards both the successes and the denominator.
    #[default]
    CountAsSuccess,
    /// A skipped operation is left out of the success rate entirely.
    Exclude,
}

/// Aggregated results for a single operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub operation: Operation,
    /// Requests that were sent, whatever their result.
    pub attempted: usize,
    /// Iterations where the operation was selected but not sent.
    pub skipped: usize,
    /// Numerator of the success rate.
    pub successes: usize,
    /// Denominator of the success rate.
    pub counted: usize,
    pub average_latency_seconds: f64,
    pub min_latency_seconds: f64,
    pub max_latency_seconds: f64,
}

impl OperationSummary {
    fn empty(operation: Operation) -> Self {
        Self {
            operation,
            attempted: 0,
            skipped: 0,
            successes: 0,
            counted: 0,
            average_latency_seconds: 0.0,
            min_latency_seconds: 0.0,
            max_latency_seconds: 0.0,
        }
    }

    /// Success rate as a percentage, `None` when nothing was counted.
    pub fn success_rate(&self) -> Option<f64> {
        percentage(self.successes, self.counted)
    }
}

/// The summary of a whole run, derived from every collected [RequestOutcome].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Every outcome, including skipped operations.
    pub total_requests: usize,
    pub attempted_requests: usize,
    /// Mean latency over attempted requests. Zero when nothing was attempted.
    pub average_latency_seconds: f64,
    pub skipped_delete_policy: SkippedDeletePolicy,
    /// One entry per operation that appeared in the run, in [Operation] order.
    pub operations: Vec<OperationSummary>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[RequestOutcome], policy: SkippedDeletePolicy) -> Self {
        let mut by_operation = BTreeMap::<Operation, (OperationSummary, f64)>::new();

        for outcome in outcomes {
            let (summary, total_latency) = by_operation
                .entry(outcome.operation)
                .or_insert_with(|| (OperationSummary::empty(outcome.operation), 0.0));

            if outcome.is_attempted() {
                let latency = outcome.latency_seconds.max(0.0);
                if summary.attempted == 0 {
                    summary.min_latency_seconds = latency;
                    summary.max_latency_seconds = latency;
                } else {
                    summary.min_latency_seconds = summary.min_latency_seconds.min(latency);
                    summary.max_latency_seconds = summary.max_latency_seconds.max(latency);
                }
                summary.attempted += 1;
                summary.counted += 1;
                *total_latency += latency;
                if outcome.is_success() {
                    summary.successes += 1;
                }
            } else {
                summary.skipped += 1;
                if policy == SkippedDeletePolicy::CountAsSuccess {
                    summary.counted += 1;
                    summary.successes += 1;
                }
            }
        }

        let attempted_requests = by_operation.values().map(|(s, _)| s.attempted).sum();
        let total_latency: f64 = by_operation.values().map(|(_, latency)| latency).sum();

        let operations = by_operation
            .into_values()
            .map(|(mut summary, total_latency)| {
                summary.average_latency_seconds = mean(total_latency, summary.attempted);
                summary
            })
            .collect();

        Self {
            total_requests: outcomes.len(),
            attempted_requests,
            average_latency_seconds: mean(total_latency, attempted_requests),
            skipped_delete_policy: policy,
            operations,
        }
    }

    pub fn operation(&self, operation: Operation) -> Option<&OperationSummary> {
        self.operations.iter().find(|s| s.operation == operation)
    }

    pub fn successes(&self) -> usize {
        self.operations.iter().map(|s| s.successes).sum()
    }

    pub fn counted(&self) -> usize {
        self.operations.iter().map(|s| s.counted).sum()
    }

    /// Overall success rate as a percentage, `None` when nothing was counted.
    pub fn success_rate(&self) -> Option<f64> {
        percentage(self.successes(), self.counted())
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn percentage(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64 * 100.0)
    }
}
