use loadgen_core::prelude::Operation;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// The recorded result of one scenario iteration.
///
/// A `status_code` of `None` means that the operation was not attempted, which is what a scenario
/// records when its policy decides to skip a delete. That is a normal result and is distinct from
/// an attempt that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub user_id: String,
    pub operation: Operation,
    pub status_code: Option<u16>,
    pub latency_seconds: f64,
}

impl RequestOutcome {
    /// An outcome for an operation that the scenario chose not to perform.
    pub fn skipped(user_id: impl Into<String>, operation: Operation) -> Self {
        Self {
            user_id: user_id.into(),
            operation,
            status_code: None,
            latency_seconds: 0.0,
        }
    }

    pub fn is_attempted(&self) -> bool {
        self.status_code.is_some()
    }

    /// True for any attempted request that came back with a 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(200..=299))
    }
}

/// Times a single operation from the moment it is created until it is finished.
pub struct OperationRecord {
    user_id: String,
    operation: Operation,
    started: Instant,
}

impl OperationRecord {
    pub fn new(user_id: impl Into<String>, operation: Operation) -> Self {
        Self {
            user_id: user_id.into(),
            operation,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stop the clock and produce the outcome for this operation.
    pub fn finish(self, status_code: u16) -> RequestOutcome {
        RequestOutcome {
            latency_seconds: self.started.elapsed().as_secs_f64(),
            user_id: self.user_id,
            operation: self.operation,
            status_code: Some(status_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_record_is_attempted() {
        let outcome = OperationRecord::new("user0", Operation::Get).finish(204);

        assert_eq!("user0", outcome.user_id);
        assert!(outcome.is_attempted());
        assert!(outcome.is_success());
        assert!(outcome.latency_seconds >= 0.0);
    }

    #[test]
    fn skipped_is_neither_attempted_nor_successful() {
        let outcome = RequestOutcome::skipped("user1", Operation::Delete);

        assert!(!outcome.is_attempted());
        assert!(!outcome.is_success());
        assert_eq!(0.0, outcome.latency_seconds);
    }

    #[test]
    fn only_2xx_is_success() {
        let cases = [(199, false), (200, true), (299, true), (302, false), (500, false)];
        for (status, expected) in cases {
            let outcome = OperationRecord::new("user0", Operation::Update).finish(status);
            assert_eq!(expected, outcome.is_success(), "status {status}");
        }
    }
}
