use crate::outcome::RequestOutcome;
use crate::report::ReportCollector;
use crate::summary::{RunSummary, SkippedDeletePolicy};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha3::Digest;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// A record of one run, suitable for comparing runs over time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The name of the scenario that was run
    pub scenario_name: String,
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// The configuration the run was started with, flattened to strings
    pub settings: HashMap<String, String>,
    /// Users whose scenario failed and whose outcomes are missing from the summary
    pub failed_users: Vec<String>,
    pub summary: Option<RunSummary>,
}

impl RunRecord {
    pub fn new(
        run_id: String,
        scenario_name: String,
        started_at: i64,
        settings: HashMap<String, String>,
    ) -> Self {
        Self {
            run_id,
            scenario_name,
            started_at,
            settings,
            failed_users: Vec::with_capacity(0),
            summary: None,
        }
    }

    /// Compute a fingerprint for this run
    ///
    /// The fingerprint identifies the configuration used to run the scenario, so that runs with
    /// the same settings can be grouped. It covers the scenario name and the settings.
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.scenario_name.as_bytes());
        self.settings
            .iter()
            .sorted_by_key(|(k, _)| k.to_owned())
            .for_each(|(k, v)| {
                Digest::update(&mut hasher, k.as_bytes());
                Digest::update(&mut hasher, v.as_bytes());
            });

        format!("{:x}", hasher.finalize())
    }
}

/// Append the run record to a file
///
/// The record is serialized to JSON and written as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_record(run_record: &RunRecord, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    serde_json::to_writer(&mut file, run_record)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Load run records from a file written by [append_run_record]
pub fn load_run_records(path: PathBuf) -> anyhow::Result<Vec<RunRecord>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Summarises the run and appends a [RunRecord] to a JSONL file when finalized.
pub struct RunRecordCollector {
    path: PathBuf,
    record: RunRecord,
    policy: SkippedDeletePolicy,
    outcomes: Vec<RequestOutcome>,
}

impl RunRecordCollector {
    pub fn new(path: PathBuf, record: RunRecord, policy: SkippedDeletePolicy) -> Self {
        Self {
            path,
            record,
            policy,
            outcomes: Vec::new(),
        }
    }
}

impl ReportCollector for RunRecordCollector {
    fn add_outcomes(&mut self, outcomes: &[RequestOutcome]) {
        self.outcomes.extend_from_slice(outcomes);
    }

    fn add_failed_user(&mut self, user_id: &str) {
        self.record.failed_users.push(user_id.to_string());
    }

    fn finalize(&self) -> anyhow::Result<()> {
        let mut record = self.record.clone();
        record.summary = Some(RunSummary::from_outcomes(&self.outcomes, self.policy));

        log::info!(
            "Appending run record {} ({}) to {}",
            record.run_id,
            record.fingerprint(),
            self.path.display()
        );
        append_run_record(&record, self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgen_core::prelude::Operation;
    use pretty_assertions::assert_eq;

    fn sample_record(settings: &[(&str, &str)]) -> RunRecord {
        RunRecord::new(
            "abc".to_string(),
            "basket_crud".to_string(),
            1_700_000_000,
            settings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn fingerprint_ignores_setting_order_and_run_id() {
        let a = sample_record(&[("users", "5"), ("concurrency", "3")]);
        let mut b = sample_record(&[("concurrency", "3"), ("users", "5")]);
        b.run_id = "def".to_string();

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_settings() {
        let a = sample_record(&[("users", "5")]);
        let b = sample_record(&[("users", "6")]);

        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn collector_appends_one_line_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");

        for _ in 0..2 {
            let mut collector = RunRecordCollector::new(
                path.clone(),
                sample_record(&[("users", "1")]),
                SkippedDeletePolicy::default(),
            );
            collector.add_outcomes(&[RequestOutcome::skipped("user0", Operation::Delete)]);
            collector.add_failed_user("user1");
            collector.finalize().unwrap();
        }

        let records = load_run_records(path).unwrap();
        assert_eq!(2, records.len());
        assert_eq!(vec!["user1".to_string()], records[0].failed_users);

        let summary = records[1].summary.as_ref().unwrap();
        assert_eq!(1, summary.total_requests);
        assert_eq!(0, summary.attempted_requests);
    }
}
