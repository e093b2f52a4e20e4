mod run_record;
mod summary_report;

use crate::outcome::RequestOutcome;
use parking_lot::Mutex;

pub use run_record::{append_run_record, load_run_records, RunRecord, RunRecordCollector};
pub use summary_report::SummaryReportCollector;

pub trait ReportCollector {
    /// Add the complete batch of outcomes for one user.
    fn add_outcomes(&mut self, outcomes: &[RequestOutcome]);

    /// Note a user whose scenario failed and contributed no outcomes.
    fn add_failed_user(&mut self, _user_id: &str) {}

    fn finalize(&self) -> anyhow::Result<()>;
}

/// Fans outcomes out to every configured [ReportCollector].
///
/// The reporter is shared between the driver and the code that prints the final report, so the
/// collectors sit behind a lock and a whole batch is added under a single acquisition.
#[derive(Default)]
pub struct Reporter {
    collectors: Mutex<Vec<Box<dyn ReportCollector + Send>>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collector(self, collector: impl ReportCollector + Send + 'static) -> Self {
        self.collectors.lock().push(Box::new(collector));
        self
    }

    pub fn add_outcomes(&self, outcomes: &[RequestOutcome]) {
        for collector in self.collectors.lock().iter_mut() {
            collector.add_outcomes(outcomes);
        }
    }

    pub fn add_failed_user(&self, user_id: &str) {
        for collector in self.collectors.lock().iter_mut() {
            collector.add_failed_user(user_id);
        }
    }

    /// Finalize every collector, even if an earlier one fails. The first error is returned.
    pub fn finalize(&self) -> anyhow::Result<()> {
        let mut first_err = None;
        for collector in self.collectors.lock().iter() {
            if let Err(e) = collector.finalize() {
                log::error!("Failed to finalize report: {e:?}");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
