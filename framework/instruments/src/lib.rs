mod outcome;
mod report;
mod summary;

pub mod prelude {
    pub use crate::outcome::{OperationRecord, RequestOutcome};
    pub use crate::report::{
        append_run_record, load_run_records, ReportCollector, Reporter, RunRecord,
        RunRecordCollector, SummaryReportCollector,
    };
    pub use crate::summary::{OperationSummary, RunSummary, SkippedDeletePolicy};
}
