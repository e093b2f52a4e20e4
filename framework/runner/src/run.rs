use std::sync::Arc;

use loadgen_core::prelude::generate_users;
use loadgen_instruments::prelude::{
    Reporter, RunRecord, RunRecordCollector, RunSummary, SummaryReportCollector,
};

use crate::config::HarnessConfig;
use crate::definition::ScenarioDefinitionBuilder;
use crate::driver::{drive, UserCompletion};
use crate::executor::Executor;
use crate::progress::CompletionProgress;
use crate::scenario::ScenarioRunner;
use crate::transport::HttpTransport;
use crate::types::LoadgenResult;

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutput {
    pub summary: RunSummary,
    /// How each user's scenario ended, in completion order.
    pub completions: Vec<UserCompletion>,
    pub completed_users: Vec<String>,
    pub failed_users: Vec<String>,
    pub peak_active: usize,
}

/// Run a scenario to completion and print its report.
///
/// The transport is created by `transport_factory` once the configuration has been validated, so
/// a bad configuration is reported before any client is built or request sent. Failed requests
/// and failed users are reported but do not make the run fail.
pub fn run<T, F>(
    definition: ScenarioDefinitionBuilder,
    transport_factory: F,
) -> LoadgenResult<RunOutput>
where
    T: HttpTransport,
    F: FnOnce(&HarnessConfig) -> LoadgenResult<T>,
{
    let definition = definition.build()?;
    let config = Arc::new(definition.config);

    log::info!("Running scenario: {}", definition.name);

    let executor = Arc::new(Executor::try_new()?);
    let transport = Arc::new(transport_factory(&config)?);

    let mut reporter = Reporter::new().with_collector(SummaryReportCollector::new(
        config.skipped_delete_policy,
    ));
    if let Some(path) = definition.summary_file {
        let record = RunRecord::new(
            nanoid::nanoid!(),
            definition.name.clone(),
            chrono::Utc::now().timestamp(),
            config.settings(),
        );
        reporter = reporter.with_collector(RunRecordCollector::new(
            path,
            record,
            config.skipped_delete_policy,
        ));
    }

    println!(
        "Starting load test with {} users, {} requests each",
        config.users, config.requests_per_user
    );
    println!("Using base URL: {}", config.base_url);

    let users = generate_users(config.users);
    let progress = CompletionProgress::new(users.len(), definition.no_progress);
    let runner = ScenarioRunner::new(config.clone(), transport, executor);
    let mut completions = Vec::new();

    let output = drive(
        users,
        config.concurrency,
        move |user| runner.run(user),
        |completion, outcomes| {
            match completion {
                UserCompletion::Completed { .. } => reporter.add_outcomes(outcomes),
                UserCompletion::Failed { user_id, .. } => reporter.add_failed_user(user_id),
            }
            log::debug!("Collected results for user {}", completion.user_id());
            progress.report(completion);
            completions.push(completion.clone());
        },
    )?;
    progress.finish();

    if let Err(e) = reporter.finalize() {
        log::error!("Reporting failed for scenario {}: {:?}", definition.name, e);
    }

    Ok(RunOutput {
        summary: RunSummary::from_outcomes(&output.outcomes, config.skipped_delete_policy),
        completions,
        completed_users: output.completed_users,
        failed_users: output.failed_users,
        peak_active: output.peak_active,
    })
}
