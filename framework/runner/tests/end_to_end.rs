mod common;

use common::{request_user, sample_cli_cfg, StubResponse, StubTransport};
use loadgen_runner::prelude::*;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn every_user_completes_every_request() {
    let transport = StubTransport::always(200);
    let handle = transport.clone();

    let output = run(
        ScenarioDefinitionBuilder::new("every_user_completes_every_request", sample_cli_cfg()),
        move |_| Ok(transport),
    )
    .unwrap();

    assert_eq!(50, output.summary.total_requests);
    assert_eq!(Some(100.0), output.summary.success_rate());
    assert_eq!(5, output.completed_users.len());
    assert!(output.failed_users.is_empty());
    assert!(output.peak_active <= 3, "peak {}", output.peak_active);
    assert_eq!(output.summary.attempted_requests, handle.request_count());

    let mut lines = output
        .completions
        .iter()
        .map(completion_line)
        .collect::<Vec<_>>();
    lines.sort();
    assert_eq!(
        (0..5)
            .map(|i| format!("User user{i} completed 10 requests"))
            .collect::<Vec<_>>(),
        lines
    );

    assert_eq!(20, output.summary.operation(Operation::Get).unwrap().attempted);
    assert_eq!(15, output.summary.operation(Operation::Update).unwrap().attempted);
    let deletes = output.summary.operation(Operation::Delete).unwrap();
    assert_eq!(15, deletes.attempted + deletes.skipped);
}

#[test]
fn concurrency_limit_is_respected() {
    let transport = StubTransport::with_delay(
        |_| StubResponse::Status(200),
        Duration::from_millis(30),
    );
    let handle = transport.clone();

    let output = run(
        ScenarioDefinitionBuilder::new(
            "concurrency_limit_is_respected",
            LoadgenCli {
                users: 6,
                requests_per_user: 3,
                concurrency: 3,
                ..sample_cli_cfg()
            },
        ),
        move |_| Ok(transport),
    )
    .unwrap();

    assert_eq!(18, output.summary.total_requests);
    // Users are run side by side up to the limit, and never beyond it
    assert_eq!(3, output.peak_active);
    assert!(handle.peak_in_flight() <= 3, "peak {}", handle.peak_in_flight());
}

#[test]
fn invalid_configuration_sends_nothing() {
    let mut transport_built = false;

    let result = run(
        ScenarioDefinitionBuilder::new(
            "invalid_configuration_sends_nothing",
            LoadgenCli {
                users: 0,
                ..sample_cli_cfg()
            },
        ),
        |_| {
            transport_built = true;
            Ok(StubTransport::always(200))
        },
    );

    let err = result.unwrap_err();
    assert_eq!(Some(&ConfigError::NoUsers), err.downcast_ref::<ConfigError>());
    assert!(!transport_built);
}

#[test]
fn transport_factory_error_is_returned() {
    let result = run(
        ScenarioDefinitionBuilder::new("transport_factory_error_is_returned", sample_cli_cfg()),
        |_| -> LoadgenResult<StubTransport> { Err(anyhow::anyhow!("No client for you")) },
    );

    assert_eq!("No client for you", result.unwrap_err().to_string());
}

#[test]
fn failed_user_is_excluded_from_the_summary() {
    let transport = StubTransport::new(|request| {
        if request_user(request).as_deref() == Some("user2") {
            StubResponse::Bail
        } else {
            StubResponse::Status(200)
        }
    });

    let output = run(
        ScenarioDefinitionBuilder::new(
            "failed_user_is_excluded_from_the_summary",
            sample_cli_cfg(),
        ),
        move |_| Ok(transport),
    )
    .unwrap();

    assert_eq!(vec!["user2".to_string()], output.failed_users);
    let failed = output
        .completions
        .iter()
        .filter(|c| matches!(c, UserCompletion::Failed { .. }))
        .collect::<Vec<_>>();
    assert_eq!(1, failed.len());
    assert_eq!("user2", failed[0].user_id());
    assert!(completion_line(failed[0]).starts_with("Error with user user2: "));
    assert_eq!(4, output.completed_users.len());
    assert_eq!(40, output.summary.total_requests);
    assert_eq!(Some(100.0), output.summary.success_rate());
}

#[test]
fn transport_failures_do_not_stop_the_run() {
    let output = run(
        ScenarioDefinitionBuilder::new(
            "transport_failures_do_not_stop_the_run",
            LoadgenCli {
                skipped_delete: SkippedDeleteOpt::Exclude,
                ..sample_cli_cfg()
            },
        ),
        |_| Ok(StubTransport::new(|_| StubResponse::TransportError)),
    )
    .unwrap();

    assert_eq!(50, output.summary.total_requests);
    assert_eq!(5, output.completed_users.len());
    assert_eq!(Some(0.0), output.summary.success_rate());
    assert_eq!(
        SkippedDeletePolicy::Exclude,
        output.summary.skipped_delete_policy
    );
}

#[test]
fn configure_hook_overrides_endpoints() {
    fn configure(config: &mut HarnessConfig) {
        config.endpoints.basket_path = "/basket".to_string();
        config.delete_probability = 0.0;
    }

    let transport = StubTransport::always(200);
    let handle = transport.clone();

    run(
        ScenarioDefinitionBuilder::new("configure_hook_overrides_endpoints", sample_cli_cfg())
            .use_configure(configure),
        move |_| Ok(transport),
    )
    .unwrap();

    let requests = handle.requests();
    assert!(!requests.is_empty());
    assert!(requests
        .iter()
        .all(|r| r.url.starts_with("http://localhost:45135/basket")));
    assert!(requests.iter().all(|r| r.method != HttpMethod::Delete));
}

#[test]
fn weights_from_the_command_line_replace_the_default_plan() {
    let transport = StubTransport::always(200);
    let handle = transport.clone();

    let output = run(
        ScenarioDefinitionBuilder::new(
            "weights_from_the_command_line_replace_the_default_plan",
            LoadgenCli {
                weights: vec![(Operation::GraphQLQuery, 1)],
                ..sample_cli_cfg()
            },
        )
        .with_default_plan(ScenarioPlan::basket_crud()),
        move |_| Ok(transport),
    )
    .unwrap();

    assert_eq!(1, output.summary.operations.len());
    assert_eq!(
        50,
        output
            .summary
            .operation(Operation::GraphQLQuery)
            .unwrap()
            .attempted
    );
    assert!(handle
        .requests()
        .iter()
        .all(|r| r.url.starts_with("http://localhost:45135/graphql?query=")));
}

#[test]
fn run_record_is_appended_to_the_summary_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.jsonl");

    for _ in 0..2 {
        run(
            ScenarioDefinitionBuilder::new(
                "run_record_is_appended_to_the_summary_file",
                LoadgenCli {
                    summary_file: Some(path.clone()),
                    ..sample_cli_cfg()
                },
            ),
            |_| Ok(StubTransport::always(200)),
        )
        .unwrap();
    }

    let records = load_run_records(path).unwrap();
    assert_eq!(2, records.len());
    assert_ne!(records[0].run_id, records[1].run_id);

    let record = &records[0];
    assert_eq!("run_record_is_appended_to_the_summary_file", record.scenario_name);
    assert!(record.failed_users.is_empty());
    assert_eq!(Some("5"), record.settings.get("users").map(String::as_str));
    let summary = record.summary.as_ref().unwrap();
    assert_eq!(50, summary.total_requests);
    assert_eq!(records[0].fingerprint(), records[1].fingerprint());
}

#[test]
fn scenario_defaults_apply_when_not_given_on_the_command_line() {
    let transport = StubTransport::always(200);
    let handle = transport.clone();

    run(
        ScenarioDefinitionBuilder::new(
            "scenario_defaults_apply_when_not_given_on_the_command_line",
            LoadgenCli {
                requests_per_user: 2,
                ..sample_cli_cfg()
            },
        )
        .with_default_plan(ScenarioPlan::web_login())
        .with_default_base_url("https://localhost:5243")
        .with_insecure_default(),
        move |config| {
            assert!(config.client.accept_invalid_certs);
            assert_eq!(None, config.client.request_timeout);
            Ok(transport)
        },
    )
    .unwrap();

    let requests = handle.requests();
    assert_eq!(10, requests.len());
    assert!(requests
        .iter()
        .all(|r| r.url.starts_with("https://localhost:5243/")));
}
