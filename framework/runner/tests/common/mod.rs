#![allow(dead_code)]

use loadgen_runner::prelude::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What the stub does with a request.
#[derive(Debug, Clone, Copy)]
pub enum StubResponse {
    Status(u16),
    TransportError,
    Bail,
}

type Respond = Box<dyn Fn(&OutboundRequest) -> StubResponse + Send + Sync>;

struct StubState {
    respond: Respond,
    delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requests: Mutex<Vec<OutboundRequest>>,
}

/// An in-process transport that never touches the network. Clones share their state, so a test
/// can keep a handle to inspect what the runner sent.
#[derive(Clone)]
pub struct StubTransport {
    state: Arc<StubState>,
}

impl StubTransport {
    pub fn new(respond: impl Fn(&OutboundRequest) -> StubResponse + Send + Sync + 'static) -> Self {
        Self::with_delay(respond, Duration::ZERO)
    }

    pub fn with_delay(
        respond: impl Fn(&OutboundRequest) -> StubResponse + Send + Sync + 'static,
        delay: Duration,
    ) -> Self {
        Self {
            state: Arc::new(StubState {
                respond: Box::new(respond),
                delay,
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn always(status: u16) -> Self {
        Self::new(move |_| StubResponse::Status(status))
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.state.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl HttpTransport for StubTransport {
    async fn send(&self, request: OutboundRequest) -> anyhow::Result<u16> {
        let state = &self.state;
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !state.delay.is_zero() {
            tokio::time::sleep(state.delay).await;
        }

        let response = (state.respond)(&request);
        state.requests.lock().push(request);
        state.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response {
            StubResponse::Status(status) => Ok(status),
            StubResponse::TransportError => Err(anyhow::anyhow!("Connection refused")),
            StubResponse::Bail => Err(ScenarioBailError::new("Stub transport bailed").into()),
        }
    }
}

/// The user a request was made for, read from the URL, headers or body.
pub fn request_user(request: &OutboundRequest) -> Option<String> {
    if let Some(user) = request.header("X-User") {
        return Some(user.to_string());
    }
    if let Some(email) = request.header("X-User-Email") {
        return email.split('@').next().map(|s| s.to_string());
    }
    None
}

/// Command line arguments for a quick run against the stub transport.
pub fn sample_cli_cfg() -> LoadgenCli {
    LoadgenCli {
        base_url: None,
        users: 5,
        requests_per_user: 10,
        concurrency: 3,
        delete_probability: 0.3,
        min_wait_ms: Some(0),
        max_wait_ms: Some(0),
        price_min: 1.0,
        price_max: 500.0,
        seed: Some(1234),
        weights: vec![],
        skipped_delete: SkippedDeleteOpt::CountAsSuccess,
        failure_status: 500,
        request_timeout_secs: None,
        insecure: None,
        summary_file: None,
        no_progress: true,
    }
}

/// A configuration with no think time, for driving a [ScenarioRunner] directly.
pub fn quick_config() -> HarnessConfig {
    HarnessConfig {
        wait: WaitInterval::none(),
        seed: Some(99),
        ..Default::default()
    }
}

pub fn scenario_runner(
    config: HarnessConfig,
    transport: &StubTransport,
) -> ScenarioRunner<StubTransport> {
    ScenarioRunner::new(
        Arc::new(config),
        Arc::new(transport.clone()),
        Arc::new(Executor::try_new().expect("Failed to create executor")),
    )
}
