use crate::config::ConfigError;
use crate::types::LoadgenResult;
use loadgen_core::prelude::SyntheticUser;
use loadgen_instruments::prelude::RequestOutcome;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

/// How one user's scenario ended.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCompletion {
    Completed { user_id: String, requests: usize },
    /// The scenario returned an error or panicked. The user contributes no outcomes.
    Failed { user_id: String, reason: String },
}

impl UserCompletion {
    pub fn user_id(&self) -> &str {
        match self {
            UserCompletion::Completed { user_id, .. } | UserCompletion::Failed { user_id, .. } => {
                user_id
            }
        }
    }
}

#[derive(Debug)]
pub struct DriverOutput {
    /// Outcomes of every completed user. Batches appear in completion order, and each batch
    /// keeps the order in which the user made their requests.
    pub outcomes: Vec<RequestOutcome>,
    pub completed_users: Vec<String>,
    pub failed_users: Vec<String>,
    /// The largest number of scenarios that were running at the same time.
    pub peak_active: usize,
}

#[derive(Default)]
struct ActiveGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ActiveGauge {
    fn enter(&self) -> ActiveGuard<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ActiveGuard(self)
    }
}

struct ActiveGuard<'a>(&'a ActiveGauge);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

type UserResult = (String, Result<Vec<RequestOutcome>, String>);

type WorkerFn = Box<dyn FnOnce() + Send + 'static>;

/// Holds workers back until every one of them has been spawned.
#[derive(Default)]
struct StartGate {
    go: Mutex<Option<bool>>,
    opened: Condvar,
}

impl StartGate {
    fn open(&self, go: bool) {
        *self.go.lock() = Some(go);
        self.opened.notify_all();
    }

    /// Block until the gate is opened. False means the worker must exit without taking a user.
    fn wait(&self) -> bool {
        let mut go = self.go.lock();
        while go.is_none() {
            self.opened.wait(&mut go);
        }
        go.unwrap_or(false)
    }
}

/// Run `scenario` once for every user, with at most `concurrency` scenarios in flight.
///
/// Users wait in a queue until a worker is free. Each worker hands back the complete batch of
/// outcomes for a user once that user's scenario is done, and `on_complete` is called for it on
/// the calling thread. A scenario that fails does not stop the other workers, and every worker
/// is joined before this returns.
pub fn drive<F, C>(
    users: Vec<SyntheticUser>,
    concurrency: usize,
    scenario: F,
    on_complete: C,
) -> LoadgenResult<DriverOutput>
where
    F: Fn(&SyntheticUser) -> LoadgenResult<Vec<RequestOutcome>> + Send + Sync + 'static,
    C: FnMut(&UserCompletion, &[RequestOutcome]),
{
    drive_with_spawner(users, concurrency, scenario, on_complete, |name, work| {
        std::thread::Builder::new().name(name).spawn(work)
    })
}

fn drive_with_spawner<F, C, S>(
    users: Vec<SyntheticUser>,
    concurrency: usize,
    scenario: F,
    mut on_complete: C,
    mut spawn: S,
) -> LoadgenResult<DriverOutput>
where
    F: Fn(&SyntheticUser) -> LoadgenResult<Vec<RequestOutcome>> + Send + Sync + 'static,
    C: FnMut(&UserCompletion, &[RequestOutcome]),
    S: FnMut(String, WorkerFn) -> std::io::Result<JoinHandle<()>>,
{
    if concurrency == 0 {
        return Err(ConfigError::ZeroConcurrency.into());
    }

    let worker_count = concurrency.min(users.len());
    let queue = Arc::new(Mutex::new(users.into_iter().collect::<VecDeque<_>>()));
    let scenario = Arc::new(scenario);
    let gauge = Arc::new(ActiveGauge::default());
    let gate = Arc::new(StartGate::default());
    let (sender, receiver) = mpsc::channel::<UserResult>();

    let mut handles = Vec::with_capacity(worker_count);
    for worker_index in 0..worker_count {
        let queue = queue.clone();
        let scenario = scenario.clone();
        let gauge = gauge.clone();
        let worker_gate = gate.clone();
        let sender = sender.clone();

        let work: WorkerFn = Box::new(move || {
            if !worker_gate.wait() {
                log::trace!("Worker {worker_index} stopped before starting");
                return;
            }

            loop {
                let next = queue.lock().pop_front();
                let Some(user) = next else {
                    log::trace!("Worker {worker_index} found no more users");
                    break;
                };

                let result = {
                    let _active = gauge.enter();
                    match catch_unwind(AssertUnwindSafe(|| scenario(&user))) {
                        Ok(Ok(outcomes)) => Ok(outcomes),
                        Ok(Err(e)) => Err(format!("{e:?}")),
                        Err(panic) => Err(panic_message(panic)),
                    }
                };

                if sender.send((user.id().to_string(), result)).is_err() {
                    log::warn!("Result collector has gone away, stopping worker {worker_index}");
                    break;
                }
            }
        });

        match spawn(format!("worker-{worker_index}"), work) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                // Nothing has run yet, release the workers we have so they exit straight away
                gate.open(false);
                for handle in handles {
                    if let Err(panic) = handle.join() {
                        log::error!("Error joining worker thread: {}", panic_message(panic));
                    }
                }
                return Err(anyhow::Error::new(e).context("Failed to spawn worker thread"));
            }
        }
    }
    gate.open(true);
    // Only the workers hold senders now, so the receiver ends once they have all finished.
    drop(sender);

    let mut output = DriverOutput {
        outcomes: Vec::new(),
        completed_users: Vec::new(),
        failed_users: Vec::new(),
        peak_active: 0,
    };

    for (user_id, result) in receiver {
        match result {
            Ok(outcomes) => {
                let completion = UserCompletion::Completed {
                    user_id: user_id.clone(),
                    requests: outcomes.len(),
                };
                on_complete(&completion, &outcomes);
                output.outcomes.extend(outcomes);
                output.completed_users.push(user_id);
            }
            Err(reason) => {
                log::error!("Scenario failed for user {user_id}: {reason}");
                let completion = UserCompletion::Failed {
                    user_id: user_id.clone(),
                    reason,
                };
                on_complete(&completion, &[]);
                output.failed_users.push(user_id);
            }
        }
    }

    for handle in handles {
        handle
            .join()
            .map_err(|e| anyhow::anyhow!("Error joining worker thread: {}", panic_message(e)))?;
    }

    output.peak_active = gauge.peak.load(Ordering::SeqCst);
    log::debug!(
        "Driver finished with {} completed and {} failed users, peak concurrency {}",
        output.completed_users.len(),
        output.failed_users.len(),
        output.peak_active
    );

    Ok(output)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
