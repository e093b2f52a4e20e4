use crate::config::HarnessConfig;
use crate::executor::Executor;
use crate::request::build_request;
use crate::transport::HttpTransport;
use crate::types::LoadgenResult;
use loadgen_core::prelude::{Operation, ScenarioBailError, SyntheticUser};
use loadgen_instruments::prelude::{OperationRecord, RequestOutcome};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

/// Performs the configured number of requests for one user at a time.
///
/// Requests for a user are strictly sequential. A failed request is recorded with the configured
/// failure status and the scenario moves on to the next iteration, so one bad call never costs
/// the user the rest of their requests.
pub struct ScenarioRunner<T: HttpTransport> {
    config: Arc<HarnessConfig>,
    transport: Arc<T>,
    executor: Arc<Executor>,
}

impl<T: HttpTransport> ScenarioRunner<T> {
    pub fn new(config: Arc<HarnessConfig>, transport: Arc<T>, executor: Arc<Executor>) -> Self {
        Self {
            config,
            transport,
            executor,
        }
    }

    /// Run the scenario for `user`, returning one outcome per iteration in the order they were
    /// performed.
    pub fn run(&self, user: &SyntheticUser) -> LoadgenResult<Vec<RequestOutcome>> {
        let mut rng = self.config.rng_for(user);
        let mut outcomes = Vec::with_capacity(self.config.requests_per_user);

        for iteration in 0..self.config.requests_per_user {
            if iteration > 0 {
                let pause = self.config.wait.sample(&mut rng);
                if !pause.is_zero() {
                    std::thread::sleep(pause);
                }
            }

            let operation = self.config.plan.select(iteration, &mut rng);
            outcomes.push(self.perform(user, operation, &mut rng)?);
        }

        log::debug!("Scenario for {} finished {} requests", user.id(), outcomes.len());

        Ok(outcomes)
    }

    fn perform(
        &self,
        user: &SyntheticUser,
        operation: Operation,
        rng: &mut StdRng,
    ) -> LoadgenResult<RequestOutcome> {
        if operation == Operation::Delete && !rng.gen_bool(self.config.delete_probability) {
            log::trace!("Skipping delete for {}", user.id());
            return Ok(RequestOutcome::skipped(user.id(), operation));
        }

        let request = build_request(operation, user, &self.config, rng)?;
        log::trace!("{} {} for {}", request.method, request.url, user.id());

        let record = OperationRecord::new(user.id(), operation);
        match self
            .executor
            .execute_in_place(self.transport.send(request))
        {
            Ok(status) => Ok(record.finish(status)),
            Err(e) if e.is::<ScenarioBailError>() => Err(e),
            Err(e) => {
                log::warn!(
                    "Request {} for {} failed after {:?}: {:?}",
                    operation,
                    user.id(),
                    record.elapsed(),
                    e
                );
                Ok(record.finish(self.config.failure_status))
            }
        }
    }
}
