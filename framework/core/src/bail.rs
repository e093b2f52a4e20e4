/// Return this error from a transport or scenario step to indicate that the scenario for the
/// current user is bailing.
///
/// Ordinary transport failures are recorded as failed requests and the scenario carries on. This
/// error is different: it stops the scenario for one user and that user's results are dropped
/// from the run, while every other user's scenario continues.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ScenarioBailError {
    msg: String,
}

impl ScenarioBailError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

impl Default for ScenarioBailError {
    fn default() -> Self {
        Self {
            msg: "Scenario is bailing".to_string(),
        }
    }
}
