use loadgen_core::prelude::ScenarioBailError;

/// Handle a request error, returning an `anyhow::Error`.
///
/// A request that could not even be built will fail the same way on every attempt, so it bails
/// the user's scenario instead of being recorded as a failed request over and over. Everything
/// else, including timeouts and refused connections, is an ordinary transport failure.
pub fn handle_request_err(err: reqwest::Error) -> anyhow::Error {
    if err.is_builder() {
        log::error!("Could not build request: {err:?}");
        ScenarioBailError::new(format!("Invalid request: {err}")).into()
    } else if err.is_timeout() {
        anyhow::anyhow!("Request timed out: {err}")
    } else if err.is_connect() {
        anyhow::anyhow!("Connection failed: {err}")
    } else {
        anyhow::anyhow!("Request error: {err:?}")
    }
}
