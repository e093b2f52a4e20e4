use loadgen_http_client::prelude::ReqwestTransport;
use loadgen_runner::prelude::*;
use std::time::Duration;

fn main() -> LoadgenResult<()> {
    // The web front end is served locally over https with a self-signed certificate
    let builder = ScenarioDefinitionBuilder::new_with_init(env!("CARGO_PKG_NAME"))
        .with_default_plan(ScenarioPlan::web_login())
        .with_default_base_url("https://localhost:5243")
        .with_default_wait(Duration::from_secs(1), Duration::from_secs(3))
        .with_insecure_default();

    run(builder, |config| ReqwestTransport::new(&config.client))?;

    Ok(())
}
