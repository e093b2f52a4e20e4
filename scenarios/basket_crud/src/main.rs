use loadgen_http_client::prelude::ReqwestTransport;
use loadgen_runner::prelude::*;

fn main() -> LoadgenResult<()> {
    let builder = ScenarioDefinitionBuilder::new_with_init(env!("CARGO_PKG_NAME"))
        .with_default_plan(ScenarioPlan::basket_crud());

    run(builder, |config| ReqwestTransport::new(&config.client))?;

    Ok(())
}
