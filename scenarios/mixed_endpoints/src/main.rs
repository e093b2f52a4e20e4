use loadgen_http_client::prelude::ReqwestTransport;
use loadgen_runner::prelude::*;

fn main() -> LoadgenResult<()> {
    let builder = ScenarioDefinitionBuilder::new_with_init(env!("CARGO_PKG_NAME"))
        .with_default_plan(ScenarioPlan::mixed_endpoints());

    let output = run(builder, |config| ReqwestTransport::new(&config.client))?;

    // A run where no GraphQL query got through usually means the endpoint is missing
    if let Some(graphql) = output.summary.operation(Operation::GraphQLQuery) {
        if graphql.attempted > 0 && graphql.successes == 0 {
            log::warn!("None of the {} GraphQL queries succeeded", graphql.attempted);
        }
    }

    Ok(())
}
