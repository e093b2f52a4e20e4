mod cli;
mod config;
mod definition;
mod driver;
mod executor;
mod init;
mod plan;
mod progress;
mod request;
mod run;
mod scenario;
mod transport;
mod types;

pub mod prelude {
    pub use crate::cli::{LoadgenCli, SkippedDeleteOpt};
    pub use crate::config::{
        ClientSettings, ConfigError, EndpointConfig, HarnessConfig, PriceRange, ScenarioDefaults,
        WaitInterval,
    };
    pub use crate::definition::{ScenarioDefinition, ScenarioDefinitionBuilder};
    pub use crate::driver::{drive, DriverOutput, UserCompletion};
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::plan::{ScenarioPlan, WeightedTable};
    pub use crate::progress::completion_line;
    pub use crate::request::build_request;
    pub use crate::run::{run, RunOutput};
    pub use crate::scenario::ScenarioRunner;
    pub use crate::transport::{HttpMethod, HttpTransport, OutboundRequest, RequestBody};
    pub use crate::types::LoadgenResult;

    pub use loadgen_core::prelude::*;
    pub use loadgen_instruments::prelude::*;
}
