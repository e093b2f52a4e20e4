use crate::cli::LoadgenCli;
use crate::config::{HarnessConfig, ScenarioDefaults, WaitInterval};
use crate::init::init;
use crate::plan::ScenarioPlan;
use crate::types::LoadgenResult;
use std::path::PathBuf;
use std::time::Duration;

/// The builder for a scenario definition.
///
/// This must be used at the start of a test to define the scenario that you want to run.
pub struct ScenarioDefinitionBuilder {
    /// The name of the scenario, which should be unique within the test suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you from the command line when using
    /// [ScenarioDefinitionBuilder::new_with_init].
    cli: LoadgenCli,
    /// Used for anything not given on the command line, including the plan when no operation
    /// weights are given.
    defaults: ScenarioDefaults,
    /// Overrides applied to the configuration after it has been built from the CLI.
    configure_fn: Option<fn(&mut HarnessConfig)>,
}

pub struct ScenarioDefinition {
    pub name: String,
    pub config: HarnessConfig,
    pub no_progress: bool,
    pub summary_file: Option<PathBuf>,
}

impl ScenarioDefinitionBuilder {
    /// Initialise a new scenario definition from the scenario name and command line arguments.
    /// See the [ScenarioDefinitionBuilder::name] for more information about the name.
    pub fn new(name: &str, cli: LoadgenCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            defaults: ScenarioDefaults::default(),
            configure_fn: None,
        }
    }

    /// Initialise logging and parse the command line, then create the builder.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, init())
    }

    /// Set the plan used when no `--weight` arguments are given.
    pub fn with_default_plan(mut self, plan: ScenarioPlan) -> Self {
        self.defaults.plan = plan;
        self
    }

    /// Set the base URL used when `--base-url` is not given.
    pub fn with_default_base_url(mut self, base_url: &str) -> Self {
        self.defaults.base_url = base_url.to_string();
        self
    }

    /// Set the think time used when `--min-wait-ms` or `--max-wait-ms` is not given.
    pub fn with_default_wait(mut self, min: Duration, max: Duration) -> Self {
        self.defaults.wait = WaitInterval::new(min, max);
        self
    }

    /// Accept invalid TLS certificates unless `--insecure=false` is given.
    pub fn with_insecure_default(mut self) -> Self {
        self.defaults.accept_invalid_certs = true;
        self
    }

    /// Adjust the configuration beyond what the CLI exposes, for example endpoint paths.
    pub fn use_configure(mut self, configure_fn: fn(&mut HarnessConfig)) -> Self {
        self.configure_fn = Some(configure_fn);
        self
    }

    pub(crate) fn build(self) -> LoadgenResult<ScenarioDefinition> {
        let mut config = HarnessConfig::from_cli(&self.cli, self.defaults)?;
        if let Some(configure_fn) = self.configure_fn {
            configure_fn(&mut config);
            config.validate()?;
        }

        Ok(ScenarioDefinition {
            name: self.name,
            config,
            no_progress: self.cli.no_progress,
            summary_file: self.cli.summary_file,
        })
    }
}
