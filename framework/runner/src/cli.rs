use crate::config::ConfigError;
use clap::{Parser, ValueEnum};
use loadgen_core::prelude::Operation;
use loadgen_instruments::prelude::SkippedDeletePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct LoadgenCli {
    /// The base URL of the service to test. Defaults to the scenario's target, which is
    /// `http://localhost:45135` unless the scenario says otherwise
    #[clap(long)]
    pub base_url: Option<String>,

    /// The number of synthetic users to run a scenario for
    #[clap(long, default_value = "5")]
    pub users: usize,

    /// The number of requests each user makes
    #[clap(long, default_value = "10")]
    pub requests_per_user: usize,

    /// The maximum number of user scenarios running at the same time
    #[clap(long, default_value = "3")]
    pub concurrency: usize,

    /// Probability, between 0 and 1, that a selected delete is actually sent
    #[clap(long, default_value = "0.3")]
    pub delete_probability: f64,

    /// Lower bound of the random pause between two requests of the same user, in milliseconds.
    /// Defaults to 100 unless the scenario says otherwise
    #[clap(long)]
    pub min_wait_ms: Option<u64>,

    /// Upper bound of the random pause between two requests of the same user, in milliseconds.
    /// Defaults to 500 unless the scenario says otherwise
    #[clap(long)]
    pub max_wait_ms: Option<u64>,

    /// Lowest unit price put in basket updates
    #[clap(long, default_value = "1.0")]
    pub price_min: f64,

    /// Highest unit price put in basket updates
    #[clap(long, default_value = "500.0")]
    pub price_max: f64,

    /// Seed the random source so that a run can be reproduced
    #[clap(long)]
    pub seed: Option<u64>,

    /// Pick operations at random with the given weight, in the format `operation:weight`. For
    /// example `--weight=get:3 --weight=update:1`.
    ///
    /// Specifying the weight is optional and will default to 1. When any weight is given, the
    /// scenario's default plan is replaced by a weighted random choice among the listed operations.
    ///
    /// Known operations are `get`, `update`, `delete`, `graphql_query`, `home_page` and `login`.
    #[clap(long = "weight", short, value_parser = parse_operation_weight)]
    pub weights: Vec<(Operation, u32)>,

    /// How deletes that were skipped, rather than sent, count towards the success rate
    #[clap(long, value_enum, default_value = "count-as-success")]
    pub skipped_delete: SkippedDeleteOpt,

    /// Status code recorded when a request fails before a response is received
    #[clap(long, default_value = "500")]
    pub failure_status: u16,

    /// Timeout for each request, in seconds. By default the HTTP client's own default applies
    #[clap(long)]
    pub request_timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates, for testing against local services with self-signed
    /// certificates. Scenarios that target such a service turn this on by default, pass
    /// `--insecure=false` to check certificates anyway
    #[clap(long, num_args = 0..=1, default_missing_value = "true")]
    pub insecure: Option<bool>,

    /// Append a JSON summary of the run to this file
    #[clap(long)]
    pub summary_file: Option<PathBuf>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by
    /// anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SkippedDeleteOpt {
    /// A skipped delete counts as a successful delete
    #[default]
    CountAsSuccess,
    /// Skipped deletes are left out of the delete success rate
    Exclude,
}

impl From<SkippedDeleteOpt> for SkippedDeletePolicy {
    fn from(value: SkippedDeleteOpt) -> Self {
        match value {
            SkippedDeleteOpt::CountAsSuccess => SkippedDeletePolicy::CountAsSuccess,
            SkippedDeleteOpt::Exclude => SkippedDeletePolicy::Exclude,
        }
    }
}

fn parse_operation_weight(s: &str) -> Result<(Operation, u32), ConfigError> {
    let mut parts = s.split(':');
    let operation = parts
        .next()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ConfigError::InvalidWeight(s.to_string()))?
        .parse::<Operation>()
        .map_err(|e| ConfigError::InvalidWeight(e.to_string()))?;

    let weight = match parts.next() {
        Some(weight) => weight
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidWeight(s.to_string()))?,
        None => 1,
    };

    if parts.next().is_some() {
        return Err(ConfigError::InvalidWeight(s.to_string()));
    }

    Ok((operation, weight))
}
