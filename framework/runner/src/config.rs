use crate::cli::LoadgenCli;
use crate::plan::ScenarioPlan;
use loadgen_core::prelude::SyntheticUser;
use loadgen_instruments::prelude::SkippedDeletePolicy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha3::Digest;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:45135";

/// Configuration problems. Any of these stops the run before a single request is sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("At least one user is required")]
    NoUsers,
    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("Invalid base URL [{url}]: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Delete probability must be between 0 and 1, got {0}")]
    DeleteProbability(f64),
    #[error("Minimum wait {min_ms}ms is greater than maximum wait {max_ms}ms")]
    WaitInterval { min_ms: u128, max_ms: u128 },
    #[error("Invalid price range {min}..={max}")]
    PriceRange { min: f64, max: f64 },
    #[error("The scenario plan has no operations")]
    EmptyPlan,
    #[error("At least one operation weight must be greater than zero")]
    ZeroWeights,
    #[error("Invalid operation weight [{0}], expected `operation:weight`")]
    InvalidWeight(String),
}

/// Paths of the endpoints under test, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub basket_path: String,
    pub graphql_path: String,
    pub home_path: String,
    pub login_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            basket_path: "/api/v1/basket".to_string(),
            graphql_path: "/graphql".to_string(),
            home_path: "/".to_string(),
            login_path: "/Account/Login?ReturnUrl=%2F".to_string(),
        }
    }
}

/// Settings passed on to the HTTP client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSettings {
    /// No timeout is set by the harness unless this is given.
    pub request_timeout: Option<Duration>,
    pub accept_invalid_certs: bool,
}

/// The pause between two consecutive requests of one user, drawn uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitInterval {
    pub min: Duration,
    pub max: Duration,
}

impl WaitInterval {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl Default for WaitInterval {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(500))
    }
}

/// Range of unit prices used for basket line items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Draw a price, rounded to cents.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let price = rng.gen_range(self.min..=self.max);
        (price * 100.0).round() / 100.0
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 500.0,
        }
    }
}

/// Values a scenario uses for settings that were not given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDefaults {
    pub plan: ScenarioPlan,
    pub base_url: String,
    pub wait: WaitInterval,
    pub accept_invalid_certs: bool,
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            plan: ScenarioPlan::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            wait: WaitInterval::default(),
            accept_invalid_certs: false,
        }
    }
}

/// Everything the harness needs to run. Built once and passed into the runner, so that several
/// harnesses can run side by side in one process.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: Url,
    pub users: usize,
    pub requests_per_user: usize,
    pub concurrency: usize,
    pub plan: ScenarioPlan,
    pub delete_probability: f64,
    pub wait: WaitInterval,
    pub price_range: PriceRange,
    pub seed: Option<u64>,
    pub skipped_delete_policy: SkippedDeletePolicy,
    pub failure_status: u16,
    pub endpoints: EndpointConfig,
    pub client: ClientSettings,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL must be valid"),
            users: 5,
            requests_per_user: 10,
            concurrency: 3,
            plan: ScenarioPlan::default(),
            delete_probability: 0.3,
            wait: WaitInterval::default(),
            price_range: PriceRange::default(),
            seed: None,
            skipped_delete_policy: SkippedDeletePolicy::default(),
            failure_status: 500,
            endpoints: EndpointConfig::default(),
            client: ClientSettings::default(),
        }
    }
}

impl HarnessConfig {
    /// Build the configuration from command line arguments, falling back to the scenario's
    /// `defaults` for anything not given. The CLI weights, if any, replace the default plan.
    pub fn from_cli(cli: &LoadgenCli, defaults: ScenarioDefaults) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(cli.base_url.as_deref().unwrap_or(&defaults.base_url))?;

        let plan = if cli.weights.is_empty() {
            defaults.plan
        } else {
            ScenarioPlan::weighted(cli.weights.clone())?
        };

        let config = Self {
            base_url,
            users: cli.users,
            requests_per_user: cli.requests_per_user,
            concurrency: cli.concurrency,
            plan,
            delete_probability: cli.delete_probability,
            wait: WaitInterval::new(
                cli.min_wait_ms.map(Duration::from_millis).unwrap_or(defaults.wait.min),
                cli.max_wait_ms.map(Duration::from_millis).unwrap_or(defaults.wait.max),
            ),
            price_range: PriceRange {
                min: cli.price_min,
                max: cli.price_max,
            },
            seed: cli.seed,
            skipped_delete_policy: cli.skipped_delete.into(),
            failure_status: cli.failure_status,
            endpoints: EndpointConfig::default(),
            client: ClientSettings {
                request_timeout: cli.request_timeout_secs.map(Duration::from_secs),
                accept_invalid_certs: cli.insecure.unwrap_or(defaults.accept_invalid_certs),
            },
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users == 0 {
            return Err(ConfigError::NoUsers);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        check_base_url(&self.base_url)?;
        if !(0.0..=1.0).contains(&self.delete_probability) {
            return Err(ConfigError::DeleteProbability(self.delete_probability));
        }
        if self.wait.min > self.wait.max {
            return Err(ConfigError::WaitInterval {
                min_ms: self.wait.min.as_millis(),
                max_ms: self.wait.max.as_millis(),
            });
        }
        let PriceRange { min, max } = self.price_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(ConfigError::PriceRange { min, max });
        }
        self.plan.validate()
    }

    /// The random source for one user. Seeded runs give every user its own reproducible stream.
    ///
    /// The run seed and the user index are hashed together, so no two (seed, user) pairs share a
    /// stream.
    pub fn rng_for(&self, user: &SyntheticUser) -> StdRng {
        match self.seed {
            Some(seed) => {
                let mut hasher = sha3::Sha3_256::new();
                Digest::update(&mut hasher, seed.to_le_bytes());
                Digest::update(&mut hasher, (user.index() as u64).to_le_bytes());
                let mut rng_seed = [0u8; 32];
                rng_seed.copy_from_slice(&hasher.finalize());
                StdRng::from_seed(rng_seed)
            }
            None => StdRng::from_entropy(),
        }
    }

    /// Build the absolute URL for a path relative to the base URL, keeping any path prefix of
    /// the base URL.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// The configuration flattened to strings, for the run record.
    pub fn settings(&self) -> HashMap<String, String> {
        let mut settings = HashMap::new();
        settings.insert("base_url".to_string(), self.base_url.to_string());
        settings.insert("users".to_string(), self.users.to_string());
        settings.insert(
            "requests_per_user".to_string(),
            self.requests_per_user.to_string(),
        );
        settings.insert("concurrency".to_string(), self.concurrency.to_string());
        settings.insert("plan".to_string(), self.plan.to_string());
        settings.insert(
            "delete_probability".to_string(),
            self.delete_probability.to_string(),
        );
        settings.insert(
            "wait_ms".to_string(),
            format!("{}-{}", self.wait.min.as_millis(), self.wait.max.as_millis()),
        );
        settings.insert(
            "skipped_delete_policy".to_string(),
            format!("{:?}", self.skipped_delete_policy),
        );
        if let Some(seed) = self.seed {
            settings.insert("seed".to_string(), seed.to_string());
        }
        settings
    }
}

fn parse_base_url(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    check_base_url(&parsed)?;
    Ok(parsed)
}

fn check_base_url(url: &Url) -> Result<(), ConfigError> {
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: "expected an http or https URL".to_string(),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: "the base URL must not have a query or fragment".to_string(),
        });
    }
    Ok(())
}
