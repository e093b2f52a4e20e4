use crate::config::ConfigError;
use itertools::Itertools;
use loadgen_core::prelude::Operation;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::fmt::{Display, Formatter};

/// A weighted table of operations to choose from at random.
#[derive(Debug, Clone)]
pub struct WeightedTable {
    entries: Vec<(Operation, u32)>,
    index: WeightedIndex<u32>,
}

// The index is derived from the entries
impl PartialEq for WeightedTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl WeightedTable {
    pub fn new(entries: Vec<(Operation, u32)>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }
        let index = WeightedIndex::new(entries.iter().map(|(_, weight)| *weight))
            .map_err(|_| ConfigError::ZeroWeights)?;

        Ok(Self { entries, index })
    }

    /// Every operation is equally likely.
    pub fn uniform(operations: &[Operation]) -> Result<Self, ConfigError> {
        Self::new(operations.iter().map(|op| (*op, 1)).collect())
    }

    pub fn entries(&self) -> &[(Operation, u32)] {
        &self.entries
    }

    pub fn choose<R: Rng>(&self, rng: &mut R) -> Operation {
        self.entries[self.index.sample(rng)].0
    }
}

/// How a scenario picks the operation for each of its iterations.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioPlan {
    /// Iteration `n` performs `steps[n % steps.len()]`.
    Sequence(Vec<Operation>),
    /// Every iteration draws an operation from the table.
    Weighted(WeightedTable),
}

impl ScenarioPlan {
    /// Fetch the basket, update it, then maybe delete it.
    pub fn basket_crud() -> Self {
        ScenarioPlan::Sequence(vec![Operation::Get, Operation::Update, Operation::Delete])
    }

    /// Uniform choice between the GraphQL query, fetching the basket and updating it.
    pub fn mixed_endpoints() -> Self {
        ScenarioPlan::Weighted(
            WeightedTable::uniform(&[Operation::GraphQLQuery, Operation::Get, Operation::Update])
                .expect("Static weights must be valid"),
        )
    }

    /// Browse the web front end, logging in twice as often as loading the home page.
    pub fn web_login() -> Self {
        ScenarioPlan::Weighted(
            WeightedTable::new(vec![(Operation::HomePage, 1), (Operation::Login, 2)])
                .expect("Static weights must be valid"),
        )
    }

    pub fn weighted(entries: Vec<(Operation, u32)>) -> Result<Self, ConfigError> {
        WeightedTable::new(entries).map(ScenarioPlan::Weighted)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ScenarioPlan::Sequence(steps) if steps.is_empty() => Err(ConfigError::EmptyPlan),
            _ => Ok(()),
        }
    }

    /// Pick the operation for an iteration.
    pub fn select<R: Rng>(&self, iteration: usize, rng: &mut R) -> Operation {
        match self {
            ScenarioPlan::Sequence(steps) => steps[iteration % steps.len()],
            ScenarioPlan::Weighted(table) => table.choose(rng),
        }
    }
}

impl Default for ScenarioPlan {
    fn default() -> Self {
        Self::basket_crud()
    }
}

impl Display for ScenarioPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioPlan::Sequence(steps) => write!(f, "sequence({})", steps.iter().join(",")),
            ScenarioPlan::Weighted(table) => write!(
                f,
                "weighted({})",
                table
                    .entries()
                    .iter()
                    .map(|(op, weight)| format!("{op}:{weight}"))
                    .join(",")
            ),
        }
    }
}
