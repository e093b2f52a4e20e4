use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An HTTP operation that a scenario can perform on behalf of a synthetic user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Fetch the user's basket.
    Get,
    /// Replace the user's basket with a randomized line item.
    Update,
    /// Delete the user's basket. Scenarios may skip this according to their delete probability.
    Delete,
    /// Query the basket through the GraphQL endpoint.
    #[serde(rename = "graphql_query")]
    GraphQLQuery,
    /// Load the web front end's landing page.
    HomePage,
    /// Submit the web front end's login form.
    Login,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Get,
        Operation::Update,
        Operation::Delete,
        Operation::GraphQLQuery,
        Operation::HomePage,
        Operation::Login,
    ];

    /// The stable name used in reports, CLI arguments and serialized summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::GraphQLQuery => "graphql_query",
            Operation::HomePage => "home_page",
            Operation::Login => "login",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
#[display(
    "Unknown operation [{name}], expected one of: \
     get, update, delete, graphql_query, home_page, login"
)]
pub struct UnknownOperationError {
    name: String,
}

impl FromStr for Operation {
    type Err = UnknownOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOperationError {
                name: s.to_string(),
            })
    }
}
