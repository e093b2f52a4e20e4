use crate::config::HarnessConfig;
use crate::transport::{HttpMethod, OutboundRequest, RequestBody};
use anyhow::Context;
use loadgen_core::prelude::{Operation, SyntheticUser};
use rand::Rng;
use serde_json::json;
use url::Url;

/// Build the request for `operation` on behalf of `user`.
///
/// Headers deliberately carry the user's email and payment token so that the system under test
/// has sensitive values to mask.
pub fn build_request<R: Rng>(
    operation: Operation,
    user: &SyntheticUser,
    config: &HarnessConfig,
    rng: &mut R,
) -> anyhow::Result<OutboundRequest> {
    let endpoints = &config.endpoints;

    let request = match operation {
        Operation::Get => OutboundRequest::new(
            HttpMethod::Get,
            config.endpoint_url(&format!("{}/{}", endpoints.basket_path, user.id())),
        )
        .with_header("X-User", user.id())
        .with_header("X-Email", user.email()),
        Operation::Update => {
            let body = json!({
                "buyerId": user.id(),
                "items": [{
                    "productId": rng.gen_range(1..=100).to_string(),
                    "quantity": rng.gen_range(1..=5),
                    "unitPrice": config.price_range.sample(rng),
                }],
            });

            OutboundRequest::new(HttpMethod::Post, config.endpoint_url(&endpoints.basket_path))
                .with_header("Content-Type", "application/json")
                .with_header("X-User-Email", user.email())
                .with_header("X-Payment", user.payment_token())
                .with_body(RequestBody::Json(body))
        }
        Operation::Delete => OutboundRequest::new(
            HttpMethod::Delete,
            config.endpoint_url(&format!("{}/{}", endpoints.basket_path, user.id())),
        )
        .with_header("X-User", user.id()),
        Operation::GraphQLQuery => {
            let mut url = Url::parse(&config.endpoint_url(&endpoints.graphql_path))
                .context("Invalid GraphQL endpoint URL")?;
            url.query_pairs_mut().append_pair(
                "query",
                &format!(
                    "{{basket(userId:\"{}\"){{items{{productId,quantity}}}}}}",
                    user.id()
                ),
            );

            OutboundRequest::new(HttpMethod::Get, url.to_string())
                .with_header("X-User-Email", user.email())
        }
        Operation::HomePage => {
            OutboundRequest::new(HttpMethod::Get, config.endpoint_url(&endpoints.home_path))
        }
        Operation::Login => {
            OutboundRequest::new(HttpMethod::Post, config.endpoint_url(&endpoints.login_path))
                .with_header("Content-Type", "application/x-www-form-urlencoded")
                .with_body(RequestBody::Form(vec![(
                    "Email".to_string(),
                    user.email().to_string(),
                )]))
        }
    };

    Ok(request)
}
