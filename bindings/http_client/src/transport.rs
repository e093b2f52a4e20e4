use crate::error::handle_request_err;
use anyhow::Context;
use loadgen_runner::prelude::{
    ClientSettings, HttpMethod, HttpTransport, OutboundRequest, RequestBody,
};

/// Sends requests over a shared, pooled [reqwest::Client].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &ClientSettings) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> anyhow::Result<u16> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await.map_err(handle_request_err)?;

        Ok(response.status().as_u16())
    }
}
