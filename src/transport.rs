use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

use crate::providers::http_errors::model_api_request_error;
use crate::providers::{Auth, OutboundRequest};

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Performs the single outbound POST for a query.
///
/// Any non-2xx status or undecodable body is an error; a successful call
/// yields the decoded JSON body untouched.
pub trait Transport: Send + Sync {
    fn post_json<'a>(&'a self, request: OutboundRequest) -> TransportFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to initialize HTTP client")?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Transport for HttpTransport {
    fn post_json<'a>(&'a self, request: OutboundRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            let OutboundRequest { url, auth, body } = request;
            let builder = self.client.post(&url).json(&body);
            let builder = match &auth {
                Auth::QueryKey(key) => builder.query(&[("key", key.as_str())]),
                Auth::Bearer(token) => builder.bearer_auth(token),
            };
            debug!(api_url = %url, timeout_secs = self.timeout_secs, "sending llm request");

            let response = builder.send().await.map_err(|err| {
                let err = err.without_url();
                warn!(api_url = %url, error = %err, "llm request failed");
                model_api_request_error(err, &url, self.timeout_secs)
            })?;

            let status = response.status();
            if !status.is_success() {
                let response_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string());
                warn!(
                    api_url = %url,
                    status = %status,
                    response_body_len = response_body.len(),
                    "llm provider returned non-success status"
                );
                return Err(anyhow!(
                    "LLM request failed with status {}: {}",
                    status,
                    response_body
                ));
            }

            let parsed: Value = response
                .json()
                .await
                .map_err(reqwest::Error::without_url)
                .context("Failed to parse LLM response as JSON")?;
            debug!(api_url = %url, "received llm response");
            Ok(parsed)
        })
    }
}
