//! Client for a relay's single-execution endpoint.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tokio::time;
use url::Url;

use crate::descriptor::{ProxyPayload, RequestDescriptor};
use crate::forward::TransportError;
use crate::outcome::{ErrorCode, ExecutionError, ExecutionResult};

/// Allowance on top of the request deadline for the relay's own reply.
pub const RELAY_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RelayClientError {
    #[error("invalid relay endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RelayClient {
    pub fn new(endpoint: &str) -> Result<Self, RelayClientError> {
        let endpoint = Url::parse(endpoint)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| RelayClientError::InvalidEndpoint(endpoint.to_string()))?;
        let http = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the relay to execute `descriptor`. Never fails; failures are in the result.
    pub async fn forward(&self, descriptor: &RequestDescriptor) -> ExecutionResult {
        let payload = ProxyPayload::from_descriptor(descriptor);
        let deadline = descriptor.timeout() + RELAY_GRACE;

        tracing::debug!(relay = %self.endpoint, url = %descriptor.url(), "Relaying request");

        let exchange = async {
            let response = self
                .http
                .post(self.endpoint.clone())
                .json(&payload)
                .send()
                .await
                .map_err(|e| TransportError::from_reqwest(&e, deadline))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::from_reqwest(&e, deadline))?;
            Ok::<_, TransportError>((status, body))
        };

        match time::timeout(deadline, exchange).await {
            Ok(Ok((status, body))) => decode_relay_reply(status, &body),
            Ok(Err(e)) => {
                tracing::warn!(relay = %self.endpoint, error = %e, "Relay unreachable");
                ExecutionError::from_transport(&e).into()
            }
            Err(_) => ExecutionError::from_transport(&TransportError::Timeout(deadline)).into(),
        }
    }
}

/// Interpret the relay's JSON reply, whatever status it came with.
pub fn decode_relay_reply(status: StatusCode, body: &str) -> ExecutionResult {
    match serde_json::from_str::<ExecutionResult>(body) {
        Ok(result) => result,
        Err(_) => ExecutionError::new(
            ErrorCode::Unknown,
            format!("Proxy request failed (relay answered {status})"),
        )
        .into(),
    }
}
