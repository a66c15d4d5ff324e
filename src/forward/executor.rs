//! The forwarding executor: one descriptor in, one normalized result out.
//!
//! # Responsibilities
//! - Build the outbound request (default headers, body policy)
//! - Enforce the descriptor's deadline over connect + headers + body
//! - Capture status, headers and the full body whatever the content type
//! - Convert transport failures into the error taxonomy
//!
//! # Design Decisions
//! - One shared `reqwest::Client` (connection pool), cloned freely, no executor lock
//! - No automatic retries; retry policy belongs to the caller
//! - Transport failures are values, never panics or propagated errors

use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use thiserror::Error;
use tokio::time;

use crate::config::{ClientConfig, RelayConfig, TimeoutConfig};
use crate::descriptor::RequestDescriptor;
use crate::forward::{RawResponse, TransportError};
use crate::observability::metrics;
use crate::outcome::{normalize, ExecutionResult};
use crate::routing::Destination;

/// Accept header sent when the caller does not choose one.
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

#[derive(Debug, Error)]
pub enum ExecutorBuildError {
    #[error("invalid user agent '{0}'")]
    UserAgent(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Executes descriptors against arbitrary upstreams.
#[derive(Debug, Clone)]
pub struct Executor {
    client: reqwest::Client,
    user_agent: HeaderValue,
    max_timeout: Duration,
}

impl Executor {
    pub fn new(client_config: &ClientConfig, timeouts: &TimeoutConfig) -> Result<Self, ExecutorBuildError> {
        let user_agent = HeaderValue::from_str(&client_config.user_agent)
            .map_err(|_| ExecutorBuildError::UserAgent(client_config.user_agent.clone()))?;

        let redirect = match client_config.max_redirects {
            0 => Policy::none(),
            n => Policy::limited(n),
        };

        let mut builder = reqwest::Client::builder()
            .redirect(redirect)
            .pool_idle_timeout(Duration::from_secs(client_config.pool_idle_timeout_secs));
        if !client_config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            user_agent,
            max_timeout: Duration::from_millis(timeouts.max_ms),
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, ExecutorBuildError> {
        Self::new(&config.client, &config.timeouts)
    }

    /// Run one descriptor to a terminal state. Never fails; failures are in the result.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> ExecutionResult {
        let started = Instant::now();
        let deadline = descriptor.timeout().min(self.max_timeout);
        let method = descriptor.method();
        let destination = Destination::for_url(descriptor.url());

        tracing::debug!(
            method = %method,
            url = %descriptor.url(),
            destination = %destination,
            timeout_ms = deadline.as_millis() as u64,
            "Forwarding request"
        );

        let outcome = match self.prepare(descriptor) {
            Ok(request) => match time::timeout(deadline, self.exchange(request, deadline)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Timeout(deadline)),
            },
            Err(e) => Err(e),
        };

        let elapsed = started.elapsed();
        match &outcome {
            Ok(raw) => tracing::info!(
                method = %method,
                url = %descriptor.url(),
                status = raw.status.as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Upstream responded"
            ),
            Err(e) => tracing::warn!(
                method = %method,
                url = %descriptor.url(),
                code = e.code().as_str(),
                error = %e,
                elapsed_ms = elapsed.as_millis() as u64,
                "Upstream exchange failed"
            ),
        }

        let result = normalize(outcome);
        metrics::record_execution(method.as_str(), destination, &result, elapsed);
        result
    }

    /// Build the outbound request without sending it.
    pub fn prepare(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Request, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        for (name, value) in descriptor.headers() {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self
            .client
            .request(descriptor.method().into(), descriptor.url().clone());

        match descriptor.body() {
            Some(body) if descriptor.method().carries_body() => {
                if body.is_structured() && !descriptor.headers().contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                builder = builder.body(body.to_bytes());
            }
            Some(_) => {
                tracing::debug!(method = %descriptor.method(), "Ignoring body for method without one");
            }
            None => {}
        }

        builder
            .headers(headers)
            .build()
            .map_err(|e| TransportError::Other(crate::forward::error::describe_chain(&e)))
    }

    async fn exchange(&self, request: reqwest::Request, deadline: Duration) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TransportError::from_reqwest(&e, deadline))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, deadline))?
            .to_vec();

        Ok(RawResponse { status, headers, body })
    }
}
