//! Outbound HTTP to Google.
//!
//! One pooled `reqwest::Client` shared by every handler. Each call carries the
//! configured timeout; dropping the returned future (client hung up) aborts
//! the outbound request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use service_core::error::AppError;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Which upstream API a call targets. Used for metric labels and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Places,
    Gemini,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Places => "places",
            Upstream::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream did not respond within the timeout")]
    Timeout(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned a body that is not JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl UpstreamError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        // Strip the URL: it carries the API key.
        let err = err.without_url();
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else {
            UpstreamError::Transport(err)
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(_) => "transport_error",
            UpstreamError::InvalidBody(_) => "invalid_body",
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(_) => AppError::GatewayTimeout(anyhow::Error::new(err)),
            UpstreamError::Transport(_) => AppError::UpstreamFailure(anyhow::Error::new(err)),
            UpstreamError::InvalidBody(_) => {
                AppError::UpstreamInvalidResponse(anyhow::Error::new(err))
            }
        }
    }
}

/// Upstream status and JSON body, relayed to the caller as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UpstreamError::Transport)?;

        Ok(Self { client })
    }

    pub async fn get_json(
        &self,
        upstream: Upstream,
        url: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.dispatch(upstream, self.client.get(url)).await
    }

    pub async fn post_json(
        &self,
        upstream: Upstream,
        url: &str,
        body: &Value,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.dispatch(upstream, self.client.post(url).json(body)).await
    }

    async fn dispatch(
        &self,
        upstream: Upstream,
        request: RequestBuilder,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let start = Instant::now();
        let result = Self::execute(request).await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(response) => response.status.as_u16().to_string(),
            Err(e) => e.label().to_string(),
        };

        counter!(
            "upstream_requests_total",
            "upstream" => upstream.as_str(),
            "status" => outcome.clone()
        )
        .increment(1);
        histogram!(
            "upstream_request_duration_seconds",
            "upstream" => upstream.as_str()
        )
        .record(elapsed.as_secs_f64());

        match &result {
            Ok(response) => tracing::debug!(
                upstream = upstream.as_str(),
                status = %response.status,
                elapsed_ms = elapsed.as_millis() as u64,
                "Upstream responded"
            ),
            Err(e) => tracing::warn!(
                upstream = upstream.as_str(),
                outcome = %outcome,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "Upstream call failed"
            ),
        }

        result
    }

    async fn execute(request: RequestBuilder) -> Result<UpstreamResponse, UpstreamError> {
        let response = request.send().await.map_err(UpstreamError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(UpstreamError::from_reqwest)?;
        let body: Value = serde_json::from_slice(&bytes)?;

        Ok(UpstreamResponse { status, body })
    }
}
