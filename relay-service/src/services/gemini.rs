//! Google Generative AI `generateContent`.
//!
//! The request body is opaque to the relay: prompt parts, inline image data
//! and generation config go upstream exactly as the client sent them.

use super::upstream::{Upstream, UpstreamClient, UpstreamError, UpstreamResponse};
use crate::config::GoogleConfig;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;

#[derive(Clone)]
pub struct GeminiClient {
    upstream: UpstreamClient,
    base_url: String,
    model: String,
    api_key: Secret<String>,
}

impl GeminiClient {
    pub fn new(upstream: UpstreamClient, config: &GoogleConfig) -> Self {
        Self {
            upstream,
            base_url: config.genai_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(self.api_key.expose_secret())
        )
    }

    pub async fn generate_content(&self, body: &Value) -> Result<UpstreamResponse, UpstreamError> {
        tracing::debug!(model = %self.model, "Forwarding generateContent request");

        self.upstream
            .post_json(Upstream::Gemini, &self.generate_content_url(), body)
            .await
    }
}
