//! Google Places text search.

use super::upstream::{Upstream, UpstreamClient, UpstreamError, UpstreamResponse};
use crate::config::GoogleConfig;
use secrecy::{ExposeSecret, Secret};

#[derive(Clone)]
pub struct PlacesClient {
    upstream: UpstreamClient,
    base_url: String,
    api_key: Secret<String>,
}

impl PlacesClient {
    pub fn new(upstream: UpstreamClient, config: &GoogleConfig) -> Self {
        Self {
            upstream,
            base_url: config.places_base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Text-search URL with `query` percent-encoded and the key appended.
    pub fn text_search_url(&self, query: &str) -> String {
        format!(
            "{}/textsearch/json?query={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(self.api_key.expose_secret())
        )
    }

    pub async fn text_search(&self, query: &str) -> Result<UpstreamResponse, UpstreamError> {
        tracing::debug!(query_len = query.len(), "Forwarding Places text search");

        self.upstream
            .get_json(Upstream::Places, &self.text_search_url(query))
            .await
    }
}
