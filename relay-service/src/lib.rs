pub mod config;
pub mod handlers;
pub mod services;
pub mod startup;

use config::RelayConfig;
use service_core::error::AppError;
use services::{GeminiClient, PlacesClient, UpstreamClient};
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub places: PlacesClient,
    pub gemini: GeminiClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, AppError> {
        let upstream = UpstreamClient::new(config.upstream.timeout).map_err(|e| {
            tracing::error!("Failed to build upstream HTTP client: {}", e);
            AppError::InternalError(anyhow::Error::new(e))
        })?;

        let places = PlacesClient::new(upstream.clone(), &config.google);
        let gemini = GeminiClient::new(upstream, &config.google);

        Ok(Self {
            config: Arc::new(config),
            places,
            gemini,
        })
    }
}
