use relay_service::config::{GoogleConfig, RelayConfig, ServerConfig, UpstreamConfig};
use relay_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-google-key";
pub const TEST_MODEL: &str = "gemini-1.5-flash";

/// Config pointing both upstreams at `upstream_base` (usually a wiremock server).
pub fn test_config(upstream_base: &str) -> RelayConfig {
    RelayConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        google: GoogleConfig {
            api_key: Secret::new(TEST_API_KEY.to_string()),
            places_base_url: format!("{}/maps/api/place", upstream_base),
            genai_base_url: format!("{}/v1beta", upstream_base),
            gemini_model: TEST_MODEL.to_string(),
        },
        upstream: UpstreamConfig {
            timeout: Duration::from_secs(5),
        },
        server: ServerConfig {
            max_body_bytes: 1024 * 1024,
            static_dir: None,
        },
    }
}

/// Base URL on which nothing is listening.
pub fn unreachable_upstream() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind an ephemeral port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(config: RelayConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp { address, client }
    }

    pub async fn search_places(&self, query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/google", self.address))
            .query(&[("query", query)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn generate_content(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/gemini", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
