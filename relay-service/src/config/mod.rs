use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PLACES_API_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_GENAI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
/// Gemini caps inline request payloads at 20MB.
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Everything the relay needs, read once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub places_base_url: String,
    pub genai_base_url: String,
    pub gemini_model: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_body_bytes: usize,
    /// Built web client, served for paths the API does not own.
    pub static_dir: Option<PathBuf>,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `load` passes the process
    /// environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY is required but not set"))
            })?;

        let timeout_secs = parse_or(
            &lookup,
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "UPSTREAM_TIMEOUT_SECS must be greater than zero"
            )));
        }

        Ok(RelayConfig {
            common,
            google: GoogleConfig {
                api_key: Secret::new(api_key),
                places_base_url: trim_base_url(
                    lookup("PLACES_API_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_PLACES_API_BASE_URL.to_string()),
                ),
                genai_base_url: trim_base_url(
                    lookup("GENAI_API_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_GENAI_API_BASE_URL.to_string()),
                ),
                gemini_model: lookup("GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            upstream: UpstreamConfig {
                timeout: Duration::from_secs(timeout_secs),
            },
            server: ServerConfig {
                max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
                static_dir: lookup("STATIC_DIR")
                    .filter(|dir| !dir.is_empty())
                    .map(PathBuf::from),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", key, e))
        }),
        None => Ok(default),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RelayConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(core_config::Config::default(), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_google() {
        let config = load(&[("GOOGLE_API_KEY", "test-key")]).unwrap();

        assert_eq!(config.google.api_key.expose_secret(), "test-key");
        assert_eq!(config.google.places_base_url, DEFAULT_PLACES_API_BASE_URL);
        assert_eq!(config.google.genai_base_url, DEFAULT_GENAI_API_BASE_URL);
        assert_eq!(config.google.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.upstream.timeout, Duration::from_secs(30));
        assert_eq!(config.server.max_body_bytes, 20 * 1024 * 1024);
        assert!(config.server.static_dir.is_none());
        assert_eq!(config.common.port, 3000);
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        assert!(load(&[("GOOGLE_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("GOOGLE_API_KEY", "k"),
            ("PLACES_API_BASE_URL", "http://127.0.0.1:9000/place/"),
            ("GENAI_API_BASE_URL", "http://127.0.0.1:9000/v1beta"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("MAX_BODY_BYTES", "1024"),
            ("STATIC_DIR", "/srv/client"),
        ])
        .unwrap();

        assert_eq!(config.google.places_base_url, "http://127.0.0.1:9000/place");
        assert_eq!(config.google.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.upstream.timeout, Duration::from_secs(5));
        assert_eq!(config.server.max_body_bytes, 1024);
        assert_eq!(config.server.static_dir, Some(PathBuf::from("/srv/client")));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = load(&[("GOOGLE_API_KEY", "k"), ("UPSTREAM_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("UPSTREAM_TIMEOUT_SECS"));

        assert!(load(&[("GOOGLE_API_KEY", "k"), ("UPSTREAM_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = load(&[("GOOGLE_API_KEY", "super-secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
