use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/mini";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub storage_path: PathBuf,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Catalog cache, 0 disables it
    pub catalog_cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()?,
            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| ".watchshop/storage.json".to_string())
                .into(),
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            catalog_cache_ttl_secs: env::var("CATALOG_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
        };

        Ok(config)
    }

    /// Configuration pointing at an explicit base URL, everything else default.
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_ms: 10_000,
            storage_path: ".watchshop/storage.json".into(),
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            catalog_cache_ttl_secs: 300,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn catalog_cache_ttl(&self) -> Option<Duration> {
        (self.catalog_cache_ttl_secs > 0).then(|| Duration::from_secs(self.catalog_cache_ttl_secs))
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
