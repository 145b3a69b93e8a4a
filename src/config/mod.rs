use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::logging::LoggingConfig;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
    pub summarizer: SummarizerConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub base_url: String,
    pub engine: String,
    pub api_key: Option<String>,
    pub default_pages: u32,
    pub default_sort: String,
    pub request_timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Object-endpoint base URL; required for the http backend.
    pub endpoint: Option<String>,
    /// Root directory for the local backend.
    pub root_dir: PathBuf,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub model_id: String,
    pub api_key: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com".to_string(),
            engine: "walmart_product_reviews".to_string(),
            api_key: None,
            default_pages: 5,
            default_sort: "helpful".to_string(),
            request_timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 2,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: "review-scraped-data".to_string(),
            endpoint: None,
            root_dir: get_data_directory().join("datasets"),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://bedrock-runtime.us-east-1.amazonaws.com".to_string(),
            model_id: "qwen.qwen3-32b-v1:0".to_string(),
            api_key: None,
            max_tokens: 10000,
            temperature: 0.3,
            top_p: 0.9,
            request_timeout_seconds: 120,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            storage: StorageConfig::default(),
            summarizer: SummarizerConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from default locations
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            info!("No configuration file found, using defaults");
            let mut config = Self::default();
            ConfigOverrides::apply(&mut config);
            Ok(config)
        }
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;

        ConfigOverrides::apply(&mut config);
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to default location
    pub async fn save(&self) -> Result<()> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(&config_path, content).await?;

        info!("Configuration saved to: {}", config_path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scraper.default_pages == 0 {
            return Err(anyhow::anyhow!("Scraper default_pages must be > 0"));
        }

        if self.scraper.max_retries == 0 {
            return Err(anyhow::anyhow!("Scraper max_retries must be > 0"));
        }

        if self.storage.backend == StorageBackend::Http && self.storage.endpoint.is_none() {
            return Err(anyhow::anyhow!(
                "Storage endpoint is required for the http backend"
            ));
        }

        if self.summarizer.max_tokens == 0 {
            return Err(anyhow::anyhow!("Summarizer max_tokens must be > 0"));
        }

        if !(0.0..=2.0).contains(&self.summarizer.temperature) {
            return Err(anyhow::anyhow!(
                "Summarizer temperature must be between 0.0 and 2.0"
            ));
        }

        if self.api.port == 0 {
            return Err(anyhow::anyhow!("API port must be > 0"));
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

/// Get the default data directory
fn get_data_directory() -> PathBuf {
    directories::ProjectDirs::from("com", "reviewscope", "reviewscope")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("com", "reviewscope", "reviewscope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("config.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        if let Ok(api_key) = std::env::var("REVIEWSCOPE_SERPAPI_KEY") {
            config.scraper.api_key = Some(api_key);
        }

        if let Ok(base_url) = std::env::var("REVIEWSCOPE_SCRAPER_BASE_URL") {
            config.scraper.base_url = base_url;
        }

        if let Ok(bucket) = std::env::var("REVIEWSCOPE_STORAGE_BUCKET") {
            config.storage.bucket = bucket;
        }

        if let Ok(endpoint) = std::env::var("REVIEWSCOPE_STORAGE_ENDPOINT") {
            config.storage.backend = StorageBackend::Http;
            config.storage.endpoint = Some(endpoint);
        }

        if let Ok(model_id) = std::env::var("REVIEWSCOPE_MODEL_ID") {
            config.summarizer.model_id = model_id;
        }

        if let Ok(api_key) = std::env::var("REVIEWSCOPE_MODEL_API_KEY") {
            config.summarizer.api_key = Some(api_key);
        }

        if let Ok(host) = std::env::var("REVIEWSCOPE_API_HOST") {
            config.api.host = host;
        }

        if let Ok(port_str) = std::env::var("REVIEWSCOPE_API_PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                config.api.port = port;
            }
        }

        if let Ok(log_level) = std::env::var("REVIEWSCOPE_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_backend_requires_endpoint() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Http;
        config.storage.endpoint = None;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut config = AppConfig::default();
        config.summarizer.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override_wins() {
        let mut config = AppConfig::default();
        std::env::set_var("REVIEWSCOPE_MODEL_ID", "other.model-v2:0");

        ConfigOverrides::apply(&mut config);
        std::env::remove_var("REVIEWSCOPE_MODEL_ID");

        assert_eq!(config.summarizer.model_id, "other.model-v2:0");
    }

    #[test]
    fn test_storage_endpoint_override_flips_backend() {
        let mut config = AppConfig::default();
        std::env::set_var("REVIEWSCOPE_STORAGE_ENDPOINT", "https://objects.example.com");

        ConfigOverrides::apply(&mut config);
        std::env::remove_var("REVIEWSCOPE_STORAGE_ENDPOINT");

        assert_eq!(config.storage.backend, StorageBackend::Http);
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("https://objects.example.com")
        );
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = AppConfig::default();
        let toml_text = toml::to_string_pretty(&config).unwrap();
        let restored: AppConfig = toml::from_str(&toml_text).unwrap();

        assert_eq!(restored.scraper.engine, config.scraper.engine);
        assert_eq!(restored.storage.backend, config.storage.backend);
        assert_eq!(restored.api.port, config.api.port);
    }
}
