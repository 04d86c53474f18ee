//! Notification function client configuration
//!
//! Creates HTTP clients that talk to the remote notification function.

use lostfound_core::FUNCTION_PATH;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::DispatchError;

/// Notification function configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Full URL of the notification function
    pub function_url: String,
    /// Key sent as bearer token and `apikey` header
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            function_url: format!("http://127.0.0.1:54321{}", FUNCTION_PATH),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl FunctionConfig {
    /// Function hosted at `base_url` under the standard path
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            function_url: format!("{}{}", base_url.trim_end_matches('/'), FUNCTION_PATH),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("LOSTFOUND_FUNCTION_URL") {
            config.function_url = url;
        }
        if let Ok(key) = std::env::var("LOSTFOUND_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Some(secs) = std::env::var("LOSTFOUND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }

    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, DispatchError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse_toml(&raw)
    }

    pub fn parse_toml(raw: &str) -> Result<Self, DispatchError> {
        toml::from_str(raw).map_err(|e| DispatchError::Config(e.to_string()))
    }

    /// Scheme and host of the function URL, used for the health probe
    pub fn base_url(&self) -> &str {
        self.function_url
            .strip_suffix(FUNCTION_PATH)
            .unwrap_or(&self.function_url)
            .trim_end_matches('/')
    }
}

/// Create an HTTP client for the notification function
pub fn create_function_client(config: &FunctionConfig) -> Result<Client, DispatchError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("lostfound-notify/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DispatchError::ClientBuild(e.to_string()))
}

/// Check if the notification function is reachable
pub async fn check_function_health(config: &FunctionConfig) -> Result<bool, DispatchError> {
    let client = create_function_client(config)?;

    let result = client
        .get(format!("{}/health", config.base_url()))
        .send()
        .await;

    match result {
        Ok(resp) => Ok(resp.status().is_success()),
        Err(_) => Ok(false),
    }
}
