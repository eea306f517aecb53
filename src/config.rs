use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Connection settings for the remote session registry.
///
/// Constructed once at startup and passed to the client; nothing in this
/// crate reads configuration ambiently at call time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Organization every record is scoped to.
    pub organization_name: String,
    /// Application namespace within the organization.
    pub application_name: String,
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the remote service, without a trailing slash.
    pub remote_base_url: String,
}

impl Config {
    pub fn new(
        organization_name: impl Into<String>,
        application_name: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        remote_base_url: impl Into<String>,
    ) -> Self {
        let base: String = remote_base_url.into();
        Self {
            organization_name: organization_name.into(),
            application_name: application_name.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            remote_base_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// Check that every field is set. Lookups and mutations against the
    /// remote service need all five.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("organizationName", &self.organization_name),
            ("applicationName", &self.application_name),
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("remoteBaseUrl", &self.remote_base_url),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

/// Load config from a JSON file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let mut config: Config = serde_json::from_str(&content)?;
    config.remote_base_url = config.remote_base_url.trim_end_matches('/').to_string();
    Ok(config)
}

/// Load config from the environment.
///
/// `REGISTRY_CONFIG` may carry the whole config as JSON; otherwise the file
/// at `REGISTRY_CONFIG_PATH` (if set) is the base, and individual
/// `REGISTRY_*` variables overlay it.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    if let Ok(json) = std::env::var("REGISTRY_CONFIG") {
        match serde_json::from_str::<Config>(&json) {
            Ok(mut config) => {
                config.remote_base_url =
                    config.remote_base_url.trim_end_matches('/').to_string();
                return Ok(config);
            }
            Err(e) => {
                tracing::warn!("Failed to parse REGISTRY_CONFIG: {}", e);
            }
        }
    }

    let mut cfg = match std::env::var("REGISTRY_CONFIG_PATH") {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => Config::default(),
    };

    if let Ok(v) = std::env::var("REGISTRY_ORGANIZATION") {
        cfg.organization_name = v;
    }
    if let Ok(v) = std::env::var("REGISTRY_APPLICATION") {
        cfg.application_name = v;
    }
    if let Ok(v) = std::env::var("REGISTRY_CLIENT_ID") {
        cfg.client_id = v;
    }
    if let Ok(v) = std::env::var("REGISTRY_CLIENT_SECRET") {
        cfg.client_secret = v;
    }
    if let Ok(v) = std::env::var("REGISTRY_ENDPOINT") {
        cfg.remote_base_url = v.trim_end_matches('/').to_string();
    }

    Ok(cfg)
}
