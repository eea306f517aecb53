use std::path::PathBuf;

/// Core error types for the session registry client.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures on the wire path to the remote service.
///
/// `Http` is a network/IO failure, `Decode` a malformed response body,
/// `Remote` a well-formed envelope whose status is not `"ok"`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
