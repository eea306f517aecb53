use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::TransportError;

/// Uniform reply shape for every RPC against the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ResponseEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// True when the remote service reports the backing record was changed.
    pub fn affected(&self) -> bool {
        self.data.as_str() == Some("Affected")
    }
}

/// Retry and deadline policy for one logical call.
///
/// The default preserves the reference behavior: no timeout, no retries.
/// Retries apply to network failures only; a decoded error reply is final.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Signed-HTTP transport to the remote service.
///
/// Produces exactly two request shapes (anonymous GET, Basic-Auth POST) and
/// decodes one response shape. Holds no state beyond read-only configuration
/// and a pooled client, so it is safe to share across concurrent callers.
pub struct Transport {
    config: Config,
    policy: CallPolicy,
    client: reqwest::Client,
}

impl Transport {
    pub fn new(config: Config) -> Self {
        Self::with_policy(config, CallPolicy::default())
    }

    pub fn with_policy(config: Config, policy: CallPolicy) -> Self {
        Self {
            config,
            policy,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build `{base}/{action}?{query}` with percent-encoded keys and values.
    /// Query parameter order follows the slice; the remote service does not
    /// care about it.
    pub fn url(&self, action: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}", self.config.remote_base_url, action);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn send(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TransportError> {
        let mut attempt: u32 = 0;
        loop {
            let mut request = build();
            if let Some(timeout) = self.policy.timeout {
                request = request.timeout(timeout);
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    debug!("Retrying after transport failure (attempt {}): {}", attempt, e);
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(e) => return Err(TransportError::Http(e)),
            }
        }
    }

    /// Anonymous GET returning the raw response body. The read endpoints of
    /// the remote service take no credentials.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!(url, "GET");
        let response = self.send(|| self.client.get(url)).await?;
        let bytes = response.bytes().await.map_err(TransportError::Http)?;
        Ok(bytes.to_vec())
    }

    /// GET a URL whose body is a `ResponseEnvelope`.
    pub async fn get_envelope(&self, url: &str) -> Result<ResponseEnvelope, TransportError> {
        let bytes = self.get_bytes(url).await?;
        decode_envelope(&bytes)
    }

    /// Authenticated POST. `body` is sent verbatim as
    /// `text/plain;charset=UTF-8` (the bytes are a pre-serialized JSON
    /// document), or, when `is_multipart` is set, wrapped as the single
    /// `"file"` part of a multipart form.
    pub async fn post(
        &self,
        action: &str,
        query: &[(&str, &str)],
        body: Vec<u8>,
        is_multipart: bool,
    ) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url(action, query);
        debug!(action, multipart = is_multipart, "POST");
        let response = self
            .send(|| {
                let request = self
                    .client
                    .post(&url)
                    .basic_auth(&self.config.client_id, Some(&self.config.client_secret));
                if is_multipart {
                    let part = reqwest::multipart::Part::bytes(body.clone()).file_name("file");
                    request.multipart(reqwest::multipart::Form::new().part("file", part))
                } else {
                    request
                        .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
                        .body(body.clone())
                }
            })
            .await?;
        let bytes = response.bytes().await.map_err(TransportError::Http)?;
        decode_envelope(&bytes)
    }
}

/// Parse an envelope and surface a non-`"ok"` status as a remote error.
fn decode_envelope(bytes: &[u8]) -> Result<ResponseEnvelope, TransportError> {
    let envelope: ResponseEnvelope = serde_json::from_slice(bytes)?;
    if !envelope.is_ok() {
        return Err(TransportError::Remote(envelope.msg));
    }
    Ok(envelope)
}
