use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, TransportError};
use crate::transport::{CallPolicy, Transport};

use super::{DuplicateCheck, SessionKey, SessionRecord};

/// Client for the remote session registry.
///
/// Presents token-level session semantics while delegating durable storage
/// and multi-writer consistency entirely to the remote service. Every
/// operation is a single round-trip; concurrent callers for the same
/// identity race on server-side arrival order.
pub struct SessionClient {
    transport: Transport,
}

impl SessionClient {
    pub fn new(config: Config) -> Self {
        Self {
            transport: Transport::new(config),
        }
    }

    pub fn with_policy(config: Config, policy: CallPolicy) -> Self {
        Self {
            transport: Transport::with_policy(config, policy),
        }
    }

    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    fn config(&self) -> &Config {
        self.transport.config()
    }

    fn key_for(&self, user_name: &str) -> Result<SessionKey> {
        let config = self.config();
        Ok(SessionKey::new(
            &config.organization_name,
            &config.application_name,
            user_name,
        )?)
    }

    /// Fetch every session record scoped to the configured organization.
    /// Returns either the full decoded list or an error, never partial
    /// results.
    pub async fn get_sessions(&self) -> Result<Vec<SessionRecord>> {
        let owner = self.config().organization_name.as_str();
        let url = self.transport.url("get-sessions", &[("owner", owner)]);
        let bytes = self.transport.get_bytes(&url).await?;
        let records: Vec<SessionRecord> =
            serde_json::from_slice(&bytes).map_err(TransportError::Decode)?;
        Ok(records)
    }

    /// Look up one record by composite key. `None` means the remote service
    /// has no record for the key; that is not an error.
    pub async fn get_session(&self, user_name: &str) -> Result<Option<SessionRecord>> {
        let key = self.key_for(user_name)?;
        let url = self
            .transport
            .url("get-session", &[("sessionPkId", &key.pk_id())]);
        let bytes = self.transport.get_bytes(&url).await?;
        let record: Option<SessionRecord> =
            serde_json::from_slice(&bytes).map_err(TransportError::Decode)?;
        Ok(record)
    }

    /// Register `token` as the sole token carried in the request for the
    /// identity. Whether the remote service appends it to or replaces an
    /// existing token list is a remote-side decision this client does not
    /// control. Returns `true` iff the backing record was changed.
    pub async fn add_session(&self, user_name: &str, token: &str) -> Result<bool> {
        self.write_session("add-session", user_name, vec![token.to_string()])
            .await
    }

    /// Identical request shape to [`add_session`](Self::add_session); the
    /// remote service distinguishes create from update by record existence.
    /// Kept as a distinct verb so call sites can express intent.
    pub async fn update_session(&self, user_name: &str, token: &str) -> Result<bool> {
        self.write_session("update-session", user_name, vec![token.to_string()])
            .await
    }

    /// Submit the identity with no tokens, tearing the record down fully.
    pub async fn delete_session(&self, user_name: &str) -> Result<bool> {
        self.write_session("delete-session", user_name, Vec::new())
            .await
    }

    async fn write_session(
        &self,
        action: &str,
        user_name: &str,
        tokens: Vec<String>,
    ) -> Result<bool> {
        let key = self.key_for(user_name)?;
        let record = SessionRecord {
            owner: key.owner,
            name: key.user,
            application: key.application,
            created_time: String::new(),
            session_id: tokens,
        };
        let body = serde_json::to_vec(&record).map_err(TransportError::Decode)?;
        debug!(action, user = user_name, "Writing session record");
        let envelope = self.transport.post(action, &[], body, false).await?;
        Ok(envelope.affected())
    }

    /// Probe whether `token` is already registered for the identity. The
    /// three-valued result keeps a failed probe distinct from a negative
    /// answer.
    pub async fn check_session_duplicated(&self, user_name: &str, token: &str) -> DuplicateCheck {
        let key = match self.key_for(user_name) {
            Ok(key) => key,
            Err(e) => return DuplicateCheck::CheckFailed(e),
        };
        let url = self.transport.url(
            "is-session-duplicated",
            &[("sessionPkId", &key.pk_id()), ("sessionId", token)],
        );
        match self.transport.get_envelope(&url).await {
            Ok(envelope) if envelope.data.as_bool() == Some(true) => DuplicateCheck::Duplicated,
            Ok(_) => DuplicateCheck::NotDuplicated,
            Err(e) => DuplicateCheck::CheckFailed(e.into()),
        }
    }

    /// Compatibility wrapper that folds a failed probe into `false`. A
    /// transport failure and "not duplicated" are indistinguishable through
    /// this call alone; use
    /// [`check_session_duplicated`](Self::check_session_duplicated) when the
    /// difference matters.
    pub async fn is_session_duplicated(&self, user_name: &str, token: &str) -> bool {
        match self.check_session_duplicated(user_name, token).await {
            DuplicateCheck::Duplicated => true,
            DuplicateCheck::NotDuplicated => false,
            DuplicateCheck::CheckFailed(e) => {
                warn!("Duplicate check failed for {}: {}", user_name, e);
                false
            }
        }
    }
}
