pub mod client;

pub use client::SessionClient;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, SessionError};

/// One session record as owned by the remote service. The client only ever
/// holds transient copies; there is no local cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub owner: String,
    /// The user name within the organization.
    pub name: String,
    pub application: String,
    pub created_time: String,
    /// Currently valid session tokens, in the order the remote service
    /// returns them. An empty list is a valid state distinct from the record
    /// not existing at all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub session_id: Vec<String>,
}

/// Composite key addressing exactly one session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub owner: String,
    pub application: String,
    pub user: String,
}

impl SessionKey {
    /// All three components must be non-empty; an empty component would
    /// silently address the wrong record on the remote side.
    pub fn new(
        owner: impl Into<String>,
        application: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let key = Self {
            owner: owner.into(),
            application: application.into(),
            user: user.into(),
        };
        if key.owner.is_empty() || key.application.is_empty() || key.user.is_empty() {
            return Err(SessionError::InvalidKey(format!(
                "empty component in {}/{}/{}",
                key.owner, key.user, key.application
            )));
        }
        Ok(key)
    }

    /// `owner/user/application`, the primary-key form the remote service
    /// expects in `sessionPkId` query parameters.
    pub fn pk_id(&self) -> String {
        format!("{}/{}/{}", self.owner, self.user, self.application)
    }
}

/// Outcome of a duplicate-token probe.
///
/// A failed probe is its own state rather than being folded into
/// `NotDuplicated`; the caller decides whether "unknown" counts as "no".
#[derive(Debug)]
pub enum DuplicateCheck {
    Duplicated,
    NotDuplicated,
    CheckFailed(RegistryError),
}

impl DuplicateCheck {
    pub fn is_duplicated(&self) -> bool {
        matches!(self, DuplicateCheck::Duplicated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let json = r#"{
            "owner": "acme",
            "name": "alice",
            "application": "app-console",
            "createdTime": "2022-03-01T10:00:00Z",
            "sessionId": ["tok-1", "tok-2"]
        }"#;

        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.owner, "acme");
        assert_eq!(record.name, "alice");
        assert_eq!(record.application, "app-console");
        assert_eq!(record.created_time, "2022-03-01T10:00:00Z");
        assert_eq!(record.session_id, vec!["tok-1", "tok-2"]);

        let reparsed: SessionRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn test_record_token_order_preserved() {
        let json = r#"{"owner": "o", "name": "n", "application": "a",
                       "sessionId": ["z", "a", "m"]}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.session_id, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_empty_token_list_serializes_without_session_id() {
        let record = SessionRecord {
            owner: "acme".into(),
            name: "alice".into(),
            application: "app-console".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("sessionId").is_none());
    }

    #[test]
    fn test_single_token_serializes_as_one_element_list() {
        let record = SessionRecord {
            owner: "acme".into(),
            name: "alice".into(),
            application: "app-console".into(),
            session_id: vec!["tok-1".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], serde_json::json!(["tok-1"]));
    }

    #[test]
    fn test_missing_session_id_parses_as_empty() {
        let record: SessionRecord =
            serde_json::from_str(r#"{"owner": "o", "name": "n", "application": "a"}"#).unwrap();
        assert!(record.session_id.is_empty());
    }

    #[test]
    fn test_key_pk_id_order() {
        let key = SessionKey::new("acme", "app-console", "alice").unwrap();
        assert_eq!(key.pk_id(), "acme/alice/app-console");
    }

    #[test]
    fn test_key_rejects_empty_components() {
        assert!(SessionKey::new("", "app", "alice").is_err());
        assert!(SessionKey::new("acme", "", "alice").is_err());
        assert!(SessionKey::new("acme", "app", "").is_err());
    }
}
