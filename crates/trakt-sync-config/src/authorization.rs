use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OAuth token state as persisted by the device pairing flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Authorization {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the token was issued
    #[serde(default)]
    pub created_at: i64,
    /// Lifetime in seconds, 0 when unknown
    #[serde(default)]
    pub expires_in: i64,
}

impl Authorization {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.expires_in <= 0 {
            return None;
        }
        let expires_at = self.created_at.checked_add(self.expires_in)?;
        DateTime::from_timestamp(expires_at, 0)
    }

    /// A token is usable if it is non-empty and does not expire within five minutes.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at() {
            Some(expires_at) => expires_at > now + Duration::minutes(5),
            None => true,
        }
    }
}

/// Read-only view of `authorization.json`.
pub struct AuthorizationStore {
    path: PathBuf,
}

impl AuthorizationStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Option<Authorization>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let authorization: Authorization = serde_json::from_str(&content)?;
        Ok(Some(authorization))
    }

    pub fn access_token(&self) -> Option<String> {
        self.load()
            .ok()
            .flatten()
            .filter(|auth| auth.is_valid_at(Utc::now()))
            .map(|auth| auth.access_token)
    }

    pub fn is_authorized(&self) -> bool {
        match self.load() {
            Ok(Some(auth)) => auth.is_valid_at(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to read authorization state from {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, json: &str) -> AuthorizationStore {
        let path = dir.path().join("authorization.json");
        std::fs::write(&path, json).unwrap();
        AuthorizationStore::new(path)
    }

    #[test]
    fn test_missing_file_is_not_authorized() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthorizationStore::new(dir.path().join("authorization.json"));
        assert!(!store.is_authorized());
        assert_eq!(store.access_token(), None);
    }

    #[test]
    fn test_valid_token() {
        let dir = tempfile::tempdir().unwrap();
        let created_at = Utc::now().timestamp();
        let store = write(
            &dir,
            &format!(
                r#"{{"access_token":"abc","refresh_token":"def","created_at":{},"expires_in":7776000}}"#,
                created_at
            ),
        );
        assert!(store.is_authorized());
        assert_eq!(store.access_token(), Some("abc".to_string()));
    }

    #[test]
    fn test_expired_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = write(
            &dir,
            r#"{"access_token":"abc","refresh_token":"def","created_at":1000,"expires_in":60}"#,
        );
        assert!(!store.is_authorized());
    }

    #[test]
    fn test_overflowing_expiry_is_treated_as_unknown() {
        let auth = Authorization {
            access_token: "abc".to_string(),
            refresh_token: String::new(),
            created_at: i64::MAX - 10,
            expires_in: 7776000,
        };
        assert_eq!(auth.expires_at(), None);
        assert!(auth.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_unreadable_file_is_not_authorized() {
        let dir = tempfile::tempdir().unwrap();
        let store = write(&dir, "not json");
        assert!(!store.is_authorized());
    }
}
