// SPDX-License-Identifier: MPL-2.0

use crate::config::APP_ID;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Storage(String),
    #[error("invalid session data: {0}")]
    InvalidData(String),
}

/// A catalog access credential with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub expires_at_ms: i64,
}

impl StoredToken {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Result of checking the persisted credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid(StoredToken),
    Expired,
    Absent,
}

/// On-disk record. The expiry is kept string-encoded for compatibility with
/// the mobile client's key-value entries.
#[derive(Serialize, Deserialize)]
struct TokenRecord {
    token: String,
    #[serde(rename = "expirationDate")]
    expiration_date: String,
}

/// Persists the catalog session token as JSON under the config directory.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store at the default location (`<config dir>/<APP_ID>/session.json`).
    pub fn open() -> Result<Self, SessionError> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| SessionError::Storage("could not find config directory".to_string()))?;
        path.push(APP_ID);
        path.push("session.json");
        Ok(Self { path })
    }

    /// Store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn store(&self, token: &StoredToken) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::Storage(format!("failed to create session dir: {e}")))?;
        }

        let record = TokenRecord {
            token: token.access_token.clone(),
            expiration_date: token.expires_at_ms.to_string(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| SessionError::InvalidData(e.to_string()))?;

        std::fs::write(&self.path, json).map_err(|e| SessionError::Storage(e.to_string()))
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }

    /// Check the persisted credential against the wall clock. An expired
    /// credential is cleared as a side effect, so the next check is `Absent`.
    pub fn status(&self) -> Result<TokenStatus, SessionError> {
        self.status_at(now_ms())
    }

    /// Clock-injected variant of [`status`](Self::status).
    pub fn status_at(&self, now_ms: i64) -> Result<TokenStatus, SessionError> {
        let Some(record) = self.read_record()? else {
            return Ok(TokenStatus::Absent);
        };

        // An unparsable expiry counts as expired, matching how the mobile
        // client treated a garbled key-value entry.
        let expires_at_ms = record.expiration_date.parse::<i64>().ok();
        match expires_at_ms {
            Some(expiry) if now_ms < expiry => Ok(TokenStatus::Valid(StoredToken {
                access_token: record.token,
                expires_at_ms: expiry,
            })),
            _ => {
                self.clear()?;
                Ok(TokenStatus::Expired)
            }
        }
    }

    fn read_record(&self) -> Result<Option<TokenRecord>, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(e.to_string())),
        };

        let record: TokenRecord =
            serde_json::from_str(&contents).map_err(|e| SessionError::InvalidData(e.to_string()))?;
        Ok(Some(record))
    }
}

/// Current unix time in milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::at(dir.path().join("session.json"))
    }

    #[test]
    fn test_status_absent_when_never_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.status_at(0).unwrap(), TokenStatus::Absent);
    }

    #[test]
    fn test_store_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let token = StoredToken {
            access_token: "TOK123".to_string(),
            expires_at_ms: 60_000,
        };
        store.store(&token).unwrap();
        assert_eq!(store.status_at(0).unwrap(), TokenStatus::Valid(token));
    }

    #[test]
    fn test_valid_until_the_last_millisecond() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let issued_at = 1_700_000_000_000;
        store
            .store(&StoredToken {
                access_token: "TOK123".to_string(),
                expires_at_ms: issued_at + 60_000,
            })
            .unwrap();

        assert!(matches!(
            store.status_at(issued_at + 59_999).unwrap(),
            TokenStatus::Valid(_)
        ));
    }

    #[test]
    fn test_expired_past_expiry_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let issued_at = 1_700_000_000_000;
        store
            .store(&StoredToken {
                access_token: "TOK123".to_string(),
                expires_at_ms: issued_at + 60_000,
            })
            .unwrap();

        assert_eq!(
            store.status_at(issued_at + 60_001).unwrap(),
            TokenStatus::Expired
        );
        // The expired credential was cleared, so a re-check finds nothing.
        assert_eq!(
            store.status_at(issued_at + 60_001).unwrap(),
            TokenStatus::Absent
        );
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .store(&StoredToken {
                access_token: "TOK123".to_string(),
                expires_at_ms: 60_000,
            })
            .unwrap();
        // now == expiry is already expired.
        assert_eq!(store.status_at(60_000).unwrap(), TokenStatus::Expired);
    }

    #[test]
    fn test_garbled_expiry_treated_as_expired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"token":"TOK123","expirationDate":"not-a-number"}"#,
        )
        .unwrap();

        let store = TokenStore::at(path);
        assert_eq!(store.status_at(0).unwrap(), TokenStatus::Expired);
        assert_eq!(store.status_at(0).unwrap(), TokenStatus::Absent);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.clear().unwrap();
        store
            .store(&StoredToken {
                access_token: "TOK123".to_string(),
                expires_at_ms: 1,
            })
            .unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.status_at(0).unwrap(), TokenStatus::Absent);
    }
}
