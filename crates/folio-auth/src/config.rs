//! Auth configuration

use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Session lifetime: seven days
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Shortest accepted password
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

/// Where accounts and sessions live and how long tokens last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JSON array of accounts
    pub users_db: PathBuf,
    /// JSON array of active session tokens
    pub sessions_db: PathBuf,
    /// Hex-encoded signing key, created on first use
    pub key_file: PathBuf,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Shortest accepted password
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_db: PathBuf::from("data/users.json"),
            sessions_db: PathBuf::from("data/sessions.json"),
            key_file: PathBuf::from("data/signing.key"),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl AuthConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accounts file
    #[must_use]
    pub fn with_users_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.users_db = path.into();
        self
    }

    /// Set the sessions file
    #[must_use]
    pub fn with_sessions_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.sessions_db = path.into();
        self
    }

    /// Set the signing key file
    #[must_use]
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = path.into();
        self
    }

    /// Set token lifetime
    #[must_use]
    pub fn with_token_ttl(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Set the shortest accepted password
    #[must_use]
    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    /// Reject unusable settings
    ///
    /// # Errors
    /// Returns [`AuthError::Config`] for a zero TTL or a shared store file.
    pub fn validate(&self) -> AuthResult<()> {
        if self.token_ttl_secs == 0 {
            return Err(AuthError::Config("token_ttl_secs must be positive".into()));
        }
        if self.users_db == self.sessions_db {
            return Err(AuthError::Config(
                "users_db and sessions_db must be different files".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AuthConfig::new();
        assert_eq!(config.token_ttl_secs, 604_800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_ttl_and_shared_files() {
        assert!(AuthConfig::new().with_token_ttl(0).validate().is_err());
        assert!(AuthConfig::new()
            .with_users_db("db.json")
            .with_sessions_db("db.json")
            .validate()
            .is_err());
    }

    #[test]
    fn partial_toml_style_input_uses_defaults() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"token_ttl_secs": 60}"#).unwrap();
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(config.users_db, PathBuf::from("data/users.json"));
    }
}
