//! Register, log in, log out and authenticate

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password::{hash_password, verify_password};
use crate::store::{Account, JsonSessionStore, JsonUserStore, SessionStore, User, UserStore};
use crate::token::{now_secs, TokenIssuer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An issued session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token
    pub token: String,
    /// Account the token belongs to
    pub account: Account,
    /// Expiry, seconds since the Unix epoch
    pub expires_at: u64,
}

/// Session lifecycle over pluggable stores
pub struct SessionService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    issuer: TokenIssuer,
    min_password_len: usize,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("issuer", &self.issuer.verifying_key())
            .field("min_password_len", &self.min_password_len)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    /// Service over the given stores and issuer
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            users,
            sessions,
            issuer,
            min_password_len: crate::config::DEFAULT_MIN_PASSWORD_LEN,
        }
    }

    /// Require passwords of at least `len` characters on register
    #[must_use]
    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    /// Service over the JSON files and key named in `config`
    ///
    /// # Errors
    /// Fails on an invalid config or an unusable key file.
    pub async fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        config.validate()?;
        let issuer = TokenIssuer::load_or_create(&config.key_file, config.token_ttl_secs).await?;
        Ok(Self::new(
            Arc::new(JsonUserStore::new(&config.users_db)),
            Arc::new(JsonSessionStore::new(&config.sessions_db)),
            issuer,
        )
        .with_min_password_len(config.min_password_len))
    }

    /// Token issuer
    #[inline]
    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Create an account and open a session for it
    ///
    /// # Errors
    /// - [`AuthError::Invalid`] for an empty username or short password
    /// - [`AuthError::UserExists`] if the username is taken
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<Session> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::Invalid("username must not be empty".into()));
        }
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::Invalid(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))??;
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
        };
        self.users.insert(user.clone()).await?;
        tracing::info!(username = %user.username, user_id = %user.id, "account registered");
        self.open_session(&user).await
    }

    /// Verify credentials and open a fresh session
    ///
    /// Other sessions of the same account, and any expired or unverifiable
    /// tokens, are dropped from the active list.
    ///
    /// # Errors
    /// - [`AuthError::UserNotFound`] for an unknown username
    /// - [`AuthError::InvalidCredentials`] for a wrong password
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<Session> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.trim().to_string()))?;

        let (candidate, hash) = (password.to_string(), user.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        if !matches {
            tracing::warn!(username = %user.username, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let now = now_secs();
        let issuer = &self.issuer;
        let user_id = user.id.as_str();
        let dropped = self
            .sessions
            .retain(&|token| match issuer.verify(token) {
                Ok(claims) => claims.user_id != user_id && !claims.is_expired_at(now),
                Err(_) => false,
            })
            .await?;
        tracing::debug!(username = %user.username, dropped, "stale sessions revoked");

        let session = self.open_session(&user).await?;
        tracing::info!(username = %user.username, "logged in");
        Ok(session)
    }

    /// Remove a token from the active list
    ///
    /// Logging out an unknown token is not an error.
    ///
    /// # Errors
    /// Fails only when the session store does.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        if self.sessions.remove(token).await? {
            tracing::info!("logged out");
        } else {
            tracing::debug!("logout for inactive token");
        }
        Ok(())
    }

    /// Account behind an active, valid, unexpired token
    ///
    /// # Errors
    /// - [`AuthError::Revoked`] if the token is not active
    /// - [`AuthError::InvalidToken`] if the signature fails
    /// - [`AuthError::Expired`] past expiry
    /// - [`AuthError::UserNotFound`] if the account is gone
    pub async fn authenticate(&self, token: &str) -> AuthResult<Account> {
        if !self.sessions.contains(token).await? {
            return Err(AuthError::Revoked);
        }
        let claims = self.issuer.verify(token)?;
        if claims.is_expired() {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
            });
        }
        let user = self
            .users
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound(claims.user_id))?;
        Ok(Account::from(&user))
    }

    async fn open_session(&self, user: &User) -> AuthResult<Session> {
        let (token, claims) = self.issuer.issue(&user.id)?;
        self.sessions.add(token.clone()).await?;
        Ok(Session {
            token,
            account: Account::from(user),
            expires_at: claims.exp,
        })
    }
}
