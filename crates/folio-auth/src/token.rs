//! Signed session tokens
//!
//! A token is `base64url(claims json)` and the hex ed25519 signature of that
//! text, joined by a dot.

use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Token type stamped into every session token
pub const SESSION_TOKEN_TYPE: &str = "sessionToken";

/// Seconds since the Unix epoch
#[must_use]
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// What a session token asserts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account the session belongs to
    pub user_id: String,
    /// Always [`SESSION_TOKEN_TYPE`]
    pub token_type: String,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}

impl Claims {
    /// Past expiry at `now`
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.exp
    }

    /// Past expiry now
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_secs())
    }
}

/// Issues and verifies session tokens with one ed25519 key
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    /// Issuer for `signing_key` with tokens living `ttl_secs`
    #[must_use]
    pub fn with_expiry(signing_key: SigningKey, ttl_secs: u64) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
            ttl_secs,
        }
    }

    /// Issuer with a fresh random key
    #[must_use]
    pub fn generate(ttl_secs: u64) -> Self {
        Self::with_expiry(SigningKey::from_bytes(&rand::random::<[u8; 32]>()), ttl_secs)
    }

    /// Load the hex key at `path`, creating it when absent
    ///
    /// # Errors
    /// Fails when the file cannot be read or written, or holds something
    /// other than 32 hex-encoded bytes.
    pub async fn load_or_create(path: &Path, ttl_secs: u64) -> AuthResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let bytes = hex::decode(text.trim())
                    .map_err(|e| AuthError::Config(format!("{}: {e}", path.display())))?;
                let secret: [u8; 32] = bytes.try_into().map_err(|_| {
                    AuthError::Config(format!("{}: key must be 32 bytes", path.display()))
                })?;
                Ok(Self::with_expiry(SigningKey::from_bytes(&secret), ttl_secs))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let issuer = Self::generate(ttl_secs);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| AuthError::io_error(parent, e))?;
                }
                tokio::fs::write(path, hex::encode(issuer.signing_key.to_bytes()))
                    .await
                    .map_err(|e| AuthError::io_error(path, e))?;
                tracing::info!(path = %path.display(), "signing key created");
                Ok(issuer)
            }
            Err(e) => Err(AuthError::io_error(path, e)),
        }
    }

    /// Public half of the key
    #[inline]
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Token lifetime
    #[inline]
    #[must_use]
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign a session token for `user_id` issued at `now`
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidToken`] if the claims cannot be encoded.
    pub fn issue_at(&self, user_id: &str, now: u64) -> AuthResult<(String, Claims)> {
        let claims = Claims {
            user_id: user_id.to_string(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        let json =
            serde_json::to_vec(&claims).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = self.signing_key.sign(payload.as_bytes());
        Ok((
            format!("{payload}.{}", hex::encode(signature.to_bytes())),
            claims,
        ))
    }

    /// Sign a session token for `user_id` issued now
    ///
    /// # Errors
    /// See [`TokenIssuer::issue_at`].
    pub fn issue(&self, user_id: &str) -> AuthResult<(String, Claims)> {
        self.issue_at(user_id, now_secs())
    }

    /// Check the signature and token type, without looking at expiry
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidToken`] for anything this issuer did not
    /// sign as a session token.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| AuthError::InvalidToken("missing signature".into()))?;
        let signature = hex::decode(signature)
            .ok()
            .and_then(|bytes| Signature::from_slice(&bytes).ok())
            .ok_or_else(|| AuthError::InvalidToken("malformed signature".into()))?;
        self.verifying_key
            .verify(payload.as_bytes(), &signature)
            .map_err(|_| AuthError::InvalidToken("bad signature".into()))?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims: Claims =
            serde_json::from_slice(&json).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if claims.token_type != SESSION_TOKEN_TYPE {
            return Err(AuthError::InvalidToken(format!(
                "unexpected token type {}",
                claims.token_type
            )));
        }
        Ok(claims)
    }
}
