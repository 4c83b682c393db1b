//! Error types for accounts and sessions

use folio_content::ErrorCategory;
use std::path::{Path, PathBuf};

/// Result alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Account and session errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Username is taken
    #[error("Username has already existed: {0}")]
    UserExists(String),

    /// No account with that name or id
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Password does not match the stored hash
    #[error("Password incorrect")]
    InvalidCredentials,

    /// Token is malformed or its signature does not verify
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token is not in the active session list
    #[error("session is not active")]
    Revoked,

    /// Token is past its expiry
    #[error("token expired at {expired_at}")]
    Expired {
        /// Expiry, seconds since the Unix epoch
        expired_at: u64,
    },

    /// Username or password rejected before lookup
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Password hashing failed
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Account or session file is unreadable
    #[error("corrupt store at {}: {source}", path.display())]
    Corrupt {
        /// Store file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Create IO error with path context
    pub fn io_error(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create store decoding error with path context
    pub fn corrupt(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Failure class of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UserExists(_) => ErrorCategory::Conflict,
            Self::UserNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidCredentials
            | Self::InvalidToken(_)
            | Self::Revoked
            | Self::Expired { .. } => ErrorCategory::Unauthorized,
            Self::Invalid(_) => ErrorCategory::Invalid,
            Self::Hash(_) | Self::Corrupt { .. } | Self::Io { .. } | Self::Config(_) => {
                ErrorCategory::Internal
            }
        }
    }
}
