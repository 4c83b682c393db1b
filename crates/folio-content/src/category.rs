//! Failure classes shared by every layer

use serde::{Deserialize, Serialize};

/// Coarse failure class a routing layer maps to a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Target does not exist
    NotFound,
    /// Input or stored content is malformed
    Invalid,
    /// Target already exists
    Conflict,
    /// Caller is not authenticated
    Unauthorized,
    /// Anything else
    Internal,
}

impl ErrorCategory {
    /// Conventional HTTP status for this class
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Invalid => 400,
            Self::Conflict => 409,
            Self::Unauthorized => 401,
            Self::Internal => 500,
        }
    }
}
