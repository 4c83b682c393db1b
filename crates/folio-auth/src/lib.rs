//! Folio accounts and sessions
//!
//! Editors authenticate with a username and password. A successful register
//! or login yields a signed session token; the token stays valid while it is
//! in the active list, carries a good signature and has not expired.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_auth::{AuthConfig, SessionService};
//!
//! let service = SessionService::from_config(&AuthConfig::new()).await?;
//! let session = service.register("editor", "correct horse").await?;
//! let account = service.authenticate(&session.token).await?;
//! service.logout(&session.token).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use service::{Session, SessionService};
pub use store::{
    Account, JsonSessionStore, JsonUserStore, MemorySessionStore, MemoryUserStore, SessionStore,
    User, UserStore,
};
pub use token::{Claims, TokenIssuer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for account and session handling
    pub use crate::config::AuthConfig;
    pub use crate::error::{AuthError, AuthResult};
    pub use crate::service::{Session, SessionService};
    pub use crate::store::{Account, SessionStore, UserStore};
}
