//! Folio content store
//!
//! The disk-facing half of the engine. Markdown files with front matter are
//! the database; this crate finds them, reads them through the schema gate,
//! lists them and writes them back.
//!
//! # Core Operations
//!
//! - **Resolve**: map a request URL to a document or directory
//! - **Read**: decode, validate, qualify and render a document
//! - **List**: scan a directory, project cards, filter, sort, paginate
//! - **Write**: create, partially update or delete a document under a
//!   per-path lock with atomic replacement
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_store::{ContentStore, EngineConfig, ListQuery};
//! use folio_content::Lang;
//! use folio_schema::Vertical;
//!
//! let store = ContentStore::new(EngineConfig::new().with_content_dir("content"))?;
//! let target = store.resolve_path(Lang::En, "/api/news?page=2", false).await?;
//! let listing = store.list_collection(&target, Vertical::News, ListQuery::page(2)).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod competition;
pub mod config;
pub mod document;
pub mod error;
pub mod listing;
pub mod portal;
pub mod resolver;
pub mod scanner;
pub mod store;
pub mod writer;

pub use competition::{split_registration, CompetitionRecord, REGISTRATION_MARKER};
pub use config::EngineConfig;
pub use document::{DocumentPatch, DocumentRecord, NewDocument, Record};
pub use error::{ErrorCategory, StoreError, StoreResult};
pub use listing::{ListQuery, Listing};
pub use portal::{PortalIngest, PortalPost, PortalPostUpdate};
pub use resolver::PathResolver;
pub use store::ContentStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the content store
    pub use crate::config::EngineConfig;
    pub use crate::document::{DocumentPatch, DocumentRecord, NewDocument};
    pub use crate::error::{ErrorCategory, StoreError, StoreResult};
    pub use crate::listing::{ListQuery, Listing};
    pub use crate::store::ContentStore;
    pub use folio_content::{FileTarget, Lang};
    pub use folio_schema::Vertical;
}
