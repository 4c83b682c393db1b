//! Folio content model
//!
//! Types shared by every layer of the engine:
//!
//! - [`Lang`]: the language namespace under the content root
//! - [`ContentPath`]: validated URL path segments
//! - [`FileTarget`] / [`DocumentId`]: a resolved file or directory and the
//!   identity derived from its file stem
//! - [`AssetBase`]: static-asset URL qualification in both directions
//! - [`Page`] / [`paginate`]: fixed-size pagination of card listings
//! - [`ErrorCategory`]: failure classes shared by the store and auth layers
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_content::{AssetBase, MediaBase};
//!
//! let assets = AssetBase::new("localhost", 4000).with_prefix("uploads");
//! let url = assets.qualify("photo.jpg", MediaBase::Static);
//! assert_eq!(url, "http://localhost:4000/uploads/static/photo.jpg");
//! assert_eq!(assets.dequalify(&url, MediaBase::Static), "photo.jpg");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod asset;
pub mod category;
pub mod lang;
pub mod page;
pub mod path;
pub mod target;

pub use asset::{AssetBase, MediaBase};
pub use category::ErrorCategory;
pub use lang::Lang;
pub use page::{paginate, Page, PageInfo, DEFAULT_PAGE_SIZE};
pub use path::{ContentPath, PathError};
pub use target::{DocumentId, FileTarget, INDEX_STEM, MARKDOWN_EXT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Folio content
    pub use crate::asset::{AssetBase, MediaBase};
    pub use crate::lang::Lang;
    pub use crate::page::{paginate, Page, PageInfo};
    pub use crate::path::ContentPath;
    pub use crate::target::{DocumentId, FileTarget};
}
