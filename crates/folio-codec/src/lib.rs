//! Folio codec
//!
//! The byte-level boundary between content files and the engine.
//!
//! # Core Operations
//!
//! - **Decode**: split a file into its `---` front-matter block and body
//! - **Encode**: write metadata and body back, fully or partially, keeping
//!   untouched bytes identical
//! - **Render**: turn the markdown body into HTML with qualified image URLs
//!
//! # Architecture
//!
//! ```text
//! raw file → decode → (metadata, body)
//!                         │        └→ Renderer: parse → raw HTML → images → attributes → HTML
//!                         └→ encode / replace_metadata / replace_body → raw file
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_codec::{frontmatter, Renderer};
//! use folio_content::AssetBase;
//!
//! let decoded = frontmatter::decode(&raw);
//! let metadata = frontmatter::decode_metadata(&raw)?;
//! let html = Renderer::new(AssetBase::default()).render(decoded.body)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod frontmatter;
pub mod merge;
pub mod render;

pub use error::{CodecError, RenderError};
pub use frontmatter::{Decoded, FrontMatterBlock, Metadata};
pub use merge::merge_metadata;
pub use render::{RenderOptions, Renderer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Folio codec
    pub use crate::error::{CodecError, RenderError};
    pub use crate::frontmatter::{self, Decoded, Metadata};
    pub use crate::merge::merge_metadata;
    pub use crate::render::{RenderOptions, RenderStage, Renderer};
}
