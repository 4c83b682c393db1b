//! Folio schema gate
//!
//! Every record crosses a [`Schema`] before it is returned or persisted.
//! Shape checking and URL normalization are separate steps:
//!
//! - [`Schema::validate`]: coerce, fill defaults, check with JSON Schema,
//!   project to declared fields
//! - [`Normalizer`]: qualify media paths on read, de-qualify them on write
//! - [`SchemaGate`]: the read and write sequences built from the two
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_schema::{FieldType, Schema, SchemaGate};
//! use folio_content::AssetBase;
//! use serde_json::json;
//!
//! let schema = Schema::builder("card")
//!     .required("title", FieldType::NonEmptyString)
//!     .with_default("draft", FieldType::Bool, json!(false))
//!     .required("image", FieldType::media())
//!     .build()?;
//!
//! let gate = SchemaGate::new(AssetBase::default());
//! let record = gate.read(&schema, metadata)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod field;
pub mod gate;
pub mod normalize;
pub mod schema;
pub mod verticals;

pub use error::SchemaError;
pub use field::{Field, FieldType, MediaPath, Presence};
pub use gate::SchemaGate;
pub use normalize::Normalizer;
pub use schema::{Schema, SchemaBuilder};
pub use verticals::{ContentSchema, DraftPolicy, ListingRule, SchemaCatalog, SortOrder, Vertical};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the schema gate
    pub use crate::error::SchemaError;
    pub use crate::field::{FieldType, Presence};
    pub use crate::gate::SchemaGate;
    pub use crate::schema::Schema;
    pub use crate::verticals::{ContentSchema, SchemaCatalog, Vertical};
}
