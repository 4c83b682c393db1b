//! Error types for the content store

use folio_codec::{CodecError, RenderError};
pub use folio_content::ErrorCategory;
use folio_content::PathError;
use folio_schema::SchemaError;
use std::path::{Path, PathBuf};

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Content store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing on disk at the path
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Request path could not be mapped under the content root
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// Target is a directory where a document was expected
    #[error("not a document: {}", .0.display())]
    NotADocument(PathBuf),

    /// Document already exists
    #[error("already exists: {}", .0.display())]
    Conflict(PathBuf),

    /// Front matter could not be decoded
    #[error("cannot decode {}: {source}", path.display())]
    Codec {
        /// File being decoded
        path: PathBuf,
        /// Underlying error
        #[source]
        source: CodecError,
    },

    /// Markdown body could not be rendered
    #[error("cannot render {}: {source}", path.display())]
    Render {
        /// File being rendered
        path: PathBuf,
        /// Underlying error
        #[source]
        source: RenderError,
    },

    /// Record failed its schema
    #[error("{}: {source}", path.display())]
    Schema {
        /// File the record belongs to
        path: PathBuf,
        /// Underlying error
        #[source]
        source: SchemaError,
    },

    /// Schema catalog failed to compile
    #[error("schema catalog: {0}")]
    Catalog(#[source] SchemaError),

    /// Filesystem failure
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Competition body holds an unsupported number of registration markers
    #[error("{}: expected at most 2 registration markers, found {markers}", path.display())]
    Registration {
        /// Competition document
        path: PathBuf,
        /// Marker count
        markers: usize,
    },

    /// Document exceeds the configured size limit
    #[error("{} is {size} bytes, limit is {limit}", path.display())]
    TooLarge {
        /// Offending file
        path: PathBuf,
        /// Actual size
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// Request rejected before touching disk
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// Background task failed
    #[error("task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Create IO error with path context
    ///
    /// A missing file becomes [`StoreError::NotFound`].
    pub fn io_error(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Create codec error with path context
    pub fn codec(path: impl AsRef<Path>, source: CodecError) -> Self {
        Self::Codec {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create render error with path context
    pub fn render(path: impl AsRef<Path>, source: RenderError) -> Self {
        Self::Render {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create schema error with path context
    pub fn schema(path: impl AsRef<Path>, source: SchemaError) -> Self {
        Self::Schema {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Failure class of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::InvalidPath(_)
            | Self::NotADocument(_)
            | Self::Codec { .. }
            | Self::Schema { .. }
            | Self::Registration { .. }
            | Self::TooLarge { .. }
            | Self::Invalid(_) => ErrorCategory::Invalid,
            Self::Render { .. }
            | Self::Catalog(_)
            | Self::Io { .. }
            | Self::Config(_)
            | Self::Task(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = StoreError::io_error(
            "a.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn other_io_errors_are_internal() {
        let err = StoreError::io_error(
            "a.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no"),
        );
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("a.md"));
    }

    #[test]
    fn traversal_is_invalid() {
        let err = StoreError::from(PathError::Traversal("..".into()));
        assert_eq!(err.category(), ErrorCategory::Invalid);
    }
}
