//! Resolved filesystem targets and document identity

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Extension of content documents
pub const MARKDOWN_EXT: &str = "md";

/// File stem of a section index document
pub const INDEX_STEM: &str = "_index";

/// A file or directory under the content root
///
/// `is_dir` decides whether a request is a listing or a detail read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTarget {
    /// Absolute or root-relative path on disk
    pub full_path: PathBuf,
    /// Whether the target is a directory listing
    pub is_dir: bool,
}

impl FileTarget {
    /// Target naming a single document
    #[inline]
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            full_path: path.into(),
            is_dir: false,
        }
    }

    /// Target naming a directory
    #[inline]
    #[must_use]
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            full_path: path.into(),
            is_dir: true,
        }
    }

    /// Path on disk
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.full_path
    }

    /// Identity of the document at this target, if it is a file
    #[must_use]
    pub fn id(&self) -> Option<DocumentId> {
        if self.is_dir {
            None
        } else {
            DocumentId::from_path(&self.full_path)
        }
    }

    /// Path of the section index inside a directory target
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.full_path.join(format!("{INDEX_STEM}.{MARKDOWN_EXT}"))
    }
}

impl Display for FileTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir { "dir" } else { "file" };
        write!(f, "{kind}:{}", self.full_path.display())
    }
}

/// Document identity, always the file stem
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive identity from a file path
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }

    /// Identity as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a section index document
    #[inline]
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.0 == INDEX_STEM
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
