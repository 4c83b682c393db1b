//! URL paths for addressing content
//!
//! Provides [`ContentPath`], the validated segment list a request URL maps to.
//! Segments are confined: nothing in a `ContentPath` can climb out of the
//! directory it is later joined onto.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Path below a content section, as a list of URL segments
///
/// # Examples
/// - `/api/news/2024/hello?lang=vi` → `["api", "news", "2024", "hello"]`
/// - `news/` → `["news"]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentPath(Vec<String>);

impl ContentPath {
    /// Create path from segments, validating each
    ///
    /// # Errors
    /// Returns [`PathError`] if any segment is empty or escapes its parent.
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        for seg in &segments {
            validate_segment(seg)?;
        }
        Ok(Self(segments))
    }

    /// Parse a request URL, dropping the query string and empty segments
    ///
    /// # Errors
    /// Returns [`PathError`] if a segment is `.`/`..` or holds forbidden bytes.
    pub fn from_url(url: &str) -> Result<Self, PathError> {
        let path = url.split_once('?').map_or(url, |(p, _)| p);
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|seg| validate_segment(seg).map(|()| seg.to_string()))
            .collect::<Result<_, _>>()?;
        Ok(Self(segments))
    }

    /// Empty path (section root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment (if any)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Drop the first `n` segments
    #[inline]
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        Self(self.0.iter().skip(n).cloned().collect())
    }

    /// Split into directory part and trailing file name
    ///
    /// Returns `None` for the empty path.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &str)> {
        let (last, rest) = self.0.split_last()?;
        Some((Self(rest.to_vec()), last.as_str()))
    }

    /// Append a segment, returning new path
    ///
    /// # Errors
    /// Returns [`PathError`] if the segment is not a plain name.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut new = self.clone();
        new.0.push(segment);
        Ok(new)
    }

    /// Relative filesystem path built from the segments
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        self.0.iter().collect()
    }

    /// Iterator over segments
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

fn validate_segment(seg: &str) -> Result<(), PathError> {
    if seg.is_empty() {
        Err(PathError::EmptySegment)
    } else if seg == "." || seg == ".." {
        Err(PathError::Traversal(seg.to_string()))
    } else if seg.contains(['/', '\\', '\0']) {
        Err(PathError::InvalidSegment(seg.to_string()))
    } else {
        Ok(())
    }
}

impl Display for ContentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_url(s)
    }
}

/// Errors related to content paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Relative navigation segment
    #[error("path segment '{0}' would leave the content root")]
    Traversal(String),

    /// Segment holds a separator or NUL byte
    #[error("invalid segment: {0:?}")]
    InvalidSegment(String),

    /// Language outside the supported set
    #[error("unknown language: '{0}'")]
    UnknownLang(String),
}
