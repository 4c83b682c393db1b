//! Error types for the codec
//!
//! - [`CodecError`]: front-matter decode and encode failures
//! - [`RenderError`]: markdown pipeline failures

/// Errors while decoding or encoding front matter
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The file has no `---` block but the operation needs one
    #[error("document has no front-matter block")]
    MissingFrontMatter,

    /// The block is not valid YAML
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The block parsed, but not into a mapping
    #[error("front matter must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// A mapping key is a sequence or mapping
    #[error("front-matter keys must be scalars, found {0}")]
    UnsupportedKey(&'static str),
}

/// Errors raised by the markdown pipeline
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An attribute comment could not be parsed
    #[error("malformed attribute comment '{comment}': {reason}")]
    Attribute {
        /// Comment text as written
        comment: String,
        /// What was wrong with it
        reason: String,
    },

    /// A pipeline stage failed
    #[error("render stage '{stage}' failed: {message}")]
    Stage {
        /// Stage name
        stage: &'static str,
        /// Failure description
        message: String,
    },
}

impl RenderError {
    /// Create attribute error for a comment
    pub fn attribute(comment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Attribute {
            comment: comment.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_display() {
        assert_eq!(
            CodecError::MissingFrontMatter.to_string(),
            "document has no front-matter block"
        );
        assert_eq!(
            CodecError::NotAMapping("a sequence").to_string(),
            "front matter must be a mapping, found a sequence"
        );
    }

    #[test]
    fn render_error_display() {
        let err = RenderError::attribute("<!--rehype:x-->", "missing '='");
        assert!(err.to_string().contains("missing '='"));
    }
}
