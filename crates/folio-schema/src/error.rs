//! Error types for the schema gate

/// Errors raised while building or applying a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A record failed validation
    #[error("invalid {schema} record: {}", .errors.join("; "))]
    Invalid {
        /// Schema name
        schema: String,
        /// Field-level descriptions
        errors: Vec<String>,
    },

    /// The generated JSON Schema did not compile
    #[error("schema '{schema}' failed to compile: {message}")]
    Compile {
        /// Schema name
        schema: String,
        /// Compiler message
        message: String,
    },

    /// A media field is still relative after qualification
    #[error("{field} in {schema} record is not a qualified URL: '{value}'")]
    Unqualified {
        /// Schema name
        schema: String,
        /// Media path
        field: String,
        /// Offending value
        value: String,
    },

    /// Media path syntax error
    #[error("invalid media path '{0}'")]
    MediaPath(String),

    /// Vertical name not in the catalog
    #[error("unknown content vertical: '{0}'")]
    UnknownVertical(String),
}

impl SchemaError {
    /// Create validation error with one message
    pub fn invalid(schema: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Invalid {
            schema: schema.into(),
            errors: vec![error.into()],
        }
    }

    /// Field-level descriptions, empty for non-validation errors
    #[must_use]
    pub fn field_errors(&self) -> &[String] {
        match self {
            Self::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display_joins_errors() {
        let err = SchemaError::Invalid {
            schema: "post".into(),
            errors: vec!["/title: required".into(), "/draft: not a boolean".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid post record: /title: required; /draft: not a boolean"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn unknown_vertical_display() {
        let err = SchemaError::UnknownVertical("blog".into());
        assert_eq!(err.to_string(), "unknown content vertical: 'blog'");
        assert!(err.field_errors().is_empty());
    }
}
