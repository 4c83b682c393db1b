//! Competition registration split

use crate::document::Record;
use serde::{Deserialize, Serialize};

/// Literal separating the registration part of a competition body
pub const REGISTRATION_MARKER: &str = "<!--REGISTRATION-->";

/// A competition as served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRecord {
    /// Validated, qualified metadata with `id`
    pub metadata: Record,
    /// Rendered main body
    pub content: String,
    /// Rendered registration part, empty when there is none
    pub registration: String,
}

/// Markdown parts of a competition body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSplit {
    /// Main body
    pub content: String,
    /// Registration section
    pub registration: String,
}

/// Split a body on [`REGISTRATION_MARKER`]
///
/// - no marker: everything is content
/// - one marker: content before, registration after
/// - two markers: registration is enclosed, content is what surrounds it
///
/// # Errors
/// Returns the marker count when there are more than two.
pub fn split_registration(body: &str) -> Result<RegistrationSplit, usize> {
    let parts: Vec<&str> = body.split(REGISTRATION_MARKER).collect();
    match parts.as_slice() {
        [content] => Ok(RegistrationSplit {
            content: (*content).to_string(),
            registration: String::new(),
        }),
        [content, registration] => Ok(RegistrationSplit {
            content: (*content).to_string(),
            registration: (*registration).to_string(),
        }),
        [head, registration, tail] => Ok(RegistrationSplit {
            content: format!("{head}{tail}"),
            registration: (*registration).to_string(),
        }),
        _ => Err(parts.len() - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn no_marker() {
        let split = split_registration("# Rules").unwrap();
        assert_eq!(split.content, "# Rules");
        assert!(split.registration.is_empty());
    }

    #[test]
    fn single_marker_splits_in_two() {
        let split = split_registration("intro\n<!--REGISTRATION-->\nform").unwrap();
        assert_eq!(split.content, "intro\n");
        assert_eq!(split.registration, "\nform");
    }

    #[test]
    fn enclosed_registration() {
        let split =
            split_registration("a<!--REGISTRATION-->form<!--REGISTRATION-->b").unwrap();
        assert_eq!(split.content, "ab");
        assert_eq!(split.registration, "form");
    }

    #[test]
    fn too_many_markers() {
        let body = REGISTRATION_MARKER.repeat(3);
        assert_eq!(split_registration(&body), Err(3));
    }

    proptest! {
        #[test]
        fn single_marker_reconstructs(a in "[a-z \n#]{0,40}", b in "[a-z \n#]{0,40}") {
            let body = format!("{a}{REGISTRATION_MARKER}{b}");
            let split = split_registration(&body).unwrap();
            prop_assert_eq!(
                format!("{}{REGISTRATION_MARKER}{}", split.content, split.registration),
                body
            );
        }
    }
}
