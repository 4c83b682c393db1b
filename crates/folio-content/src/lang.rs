//! Content language namespace

use crate::path::PathError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Language directory directly under the content root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// Vietnamese
    Vi,
    /// English
    #[default]
    En,
}

impl Lang {
    /// Directory name for this language
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
        }
    }

    /// Parse an optional `lang` query value, defaulting to English
    ///
    /// # Errors
    /// Returns [`PathError::UnknownLang`] for anything other than `vi` or `en`.
    pub fn from_query(value: Option<&str>) -> Result<Self, PathError> {
        match value {
            None | Some("") => Ok(Self::default()),
            Some(v) => v.parse(),
        }
    }
}

impl Display for Lang {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vi" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            other => Err(PathError::UnknownLang(other.to_string())),
        }
    }
}
