//! Static-asset URL qualification
//!
//! Media fields are stored relative (`photo.jpg`) and served absolute
//! (`http://host:port/<prefix>/static/photo.jpg`). [`AssetBase`] owns both
//! directions so the renderer and the schema normalizer agree on the format.

use serde::{Deserialize, Serialize};

/// Which root a media path hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBase {
    /// `scheme://host:port/<prefix>/static/<path>`
    Static,
    /// `scheme://host:port/<path>`
    Root,
}

/// Location of the static file server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetBase {
    /// URL scheme
    pub scheme: String,
    /// Host name
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Path prefix before `/static`, may be empty
    pub prefix: String,
}

impl Default for AssetBase {
    fn default() -> Self {
        Self::new("localhost", 4000)
    }
}

impl AssetBase {
    /// Create base for host and port over plain HTTP
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
            prefix: String::new(),
        }
    }

    /// Set the path prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Set the URL scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// `scheme://host:port`
    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Base URL for a media root, without trailing slash
    #[must_use]
    pub fn root_url(&self, base: MediaBase) -> String {
        let prefix = self.prefix.trim_matches('/');
        match base {
            MediaBase::Root => self.origin(),
            MediaBase::Static if prefix.is_empty() => format!("{}/static", self.origin()),
            MediaBase::Static => format!("{}/{prefix}/static", self.origin()),
        }
    }

    /// Turn a stored media path into an absolute URL
    ///
    /// Values that are already absolute are returned unchanged.
    #[must_use]
    pub fn qualify(&self, value: &str, base: MediaBase) -> String {
        if value.is_empty() || is_absolute_url(value) {
            return value.to_string();
        }
        format!("{}/{}", self.root_url(base), value.trim_start_matches('/'))
    }

    /// Turn an absolute URL under this base back into its stored form
    ///
    /// Stored form never has a leading slash. URLs pointing elsewhere are
    /// returned unchanged.
    #[must_use]
    pub fn dequalify(&self, value: &str, base: MediaBase) -> String {
        let root = self.root_url(base);
        match value.strip_prefix(&root) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                rest.trim_start_matches('/').to_string()
            }
            _ if is_absolute_url(value) => value.to_string(),
            _ => value.trim_start_matches('/').to_string(),
        }
    }

    /// Whether `value` is already in served (absolute) form
    #[must_use]
    pub fn is_qualified(&self, value: &str) -> bool {
        value.starts_with(&self.origin()) || is_absolute_url(value)
    }
}

/// Whether a reference already carries a scheme or authority
#[must_use]
pub fn is_absolute_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assets() -> AssetBase {
        AssetBase::new("example.org", 4000).with_prefix("/uploads/")
    }

    #[test]
    fn qualify_static() {
        assert_eq!(
            assets().qualify("photo.jpg", MediaBase::Static),
            "http://example.org:4000/uploads/static/photo.jpg"
        );
        assert_eq!(
            assets().qualify("/images/a.png", MediaBase::Static),
            "http://example.org:4000/uploads/static/images/a.png"
        );
    }

    #[test]
    fn qualify_without_prefix() {
        let base = AssetBase::new("localhost", 8080);
        assert_eq!(
            base.qualify("a.png", MediaBase::Static),
            "http://localhost:8080/static/a.png"
        );
    }

    #[test]
    fn qualify_root() {
        assert_eq!(
            assets().qualify("gallery/1.jpg", MediaBase::Root),
            "http://example.org:4000/gallery/1.jpg"
        );
    }

    #[test]
    fn absolute_urls_untouched() {
        let url = "https://cdn.example.com/x.png";
        assert_eq!(assets().qualify(url, MediaBase::Static), url);
        assert_eq!(assets().dequalify(url, MediaBase::Static), url);
        assert_eq!(assets().qualify("", MediaBase::Static), "");
    }

    #[test]
    fn dequalify_strips_leading_slash() {
        assert_eq!(assets().dequalify("/a/b.png", MediaBase::Static), "a/b.png");
    }

    #[test]
    fn dequalify_does_not_match_partial_prefix() {
        let url = "http://example.org:4000/uploads/staticfoo/x.png";
        assert_eq!(assets().dequalify(url, MediaBase::Static), url);
    }

    proptest! {
        #[test]
        fn bare_paths_round_trip(path in "[a-z0-9_-]{1,12}(/[a-z0-9_-]{1,12}){0,3}\\.(png|jpg|webp)") {
            let base = assets();
            for media in [MediaBase::Static, MediaBase::Root] {
                let url = base.qualify(&path, media);
                prop_assert!(base.is_qualified(&url));
                prop_assert_eq!(base.dequalify(&url, media), path.clone());
            }
        }
    }
}
