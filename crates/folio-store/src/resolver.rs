//! Request path → file target
//!
//! The only place URL segments are turned into filesystem paths.

use crate::error::{StoreError, StoreResult};
use folio_content::{ContentPath, FileTarget, Lang, MARKDOWN_EXT};
use std::path::{Path, PathBuf};

/// Maps request URLs onto the content tree
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Resolver over a content root
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a section, whether or not it exists
    #[must_use]
    pub fn section_dir(&self, lang: Lang, section: &ContentPath) -> PathBuf {
        self.root.join(lang.as_str()).join(section.to_path_buf())
    }

    /// Resolve a request URL to a document or directory
    ///
    /// The first segment is the API prefix and is dropped. With
    /// `has_route_params` the last segment names a document; a `<name>.md`
    /// file wins over a `<name>/` directory.
    ///
    /// # Errors
    /// - [`StoreError::InvalidPath`] for traversal or forbidden segments
    /// - [`StoreError::NotFound`] when neither file nor directory exists
    pub async fn resolve(
        &self,
        lang: Lang,
        url: &str,
        has_route_params: bool,
    ) -> StoreResult<FileTarget> {
        let path = ContentPath::from_url(url)?.skip(1);

        if !has_route_params {
            let base = self.section_dir(lang, &path);
            return if is_dir(&base).await {
                tracing::debug!(url, dir = %base.display(), "resolved directory");
                Ok(FileTarget::dir(base))
            } else {
                Err(StoreError::NotFound(base))
            };
        }

        let Some((dir, name)) = path.split_last() else {
            return Err(StoreError::NotFound(self.root.join(lang.as_str())));
        };
        let base = self.section_dir(lang, &dir);

        let file = base.join(format!("{name}.{MARKDOWN_EXT}"));
        if is_file(&file).await {
            tracing::debug!(url, file = %file.display(), "resolved document");
            return Ok(FileTarget::file(file));
        }

        let nested = base.join(name);
        if is_dir(&nested).await {
            tracing::debug!(url, dir = %nested.display(), "resolved directory");
            return Ok(FileTarget::dir(nested));
        }

        Err(StoreError::NotFound(file))
    }

    /// Target of a document that may not exist yet
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidPath`] if `slug` is not a plain name.
    pub fn target_for(
        &self,
        lang: Lang,
        section: &ContentPath,
        slug: &str,
    ) -> StoreResult<FileTarget> {
        let path = section.child(slug)?;
        let (dir, name) = path
            .split_last()
            .ok_or_else(|| StoreError::Invalid("empty document name".into()))?;
        Ok(FileTarget::file(
            self.section_dir(lang, &dir)
                .join(format!("{name}.{MARKDOWN_EXT}")),
        ))
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn tree() -> (TempDir, PathResolver) {
        let tmp = TempDir::new().unwrap();
        let en = tmp.path().join("en");
        std::fs::create_dir_all(en.join("news/2024")).unwrap();
        std::fs::write(en.join("news/hello.md"), "---\ntitle: Hi\n---\n").unwrap();
        std::fs::create_dir_all(en.join("members/alice")).unwrap();
        std::fs::write(en.join("members/alice.md"), "---\n---\n").unwrap();
        let resolver = PathResolver::new(tmp.path());
        (tmp, resolver)
    }

    #[tokio::test]
    async fn listing_url_resolves_directory() {
        let (tmp, resolver) = tree();
        let target = resolver.resolve(Lang::En, "/api/news?page=2", false).await.unwrap();
        assert!(target.is_dir);
        assert_eq!(target.full_path, tmp.path().join("en/news"));
    }

    #[tokio::test]
    async fn document_url_resolves_markdown_file() {
        let (tmp, resolver) = tree();
        let target = resolver
            .resolve(Lang::En, "/api/news/hello?lang=en", true)
            .await
            .unwrap();
        assert!(!target.is_dir);
        assert_eq!(target.full_path, tmp.path().join("en/news/hello.md"));
        assert_eq!(target.id().unwrap().as_str(), "hello");
    }

    #[tokio::test]
    async fn nested_directory_with_route_param() {
        let (tmp, resolver) = tree();
        let target = resolver.resolve(Lang::En, "/api/news/2024", true).await.unwrap();
        assert_eq!(target, FileTarget::dir(tmp.path().join("en/news/2024")));
    }

    #[tokio::test]
    async fn file_wins_over_directory() {
        let (_tmp, resolver) = tree();
        let target = resolver.resolve(Lang::En, "/api/members/alice", true).await.unwrap();
        assert!(!target.is_dir);
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let (_tmp, resolver) = tree();
        let err = resolver.resolve(Lang::En, "/api/news/nope", true).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        let err = resolver.resolve(Lang::Vi, "/api/news", false).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let (_tmp, resolver) = tree();
        let err = resolver
            .resolve(Lang::En, "/api/news/../../etc/passwd", true)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }

    #[test]
    fn target_for_new_document() {
        let resolver = PathResolver::new("/content");
        let section: ContentPath = "news/2025".parse().unwrap();
        let target = resolver.target_for(Lang::Vi, &section, "launch").unwrap();
        assert_eq!(
            target.full_path,
            PathBuf::from("/content/vi/news/2025/launch.md")
        );
        assert!(resolver.target_for(Lang::Vi, &section, "..").is_err());
    }
}
