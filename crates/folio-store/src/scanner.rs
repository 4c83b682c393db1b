//! Collection scanning

use folio_content::{DocumentId, FileTarget, MARKDOWN_EXT};
use std::path::Path;
use walkdir::WalkDir;

/// Every markdown document below `dir`, section indexes excluded
///
/// Files are returned in file-name order per directory. A missing directory
/// yields an empty list. Symlinks are not followed, so symlinked content
/// directories are skipped.
#[must_use]
pub fn scan(dir: &Path) -> Vec<FileTarget> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "collection directory absent");
        return Vec::new();
    }

    let targets: Vec<FileTarget> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_document(entry.path()))
        .map(|entry| FileTarget::file(entry.into_path()))
        .collect();

    tracing::debug!(dir = %dir.display(), count = targets.len(), "scanned collection");
    targets
}

fn is_document(path: &Path) -> bool {
    let markdown = path.extension().and_then(|e| e.to_str()) == Some(MARKDOWN_EXT);
    markdown && DocumentId::from_path(path).is_some_and(|id| !id.is_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn ids(targets: &[FileTarget]) -> Vec<String> {
        targets
            .iter()
            .filter_map(FileTarget::id)
            .map(|id| id.to_string())
            .collect()
    }

    #[test]
    fn excludes_index_and_non_markdown() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("_index.md"), "").unwrap();
        std::fs::write(dir.join("b.md"), "").unwrap();
        std::fs::write(dir.join("a.md"), "").unwrap();
        std::fs::write(dir.join("notes.txt"), "").unwrap();
        std::fs::write(dir.join(".a.md.1234.tmp"), "").unwrap();
        assert_eq!(ids(&scan(dir)), vec!["a", "b"]);
    }

    #[test]
    fn descends_into_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::create_dir_all(dir.join("2024")).unwrap();
        std::fs::write(dir.join("2024/_index.md"), "").unwrap();
        std::fs::write(dir.join("2024/hello.md"), "").unwrap();
        std::fs::write(dir.join("top.md"), "").unwrap();
        assert_eq!(ids(&scan(dir)), vec!["hello", "top"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(&tmp.path().join("nope")).is_empty());
    }
}
