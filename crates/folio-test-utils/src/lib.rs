//! Testing utilities for the Folio workspace
//!
//! Temporary content trees and sample documents.

#![allow(missing_docs)]

use folio_codec::{frontmatter, Metadata};
use folio_content::{AssetBase, Lang};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Asset base used across tests: `http://localhost:4000/uploads/static/...`
pub fn test_assets() -> AssetBase {
    AssetBase::new("localhost", 4000).with_prefix("uploads")
}

pub fn metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A content root in a temp directory, removed on drop
#[derive(Debug)]
pub struct ContentTree {
    dir: TempDir,
}

impl ContentTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp content root");
        std::fs::create_dir_all(dir.path().join(Lang::En.as_str())).expect("create en");
        std::fs::create_dir_all(dir.path().join(Lang::Vi.as_str())).expect("create vi");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` under the English tree
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(Lang::En.as_str()).join(rel)
    }

    /// Write raw text to `rel` under the English tree
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    /// Write a document with front matter
    pub fn document(&self, rel: &str, front: Value, body: &str) -> PathBuf {
        let text = frontmatter::encode(&metadata(front), body).expect("encode fixture");
        self.write(rel, &text)
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(&path).expect("create dir");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read fixture")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Front matter of a valid news post
pub fn news_front(title: &str, publish_date: &str) -> Value {
    json!({
        "title": title,
        "publishDate": publish_date,
        "image": "images/cover.jpg",
        "draft": false,
    })
}

/// A news section with `count` posts, one day apart, and an index
pub fn news_section(tree: &ContentTree, count: usize) {
    tree.document(
        "news/_index.md",
        json!({"title": "Latest News", "description": "From the lab", "bg_image": "bg/news.jpg"}),
        "",
    );
    for i in 0..count {
        tree.document(
            &format!("news/post-{i:02}.md"),
            news_front(
                &format!("Post {i}"),
                &format!("2024-01-{:02}T00:00:00.000Z", i + 1),
            ),
            &format!("Body of post {i}.\n"),
        );
    }
}
