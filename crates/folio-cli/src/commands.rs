//! Subcommand handlers
//!
//! Each handler returns the JSON value the binary prints.

use anyhow::{Context, Result};
use folio_auth::SessionService;
use folio_codec::frontmatter;
use folio_content::{ContentPath, ErrorCategory, Lang};
use folio_schema::Vertical;
use folio_store::{ContentStore, DocumentPatch, ListQuery, NewDocument};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Category stamped on posts created through the news section
pub(crate) const NEWS_CATEGORY: &str = "cuocsong";

/// Where a document is written
#[derive(Debug, Clone)]
pub(crate) struct Location<'a> {
    pub(crate) lang: Lang,
    pub(crate) section: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) vertical: Vertical,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("serializing result")
}

/// Single document, with the registration split for competitions
pub(crate) async fn read(
    store: &ContentStore,
    lang: Lang,
    url: &str,
    vertical: Vertical,
) -> Result<Value> {
    let target = store.resolve_path(lang, url, true).await?;
    if vertical == Vertical::Competition {
        to_json(&store.read_competition(&target).await?)
    } else {
        to_json(&store.read_document(&target, store.schema(vertical)).await?)
    }
}

/// One page of a collection
pub(crate) async fn list(
    store: &ContentStore,
    lang: Lang,
    url: &str,
    vertical: Vertical,
    query: ListQuery,
) -> Result<Value> {
    let target = store.resolve_path(lang, url, false).await?;
    to_json(&store.list_collection(&target, vertical, query).await?)
}

/// Section landing page read from `_index.md`
pub(crate) async fn about(
    store: &ContentStore,
    lang: Lang,
    url: &str,
    vertical: Vertical,
) -> Result<Value> {
    let target = store.resolve_path(lang, url, false).await?;
    to_json(
        &store
            .read_section_document(target.path(), store.schema(vertical))
            .await?,
    )
}

async fn read_source(file: &Path) -> Result<(Option<folio_codec::Metadata>, String)> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let decoded = frontmatter::decode(&raw);
    let metadata = decoded
        .block
        .as_ref()
        .map(frontmatter::parse_metadata)
        .transpose()
        .with_context(|| format!("front matter of {}", file.display()))?;
    Ok((metadata, decoded.body.to_string()))
}

/// Create a document from a markdown file, then read it back
pub(crate) async fn create(
    store: &ContentStore,
    at: &Location<'_>,
    file: &Path,
    author: Option<&str>,
) -> Result<Value> {
    let target = store.target_for(at.lang, &ContentPath::from_url(at.section)?, at.slug)?;
    let (metadata, body) = read_source(file).await?;
    let mut document = NewDocument::new(metadata.unwrap_or_default(), body);
    if let Some(author) = author {
        document = document.with_author(author);
    }
    if at.vertical == Vertical::News {
        document = document.with_field("category", NEWS_CATEGORY);
    }
    let schema = store.schema(at.vertical);
    store.create_document(&target, schema, document).await?;
    to_json(&store.read_document(&target, schema).await?)
}

/// Merge a markdown file into an existing document, then read it back
///
/// A front-matter block patches metadata; a non-blank body replaces the body.
pub(crate) async fn update(store: &ContentStore, at: &Location<'_>, file: &Path) -> Result<Value> {
    let target = store.target_for(at.lang, &ContentPath::from_url(at.section)?, at.slug)?;
    let (metadata, body) = read_source(file).await?;
    let patch = DocumentPatch {
        metadata,
        body: (!body.trim().is_empty()).then_some(body),
    };
    let schema = store.schema(at.vertical);
    store.update_document(&target, schema, patch).await?;
    to_json(&store.read_document(&target, schema).await?)
}

/// Remove a document, returning its card
pub(crate) async fn delete(store: &ContentStore, at: &Location<'_>) -> Result<Value> {
    let target = store.target_for(at.lang, &ContentPath::from_url(at.section)?, at.slug)?;
    to_json(&store.delete_document(&target, store.schema(at.vertical)).await?)
}

/// Markdown file to HTML
pub(crate) async fn render(store: &ContentStore, file: &Path) -> Result<String> {
    let markdown = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    Ok(store.renderer().render(&markdown)?)
}

/// A document that failed to read
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Problem {
    pub(crate) path: String,
    pub(crate) category: ErrorCategory,
    pub(crate) error: String,
}

/// Read every document in a section, collecting failures
pub(crate) async fn check(
    store: &ContentStore,
    lang: Lang,
    url: &str,
    vertical: Vertical,
) -> Result<Vec<Problem>> {
    let target = store.resolve_path(lang, url, false).await?;
    let schema = store.schema(vertical);
    let mut problems = Vec::new();
    for file in store.scan_collection(target.path()).await? {
        if let Err(e) = store.read_document(&file, schema).await {
            tracing::warn!(path = %file, error = %e, "document failed check");
            problems.push(Problem {
                path: file.to_string(),
                category: e.category(),
                error: e.to_string(),
            });
        }
    }
    Ok(problems)
}

/// Account subcommands
#[derive(Debug, Clone)]
pub(crate) enum UserAction<'a> {
    Register { username: &'a str, password: &'a str },
    Login { username: &'a str, password: &'a str },
    Logout { token: &'a str },
    Whoami { token: &'a str },
}

/// Run an account subcommand
pub(crate) async fn user(service: &SessionService, action: UserAction<'_>) -> Result<Value> {
    match action {
        UserAction::Register { username, password } => {
            to_json(&service.register(username, password).await?)
        }
        UserAction::Login { username, password } => {
            to_json(&service.login(username, password).await?)
        }
        UserAction::Logout { token } => {
            service.logout(token).await?;
            Ok(serde_json::json!({ "loggedOut": true }))
        }
        UserAction::Whoami { token } => to_json(&service.authenticate(token).await?),
    }
}
