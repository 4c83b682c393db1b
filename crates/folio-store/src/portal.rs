//! Posts pushed in by the university portal

use crate::document::{DocumentPatch, NewDocument};
use crate::error::{StoreError, StoreResult};
use crate::store::ContentStore;
use chrono::{NaiveDateTime, SecondsFormat, Utc};
use folio_codec::Metadata;
use folio_content::{ContentPath, FileTarget, Lang};
use folio_schema::Vertical;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Author recorded on every portal post
pub const PORTAL_AUTHOR: &str = "UEH Portal";

/// Date layout the portal sends
pub const PORTAL_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Section a portal category code maps to
///
/// # Errors
/// Returns [`StoreError::Invalid`] for codes outside 0 to 3.
pub fn category_section(code: u8) -> StoreResult<&'static str> {
    match code {
        0 => Ok("news"),
        1 => Ok("evolving_research"),
        2 => Ok("voice_from_public"),
        3 => Ok("open_admission"),
        other => Err(StoreError::Invalid(format!("Unknown category: {other}"))),
    }
}

/// A new post from the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalPost {
    /// Document id, used as the file name
    pub id: String,
    /// Title
    pub title: String,
    /// `dd/MM/yyyy HH:mm:ss`, now when absent
    #[serde(default)]
    pub publish_date: Option<String>,
    /// Thumbnail, stored as `image`
    pub thumb: String,
    /// Markdown body
    pub content: String,
    /// Summary
    pub description: String,
    /// Sustainable development goals, 1 to 3
    pub sdgs: Vec<u8>,
    /// Category code
    pub category: u8,
}

/// Changes to a portal post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalPostUpdate {
    /// Document id
    pub id: String,
    /// Category code locating the post
    pub category: u8,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New thumbnail, placed under `images/` unless already there
    #[serde(default)]
    pub thumb: Option<String>,
    /// New markdown body
    #[serde(default)]
    pub content: Option<String>,
    /// New summary
    #[serde(default)]
    pub description: Option<String>,
    /// New goals
    #[serde(default)]
    pub sdgs: Option<Vec<u8>>,
}

/// Portal ingestion over a content store
#[derive(Debug, Clone, Copy)]
pub struct PortalIngest<'a> {
    store: &'a ContentStore,
}

impl<'a> PortalIngest<'a> {
    /// Ingest into `store`
    #[must_use]
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }

    /// Where a portal post lives
    ///
    /// # Errors
    /// Fails for an unknown category or an id that is not a plain name.
    pub fn target(&self, lang: Lang, category: u8, id: &str) -> StoreResult<FileTarget> {
        let section = ContentPath::root().child(category_section(category)?)?;
        self.store.target_for(lang, &section, id)
    }

    /// Store a new portal post
    ///
    /// # Errors
    /// - [`StoreError::Invalid`] for an unknown category or bad date
    /// - [`StoreError::Conflict`] if the post exists
    /// - [`StoreError::Schema`] if the post fails the post schema
    pub async fn create_post(&self, lang: Lang, post: PortalPost) -> StoreResult<FileTarget> {
        let target = self.target(lang, post.category, &post.id)?;
        let publish_date = match &post.publish_date {
            Some(date) => parse_portal_date(date)?,
            None => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let metadata = object(json!({
            "title": post.title,
            "image": post.thumb,
            "description": post.description,
            "sdgs": post.sdgs,
            "publishDate": publish_date,
            "location": "",
        }));
        let document = NewDocument::new(metadata, post.content).with_author(PORTAL_AUTHOR);
        self.store
            .create_document(&target, self.store.schema(Vertical::News), document)
            .await?;
        tracing::info!(id = %post.id, category = post.category, "portal post received");
        Ok(target)
    }

    /// Merge changes into an existing portal post
    ///
    /// # Errors
    /// - [`StoreError::Invalid`] for an unknown category
    /// - [`StoreError::NotFound`] if the post does not exist
    /// - [`StoreError::Schema`] if the merged post is invalid
    pub async fn update_post(&self, lang: Lang, update: PortalPostUpdate) -> StoreResult<FileTarget> {
        let target = self.target(lang, update.category, &update.id)?;
        let mut metadata = Metadata::new();
        if let Some(title) = update.title {
            metadata.insert("title".into(), Value::String(title));
        }
        if let Some(thumb) = update.thumb {
            metadata.insert("image".into(), Value::String(image_path(&thumb)));
        }
        if let Some(description) = update.description {
            metadata.insert("description".into(), Value::String(description));
        }
        if let Some(sdgs) = update.sdgs {
            metadata.insert("sdgs".into(), json!(sdgs));
        }
        let patch = DocumentPatch {
            metadata: (!metadata.is_empty()).then_some(metadata),
            body: update.content.filter(|c| !c.is_empty()),
        };
        self.store
            .update_document(&target, self.store.schema(Vertical::News), patch)
            .await?;
        tracing::info!(id = %update.id, category = update.category, "portal post updated");
        Ok(target)
    }
}

/// `dd/MM/yyyy HH:mm:ss` (UTC) → RFC 3339 with milliseconds
///
/// # Errors
/// Returns [`StoreError::Invalid`] if the text does not match.
pub fn parse_portal_date(text: &str) -> StoreResult<String> {
    NaiveDateTime::parse_from_str(text.trim(), PORTAL_DATE_FORMAT)
        .map(|dt| dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        .map_err(|e| StoreError::Invalid(format!("publishDate '{text}': {e}")))
}

fn image_path(thumb: &str) -> String {
    let thumb = thumb.trim_start_matches('/');
    if thumb.starts_with("images/") {
        thumb.to_string()
    } else {
        format!("images/{thumb}")
    }
}

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn category_codes() {
        assert_eq!(category_section(0).unwrap(), "news");
        assert_eq!(category_section(3).unwrap(), "open_admission");
        assert_eq!(category_section(4).unwrap_err().category(), ErrorCategory::Invalid);
    }

    #[test]
    fn portal_dates_become_rfc3339() {
        assert_eq!(
            parse_portal_date("05/03/2024 14:30:00").unwrap(),
            "2024-03-05T14:30:00.000Z"
        );
        assert!(parse_portal_date("2024-03-05").is_err());
    }

    #[test]
    fn thumbs_land_under_images() {
        assert_eq!(image_path("a.png"), "images/a.png");
        assert_eq!(image_path("/images/a.png"), "images/a.png");
    }

    #[test]
    fn post_deserializes_from_portal_json() {
        let post: PortalPost = serde_json::from_value(json!({
            "id": "p1", "title": "T", "thumb": "t.png", "content": "body",
            "description": "d", "sdgs": [4], "category": 1,
            "publishDate": "01/01/2024 00:00:00"
        }))
        .unwrap();
        assert_eq!(post.publish_date.as_deref(), Some("01/01/2024 00:00:00"));
    }
}
