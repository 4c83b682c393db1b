//! Content verticals and their schemas
//!
//! Every section of the site maps to a [`Vertical`]. A vertical has a card
//! schema for listings, a document schema for detail reads and writes, and
//! a [`ListingRule`] describing how its cards are filtered and ordered.

use crate::error::SchemaError;
use crate::field::{Field, FieldType};
use crate::schema::Schema;
use folio_content::MediaBase;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Default location stamped on posts
pub const DEFAULT_LOCATION: &str = "ISCM, Ho Chi Minh City, Vietnam";

/// Default author when none is recorded
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Site sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vertical {
    /// News posts
    News,
    /// Event posts
    Event,
    /// Team members
    Member,
    /// Research projects
    Project,
    /// Publications
    Publication,
    /// Competitions
    Competition,
    /// Courses
    Course,
    /// Activities
    Activity,
    /// Partners
    Partner,
    /// Studio lab showcase
    StudioLab,
}

impl Vertical {
    /// Every vertical
    pub const ALL: [Self; 10] = [
        Self::News,
        Self::Event,
        Self::Member,
        Self::Project,
        Self::Publication,
        Self::Competition,
        Self::Course,
        Self::Activity,
        Self::Partner,
        Self::StudioLab,
    ];

    /// Machine name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Event => "event",
            Self::Member => "member",
            Self::Project => "project",
            Self::Publication => "publication",
            Self::Competition => "competition",
            Self::Course => "course",
            Self::Activity => "activity",
            Self::Partner => "partner",
            Self::StudioLab => "studio-lab",
        }
    }

    /// Listing header title when the section index has none
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::News => "News",
            Self::Event => "Event",
            Self::Member => "Members",
            Self::Project => "Projects",
            Self::Publication => "Publications",
            Self::Competition => "Competitions",
            Self::Course => "Courses",
            Self::Activity => "Activities",
            Self::Partner => "Partners",
            Self::StudioLab => "Studio Lab",
        }
    }

    /// How cards of this vertical are listed
    #[must_use]
    pub fn listing(self) -> ListingRule {
        use DraftPolicy::{Hidden, Shown, VisibleToEditors};
        use SortOrder::{FileOrder, LaunchThenWeightDesc, PublishDateDesc, WeightAsc, WeightDesc};
        let (order, drafts, paginated) = match self {
            Self::News => (PublishDateDesc, VisibleToEditors, true),
            Self::Event => (PublishDateDesc, Hidden, true),
            Self::Member | Self::Course => (WeightAsc, Hidden, true),
            Self::Project => (FileOrder, Hidden, false),
            Self::Publication | Self::StudioLab => (FileOrder, Shown, true),
            Self::Competition => (LaunchThenWeightDesc, Hidden, true),
            Self::Activity => (WeightDesc, Hidden, true),
            Self::Partner => (WeightAsc, Hidden, false),
        };
        ListingRule {
            order,
            drafts,
            paginated,
        }
    }
}

impl Display for Vertical {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vertical {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownVertical(s.to_string()))
    }
}

/// Card ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest `publishDate` first
    PublishDateDesc,
    /// Lowest `weight` first
    WeightAsc,
    /// Highest `weight` first, missing weight counts as 0
    WeightDesc,
    /// Cards with `isLaunch` last, otherwise highest `weight` first
    LaunchThenWeightDesc,
    /// Directory traversal order
    FileOrder,
}

/// Draft visibility in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPolicy {
    /// Drafts never listed
    Hidden,
    /// Drafts listed only to authenticated editors
    VisibleToEditors,
    /// No draft flag; everything listed
    Shown,
}

/// Filtering, ordering and paging of a vertical's cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingRule {
    /// Card ordering
    pub order: SortOrder,
    /// Draft visibility
    pub drafts: DraftPolicy,
    /// Whether listings are split into pages
    pub paginated: bool,
}

/// Schemas of one vertical
#[derive(Debug, Clone)]
pub struct ContentSchema {
    /// Owning vertical
    pub vertical: Vertical,
    /// Listing projection
    pub card: Schema,
    /// Full document metadata
    pub document: Schema,
    /// Update patches
    pub patch: Schema,
    /// Whether a create must carry a non-empty body
    pub body_required: bool,
}

impl ContentSchema {
    fn new(vertical: Vertical, card: Schema, document: Schema, body_required: bool) -> Result<Self, SchemaError> {
        let patch = document.as_patch()?;
        Ok(Self {
            vertical,
            card,
            document,
            patch,
            body_required,
        })
    }
}

/// All vertical schemas plus the section index schema, compiled once
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    schemas: HashMap<Vertical, ContentSchema>,
    section: Schema,
}

impl SchemaCatalog {
    /// Compile every schema
    ///
    /// # Errors
    /// Returns [`SchemaError::Compile`] if a generated schema is rejected.
    pub fn new() -> Result<Self, SchemaError> {
        let mut schemas = HashMap::new();
        for vertical in Vertical::ALL {
            schemas.insert(vertical, build(vertical)?);
        }
        let section = Schema::builder("section-index")
            .optional("title", FieldType::String)
            .with_default("description", FieldType::String, json!(""))
            .optional("bg_image", FieldType::media())
            .build()?;
        Ok(Self { schemas, section })
    }

    /// Schemas of a vertical
    #[must_use]
    pub fn get(&self, vertical: Vertical) -> &ContentSchema {
        // Every vertical is inserted by `new`.
        &self.schemas[&vertical]
    }

    /// Schema of `_index.md` documents
    #[inline]
    #[must_use]
    pub fn section(&self) -> &Schema {
        &self.section
    }
}

fn string_default(value: &str) -> Value {
    Value::String(value.to_string())
}

fn build(vertical: Vertical) -> Result<ContentSchema, SchemaError> {
    let name = vertical.as_str();
    let card = |suffix: &str| Schema::builder(format!("{name}-{suffix}"));
    match vertical {
        Vertical::News | Vertical::Event => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .required("publishDate", FieldType::String)
                .with_default("draft", FieldType::Bool, json!(false))
                .required("image", FieldType::media())
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .default_now("publishDate")
                .with_default("draft", FieldType::Bool, json!(false))
                .required("image", FieldType::media())
                .with_default("showImage", FieldType::Bool, json!(false))
                .with_default("author", FieldType::String, string_default(UNKNOWN_AUTHOR))
                .with_default("description", FieldType::String, string_default(""))
                .with_default("location", FieldType::String, string_default(DEFAULT_LOCATION))
                .optional("category", FieldType::String)
                .optional(
                    "sdgs",
                    FieldType::NumberList {
                        min: Some(1),
                        max: Some(3),
                    },
                )
                .build()?,
            true,
        ),
        Vertical::Member => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .required("course", FieldType::String)
                .with_default("weight", FieldType::Number, json!(-1))
                .with_default("draft", FieldType::Bool, json!(false))
                .required("image", FieldType::media())
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .required("course", FieldType::String)
                .required("image", FieldType::media())
                .with_default("weight", FieldType::Number, json!(-1))
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("interest", FieldType::StringList.nullable(), Value::Null)
                .with_default("bio", FieldType::String, string_default(""))
                .with_default(
                    "contact",
                    FieldType::ObjectList(vec![
                        Field::required("icon", FieldType::String),
                        Field::required("link", FieldType::String),
                    ])
                    .nullable(),
                    Value::Null,
                )
                .build()?,
            false,
        ),
        Vertical::Project => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .with_default("draft", FieldType::Bool, json!(false))
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .optional("image", FieldType::media())
                .with_default("description", FieldType::String, string_default(""))
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("author", FieldType::String, string_default(UNKNOWN_AUTHOR))
                .build()?,
            true,
        ),
        Vertical::Publication => {
            let authors = FieldType::ObjectList(vec![
                Field::required("name", FieldType::String),
                Field::optional("title", FieldType::String),
            ]);
            ContentSchema::new(
                vertical,
                card("card")
                    .required("title", FieldType::String)
                    .with_default("authors", authors.clone(), json!([]))
                    .build()?,
                card("document")
                    .required("title", FieldType::NonEmptyString)
                    .optional("image", FieldType::media())
                    .with_default("authors", authors, json!([]))
                    .with_default("doi", FieldType::String, string_default(""))
                    .with_default("keywords", FieldType::StringList, json!([]))
                    .with_default("citation", FieldType::String, string_default(""))
                    .with_default("description", FieldType::String, string_default(""))
                    .with_default("abstract", FieldType::String, string_default(""))
                    .with_default("author", FieldType::String, string_default(UNKNOWN_AUTHOR))
                    .build()?,
                false,
            )
        }
        Vertical::Competition => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .optional("image", FieldType::media())
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("isLaunch", FieldType::Bool, json!(false))
                .with_default("weight", FieldType::Number, json!(0))
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .optional("image", FieldType::media())
                .optional("register", FieldType::media())
                .with_default("linkRegister", FieldType::String, string_default(""))
                .optional("fb", FieldType::media())
                .with_default("linkFB", FieldType::String.nullable(), Value::Null)
                .with_default("isLaunch", FieldType::Bool, json!(false))
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("weight", FieldType::Number, json!(0))
                .build()?,
            false,
        ),
        Vertical::Course => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .with_default("draft", FieldType::Bool, json!(false))
                .required("image", FieldType::media())
                .with_default("weight", FieldType::Number, json!(0))
                .optional("chance", FieldType::String)
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .required("date", FieldType::String)
                .required("image", FieldType::media())
                .with_default("duration", FieldType::String, string_default(""))
                .optional(
                    "courseStructure",
                    FieldType::ObjectList(vec![
                        Field::required("years", FieldType::String),
                        Field::required("image", FieldType::media()),
                    ]),
                )
                .optional("dualDegree", FieldType::String)
                .optional("chance", FieldType::String)
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("weight", FieldType::Number, json!(0))
                .build()?,
            false,
        ),
        Vertical::Activity => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .required("image", FieldType::media())
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("weight", FieldType::Number.nullable(), Value::Null)
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .required("image", FieldType::media())
                .with_default("draft", FieldType::Bool, json!(false))
                .with_default("weight", FieldType::Number.nullable(), Value::Null)
                .with_default("flipbook", FieldType::Bool, json!(false))
                .optional(
                    "flipbook_page",
                    FieldType::ObjectList(vec![
                        Field::required("flipbook_page_front", FieldType::media()),
                        Field::required("flipbook_page_back", FieldType::media()),
                    ]),
                )
                .optional("flipbook_width", FieldType::Number)
                .optional("flipbook_height", FieldType::Number)
                .require_when("flipbook", json!(true), "flipbook_page")
                .build()?,
            false,
        ),
        Vertical::Partner => {
            let partner = |suffix: &str| {
                card(suffix)
                    .required("title", FieldType::NonEmptyString)
                    .required("image", FieldType::media())
                    .with_default("link", FieldType::String.nullable(), Value::Null)
                    .with_default("weight", FieldType::Number, json!(0))
                    .with_default("draft", FieldType::Bool, json!(false))
                    .optional("author", FieldType::String.nullable())
            };
            ContentSchema::new(vertical, partner("card").build()?, partner("document").build()?, false)
        }
        Vertical::StudioLab => ContentSchema::new(
            vertical,
            card("card")
                .required("title", FieldType::String)
                .required("image", FieldType::media())
                .with_default("date", FieldType::String, string_default(""))
                .with_default("location", FieldType::String, string_default(""))
                .build()?,
            card("document")
                .required("title", FieldType::NonEmptyString)
                .required("image", FieldType::media())
                .with_default("members", FieldType::StringList, json!([]))
                .with_default("description", FieldType::String, string_default(""))
                .with_default("supervisor", FieldType::StringList, json!([]))
                .with_default("date", FieldType::String, string_default(""))
                .with_default("location", FieldType::String, string_default(""))
                .with_default("galley", FieldType::MediaList(MediaBase::Root), json!([]))
                .build()?,
            false,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn catalog_compiles_every_vertical() {
        let catalog = SchemaCatalog::new().unwrap();
        for vertical in Vertical::ALL {
            assert_eq!(catalog.get(vertical).vertical, vertical);
        }
    }

    #[test]
    fn vertical_names_round_trip() {
        for vertical in Vertical::ALL {
            assert_eq!(vertical.as_str().parse::<Vertical>().unwrap(), vertical);
        }
        assert!("blog".parse::<Vertical>().is_err());
    }

    #[test]
    fn post_defaults() {
        let catalog = SchemaCatalog::new().unwrap();
        let doc = catalog
            .get(Vertical::News)
            .document
            .validate(record(json!({"title": "Hello", "image": "a.png"})))
            .unwrap();
        assert_eq!(doc["author"], "unknown");
        assert_eq!(doc["location"], DEFAULT_LOCATION);
        assert_eq!(doc["draft"], false);
        assert!(doc["publishDate"].is_string());
    }

    #[test]
    fn sdgs_bounds() {
        let catalog = SchemaCatalog::new().unwrap();
        let schema = &catalog.get(Vertical::News).document;
        let base = json!({"title": "t", "image": "a.png"});
        let with = |sdgs: Value| {
            let mut rec = record(base.clone());
            rec.insert("sdgs".into(), sdgs);
            schema.validate(rec)
        };
        assert!(with(json!([1, 2, 3])).is_ok());
        assert!(with(json!([])).is_err());
        assert!(with(json!([1, 2, 3, 4])).is_err());
    }

    #[test]
    fn activity_flipbook_requires_pages() {
        let catalog = SchemaCatalog::new().unwrap();
        let schema = &catalog.get(Vertical::Activity).document;
        let err = schema
            .validate(record(json!({"title": "t", "image": "a", "flipbook": true})))
            .unwrap_err();
        assert!(err.to_string().contains("flipbook_page"));
    }

    #[test]
    fn studio_gallery_is_root_media() {
        let catalog = SchemaCatalog::new().unwrap();
        let media = catalog.get(Vertical::StudioLab).document.media();
        assert!(media
            .iter()
            .any(|(path, base)| path.to_string() == "galley[]" && *base == MediaBase::Root));
    }

    #[test]
    fn listing_rules() {
        assert_eq!(Vertical::News.listing().drafts, DraftPolicy::VisibleToEditors);
        assert_eq!(Vertical::Event.listing().drafts, DraftPolicy::Hidden);
        assert!(!Vertical::Partner.listing().paginated);
        assert_eq!(Vertical::Competition.listing().order, SortOrder::LaunchThenWeightDesc);
    }
}
