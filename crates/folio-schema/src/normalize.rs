//! Media URL normalization
//!
//! Kept apart from shape validation so it can be tested on its own and
//! applied in exactly one direction per path.

use crate::error::SchemaError;
use crate::schema::Schema;
use folio_content::AssetBase;
use serde_json::{Map, Value};

/// Rewrites a schema's media fields between stored and served form
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    assets: AssetBase,
}

impl Normalizer {
    /// Normalizer for a static server
    #[must_use]
    pub fn new(assets: AssetBase) -> Self {
        Self { assets }
    }

    /// Asset base in use
    #[inline]
    #[must_use]
    pub fn assets(&self) -> &AssetBase {
        &self.assets
    }

    /// Read direction: stored paths become absolute URLs
    pub fn qualify(&self, schema: &Schema, record: &mut Map<String, Value>) {
        self.rewrite(schema, record, |assets, value, base| assets.qualify(value, base));
    }

    /// Write direction: URLs under this base become stored paths
    pub fn dequalify(&self, schema: &Schema, record: &mut Map<String, Value>) {
        self.rewrite(schema, record, |assets, value, base| assets.dequalify(value, base));
    }

    /// Fail if any non-empty media value is still relative
    ///
    /// # Errors
    /// Returns [`SchemaError::Unqualified`] naming the first offending field.
    pub fn ensure_qualified(
        &self,
        schema: &Schema,
        record: &Map<String, Value>,
    ) -> Result<(), SchemaError> {
        let root = Value::Object(record.clone());
        for (path, _) in schema.media() {
            if let Some(value) = path
                .strings(&root)
                .into_iter()
                .find(|v| !v.is_empty() && !self.assets.is_qualified(v))
            {
                return Err(SchemaError::Unqualified {
                    schema: schema.name().to_string(),
                    field: path.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    fn rewrite(
        &self,
        schema: &Schema,
        record: &mut Map<String, Value>,
        f: impl Fn(&AssetBase, &str, folio_content::MediaBase) -> String,
    ) {
        if schema.media().is_empty() {
            return;
        }
        let mut root = Value::Object(std::mem::take(record));
        for (path, base) in schema.media() {
            path.for_each_mut(&mut root, &mut |s: &mut String| {
                *s = f(&self.assets, s, *base);
            });
        }
        if let Value::Object(map) = root {
            *record = map;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use folio_content::MediaBase;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::builder("studio")
            .required("image", FieldType::media())
            .optional("galley", FieldType::MediaList(MediaBase::Root))
            .optional(
                "courseStructure",
                FieldType::ObjectList(vec![Field::required("image", FieldType::media())]),
            )
            .build()
            .unwrap()
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(AssetBase::new("host", 4000).with_prefix("media"))
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn qualify_every_media_path() {
        let mut rec = record(json!({
            "image": "photo.jpg",
            "galley": ["g/1.jpg", "https://cdn/x.jpg"],
            "courseStructure": [{"image": "/year1.png"}]
        }));
        normalizer().qualify(&schema(), &mut rec);
        assert_eq!(
            Value::Object(rec.clone()),
            json!({
                "image": "http://host:4000/media/static/photo.jpg",
                "galley": ["http://host:4000/g/1.jpg", "https://cdn/x.jpg"],
                "courseStructure": [{"image": "http://host:4000/media/static/year1.png"}]
            })
        );
        assert!(normalizer().ensure_qualified(&schema(), &rec).is_ok());
    }

    #[test]
    fn dequalify_restores_stored_form() {
        let mut rec = record(json!({"image": "photo.jpg"}));
        let n = normalizer();
        n.qualify(&schema(), &mut rec);
        n.dequalify(&schema(), &mut rec);
        assert_eq!(rec["image"], "photo.jpg");
    }

    #[test]
    fn relative_value_fails_qualified_check() {
        let rec = record(json!({"image": "photo.jpg"}));
        let err = normalizer().ensure_qualified(&schema(), &rec).unwrap_err();
        assert!(matches!(err, SchemaError::Unqualified { field, .. } if field == "image"));
    }

    #[test]
    fn non_media_fields_untouched() {
        let mut rec = record(json!({"image": "a.png", "title": "b.png"}));
        normalizer().qualify(&schema(), &mut rec);
        assert_eq!(rec["title"], "b.png");
    }

    proptest! {
        #[test]
        fn qualify_then_dequalify_is_identity(
            image in "[a-z0-9_-]{1,8}(/[a-z0-9_-]{1,8}){0,2}\\.(jpg|png)",
            galley in proptest::collection::vec("[a-z0-9_-]{1,8}/[a-z0-9_-]{1,8}\\.jpg", 0..4),
            years in proptest::collection::vec("[a-z0-9_-]{1,8}\\.png", 0..3),
        ) {
            let stored = record(json!({
                "image": image,
                "galley": galley,
                "courseStructure": years.iter().map(|y| json!({"image": y})).collect::<Vec<_>>(),
            }));
            let n = normalizer();
            let mut rec = stored.clone();
            n.qualify(&schema(), &mut rec);
            prop_assert!(n.ensure_qualified(&schema(), &rec).is_ok());
            n.dequalify(&schema(), &mut rec);
            prop_assert_eq!(rec, stored);
        }
    }
}
