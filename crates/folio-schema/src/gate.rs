//! Read and write sequences over a schema

use crate::error::SchemaError;
use crate::normalize::Normalizer;
use crate::schema::Schema;
use folio_content::AssetBase;
use serde_json::{Map, Value};

/// Runs records through validation and normalization in the right order
///
/// - read: validate → qualify → check qualified
/// - write: de-qualify → validate
#[derive(Debug, Clone, Default)]
pub struct SchemaGate {
    normalizer: Normalizer,
}

impl SchemaGate {
    /// Gate for a static server
    #[must_use]
    pub fn new(assets: AssetBase) -> Self {
        Self {
            normalizer: Normalizer::new(assets),
        }
    }

    /// Normalizer in use
    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Admit a stored record for output
    ///
    /// # Errors
    /// Returns [`SchemaError`] if the record fails the schema or a media
    /// value cannot be qualified.
    pub fn read(
        &self,
        schema: &Schema,
        raw: Map<String, Value>,
    ) -> Result<Map<String, Value>, SchemaError> {
        let mut record = schema.validate(raw)?;
        self.normalizer.qualify(schema, &mut record);
        self.normalizer.ensure_qualified(schema, &record)?;
        Ok(record)
    }

    /// Admit a new record for storage, keeping declared fields only
    ///
    /// # Errors
    /// Returns [`SchemaError::Invalid`] if the input fails the schema.
    pub fn write(
        &self,
        schema: &Schema,
        input: Map<String, Value>,
    ) -> Result<Map<String, Value>, SchemaError> {
        let mut input = input;
        self.normalizer.dequalify(schema, &mut input);
        schema.validate(input)
    }

    /// Admit a merged record for storage, keeping undeclared keys
    ///
    /// # Errors
    /// Returns [`SchemaError::Invalid`] if the record fails the schema.
    pub fn write_preserving(
        &self,
        schema: &Schema,
        merged: Map<String, Value>,
    ) -> Result<Map<String, Value>, SchemaError> {
        let mut merged = merged;
        self.normalizer.dequalify(schema, &mut merged);
        schema.check(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn setup() -> (SchemaGate, Schema) {
        let gate = SchemaGate::new(AssetBase::new("h", 4000).with_prefix("up"));
        let schema = Schema::builder("post")
            .required("title", FieldType::NonEmptyString)
            .required("image", FieldType::media())
            .build()
            .unwrap();
        (gate, schema)
    }

    #[test]
    fn photo_round_trip() {
        let (gate, schema) = setup();
        let stored = gate
            .write(&schema, record(json!({"title": "t", "image": "photo.jpg"})))
            .unwrap();
        assert_eq!(stored["image"], "photo.jpg");

        let served = gate.read(&schema, stored).unwrap();
        assert_eq!(served["image"], "http://h:4000/up/static/photo.jpg");

        let stored_again = gate.write(&schema, served).unwrap();
        assert_eq!(stored_again["image"], "photo.jpg");
    }

    #[test]
    fn write_rejects_before_normalizing_output() {
        let (gate, schema) = setup();
        let err = gate.write(&schema, record(json!({"image": "x"}))).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn write_preserving_keeps_unknown_keys() {
        let (gate, schema) = setup();
        let out = gate
            .write_preserving(
                &schema,
                record(json!({"title": "t", "image": "http://h:4000/up/static/a.png", "legacy": true})),
            )
            .unwrap();
        assert_eq!(out["legacy"], true);
        assert_eq!(out["image"], "a.png");
    }
}
