//! Compiled content schemas

use crate::error::SchemaError;
use crate::field::{fill_fields, object_schema, Field, FieldType, MediaPath, Presence};
use folio_content::MediaBase;
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Key that is always allowed and always kept
const ID_KEY: &str = "id";

/// Conditional requirement: when `flag == value`, `field` must be present
#[derive(Debug, Clone, PartialEq)]
struct Condition {
    flag: String,
    value: Value,
    field: String,
}

/// A declarative field contract compiled to JSON Schema
#[derive(Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
    media: Vec<(MediaPath, MediaBase)>,
    document: Value,
    compiled: Arc<JSONSchema>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields.iter().map(|f| &f.name).collect::<Vec<_>>())
            .field("media", &self.media.iter().map(|(p, _)| p.to_string()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Start declaring a schema
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Schema name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Media paths and their bases
    #[inline]
    #[must_use]
    pub fn media(&self) -> &[(MediaPath, MediaBase)] {
        &self.media
    }

    /// Generated JSON Schema document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Whether `name` is a declared field
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Fill defaults, check shape, keep only declared fields (and `id`)
    ///
    /// # Errors
    /// Returns [`SchemaError::Invalid`] listing every field-level failure.
    pub fn validate(&self, record: Map<String, Value>) -> Result<Map<String, Value>, SchemaError> {
        let checked = self.check(record)?;
        Ok(checked
            .into_iter()
            .filter(|(key, _)| key == ID_KEY || self.declares(key))
            .collect())
    }

    /// Fill defaults and check shape, keeping undeclared keys
    ///
    /// # Errors
    /// Returns [`SchemaError::Invalid`] listing every field-level failure.
    pub fn check(&self, record: Map<String, Value>) -> Result<Map<String, Value>, SchemaError> {
        let filled = fill_fields(&self.fields, record);
        let instance = Value::Object(filled);
        if let Err(errors) = self.compiled.validate(&instance) {
            let errors: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{path}: {e}")
                    }
                })
                .collect();
            tracing::debug!(schema = %self.name, ?errors, "record rejected");
            return Err(SchemaError::Invalid {
                schema: self.name.clone(),
                errors,
            });
        }
        match instance {
            Value::Object(map) => Ok(map),
            _ => Err(SchemaError::invalid(&self.name, "record is not an object")),
        }
    }

    /// Same fields, all optional, no defaults, no conditions
    ///
    /// Used to check update patches before they are merged.
    ///
    /// # Errors
    /// Returns [`SchemaError::Compile`] if the derived schema does not compile.
    pub fn as_patch(&self) -> Result<Self, SchemaError> {
        let fields = self
            .fields
            .iter()
            .map(|f| Field::optional(f.name.clone(), f.ty.clone()))
            .collect();
        SchemaBuilder {
            name: format!("{}-patch", self.name),
            fields,
            conditions: Vec::new(),
        }
        .build()
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
    conditions: Vec<Condition>,
}

impl SchemaBuilder {
    /// Add a declared field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    /// Required field
    #[must_use]
    pub fn required(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(Field::required(name, ty))
    }

    /// Optional field
    #[must_use]
    pub fn optional(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(Field::optional(name, ty))
    }

    /// Field filled with `value` when absent
    #[must_use]
    pub fn with_default(self, name: impl Into<String>, ty: FieldType, value: Value) -> Self {
        self.field(Field::new(name, ty, Presence::Default(value)))
    }

    /// Timestamp field filled with the current time when absent
    #[must_use]
    pub fn default_now(self, name: impl Into<String>) -> Self {
        self.field(Field::new(name, FieldType::String, Presence::Now))
    }

    /// Require `field` whenever `flag` equals `value`
    #[must_use]
    pub fn require_when(
        mut self,
        flag: impl Into<String>,
        value: Value,
        field: impl Into<String>,
    ) -> Self {
        self.conditions.push(Condition {
            flag: flag.into(),
            value,
            field: field.into(),
        });
        self
    }

    /// Compile the schema
    ///
    /// # Errors
    /// Returns [`SchemaError::Compile`] if the generated document is rejected
    /// by the JSON Schema compiler.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut document = object_schema(&self.fields);
        let mut properties = document["properties"].take();
        if let Value::Object(map) = &mut properties {
            map.insert(ID_KEY.to_string(), json!({"type": "string"}));
        }
        document["properties"] = properties;
        if !self.conditions.is_empty() {
            let all_of: Vec<Value> = self
                .conditions
                .iter()
                .map(|c| {
                    json!({
                        "if": {"properties": {&c.flag: {"const": c.value}}, "required": [&c.flag]},
                        "then": {"required": [&c.field]}
                    })
                })
                .collect();
            document["allOf"] = Value::Array(all_of);
        }

        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&document)
            .map_err(|e| SchemaError::Compile {
                schema: self.name.clone(),
                message: e.to_string(),
            })?;

        let mut media = Vec::new();
        for field in &self.fields {
            field
                .ty
                .collect_media(&MediaPath::default().key(&field.name), &mut media);
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            media,
            document,
            compiled: Arc::new(compiled),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn card() -> Schema {
        Schema::builder("card")
            .required("title", FieldType::NonEmptyString)
            .with_default("draft", FieldType::Bool, json!(false))
            .with_default("weight", FieldType::Number, json!(-1))
            .required("image", FieldType::media())
            .optional("chance", FieldType::String)
            .build()
            .unwrap()
    }

    #[test]
    fn defaults_filled_and_projection_applied() {
        let out = card()
            .validate(record(json!({
                "id": "a", "title": "T", "image": "x.png", "extra": 1
            })))
            .unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"id": "a", "title": "T", "image": "x.png", "draft": false, "weight": -1})
        );
    }

    #[test]
    fn check_keeps_undeclared_keys() {
        let out = card()
            .check(record(json!({"title": "T", "image": "x.png", "extra": 1})))
            .unwrap();
        assert_eq!(out["extra"], 1);
    }

    #[test]
    fn missing_required_field_reported() {
        let err = card().validate(record(json!({"image": "x.png"}))).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn every_failure_is_listed() {
        let err = card()
            .validate(record(json!({"title": "", "image": 3, "draft": "nope"})))
            .unwrap_err();
        assert_eq!(err.field_errors().len(), 3);
    }

    #[test]
    fn conditional_requirement() {
        let schema = Schema::builder("activity")
            .with_default("flipbook", FieldType::Bool, json!(false))
            .optional("flipbook_page", FieldType::StringList)
            .require_when("flipbook", json!(true), "flipbook_page")
            .build()
            .unwrap();
        assert!(schema.validate(record(json!({}))).is_ok());
        assert!(schema.validate(record(json!({"flipbook": true}))).is_err());
        assert!(schema
            .validate(record(json!({"flipbook": true, "flipbook_page": ["a"]})))
            .is_ok());
    }

    #[test]
    fn conditions_live_in_document_only() {
        let schema = Schema::builder("activity")
            .with_default("flipbook", FieldType::Bool, json!(false))
            .optional("flipbook_page", FieldType::StringList)
            .require_when("flipbook", json!(true), "flipbook_page")
            .build()
            .unwrap();
        assert_eq!(schema.document()["allOf"].as_array().map(Vec::len), Some(1));

        let patch = schema.as_patch().unwrap();
        assert!(patch.document().get("allOf").is_none());
        assert!(patch.validate(record(json!({"flipbook": true}))).is_ok());
    }

    #[test]
    fn patch_schema_is_all_optional() {
        let patch = card().as_patch().unwrap();
        let out = patch.validate(record(json!({"weight": 3}))).unwrap();
        assert_eq!(Value::Object(out), json!({"weight": 3}));
        assert!(patch.validate(record(json!({"title": ""}))).is_err());
    }

    #[test]
    fn media_paths_collected() {
        assert_eq!(card().media().len(), 1);
        assert_eq!(card().media()[0].0.to_string(), "image");
    }
}
