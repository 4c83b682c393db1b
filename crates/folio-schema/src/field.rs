//! Field declarations
//!
//! A [`Field`] is a name, a [`FieldType`] and a [`Presence`]. Types know
//! their JSON Schema fragment, the loose inputs they accept, and whether
//! they carry media that needs URL qualification.

use crate::error::SchemaError;
use folio_content::MediaBase;
use serde_json::{json, Map, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Shape of a field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Any string
    String,
    /// String with at least one character
    NonEmptyString,
    /// `true` / `false`
    Bool,
    /// Any JSON number
    Number,
    /// Whole number
    Integer,
    /// List of strings
    StringList,
    /// List of numbers with optional length bounds
    NumberList {
        /// Minimum item count
        min: Option<usize>,
        /// Maximum item count
        max: Option<usize>,
    },
    /// List of objects with their own fields
    ObjectList(Vec<Field>),
    /// Inner type or `null`
    Nullable(Box<FieldType>),
    /// A media path stored relative and served absolute
    Media(MediaBase),
    /// List of media paths
    MediaList(MediaBase),
    /// Anything
    Any,
}

impl FieldType {
    /// Static-asset media path
    #[inline]
    #[must_use]
    pub fn media() -> Self {
        Self::Media(MediaBase::Static)
    }

    /// Wrap in [`FieldType::Nullable`]
    #[inline]
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Whether `null` is a valid value
    #[inline]
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_) | Self::Any)
    }

    /// JSON Schema fragment for this type
    #[must_use]
    pub fn json_schema(&self) -> Value {
        match self {
            Self::String | Self::Media(_) => json!({"type": "string"}),
            Self::NonEmptyString => json!({"type": "string", "minLength": 1}),
            Self::Bool => json!({"type": "boolean"}),
            Self::Number => json!({"type": "number"}),
            Self::Integer => json!({"type": "integer"}),
            Self::StringList | Self::MediaList(_) => {
                json!({"type": "array", "items": {"type": "string"}})
            }
            Self::NumberList { min, max } => {
                let mut schema = json!({"type": "array", "items": {"type": "number"}});
                if let Some(min) = min {
                    schema["minItems"] = json!(min);
                }
                if let Some(max) = max {
                    schema["maxItems"] = json!(max);
                }
                schema
            }
            Self::ObjectList(fields) => json!({"type": "array", "items": object_schema(fields)}),
            Self::Nullable(inner) => json!({"anyOf": [inner.json_schema(), {"type": "null"}]}),
            Self::Any => json!({}),
        }
    }

    /// Coerce loose input into this type where unambiguous
    ///
    /// Numeric and boolean strings become numbers and booleans. Object list
    /// items get their own fields coerced and defaulted. Anything that does
    /// not coerce is returned as-is for validation to report.
    #[must_use]
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::String(s), Value::Number),
            (Self::Integer, Value::String(s)) => {
                s.trim().parse::<i64>().map_or(Value::String(s), Value::from)
            }
            (Self::Bool, Value::String(s)) => match s.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(s),
            },
            (Self::Nullable(inner), value) if !value.is_null() => inner.coerce(value),
            (Self::ObjectList(fields), Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => Value::Object(fill_fields(fields, map)),
                        other => other,
                    })
                    .collect(),
            ),
            (_, value) => value,
        }
    }

    /// Media paths below this type, relative to the field
    pub(crate) fn collect_media(&self, prefix: &MediaPath, out: &mut Vec<(MediaPath, MediaBase)>) {
        match self {
            Self::Media(base) => out.push((prefix.clone(), *base)),
            Self::MediaList(base) => out.push((prefix.each(), *base)),
            Self::Nullable(inner) => inner.collect_media(prefix, out),
            Self::ObjectList(fields) => {
                let each = prefix.each();
                for field in fields {
                    field.ty.collect_media(&each.key(&field.name), out);
                }
            }
            _ => {}
        }
    }
}

/// How a field may be absent
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Must be present
    Required,
    /// May be absent
    Optional,
    /// Filled with a value when absent
    Default(Value),
    /// Filled with the current UTC time (RFC 3339) when absent
    Now,
}

/// A named, typed field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Key in the record
    pub name: String,
    /// Value shape
    pub ty: FieldType,
    /// Absence rule
    pub presence: Presence,
}

impl Field {
    /// Declare a field
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType, presence: Presence) -> Self {
        Self {
            name: name.into(),
            ty,
            presence,
        }
    }

    /// Required field
    #[must_use]
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self::new(name, ty, Presence::Required)
    }

    /// Optional field
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        Self::new(name, ty, Presence::Optional)
    }

    /// Fill value for an absent field, if any
    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        match &self.presence {
            Presence::Default(value) => Some(value.clone()),
            Presence::Now => Some(Value::String(
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            )),
            Presence::Required | Presence::Optional => None,
        }
    }
}

/// `{"type": "object", "properties": …, "required": …}` for fields
pub(crate) fn object_schema(fields: &[Field]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.clone(), f.ty.json_schema()))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| !matches!(f.presence, Presence::Optional))
        .map(|f| f.name.as_str())
        .collect();
    json!({"type": "object", "properties": properties, "required": required})
}

/// Coerce values and fill defaults for declared fields
///
/// An explicit `null` on a non-nullable, non-required field counts as absent.
pub(crate) fn fill_fields(fields: &[Field], mut record: Map<String, Value>) -> Map<String, Value> {
    for field in fields {
        let current = record.get_mut(&field.name);
        match current {
            Some(value)
                if value.is_null()
                    && !field.ty.is_nullable()
                    && !matches!(field.presence, Presence::Required) =>
            {
                match field.default_value() {
                    Some(default) => *value = default,
                    None => {
                        record.shift_remove(&field.name);
                    }
                }
            }
            Some(value) => {
                let taken = std::mem::take(value);
                *value = field.ty.coerce(taken);
            }
            None => {
                if let Some(default) = field.default_value() {
                    record.insert(field.name.clone(), default);
                }
            }
        }
    }
    record
}

/// One step of a [`MediaPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaSegment {
    /// Object key
    Key(String),
    /// Every element of an array
    Each,
}

/// Address of media values inside a record
///
/// `image`, `courseStructure[].image`, `galley[]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MediaPath(Vec<MediaSegment>);

impl MediaPath {
    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[MediaSegment] {
        &self.0
    }

    /// Path with a key appended
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(MediaSegment::Key(key.into()));
        next
    }

    /// Path with an array step appended
    #[must_use]
    pub fn each(&self) -> Self {
        let mut next = self.clone();
        next.0.push(MediaSegment::Each);
        next
    }

    /// Apply `f` to every string the path reaches
    pub fn for_each_mut(&self, value: &mut Value, f: &mut impl FnMut(&mut String)) {
        walk_mut(&self.0, value, f);
    }

    /// Collect every string the path reaches
    #[must_use]
    pub fn strings<'v>(&self, value: &'v Value) -> Vec<&'v str> {
        let mut out = Vec::new();
        walk(&self.0, value, &mut out);
        out
    }
}

fn walk_mut(segments: &[MediaSegment], value: &mut Value, f: &mut impl FnMut(&mut String)) {
    match (segments.split_first(), value) {
        (None, Value::String(s)) => f(s),
        (Some((MediaSegment::Key(key), rest)), Value::Object(map)) => {
            if let Some(next) = map.get_mut(key) {
                walk_mut(rest, next, f);
            }
        }
        (Some((MediaSegment::Each, rest)), Value::Array(items)) => {
            for item in items {
                walk_mut(rest, item, f);
            }
        }
        _ => {}
    }
}

fn walk<'v>(segments: &[MediaSegment], value: &'v Value, out: &mut Vec<&'v str>) {
    match (segments.split_first(), value) {
        (None, Value::String(s)) => out.push(s),
        (Some((MediaSegment::Key(key), rest)), Value::Object(map)) => {
            if let Some(next) = map.get(key) {
                walk(rest, next, out);
            }
        }
        (Some((MediaSegment::Each, rest)), Value::Array(items)) => {
            for item in items {
                walk(rest, item, out);
            }
        }
        _ => {}
    }
}

impl Display for MediaPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            match seg {
                MediaSegment::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                MediaSegment::Each => f.write_str("[]")?,
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for MediaPath {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut path = Self::default();
        for part in s.split('.') {
            let (key, mut arrays) = match part.find("[]") {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };
            if key.is_empty() || key.contains(['[', ']']) {
                return Err(SchemaError::MediaPath(s.to_string()));
            }
            path = path.key(key);
            while let Some(rest) = arrays.strip_prefix("[]") {
                path = path.each();
                arrays = rest;
            }
            if !arrays.is_empty() {
                return Err(SchemaError::MediaPath(s.to_string()));
            }
        }
        Ok(path)
    }
}
