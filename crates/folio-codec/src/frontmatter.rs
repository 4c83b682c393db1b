//! Front-matter block codec
//!
//! On-disk layout:
//!
//! ```text
//! ---
//! <yaml mapping>
//! ---
//!
//! <markdown body>
//! ```
//!
//! Partial writes splice bytes instead of re-encoding the whole file, so a
//! metadata-only update leaves the body byte-for-byte identical and a
//! body-only update leaves the block byte-for-byte identical.

use crate::error::CodecError;
use serde_json::{Map, Value};

/// Structured metadata of a document
pub type Metadata = Map<String, Value>;

const DELIMITER: &str = "---";
const BOM: char = '\u{feff}';

/// Key that is derived from the file name and never stored
pub const ID_KEY: &str = "id";

/// Location of the front-matter block inside raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterBlock<'a> {
    /// Text between the delimiter lines
    pub yaml: &'a str,
    /// Byte offset just past the closing delimiter line
    pub end: usize,
}

/// A file split into block and body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<'a> {
    /// The block, when the file has a well-formed one
    pub block: Option<FrontMatterBlock<'a>>,
    /// Markdown after the block, one separating blank line removed
    pub body: &'a str,
}

impl Decoded<'_> {
    /// Whether a front-matter block was found
    #[inline]
    #[must_use]
    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }
}

/// Split raw text into front-matter block and body
///
/// Never fails: a missing or unterminated block yields `block = None` and the
/// whole input as body.
#[must_use]
pub fn decode(raw: &str) -> Decoded<'_> {
    match find_block(raw) {
        Some(block) => Decoded {
            block: Some(block),
            body: strip_blank_line(&raw[block.end..]),
        },
        None => Decoded {
            block: None,
            body: raw,
        },
    }
}

/// Parse a block's YAML into metadata
///
/// # Errors
/// Returns [`CodecError::Yaml`] on syntax errors and
/// [`CodecError::NotAMapping`] when the YAML is a scalar or sequence.
/// Scalar keys are read as strings; [`CodecError::UnsupportedKey`] is
/// returned for sequence or mapping keys.
pub fn parse_metadata(block: &FrontMatterBlock<'_>) -> Result<Metadata, CodecError> {
    if block.yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(block.yaml)?;
    match value {
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Mapping(mapping) => mapping_to_json(mapping),
        serde_yaml::Value::Sequence(_) => Err(CodecError::NotAMapping("a sequence")),
        serde_yaml::Value::Tagged(_) => Err(CodecError::NotAMapping("a tagged value")),
        _ => Err(CodecError::NotAMapping("a scalar")),
    }
}

/// Scalar keys become strings (`2024: x` reads as `"2024"`)
fn mapping_to_json(mapping: serde_yaml::Mapping) -> Result<Metadata, CodecError> {
    mapping
        .into_iter()
        .map(|(key, value)| Ok((key_to_string(key)?, yaml_to_json(value)?)))
        .collect()
}

fn key_to_string(key: serde_yaml::Value) -> Result<String, CodecError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
        serde_yaml::Value::Sequence(_) => Err(CodecError::UnsupportedKey("a sequence")),
        serde_yaml::Value::Mapping(_) => Err(CodecError::UnsupportedKey("a mapping")),
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, CodecError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => serde_json::to_value(&n).unwrap_or(Value::Null),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => Value::Object(mapping_to_json(mapping)?),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Metadata of a file, empty when it has no block
///
/// # Errors
/// Returns [`CodecError`] if a block exists but does not parse.
pub fn decode_metadata(raw: &str) -> Result<Metadata, CodecError> {
    match find_block(raw) {
        Some(block) => parse_metadata(&block),
        None => Ok(Metadata::new()),
    }
}

/// Metadata of a file that must have a block
///
/// # Errors
/// Returns [`CodecError::MissingFrontMatter`] if there is no block.
pub fn require_metadata(raw: &str) -> Result<Metadata, CodecError> {
    let block = find_block(raw).ok_or(CodecError::MissingFrontMatter)?;
    parse_metadata(&block)
}

/// Encode a complete file
///
/// The `id` key is dropped. Output is `---\n<yaml>---\n\n<body>`.
///
/// # Errors
/// Returns [`CodecError::Yaml`] if the metadata cannot be serialized.
pub fn encode(metadata: &Metadata, body: &str) -> Result<String, CodecError> {
    let block = encode_block(metadata)?;
    Ok(format!("{block}\n{body}"))
}

/// Swap the block of an existing file, keeping the body bytes
///
/// # Errors
/// Returns [`CodecError::MissingFrontMatter`] if `raw` has no block.
pub fn replace_metadata(raw: &str, metadata: &Metadata) -> Result<String, CodecError> {
    let block = find_block(raw).ok_or(CodecError::MissingFrontMatter)?;
    let mut out = String::with_capacity(raw.len());
    if raw.starts_with(BOM) {
        out.push(BOM);
    }
    out.push_str(&encode_block(metadata)?);
    out.push_str(&raw[block.end..]);
    Ok(out)
}

/// Swap the body of an existing file, keeping the block bytes
///
/// # Errors
/// Returns [`CodecError::MissingFrontMatter`] if `raw` has no block.
pub fn replace_body(raw: &str, body: &str) -> Result<String, CodecError> {
    let block = find_block(raw).ok_or(CodecError::MissingFrontMatter)?;
    let head = &raw[..block.end];
    let newline = if head.ends_with('\n') { "" } else { "\n" };
    Ok(format!("{head}{newline}\n{body}"))
}

/// `---\n<yaml>---\n`, with `id` removed
fn encode_block(metadata: &Metadata) -> Result<String, CodecError> {
    let stored: Metadata = metadata
        .iter()
        .filter(|(key, _)| key.as_str() != ID_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if stored.is_empty() {
        return Ok(format!("{DELIMITER}\n{DELIMITER}\n"));
    }
    let yaml = serde_yaml::to_string(&stored)?;
    let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
}

fn find_block(raw: &str) -> Option<FrontMatterBlock<'_>> {
    let start = if raw.starts_with(BOM) { BOM.len_utf8() } else { 0 };
    let yaml_start = start + delimiter_line_len(&raw[start..])?;

    let mut line_start = yaml_start;
    while line_start <= raw.len() {
        let rest = &raw[line_start..];
        if let Some(len) = delimiter_line_len(rest) {
            return Some(FrontMatterBlock {
                yaml: &raw[yaml_start..line_start],
                end: line_start + len,
            });
        }
        line_start += rest.find('\n')? + 1;
    }
    None
}

/// Length of a leading `---` line including its newline
///
/// Trailing spaces are tolerated; a delimiter on the last line may lack a
/// newline.
fn delimiter_line_len(text: &str) -> Option<usize> {
    let rest = text.strip_prefix(DELIMITER)?;
    let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
    if rest[..line_len].trim().is_empty() {
        Some(DELIMITER.len() + line_len)
    } else {
        None
    }
}

fn strip_blank_line(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}
