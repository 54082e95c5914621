//! Delta-related type definitions
//!
//! These mirror the JSON the rich-text editor emits: a content object with
//! the plain text and an ordered list of insert operations.

use crate::core::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Character formats the translator knows how to carry over.
/// Listed in the order their style fields are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFormat {
    /// Bold weight
    Bold,
    /// Italic slant
    Italic,
    /// Underline decoration
    Underline,
}

impl TextFormat {
    /// All recognized formats, in emission order
    pub const ALL: [TextFormat; 3] = [TextFormat::Bold, TextFormat::Italic, TextFormat::Underline];

    /// Attribute key used by the editor and field name used by the Docs API
    pub fn as_str(self) -> &'static str {
        match self {
            TextFormat::Bold => "bold",
            TextFormat::Italic => "italic",
            TextFormat::Underline => "underline",
        }
    }
}

/// Formatting attributes attached to an insert.
///
/// Unknown keys (color, link, ...) are kept but never consulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Whether the editor marked `format` as applied
    pub fn is_enabled(&self, format: TextFormat) -> bool {
        self.0.get(format.as_str()).is_some_and(is_truthy)
    }

    /// Recognized formats that are applied, in emission order
    pub fn enabled_formats(&self) -> impl Iterator<Item = TextFormat> + '_ {
        TextFormat::ALL.into_iter().filter(|format| self.is_enabled(*format))
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Editor truthiness: `false`, `0`, `""` and `null` are off, anything else is on
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A text insert with optional formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Literal text placed in the document
    pub text: String,
    /// Character formatting, when the editor sent any
    pub attributes: Option<Attributes>,
}

/// One entry of a delta.
///
/// Anything that is not a string insert (retains, deletes, embeds, junk)
/// becomes [`Operation::Unsupported`] and is skipped by the translator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Operation {
    /// Insert literal text
    Insert(Insert),
    /// An operation this service does not understand
    Unsupported,
}

impl Operation {
    /// Plain insert without formatting
    pub fn insert(text: impl Into<String>) -> Self {
        Operation::Insert(Insert {
            text: text.into(),
            attributes: None,
        })
    }

    /// Insert with the given formats switched on
    pub fn formatted(text: impl Into<String>, formats: &[TextFormat]) -> Self {
        let map = formats
            .iter()
            .map(|format| (format.as_str().to_string(), Value::Bool(true)))
            .collect::<Map<_, _>>();
        Operation::Insert(Insert {
            text: text.into(),
            attributes: Some(Attributes(map)),
        })
    }
}

impl From<Value> for Operation {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Operation::Unsupported;
        };
        match fields.remove("insert") {
            Some(Value::String(text)) => {
                let attributes = match fields.remove("attributes") {
                    Some(Value::Object(map)) => Some(Attributes(map)),
                    _ => None,
                };
                Operation::Insert(Insert { text, attributes })
            }
            _ => Operation::Unsupported,
        }
    }
}

/// The `delta` part of the editor content
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Delta {
    /// Ordered operations
    pub ops: Vec<Operation>,
}

/// Content posted by the editor: plain text plus its delta
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContent {
    /// Plain text rendition of the document
    pub text_value: String,
    /// Rich-text operations
    pub delta: Delta,
}

impl EditorContent {
    /// Parse editor content, accepting either the object itself or a
    /// JSON string that encodes it.
    ///
    /// Fails with [`Error::UnsupportedFormat`] when `textValue` is missing
    /// or empty, or `delta.ops` is missing or not a list.
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::String(raw) => serde_json::from_str(&raw).map_err(|e| {
                Error::unsupported_format(format!("content string is not JSON: {}", e))
            })?,
            other => other,
        };

        let content: EditorContent = serde_json::from_value(value)
            .map_err(|e| Error::unsupported_format(e.to_string()))?;

        if content.text_value.is_empty() {
            return Err(Error::unsupported_format("textValue is empty"));
        }

        Ok(content)
    }
}
