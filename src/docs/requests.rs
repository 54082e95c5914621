//! Google Docs `batchUpdate` request model
//!
//! Only the two request kinds the translator produces are modelled.
//! Serialization yields the exact JSON shape the Docs API expects.

use crate::delta::TextFormat;
use serde::{Serialize, Serializer};
use std::ops::Range;

/// One mutation inside a `documents.batchUpdate` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentRequest {
    /// Insert text at an index
    InsertText(InsertTextRequest),
    /// Apply character styling to an existing range
    UpdateTextStyle(UpdateTextStyleRequest),
}

/// `insertText` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertTextRequest {
    /// Where the text goes
    pub location: Location,
    /// Text to insert
    pub text: String,
}

/// An index into the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    /// UTF-16 offset
    pub index: usize,
}

/// `updateTextStyle` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyleRequest {
    /// Half-open range the style applies to
    pub range: TextRange,
    /// Style values to set
    pub text_style: TextStyle,
    /// Fields of `text_style` that are being set, in emission order
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<TextFormat>,
}

/// Half-open `[start_index, end_index)` range in UTF-16 units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    /// First index covered
    pub start_index: usize,
    /// First index past the range
    pub end_index: usize,
}

/// Character style; only set formats are serialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    /// Bold weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Italic slant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Underline decoration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl TextStyle {
    /// Switch `format` on
    pub fn enable(&mut self, format: TextFormat) {
        match format {
            TextFormat::Bold => self.bold = Some(true),
            TextFormat::Italic => self.italic = Some(true),
            TextFormat::Underline => self.underline = Some(true),
        }
    }
}

impl DocumentRequest {
    /// Insert `text` at `index`
    pub fn insert_text(index: usize, text: impl Into<String>) -> Self {
        DocumentRequest::InsertText(InsertTextRequest {
            location: Location { index },
            text: text.into(),
        })
    }

    /// Style `range` with every format in `formats`, which must be in emission order.
    pub fn update_text_style(range: Range<usize>, formats: Vec<TextFormat>) -> Self {
        let mut text_style = TextStyle::default();
        for format in &formats {
            text_style.enable(*format);
        }
        DocumentRequest::UpdateTextStyle(UpdateTextStyleRequest {
            range: TextRange {
                start_index: range.start,
                end_index: range.end,
            },
            text_style,
            fields: formats,
        })
    }
}

impl UpdateTextStyleRequest {
    /// The field mask as sent on the wire, e.g. `"bold,italic"`
    pub fn field_mask(&self) -> String {
        join_formats(&self.fields)
    }
}

fn serialize_fields<S>(fields: &[TextFormat], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&join_formats(fields))
}

fn join_formats(fields: &[TextFormat]) -> String {
    fields
        .iter()
        .map(|format| format.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
