//! Delta to Google Docs request translation
//!
//! Walks the operations in order, emitting an `insertText` for every insert
//! and, when the insert carries recognized formatting, an `updateTextStyle`
//! over the text just inserted. Offsets are absolute UTF-16 indexes into
//! the target document.

use super::types::{Insert, Operation};
use crate::docs::DocumentRequest;
use std::ops::Range;

/// First writable index of a new Google Doc. Index 0 holds the body's
/// structural start marker.
pub const DOCUMENT_START_INDEX: usize = 1;

/// Next free insertion index in the target document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(usize);

impl Cursor {
    /// Cursor at the start of an empty document
    pub fn new() -> Self {
        Cursor(DOCUMENT_START_INDEX)
    }

    /// Current index
    pub fn index(self) -> usize {
        self.0
    }

    /// Reserve room for `text` and return the range it occupies
    pub fn advance(&mut self, text: &str) -> Range<usize> {
        let start = self.0;
        self.0 += utf16_len(text);
        start..self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of `text` in UTF-16 code units, the unit Docs indexes are counted in
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Translate a delta into the requests that rebuild it in a blank document
pub fn translate(operations: &[Operation]) -> Vec<DocumentRequest> {
    let mut cursor = Cursor::new();
    let mut requests = Vec::with_capacity(operations.len());

    for operation in operations {
        match operation {
            Operation::Insert(insert) if insert.text.is_empty() => {}
            Operation::Insert(insert) => emit_insert(insert, &mut cursor, &mut requests),
            Operation::Unsupported => {}
        }
    }

    requests
}

fn emit_insert(insert: &Insert, cursor: &mut Cursor, requests: &mut Vec<DocumentRequest>) {
    let range = cursor.advance(&insert.text);
    requests.push(DocumentRequest::insert_text(range.start, insert.text.as_str()));

    let formats: Vec<_> = insert
        .attributes
        .iter()
        .flat_map(|attributes| attributes.enabled_formats())
        .collect();

    // Style must follow its insert: the API only styles text that exists.
    if !formats.is_empty() {
        requests.push(DocumentRequest::update_text_style(range, formats));
    }
}
