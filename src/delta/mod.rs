//! Rich-text delta handling.
//!
//! Parses the editor's content and translates its insert operations into
//! Google Docs requests:
//! - Only string inserts are understood; everything else is skipped
//! - Bold, italic and underline are the only formats carried over
//! - Offsets are UTF-16 indexes starting at 1

pub mod translator;
pub mod types;

// Re-export main types for convenience
pub use translator::{translate, utf16_len, Cursor, DOCUMENT_START_INDEX};
pub use types::{Attributes, Delta, EditorContent, Insert, Operation, TextFormat};
