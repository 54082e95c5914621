//! # Google Docs integration
//!
//! - `requests`: the `batchUpdate` request model and its wire format
//! - `client`: the remote document service seam and its Google implementation
//! - `export`: the create / fill / rename flow behind `POST /save-letter`

pub mod client;
pub mod export;
pub mod requests;

// Re-export commonly used items
pub use client::{AccessToken, DocumentService, GoogleDocsClient};
pub use export::{export_letter, ExportOptions};
pub use requests::{DocumentRequest, TextRange, TextStyle, UpdateTextStyleRequest};
