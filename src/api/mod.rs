//! # API Module
//!
//! HTTP interface of the letter export service.
//!
//! ## Endpoints Overview
//!
//! - `POST /save-letter` - Export editor content to a new Google Doc
//!   (requires `Authorization: Bearer <google access token>`)
//! - `POST /api/translate` - Return the Docs requests for editor content
//!   without calling Google
//! - `GET /health` - Health check
//! - `GET /info` - Service info and supported formats

pub mod handlers;
pub mod server;

// Re-export commonly used items
pub use handlers::{AppState, SharedState};
pub use server::{create_app, start_server};
