//! Core foundations
//!
//! Error handling and configuration shared by every other module.

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::Config;
pub use error::{Error, ExportStep, RemoteError, Result};
