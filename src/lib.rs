//! Letter Export - rich-text letters to formatted Google Docs
//!
//! The browser editor posts its content as a delta of insert operations.
//! This crate translates that delta into Google Docs `batchUpdate`
//! requests and drives the Docs and Drive APIs to produce a named,
//! formatted document in the user's Drive.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod api;
pub mod delta;
pub mod docs;

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, Result};
pub use delta::translate;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A second init (tests, embedding) is not an error worth failing on.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    tracing::info!("Initializing {} v{}", NAME, VERSION);
}
