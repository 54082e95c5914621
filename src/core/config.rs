//! Configuration management for the letter export service
//!
//! Settings come from a TOML file, then `LETTER_*` environment variables,
//! then command line flags (applied by the binary).

use crate::core::error::{Error, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "letter-export.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Remote document service configuration
    pub google: GoogleConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,

    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
}

/// Google Docs / Drive configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Base URL of the Docs API (without the `/v1` suffix)
    pub docs_api_base: String,

    /// Base URL of the Drive API (without the `/drive/v3` suffix)
    pub drive_api_base: String,

    /// Name given to every exported document
    pub document_name: String,

    /// Mime type set when the document is renamed
    pub mime_type: String,

    /// Timeout for each remote call
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,

    /// Delete the created document when a later export step fails
    pub cleanup_on_failure: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://letter-editor.netlify.app".to_string(),
            ],
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            docs_api_base: "https://docs.googleapis.com".to_string(),
            drive_api_base: "https://www.googleapis.com".to_string(),
            document_name: "My Styled Letter".to_string(),
            mime_type: "application/vnd.google-apps.document".to_string(),
            request_timeout: Duration::from_secs(30),
            cleanup_on_failure: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file (if present) and environment
    pub fn load() -> Result<Self> {
        let config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Config::default()
        };
        config.finish()
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(path)?.finish()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    fn finish(mut self) -> Result<Self> {
        self.apply_env_overrides(|key| std::env::var(key).ok())?;
        self.validate()?;
        Ok(self)
    }

    /// Apply `LETTER_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("LETTER_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(origins) = var("LETTER_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(base) = var("LETTER_DOCS_API_BASE") {
            self.google.docs_api_base = base;
        }

        if let Some(base) = var("LETTER_DRIVE_API_BASE") {
            self.google.drive_api_base = base;
        }

        if let Some(name) = var("LETTER_DOCUMENT_NAME") {
            self.google.document_name = name;
        }

        if let Some(timeout) = var("LETTER_REQUEST_TIMEOUT") {
            self.google.request_timeout = parse_duration(&timeout)
                .map_err(|e| Error::config(format!("Invalid request timeout: {}", e)))?;
        }

        if let Some(cleanup) = var("LETTER_CLEANUP_ON_FAILURE") {
            self.google.cleanup_on_failure = cleanup
                .parse()
                .map_err(|e| Error::config(format!("Invalid cleanup flag: {}", e)))?;
        }

        if let Some(level) = var("LETTER_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, base) in [
            ("docs_api_base", &self.google.docs_api_base),
            ("drive_api_base", &self.google.drive_api_base),
        ] {
            reqwest::Url::parse(base)
                .map_err(|e| Error::config(format!("Invalid {} '{}': {}", name, base, e)))?;
        }

        if self.google.document_name.trim().is_empty() {
            return Err(Error::config("Document name must not be empty"));
        }

        if self.google.request_timeout.is_zero() {
            return Err(Error::config("Request timeout must be greater than zero"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        Ok(())
    }
}

// Custom deserializer for Duration from string
fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration string like '30s' or '5m', or a number of seconds")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            parse_duration(value).map_err(E::custom)
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration must not be negative"))
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Duration, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(value))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

// Simple duration parser for common formats
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let ms: u64 = ms.parse().map_err(|_| "Invalid milliseconds")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().map_err(|_| "Invalid seconds")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().map_err(|_| "Invalid minutes")?;
        let secs = mins.checked_mul(60).ok_or("Invalid minutes")?;
        Ok(Duration::from_secs(secs))
    } else {
        let secs: u64 = s.parse().map_err(|_| "Invalid duration format")?;
        Ok(Duration::from_secs(secs))
    }
}
