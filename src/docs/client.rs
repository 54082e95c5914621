//! Remote document service
//!
//! [`DocumentService`] is the seam the export flow talks to.
//! [`GoogleDocsClient`] implements it against the Docs and Drive REST APIs
//! using the caller's OAuth access token.

use super::requests::DocumentRequest;
use crate::core::config::GoogleConfig;
use crate::core::{Error, ExportStep, RemoteError, Result};
use reqwest::{RequestBuilder, Response};
use url::Host;
use serde::Deserialize;
use serde_json::json;

/// Opaque bearer credential for the remote services
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token, rejecting blank values
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::MissingCredential);
        }
        Ok(Self(token))
    }

    /// Extract the token from an `Authorization: Bearer ...` header value
    pub fn from_authorization(header: Option<&str>) -> Result<Self> {
        header
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(Error::MissingCredential)
            .and_then(Self::new)
    }

    /// Raw token string
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Operations the export flow needs from a document backend
#[axum::async_trait]
pub trait DocumentService: Send + Sync {
    /// Create a blank document and return its id
    async fn create_document(&self, token: &AccessToken, title: &str) -> Result<String>;

    /// Apply `requests` atomically, in order
    async fn batch_update(
        &self,
        token: &AccessToken,
        document_id: &str,
        requests: &[DocumentRequest],
    ) -> Result<()>;

    /// Give the document its final name and mime type
    async fn rename(
        &self,
        token: &AccessToken,
        document_id: &str,
        name: &str,
        mime_type: &str,
    ) -> Result<()>;

    /// Delete the document
    async fn delete(&self, token: &AccessToken, document_id: &str) -> Result<()>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

/// [`DocumentService`] backed by the Google Docs and Drive APIs
#[derive(Debug, Clone)]
pub struct GoogleDocsClient {
    http: reqwest::Client,
    docs_base: String,
    drive_base: String,
}

impl GoogleDocsClient {
    /// Build a client from configuration
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout);
        // Local stand-ins for the APIs are never reached through a proxy.
        if is_loopback(&config.docs_api_base) && is_loopback(&config.drive_api_base) {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            docs_base: config.docs_api_base.trim_end_matches('/').to_string(),
            drive_base: config.drive_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn document_url(&self, suffix: &str) -> String {
        format!("{}/v1/documents{}", self.docs_base, suffix)
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/drive/v3/files/{}", self.drive_base, file_id)
    }

    async fn send(
        &self,
        step: ExportStep,
        token: &AccessToken,
        request: RequestBuilder,
    ) -> Result<Response> {
        let response = request
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| Error::remote(step, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(
                step,
                RemoteError::Status {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        tracing::debug!(%step, status = status.as_u16(), "remote call succeeded");
        Ok(response)
    }
}

fn is_loopback(base: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base) else {
        return false;
    };
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost",
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[axum::async_trait]
impl DocumentService for GoogleDocsClient {
    async fn create_document(&self, token: &AccessToken, title: &str) -> Result<String> {
        let step = ExportStep::CreateDocument;
        let request = self.http.post(self.document_url("")).json(&json!({ "title": title }));
        let response = self.send(step, token, request).await?;

        let created: CreatedDocument = response
            .json()
            .await
            .map_err(|e| Error::remote(step, RemoteError::InvalidResponse(e.to_string())))?;

        if created.document_id.is_empty() {
            return Err(Error::remote(
                step,
                RemoteError::InvalidResponse("empty documentId".to_string()),
            ));
        }
        Ok(created.document_id)
    }

    async fn batch_update(
        &self,
        token: &AccessToken,
        document_id: &str,
        requests: &[DocumentRequest],
    ) -> Result<()> {
        let url = self.document_url(&format!("/{}:batchUpdate", document_id));
        let request = self.http.post(url).json(&json!({ "requests": requests }));
        self.send(ExportStep::BatchUpdate, token, request).await?;
        Ok(())
    }

    async fn rename(
        &self,
        token: &AccessToken,
        document_id: &str,
        name: &str,
        mime_type: &str,
    ) -> Result<()> {
        let request = self
            .http
            .patch(self.file_url(document_id))
            .json(&json!({ "name": name, "mimeType": mime_type }));
        self.send(ExportStep::Rename, token, request).await?;
        Ok(())
    }

    async fn delete(&self, token: &AccessToken, document_id: &str) -> Result<()> {
        let request = self.http.delete(self.file_url(document_id));
        self.send(ExportStep::Delete, token, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_from_header() {
        let token = AccessToken::from_authorization(Some("Bearer ya29.abc")).unwrap();
        assert_eq!(token.secret(), "ya29.abc");

        for header in [None, Some(""), Some("Bearer "), Some("Basic dXNlcg=="), Some("ya29.abc")] {
            let err = AccessToken::from_authorization(header).unwrap_err();
            assert!(matches!(err, Error::MissingCredential), "header {header:?}");
        }
    }

    #[test]
    fn test_access_token_debug_hides_secret() {
        let token = AccessToken::new("secret-value").unwrap();
        assert!(!format!("{token:?}").contains("secret-value"));
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("http://127.0.0.1:8080"));
        assert!(is_loopback("http://localhost"));
        assert!(is_loopback("http://[::1]:9000"));
        assert!(!is_loopback("http://[2001:db8::1]"));
        assert!(!is_loopback("https://docs.googleapis.com"));
        assert!(!is_loopback("not a url"));
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let config = GoogleConfig {
            docs_api_base: "http://localhost:9999/".to_string(),
            drive_api_base: "http://localhost:9998".to_string(),
            ..GoogleConfig::default()
        };
        let client = GoogleDocsClient::new(&config).unwrap();

        assert_eq!(client.document_url(""), "http://localhost:9999/v1/documents");
        assert_eq!(
            client.document_url("/abc:batchUpdate"),
            "http://localhost:9999/v1/documents/abc:batchUpdate"
        );
        assert_eq!(client.file_url("abc"), "http://localhost:9998/drive/v3/files/abc");
    }
}
