//! Letter export flow
//!
//! create document -> translate -> batch update -> rename, strictly in that
//! order. Content and credential are checked before the first remote call.
//! If a step after creation fails, the new document is deleted (when
//! enabled) so no empty document is left behind in the user's Drive.

use super::client::{AccessToken, DocumentService};
use crate::core::config::GoogleConfig;
use crate::core::{Error, Result};
use crate::delta::{translate, EditorContent};
use serde_json::Value;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// Settings for one export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Final document name
    pub document_name: String,
    /// Mime type set alongside the name
    pub mime_type: String,
    /// Delete the created document if a later step fails
    pub cleanup_on_failure: bool,
}

impl From<&GoogleConfig> for ExportOptions {
    fn from(config: &GoogleConfig) -> Self {
        Self {
            document_name: config.document_name.clone(),
            mime_type: config.mime_type.clone(),
            cleanup_on_failure: config.cleanup_on_failure,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&GoogleConfig::default())
    }
}

/// Export editor `content` as a new formatted document and return its id.
pub async fn export_letter(
    service: &dyn DocumentService,
    token: Option<AccessToken>,
    content: Value,
    options: &ExportOptions,
) -> Result<String> {
    let export_id = Uuid::new_v4();
    let span = tracing::info_span!("export", %export_id);

    async move {
        let token = token.ok_or(Error::MissingCredential)?;
        let content = EditorContent::from_value(content)?;

        let document_id = service
            .create_document(&token, &options.document_name)
            .await?;
        info!(%document_id, "created document");

        match fill_document(service, &token, &document_id, &content, options).await {
            Ok(()) => {
                info!(%document_id, "export complete");
                Ok(document_id)
            }
            Err(err) => {
                warn!(%document_id, error = %err, "export failed after document creation");
                if options.cleanup_on_failure {
                    discard_document(service, &token, &document_id).await;
                }
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

async fn fill_document(
    service: &dyn DocumentService,
    token: &AccessToken,
    document_id: &str,
    content: &EditorContent,
    options: &ExportOptions,
) -> Result<()> {
    let requests = translate(&content.delta.ops);
    info!(
        operations = content.delta.ops.len(),
        requests = requests.len(),
        "translated delta"
    );

    if !requests.is_empty() {
        service.batch_update(token, document_id, &requests).await?;
    }

    service
        .rename(token, document_id, &options.document_name, &options.mime_type)
        .await
}

async fn discard_document(service: &dyn DocumentService, token: &AccessToken, document_id: &str) {
    match service.delete(token, document_id).await {
        Ok(()) => info!(%document_id, "deleted orphaned document"),
        Err(err) => warn!(%document_id, error = %err, "could not delete orphaned document"),
    }
}
