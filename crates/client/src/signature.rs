//! Signature backend: signature requests owned by the current user.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use signdesk_core::request::SignatureRequest;

use crate::error::ApiResult;
use crate::http::HttpClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cloud_uuid: Option<String>,
}

/// A signature request as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureSummary {
    pub id: String,
    #[serde(default)]
    pub linear_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub documents: Vec<SignatureDocument>,
}

/// A downloaded PDF ready for in-app viewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPreview {
    pub base64: String,
    /// Size of the decoded PDF in bytes.
    pub size: usize,
}

impl DocumentPreview {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
            size: bytes.len(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelBody<'a> {
    linear_id: &'a str,
}

pub struct SignatureClient {
    http: HttpClient,
}

impl SignatureClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get(&self, id: &str) -> ApiResult<SignatureSummary> {
        let request = self
            .http
            .request_at(Method::GET, &["signatures", "me", id])?;
        self.http.send_content(request).await
    }

    pub async fn cancel(&self, linear_id: &str) -> ApiResult<()> {
        let request = self
            .http
            .request(Method::POST, "/signatures/me/cancel")?
            .json(&CancelBody { linear_id });
        self.http.send_empty(request).await?;
        tracing::info!(linear_id, "Signature request cancelled");
        Ok(())
    }

    /// Submit a new request. Local rules are checked first; nothing is sent
    /// when they fail.
    pub async fn create(&self, signature: &SignatureRequest) -> ApiResult<SignatureSummary> {
        signature.validate_for_submit()?;
        let request = self
            .http
            .request(Method::POST, "/signatures")?
            .json(signature);
        let created: SignatureSummary = self.http.send_content(request).await?;
        tracing::info!(
            signature_id = %created.id,
            groups = signature.groups.len(),
            documents = signature.documents.len(),
            "Signature request created"
        );
        Ok(created)
    }

    /// Fetch one document of a request as base64.
    pub async fn download_document(
        &self,
        signature_id: &str,
        cloud_uuid: &str,
    ) -> ApiResult<DocumentPreview> {
        let request = self.http.request_at(
            Method::GET,
            &["documents", signature_id, "signature-id", cloud_uuid, "doc-key"],
        )?;
        let bytes = self.http.send_bytes(request).await?;
        tracing::debug!(signature_id, cloud_uuid, size = bytes.len(), "Document downloaded");
        Ok(DocumentPreview::from_bytes(&bytes))
    }
}
