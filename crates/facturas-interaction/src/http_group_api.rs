//! HttpGroupApi - REST client for the invoice organizer backend.
//!
//! Implements `GroupApi` and `LivenessProbe` over reqwest. Every non-success
//! response is turned into `FacturasError::Api` with the server's `{error}`
//! message when one is available.

use async_trait::async_trait;
use facturas_core::api::decode_error_message;
use facturas_core::config::ClientConfig;
use facturas_core::group::{
    AnalyzeResponse, BASE_NAME_FIELD, GroupId, GroupRecord, LocalFile, MANIFEST_FIELD,
    MultipartUpdate, PdfId, PersistRequest, SessionId,
};
use facturas_core::{FacturasError, GroupApi, LivenessProbe, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Group-store client that talks to the backend over HTTP.
#[derive(Clone)]
pub struct HttpGroupApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct CreateGroupRequest<'a> {
    #[serde(rename = "baseName")]
    base_name: &'a str,
    pdfs: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct RenameGroupRequest<'a> {
    #[serde(rename = "baseName")]
    base_name: &'a str,
}

impl HttpGroupApi {
    /// Creates a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url()).with_timeout(config.request_timeout())
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `request`; non-success statuses become `FacturasError::Api`.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FacturasError::network(format!("{}: {}", fallback, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = decode_error_message(&body, fallback);
        tracing::debug!("[HttpGroupApi] {} -> {}: {}", fallback, status, message);
        Err(FacturasError::api(status.as_u16(), message))
    }

    /// Decodes a success body; a malformed body is a `Decode` error.
    async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| FacturasError::network(format!("Failed to read response: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| FacturasError::decode(format!("Unexpected response body: {}", e)))
    }

    async fn read_bytes(response: Response) -> Result<Vec<u8>> {
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FacturasError::network(format!("Failed to read download: {}", e)))
    }
}

/// Builds a multipart file part with a MIME type guessed from the name.
fn file_part(file: &LocalFile) -> Result<Part> {
    let mime = mime_guess::from_path(&file.name).first_or_octet_stream();
    Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(mime.as_ref())
        .map_err(|e| FacturasError::validation(format!("Invalid file '{}': {}", file.name, e)))
}

/// Encodes a save with new files: `pdf_{k}` parts, manifest, base name.
fn multipart_form(update: &MultipartUpdate) -> Result<Form> {
    let mut form = Form::new();
    for part in &update.files {
        form = form.part(part.field.clone(), file_part(&part.file)?);
    }
    let form = form
        .text(MANIFEST_FIELD, update.manifest_json()?)
        .text(BASE_NAME_FIELD, update.base_name.clone());
    Ok(form)
}

#[async_trait]
impl GroupApi for HttpGroupApi {
    async fn analyze(
        &self,
        file: &LocalFile,
        session_id: Option<&SessionId>,
    ) -> Result<AnalyzeResponse> {
        let mut form = Form::new().part("file", file_part(file)?);
        if let Some(session_id) = session_id {
            form = form.text("session_id", session_id.to_string());
        }

        tracing::debug!(
            "[HttpGroupApi] Analyzing '{}' ({} bytes, session: {})",
            file.name,
            file.len(),
            session_id.map(SessionId::as_str).unwrap_or("new")
        );

        let request = self.client.post(self.url("/api/analyze")).multipart(form);
        let response = self.send(request, "Error analyzing file").await?;
        Self::decode_json(response).await
    }

    async fn create_group(&self, base_name: &str) -> Result<GroupRecord> {
        let body = CreateGroupRequest {
            base_name,
            pdfs: Vec::new(),
        };
        let request = self.client.post(self.url("/api/groups")).json(&body);
        let response = self.send(request, "Error creating group").await?;
        Self::decode_json(response).await
    }

    async fn update_group(&self, group_id: GroupId, request: &PersistRequest) -> Result<GroupRecord> {
        let url = self.url(&format!("/api/groups/{}", group_id));
        let builder = match request {
            PersistRequest::Json(update) => self.client.put(url).json(update),
            PersistRequest::Multipart(update) => self.client.put(url).multipart(multipart_form(update)?),
        };

        let fallback = format!("Error saving group {}", request.base_name());
        let response = self.send(builder, &fallback).await?;
        Self::decode_json(response).await
    }

    async fn rename_group(&self, group_id: GroupId, base_name: &str) -> Result<GroupRecord> {
        let request = self
            .client
            .put(self.url(&format!("/api/groups/{}", group_id)))
            .json(&RenameGroupRequest { base_name });
        let response = self.send(request, "Error updating group name").await?;
        Self::decode_json(response).await
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/api/groups/{}", group_id)));
        self.send(request, "Error deleting group").await?;
        Ok(())
    }

    async fn download_group(&self, group_id: GroupId) -> Result<Vec<u8>> {
        let request = self
            .client
            .get(self.url(&format!("/api/download/{}", group_id)));
        let response = self.send(request, "Error downloading group").await?;
        Self::read_bytes(response).await
    }

    async fn download_all(&self, session_id: &SessionId) -> Result<Vec<u8>> {
        let request = self
            .client
            .get(self.url("/api/download-all"))
            .query(&[("session_id", session_id.as_str())]);
        let response = self.send(request, "Error downloading all groups").await?;
        Self::read_bytes(response).await
    }

    async fn fetch_pdf(&self, pdf_id: PdfId) -> Result<Vec<u8>> {
        let request = self.client.get(self.url(&format!("/api/pdf/{}", pdf_id)));
        let response = self.send(request, "Error fetching PDF").await?;
        Self::read_bytes(response).await
    }
}

#[async_trait]
impl LivenessProbe for HttpGroupApi {
    async fn ping(&self) -> Result<()> {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| FacturasError::network(e.to_string()))
    }
}
