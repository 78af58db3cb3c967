//! Transport seam towards the group-store backend.
//!
//! The application layer talks to the backend only through these traits so
//! that sync and orchestration logic can be exercised without a network.

use crate::error::Result;
use crate::group::{AnalyzeResponse, GroupId, GroupRecord, LocalFile, PdfId, PersistRequest, SessionId};
use async_trait::async_trait;
use serde_json::Value;

/// Filename given to the archive returned by the download-all endpoint.
pub const DOWNLOAD_ALL_FILE_NAME: &str = "facturas_organizadas.zip";

/// A binary download together with the filename it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Group-store endpoints consumed by the client.
#[async_trait]
pub trait GroupApi: Send + Sync {
    /// Uploads one PDF or ZIP for grouping (`POST /api/analyze`).
    ///
    /// Passing the current `session_id` makes the backend merge this upload
    /// into the existing grouping run.
    async fn analyze(
        &self,
        file: &LocalFile,
        session_id: Option<&SessionId>,
    ) -> Result<AnalyzeResponse>;

    /// Creates an empty group (`POST /api/groups`).
    async fn create_group(&self, base_name: &str) -> Result<GroupRecord>;

    /// Saves a group's full PDF order and name (`PUT /api/groups/{id}`).
    ///
    /// Not idempotent: a retried call re-applies the same mutation.
    async fn update_group(&self, group_id: GroupId, request: &PersistRequest) -> Result<GroupRecord>;

    /// Changes only the name of a group (`PUT /api/groups/{id}` with `{baseName}`).
    async fn rename_group(&self, group_id: GroupId, base_name: &str) -> Result<GroupRecord>;

    /// Deletes a group (`DELETE /api/groups/{id}`).
    async fn delete_group(&self, group_id: GroupId) -> Result<()>;

    /// Merged PDF of one group (`GET /api/download/{id}`).
    async fn download_group(&self, group_id: GroupId) -> Result<Vec<u8>>;

    /// ZIP of every group in the session (`GET /api/download-all`).
    async fn download_all(&self, session_id: &SessionId) -> Result<Vec<u8>>;

    /// A single stored PDF for viewing (`GET /api/pdf/{id}`).
    async fn fetch_pdf(&self, pdf_id: PdfId) -> Result<Vec<u8>>;
}

/// Liveness check against the backend root (`GET /`).
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Any HTTP response counts as awake; only transport failures are errors.
    async fn ping(&self) -> Result<()>;
}

/// Extracts the user-facing message from an error response body.
///
/// Tries the `{ "error": "..." }` shape first, then the raw body text, then
/// `fallback`. Never fails.
pub fn decode_error_message(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(body)) => match body.get("error").and_then(Value::as_str) {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => fallback.to_string(),
        },
        Ok(_) => fallback.to_string(),
        Err(_) => trimmed.to_string(),
    }
}
