//! GroupSyncClient - the single write path from a working list to the backend.

use crate::state::{ApplicationState, NoticeLevel};
use facturas_core::group::PersistRequest;
use facturas_core::{GroupApi, GroupId, GroupRecord, PdfRecord, Result};
use std::sync::Arc;

/// Saves (group, pdf list) pairs and reconciles the result into the store.
#[derive(Clone)]
pub struct GroupSyncClient {
    api: Arc<dyn GroupApi>,
}

impl GroupSyncClient {
    pub fn new(api: Arc<dyn GroupApi>) -> Self {
        Self { api }
    }

    /// Saves `pdfs` as the complete, ordered content of `group_id`.
    ///
    /// Multipart when any PDF is still pending upload, JSON otherwise. On
    /// failure nothing in `state` changes. On success the returned record
    /// replaces the stored one and an open preview on the group refreshes
    /// its identity (never its working list).
    pub async fn persist(
        &self,
        state: &mut ApplicationState,
        group_id: GroupId,
        base_name: &str,
        pdfs: &[PdfRecord],
    ) -> Result<GroupRecord> {
        let request = PersistRequest::build(base_name, pdfs);
        tracing::debug!(
            "[GroupSync] Saving group {} '{}' ({} PDFs, {})",
            group_id,
            base_name,
            request.pdf_count(),
            if request.is_multipart() { "multipart" } else { "json" }
        );

        let record = self
            .api
            .update_group(group_id, &request)
            .await
            .inspect_err(|e| tracing::debug!("[GroupSync] Save of group {} failed: {}", group_id, e))?;

        Ok(state.apply_saved_group(record))
    }

    /// Saves the open preview (working list and staged name), then closes it.
    ///
    /// On failure the preview stays open with every edit intact.
    pub async fn commit(&self, state: &mut ApplicationState) -> Result<GroupRecord> {
        let session = state.active_session()?;
        let group_id = session.group_id();
        let base_name = session.pending_name().to_string();
        let pdfs = session.pdfs().to_vec();

        let record = self.persist(state, group_id, &base_name, &pdfs).await?;
        state.close_session();
        tracing::info!("[GroupSync] Committed group {} '{}'", record.id, record.base_name);
        state.notify(NoticeLevel::Success, "Group saved");
        Ok(record)
    }
}
