//! MoveOrchestrator - moves one PDF from the open preview to another group.
//!
//! The source group is saved first. If only the first save lands, the PDF is
//! missing from both groups rather than present in two.

use crate::state::{ApplicationState, NoticeLevel};
use crate::sync::GroupSyncClient;
use facturas_core::{FacturasError, GroupId, GroupRecord, Result};

pub struct MoveOrchestrator {
    sync: GroupSyncClient,
}

impl MoveOrchestrator {
    pub fn new(sync: GroupSyncClient) -> Self {
        Self { sync }
    }

    /// Moves the PDF at `pdf_index` of the open preview to `target`.
    ///
    /// Returns the saved destination group.
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad index or when `target` is the group being edited.
    /// - `NotFound` when `target` is not in the store.
    /// - The save error when the source save fails; the PDF is put back.
    /// - `MoveIncomplete` when the source was saved but the destination was not.
    pub async fn move_pdf(
        &self,
        state: &mut ApplicationState,
        pdf_index: usize,
        target: GroupId,
    ) -> Result<GroupRecord> {
        let session = state.active_session()?;
        let source = session.group_id();
        if target == source {
            return Err(FacturasError::validation("The PDF is already in this group"));
        }
        let pdf = session
            .get(pdf_index)
            .cloned()
            .ok_or_else(|| FacturasError::validation(format!("No PDF at position {}", pdf_index)))?;

        // Destination list comes from the store, not from any preview.
        let target_record = state.group(target)?;
        let target_name = target_record.base_name.clone();
        let mut target_pdfs = target_record.pdfs.clone();
        target_pdfs.push(pdf.clone());

        let (source_name, source_pdfs) = state.edit_session(|session| {
            session.remove_at(pdf_index);
            (session.pending_name().to_string(), session.pdfs().to_vec())
        })?;

        tracing::debug!(
            "[MoveOrchestrator] Moving '{}' from group {} to group {}",
            pdf.name(),
            source,
            target
        );

        let saved_source = match self
            .sync
            .persist(state, source, &source_name, &source_pdfs)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("[MoveOrchestrator] Source save failed, restoring '{}'", pdf.name());
                state.edit_session_on(source, |session| session.insert_at(pdf_index, pdf));
                return Err(e);
            }
        };
        // Pending uploads are stored now; the preview takes the saved list.
        state.edit_session_on(source, |session| session.set_pdfs(saved_source.pdfs.clone()));

        match self
            .sync
            .persist(state, target, &target_name, &target_pdfs)
            .await
        {
            Ok(record) => {
                tracing::info!(
                    "[MoveOrchestrator] Moved '{}' to '{}'",
                    pdf.name(),
                    record.base_name
                );
                state.notify(
                    NoticeLevel::Success,
                    format!("PDF moved to {}", record.base_name),
                );
                Ok(record)
            }
            Err(cause) => {
                tracing::warn!(
                    "[MoveOrchestrator] '{}' was removed from group {} but group {} could not be saved: {}",
                    pdf.name(),
                    source,
                    target,
                    cause
                );
                Err(FacturasError::MoveIncomplete {
                    pdf_name: pdf.name().to_string(),
                    target,
                    cause: Box::new(cause),
                })
            }
        }
    }
}
