//! SplitOrchestrator - extracts selected PDFs of the open preview into a new group.

use crate::state::{ApplicationState, NoticeLevel};
use crate::sync::GroupSyncClient;
use facturas_core::{FacturasError, GroupApi, GroupRecord, PdfRecord, Provenance, Result};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Both groups after a completed split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub new_group: GroupRecord,
    pub original: GroupRecord,
}

pub struct SplitOrchestrator {
    api: Arc<dyn GroupApi>,
    sync: GroupSyncClient,
}

impl SplitOrchestrator {
    pub fn new(api: Arc<dyn GroupApi>, sync: GroupSyncClient) -> Self {
        Self { api, sync }
    }

    /// Moves the PDFs at `selected` into a new manual group named `new_group_name`.
    ///
    /// Steps: create the group, save it with the selection, then save the
    /// original group with what is left (and any staged rename). The preview
    /// is closed once both saves landed.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty name, an empty selection or an index out
    ///   of range. Nothing is sent.
    /// - `SplitAborted` when creating or filling the new group fails. The
    ///   original group is untouched; a created group is left as `orphan`.
    /// - `SplitTorn` when the new group is filled but the original group
    ///   could not be saved. The preview stays open on the residual list so
    ///   a commit retries the residual save.
    pub async fn split_group(
        &self,
        state: &mut ApplicationState,
        selected: &[usize],
        new_group_name: &str,
    ) -> Result<SplitOutcome> {
        let new_group_name = new_group_name.trim();
        if new_group_name.is_empty() {
            return Err(FacturasError::validation("The new group needs a name"));
        }

        let session = state.active_session()?;
        let selection: BTreeSet<usize> = selected.iter().copied().collect();
        if selection.is_empty() {
            return Err(FacturasError::validation("Select at least one PDF to split"));
        }
        if let Some(&index) = selection.iter().find(|&&i| i >= session.len()) {
            return Err(FacturasError::validation(format!("No PDF at position {}", index)));
        }

        let original_id = session.group_id();
        let original_name = session.pending_name().to_string();
        let (chosen, residual): (Vec<_>, Vec<_>) = session
            .pdfs()
            .iter()
            .enumerate()
            .partition(|(i, _)| selection.contains(i));
        let chosen: Vec<PdfRecord> = chosen.into_iter().map(|(_, p)| p.clone()).collect();
        let residual: Vec<PdfRecord> = residual.into_iter().map(|(_, p)| p.clone()).collect();

        tracing::debug!(
            "[SplitOrchestrator] Splitting {} of {} PDFs from group {} into '{}'",
            chosen.len(),
            chosen.len() + residual.len(),
            original_id,
            new_group_name
        );

        // 1. create
        let mut created = self
            .api
            .create_group(new_group_name)
            .await
            .map_err(|cause| FacturasError::SplitAborted {
                orphan: None,
                cause: Box::new(cause),
            })?;
        created.created_by = Provenance::Manual;
        let new_id = created.id;
        state.upsert_group(created);

        // 2. fill
        let new_group = match self
            .sync
            .persist(state, new_id, new_group_name, &chosen)
            .await
        {
            Ok(record) => record,
            Err(cause) => {
                tracing::warn!(
                    "[SplitOrchestrator] Group {} '{}' was created but could not be filled; left for manual cleanup: {}",
                    new_id,
                    new_group_name,
                    cause
                );
                return Err(FacturasError::SplitAborted {
                    orphan: Some(new_id),
                    cause: Box::new(cause),
                });
            }
        };

        // 3. residual
        state.edit_session_on(original_id, |session| session.set_pdfs(residual.clone()));

        // 4. save original
        let original = match self
            .sync
            .persist(state, original_id, &original_name, &residual)
            .await
        {
            Ok(record) => record,
            Err(cause) => {
                tracing::warn!(
                    "[SplitOrchestrator] Split torn: group {} holds the selection but group {} still lists it: {}",
                    new_id,
                    original_id,
                    cause
                );
                return Err(FacturasError::SplitTorn {
                    new_group: new_id,
                    cause: Box::new(cause),
                });
            }
        };

        state.close_session();
        tracing::info!(
            "[SplitOrchestrator] Split {} PDFs into '{}'",
            new_group.pdfs.len(),
            new_group.base_name
        );
        state.notify(
            NoticeLevel::Success,
            format!("Created group {} with {} PDFs", new_group.base_name, new_group.pdfs.len()),
        );

        Ok(SplitOutcome {
            new_group,
            original,
        })
    }
}
