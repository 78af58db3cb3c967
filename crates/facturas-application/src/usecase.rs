//! GroupUseCase - group-table operations outside the preview editor.
//!
//! Covers analysis of uploaded files, creating, renaming and deleting
//! groups, and downloads.

use crate::state::{ApplicationState, NoticeLevel};
use facturas_core::api::DOWNLOAD_ALL_FILE_NAME;
use facturas_core::{
    DownloadedFile, FacturasError, GroupApi, GroupId, GroupRecord, LocalFile, PdfRecord,
    Provenance, Result,
};
use futures::future::join_all;
use std::sync::Arc;

/// Extensions accepted by the analyze endpoint.
const ANALYZABLE_EXTENSIONS: [&str; 2] = ["pdf", "zip"];

/// Result of `GroupUseCase::analyze_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeOutcome {
    pub processed: usize,
    /// Files the backend rejected, with the reported message.
    pub failed: Vec<(String, String)>,
    /// Files dropped before upload (not PDF or ZIP).
    pub skipped: Vec<String>,
}

/// Result of `GroupUseCase::delete_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAllOutcome {
    pub succeeded: usize,
    pub total: usize,
}

impl DeleteAllOutcome {
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }
}

pub struct GroupUseCase {
    api: Arc<dyn GroupApi>,
}

impl GroupUseCase {
    pub fn new(api: Arc<dyn GroupApi>) -> Self {
        Self { api }
    }

    /// Uploads files one at a time, threading the analysis session id.
    ///
    /// A failed file is logged and skipped; the rest of the batch goes on.
    /// Every response is merged into the store: manual groups are kept,
    /// the automatic grouping is replaced by the backend's.
    pub async fn analyze_files(
        &self,
        state: &mut ApplicationState,
        files: Vec<LocalFile>,
    ) -> Result<AnalyzeOutcome> {
        let mut outcome = AnalyzeOutcome::default();
        let (accepted, skipped): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|f| ANALYZABLE_EXTENSIONS.iter().any(|ext| f.has_extension(ext)));
        outcome.skipped = skipped.into_iter().map(|f| f.name).collect();

        if accepted.is_empty() {
            return Err(FacturasError::validation("Select at least one PDF or ZIP file"));
        }

        let total = accepted.len();
        for (n, file) in accepted.iter().enumerate() {
            tracing::debug!("[GroupUseCase] Analyzing {}/{}: {}", n + 1, total, file.name);
            let response = self.api.analyze(file, state.session_id()).await;
            match response {
                Ok(response) => {
                    state.set_session_id(response.session_id);
                    state.merge_analysis(response.groups);
                    outcome.processed += 1;
                }
                Err(e) => {
                    tracing::error!("[GroupUseCase] Analysis of '{}' failed: {}", file.name, e);
                    outcome.failed.push((file.name.clone(), e.user_message()));
                }
            }
        }

        if outcome.failed.is_empty() {
            state.notify(
                NoticeLevel::Success,
                format!("{} file(s) processed", outcome.processed),
            );
        } else {
            state.notify(
                NoticeLevel::Warning,
                format!("{}/{} file(s) processed", outcome.processed, total),
            );
        }
        Ok(outcome)
    }

    /// Creates an empty manual group.
    pub async fn create_group(
        &self,
        state: &mut ApplicationState,
        base_name: &str,
    ) -> Result<GroupRecord> {
        let base_name = base_name.trim();
        if base_name.is_empty() {
            return Err(FacturasError::validation("Group name cannot be empty"));
        }

        let mut record = self.api.create_group(base_name).await?;
        record.created_by = Provenance::Manual;
        tracing::info!("[GroupUseCase] Created group {} '{}'", record.id, record.base_name);
        state.upsert_group(record.clone());
        state.notify(NoticeLevel::Success, format!("Group {} created", record.base_name));
        Ok(record)
    }

    /// Renames a group from the group table (name only, no PDF list).
    ///
    /// An unchanged name sends nothing and returns the current record.
    pub async fn rename_group(
        &self,
        state: &mut ApplicationState,
        group_id: GroupId,
        new_name: &str,
    ) -> Result<GroupRecord> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(FacturasError::validation("Group name cannot be empty"));
        }
        let current = state.group(group_id)?;
        if current.base_name == new_name {
            return Ok(current.clone());
        }

        let record = self.api.rename_group(group_id, new_name).await?;
        // Keep the local list if the backend answered with the name only.
        let record = if record.pdfs.is_empty() {
            let pdfs = state.group(group_id)?.pdfs.clone();
            record.with_pdfs(pdfs)
        } else {
            record
        };
        Ok(state.apply_saved_group(record))
    }

    /// Deletes a group remotely, then locally. Closes a preview on it.
    pub async fn delete_group(&self, state: &mut ApplicationState, group_id: GroupId) -> Result<()> {
        let name = state.group(group_id)?.base_name.clone();
        self.api.delete_group(group_id).await?;

        state.close_session_on(group_id);
        state.remove_group(group_id);
        tracing::info!("[GroupUseCase] Deleted group {} '{}'", group_id, name);
        state.notify(NoticeLevel::Success, format!("Group {} deleted", name));
        Ok(())
    }

    /// Deletes every group concurrently and keeps the ones that failed.
    pub async fn delete_all(&self, state: &mut ApplicationState) -> Result<DeleteAllOutcome> {
        let ids = state.store().ids();
        if ids.is_empty() {
            return Err(FacturasError::validation("There are no groups to delete"));
        }

        let results = join_all(ids.iter().map(|&id| {
            let api = Arc::clone(&self.api);
            async move { (id, api.delete_group(id).await) }
        }))
        .await;

        let mut outcome = DeleteAllOutcome {
            succeeded: 0,
            total: ids.len(),
        };
        for (id, result) in results {
            match result {
                Ok(()) => {
                    state.close_session_on(id);
                    state.remove_group(id);
                    outcome.succeeded += 1;
                }
                Err(e) => tracing::error!("[GroupUseCase] Failed to delete group {}: {}", id, e),
            }
        }

        let message = format!("{}/{} groups deleted", outcome.succeeded, outcome.total);
        if outcome.is_complete() {
            tracing::info!("[GroupUseCase] {}", message);
            state.notify(NoticeLevel::Success, message);
        } else {
            tracing::warn!("[GroupUseCase] {}", message);
            state.notify(NoticeLevel::Warning, message);
        }
        Ok(outcome)
    }

    /// Merged PDF of one group, named `{baseName}.pdf`.
    pub async fn download_group(
        &self,
        state: &ApplicationState,
        group_id: GroupId,
    ) -> Result<DownloadedFile> {
        let file_name = state.group(group_id)?.download_file_name();
        let bytes = self.api.download_group(group_id).await?;
        tracing::debug!("[GroupUseCase] Downloaded {} ({} bytes)", file_name, bytes.len());
        Ok(DownloadedFile { file_name, bytes })
    }

    /// ZIP with every group of the current analysis session.
    pub async fn download_all(&self, state: &ApplicationState) -> Result<DownloadedFile> {
        if state.store().is_empty() {
            return Err(FacturasError::validation("There are no groups to download"));
        }
        let session_id = state
            .session_id()
            .ok_or_else(|| FacturasError::validation("No analysis session to download"))?;

        let bytes = self.api.download_all(session_id).await?;
        Ok(DownloadedFile {
            file_name: DOWNLOAD_ALL_FILE_NAME.to_string(),
            bytes,
        })
    }

    /// Bytes of a single PDF: local for pending files, fetched otherwise.
    pub async fn open_pdf(&self, pdf: &PdfRecord) -> Result<DownloadedFile> {
        let bytes = match (pdf.file(), pdf.id()) {
            (Some(file), _) => file.bytes.to_vec(),
            (None, Some(id)) => self.api.fetch_pdf(id).await?,
            (None, None) => return Err(FacturasError::invalid_state("PDF has no content")),
        };
        Ok(DownloadedFile {
            file_name: pdf.name().to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateEvent;
    use crate::test_support::{Call, MockGroupApi, group, names, server_error};
    use facturas_core::group::AnalyzeResponse;
    use facturas_core::{PdfId, SessionId};

    fn setup(groups: Vec<GroupRecord>) -> (Arc<MockGroupApi>, GroupUseCase, ApplicationState) {
        let api = Arc::new(MockGroupApi::new());
        let usecase = GroupUseCase::new(api.clone());
        let mut state = ApplicationState::new();
        for g in groups {
            state.upsert_group(g);
        }
        (api, usecase, state)
    }

    fn pdf(name: &str) -> LocalFile {
        LocalFile::new(name, b"%PDF".to_vec())
    }

    fn last_notice(rx: &mut tokio::sync::broadcast::Receiver<StateEvent>) -> Option<(NoticeLevel, String)> {
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let StateEvent::Notice { level, message } = event {
                last = Some((level, message));
            }
        }
        last
    }

    #[tokio::test]
    async fn test_analyze_is_sequential_and_threads_session_id() {
        let (api, usecase, mut state) = setup(vec![]);
        api.push_analyze(Ok(AnalyzeResponse {
            groups: vec![group(1, "Acme", &["a.pdf"])],
            session_id: SessionId::new("s-1"),
        }));
        api.push_analyze(Ok(AnalyzeResponse {
            groups: vec![group(1, "Acme", &["a.pdf"]), group(2, "Beta", &["b.pdf"])],
            session_id: SessionId::new("s-1"),
        }));

        let outcome = usecase
            .analyze_files(&mut state, vec![pdf("a.pdf"), pdf("notes.txt"), pdf("b.ZIP")])
            .await
            .unwrap();

        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.skipped, vec!["notes.txt".to_string()]);
        assert_eq!(
            api.calls(),
            vec![
                Call::Analyze { file: "a.pdf".into(), session: None },
                Call::Analyze { file: "b.ZIP".into(), session: Some("s-1".into()) },
            ]
        );
        assert_eq!(state.store().len(), 2);
        assert_eq!(state.session_id().unwrap().as_str(), "s-1");
    }

    #[tokio::test]
    async fn test_analyze_continues_after_failure() {
        let (api, usecase, mut state) = setup(vec![]);
        let mut rx = state.subscribe();
        api.push_analyze(Err(server_error("PDF ilegible")));
        api.push_analyze(Ok(AnalyzeResponse {
            groups: vec![group(2, "Beta", &["b.pdf"])],
            session_id: SessionId::new("s-9"),
        }));

        let outcome = usecase
            .analyze_files(&mut state, vec![pdf("bad.pdf"), pdf("b.pdf")])
            .await
            .unwrap();

        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.failed, vec![("bad.pdf".to_string(), "PDF ilegible".to_string())]);
        assert_eq!(state.store().len(), 1);
        assert_eq!(last_notice(&mut rx).unwrap().0, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_analyze_keeps_manual_groups() {
        let (api, usecase, mut state) = setup(vec![
            group(1, "Old auto", &["x.pdf"]),
            GroupRecord::new(GroupId(50), "Mine", Provenance::Manual),
        ]);
        api.push_analyze(Ok(AnalyzeResponse {
            groups: vec![group(2, "New auto", &["y.pdf"])],
            session_id: SessionId::new("s"),
        }));

        usecase.analyze_files(&mut state, vec![pdf("y.pdf")]).await.unwrap();

        let ids = state.store().ids();
        assert!(ids.contains(&GroupId(50)));
        assert!(ids.contains(&GroupId(2)));
        assert!(!ids.contains(&GroupId(1)));
    }

    #[tokio::test]
    async fn test_analyze_without_usable_files_is_validation() {
        let (api, usecase, mut state) = setup(vec![]);
        let err = usecase
            .analyze_files(&mut state, vec![pdf("image.png")])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_group_is_manual() {
        let (api, usecase, mut state) = setup(vec![]);

        let record = usecase.create_group(&mut state, "  Nuevo  ").await.unwrap();

        assert!(record.is_manual());
        assert_eq!(api.calls(), vec![Call::Create("Nuevo".into())]);
        assert!(state.store().get(record.id).unwrap().is_manual());
    }

    #[tokio::test]
    async fn test_create_group_rejects_blank_name() {
        let (api, usecase, mut state) = setup(vec![]);
        assert!(usecase.create_group(&mut state, "   ").await.unwrap_err().is_validation());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_inline_rename() {
        let (api, usecase, mut state) = setup(vec![group(1, "Old", &["a.pdf", "b.pdf"])]);
        state.open_session(GroupId(1)).unwrap();

        let record = usecase.rename_group(&mut state, GroupId(1), " New ").await.unwrap();

        assert_eq!(api.calls(), vec![Call::Rename(GroupId(1), "New".into())]);
        assert_eq!(record.base_name, "New");
        assert_eq!(names(&record.pdfs), ["a.pdf", "b.pdf"]);
        assert_eq!(state.active_session().unwrap().base_name(), "New");
    }

    #[tokio::test]
    async fn test_unchanged_rename_sends_nothing() {
        let (api, usecase, mut state) = setup(vec![group(1, "Same", &[])]);
        usecase.rename_group(&mut state, GroupId(1), "Same ").await.unwrap();
        assert!(api.calls().is_empty());
        assert!(usecase.rename_group(&mut state, GroupId(1), "").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_failed_rename_keeps_old_name() {
        let (api, usecase, mut state) = setup(vec![group(1, "Old", &[])]);
        api.fail_update(GroupId(1));
        assert!(usecase.rename_group(&mut state, GroupId(1), "New").await.is_err());
        assert_eq!(state.store().get(GroupId(1)).unwrap().base_name, "Old");
    }

    #[tokio::test]
    async fn test_delete_group_closes_its_preview() {
        let (api, usecase, mut state) = setup(vec![group(1, "A", &[]), group(2, "B", &[])]);
        state.open_session(GroupId(1)).unwrap();

        usecase.delete_group(&mut state, GroupId(1)).await.unwrap();

        assert_eq!(api.calls(), vec![Call::Delete(GroupId(1))]);
        assert_eq!(state.store().ids(), vec![GroupId(2)]);
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_group() {
        let (api, usecase, mut state) = setup(vec![group(1, "A", &[])]);
        api.fail_delete(GroupId(1));
        assert!(usecase.delete_group(&mut state, GroupId(1)).await.is_err());
        assert!(state.store().contains(GroupId(1)));
    }

    #[tokio::test]
    async fn test_delete_all_reports_partial_success() {
        let (api, usecase, mut state) = setup(vec![
            group(1, "A", &[]),
            group(2, "B", &[]),
            group(3, "C", &[]),
        ]);
        api.fail_delete(GroupId(2));
        let mut rx = state.subscribe();

        let outcome = usecase.delete_all(&mut state).await.unwrap();

        assert_eq!(outcome, DeleteAllOutcome { succeeded: 2, total: 3 });
        assert_eq!(state.store().ids(), vec![GroupId(2)]);
        assert_eq!(api.calls().len(), 3);
        assert_eq!(
            last_notice(&mut rx),
            Some((NoticeLevel::Warning, "2/3 groups deleted".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_all_on_empty_store_is_validation() {
        let (_api, usecase, mut state) = setup(vec![]);
        assert!(usecase.delete_all(&mut state).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_download_group_uses_base_name() {
        let (_api, usecase, state) = setup(vec![group(1, "Acme Corp", &["a.pdf"])]);
        let file = usecase.download_group(&state, GroupId(1)).await.unwrap();
        assert_eq!(file.file_name, "Acme Corp.pdf");
        assert_eq!(file.bytes, b"%PDF-merged");
    }

    #[tokio::test]
    async fn test_download_all_requires_groups_and_session() {
        let (api, usecase, mut state) = setup(vec![]);
        assert!(usecase.download_all(&state).await.unwrap_err().is_validation());

        state.upsert_group(group(1, "A", &[]));
        assert!(usecase.download_all(&state).await.unwrap_err().is_validation());

        state.set_session_id(SessionId::new("s-1"));
        let file = usecase.download_all(&state).await.unwrap();
        assert_eq!(file.file_name, DOWNLOAD_ALL_FILE_NAME);
        assert_eq!(api.calls(), vec![Call::DownloadAll("s-1".into())]);
    }

    #[tokio::test]
    async fn test_open_pdf_local_or_remote() {
        let (api, usecase, _state) = setup(vec![]);

        let local = PdfRecord::pending(LocalFile::new("new.pdf", b"local".to_vec()));
        assert_eq!(usecase.open_pdf(&local).await.unwrap().bytes, b"local");
        assert!(api.calls().is_empty());

        let stored = PdfRecord::stored(PdfId(7), "old.pdf");
        let file = usecase.open_pdf(&stored).await.unwrap();
        assert_eq!(file.file_name, "old.pdf");
        assert_eq!(api.calls(), vec![Call::FetchPdf(PdfId(7))]);
    }
}
