//! Recording `GroupApi` double shared by the unit tests of this crate.

use async_trait::async_trait;
use facturas_core::group::{AnalyzeResponse, PersistRequest};
use facturas_core::{
    FacturasError, GroupApi, GroupId, GroupRecord, LocalFile, PdfId, PdfRecord, Provenance,
    Result, SessionId,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Analyze { file: String, session: Option<String> },
    Create(String),
    Update { id: GroupId, base_name: String, pdfs: Vec<String>, multipart: bool },
    Rename(GroupId, String),
    Delete(GroupId),
    DownloadGroup(GroupId),
    DownloadAll(String),
    FetchPdf(PdfId),
}

/// Answers like the backend would and records every call.
///
/// Saved pending PDFs come back as stored PDFs with fresh ids; provenance
/// is never echoed.
pub(crate) struct MockGroupApi {
    calls: Mutex<Vec<Call>>,
    failing_updates: Mutex<HashSet<GroupId>>,
    failing_deletes: Mutex<HashSet<GroupId>>,
    fail_create: Mutex<bool>,
    analyze_responses: Mutex<VecDeque<Result<AnalyzeResponse>>>,
    next_group_id: AtomicI64,
    next_pdf_id: AtomicI64,
}

impl MockGroupApi {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_updates: Mutex::new(HashSet::new()),
            failing_deletes: Mutex::new(HashSet::new()),
            fail_create: Mutex::new(false),
            analyze_responses: Mutex::new(VecDeque::new()),
            next_group_id: AtomicI64::new(100),
            next_pdf_id: AtomicI64::new(1000),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn updates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect()
    }

    pub(crate) fn fail_update(&self, id: GroupId) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    pub(crate) fn heal_update(&self, id: GroupId) {
        self.failing_updates.lock().unwrap().remove(&id);
    }

    pub(crate) fn fail_delete(&self, id: GroupId) {
        self.failing_deletes.lock().unwrap().insert(id);
    }

    pub(crate) fn fail_create(&self) {
        *self.fail_create.lock().unwrap() = true;
    }

    pub(crate) fn push_analyze(&self, response: Result<AnalyzeResponse>) {
        self.analyze_responses.lock().unwrap().push_back(response);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn stored(&self, pdf: &PdfRecord) -> PdfRecord {
        match pdf.id() {
            Some(id) => PdfRecord::stored(id, pdf.name()),
            None => PdfRecord::stored(
                PdfId(self.next_pdf_id.fetch_add(1, Ordering::SeqCst)),
                pdf.name(),
            ),
        }
    }
}

/// Rebuilds the PDF list a save describes, in order.
fn requested_pdfs(request: &PersistRequest) -> Vec<PdfRecord> {
    match request {
        PersistRequest::Json(update) => update
            .pdfs
            .iter()
            .map(|p| PdfRecord::stored(p.id, p.name.clone()))
            .collect(),
        PersistRequest::Multipart(update) => {
            let mut files = update.files.iter();
            update
                .manifest
                .iter()
                .map(|entry| match entry.id {
                    Some(id) if !entry.is_new => PdfRecord::stored(id, entry.name.clone()),
                    _ => {
                        let file = files
                            .next()
                            .map(|part| part.file.clone())
                            .unwrap_or_else(|| LocalFile::new(entry.name.clone(), Vec::new()));
                        PdfRecord::pending(file)
                    }
                })
                .collect()
        }
    }
}

pub(crate) fn server_error(message: &str) -> FacturasError {
    FacturasError::api(500, message)
}

#[async_trait]
impl GroupApi for MockGroupApi {
    async fn analyze(
        &self,
        file: &LocalFile,
        session_id: Option<&SessionId>,
    ) -> Result<AnalyzeResponse> {
        self.record(Call::Analyze {
            file: file.name.clone(),
            session: session_id.map(|s| s.to_string()),
        });
        self.analyze_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(server_error("no analyze response queued")))
    }

    async fn create_group(&self, base_name: &str) -> Result<GroupRecord> {
        self.record(Call::Create(base_name.to_string()));
        if *self.fail_create.lock().unwrap() {
            return Err(server_error("create failed"));
        }
        let id = GroupId(self.next_group_id.fetch_add(1, Ordering::SeqCst));
        Ok(GroupRecord::new(id, base_name, Provenance::Auto))
    }

    async fn update_group(&self, group_id: GroupId, request: &PersistRequest) -> Result<GroupRecord> {
        let pdfs = requested_pdfs(request);
        self.record(Call::Update {
            id: group_id,
            base_name: request.base_name().to_string(),
            pdfs: pdfs.iter().map(|p| p.name().to_string()).collect(),
            multipart: request.is_multipart(),
        });
        if self.failing_updates.lock().unwrap().contains(&group_id) {
            return Err(server_error("save failed"));
        }
        let pdfs = pdfs.iter().map(|p| self.stored(p)).collect();
        Ok(GroupRecord::new(group_id, request.base_name(), Provenance::Auto).with_pdfs(pdfs))
    }

    async fn rename_group(&self, group_id: GroupId, base_name: &str) -> Result<GroupRecord> {
        self.record(Call::Rename(group_id, base_name.to_string()));
        if self.failing_updates.lock().unwrap().contains(&group_id) {
            return Err(server_error("rename failed"));
        }
        Ok(GroupRecord::new(group_id, base_name, Provenance::Auto))
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<()> {
        self.record(Call::Delete(group_id));
        if self.failing_deletes.lock().unwrap().contains(&group_id) {
            return Err(server_error("delete failed"));
        }
        Ok(())
    }

    async fn download_group(&self, group_id: GroupId) -> Result<Vec<u8>> {
        self.record(Call::DownloadGroup(group_id));
        Ok(b"%PDF-merged".to_vec())
    }

    async fn download_all(&self, session_id: &SessionId) -> Result<Vec<u8>> {
        self.record(Call::DownloadAll(session_id.to_string()));
        Ok(b"PK-zip".to_vec())
    }

    async fn fetch_pdf(&self, pdf_id: PdfId) -> Result<Vec<u8>> {
        self.record(Call::FetchPdf(pdf_id));
        Ok(format!("%PDF-{}", pdf_id).into_bytes())
    }
}

/// Group with stored PDFs named after `pdfs`, ids derived from the group id.
pub(crate) fn group(id: i64, name: &str, pdfs: &[&str]) -> GroupRecord {
    let pdfs = pdfs
        .iter()
        .enumerate()
        .map(|(i, n)| PdfRecord::stored(PdfId(id * 100 + i as i64), *n))
        .collect();
    GroupRecord::new(GroupId(id), name, Provenance::Auto).with_pdfs(pdfs)
}

pub(crate) fn names(pdfs: &[PdfRecord]) -> Vec<String> {
    pdfs.iter().map(|p| p.name().to_string()).collect()
}
