//! FacturasApp - top-level controller owning the application state.
//!
//! Views call into this type only. Each operation takes the state lock for
//! its whole duration, so two operations never interleave on the store.
//! Reads go through the published `StateSnapshot` and never wait on an
//! operation in flight. Failures are returned and also published as an
//! error notice.

use crate::activation::{ActivationState, BackendActivationMonitor};
use crate::move_pdf::MoveOrchestrator;
use crate::split::{SplitOrchestrator, SplitOutcome};
use crate::state::{ApplicationState, NoticeLevel, StateEvent, StateSnapshot};
use crate::sync::GroupSyncClient;
use crate::usecase::{AnalyzeOutcome, DeleteAllOutcome, GroupUseCase};
use facturas_core::{
    ActivationConfig, AddFilesOutcome, ClientConfig, DownloadedFile, FacturasError, GroupApi,
    GroupId, GroupRecord, LivenessProbe, LocalFile, PreviewEditSession, Result,
};
use facturas_interaction::HttpGroupApi;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;

pub struct FacturasApp {
    state: Mutex<ApplicationState>,
    events: broadcast::Sender<StateEvent>,
    snapshot: watch::Receiver<StateSnapshot>,
    usecase: GroupUseCase,
    sync: GroupSyncClient,
    mover: MoveOrchestrator,
    splitter: SplitOrchestrator,
    monitor: Arc<BackendActivationMonitor>,
}

impl FacturasApp {
    /// Wires every component to `api`, which also serves as the liveness probe.
    pub fn new<A>(api: Arc<A>, activation: ActivationConfig) -> Self
    where
        A: GroupApi + LivenessProbe + 'static,
    {
        let group_api: Arc<dyn GroupApi> = api.clone();
        let sync = GroupSyncClient::new(group_api.clone());
        let state = ApplicationState::new();
        Self {
            events: state.sender(),
            snapshot: state.snapshots(),
            state: Mutex::new(state),
            usecase: GroupUseCase::new(group_api.clone()),
            mover: MoveOrchestrator::new(sync.clone()),
            splitter: SplitOrchestrator::new(group_api, sync.clone()),
            sync,
            monitor: Arc::new(BackendActivationMonitor::new(api, activation)),
        }
    }

    /// Connects to the backend described by `config` over HTTP.
    pub fn from_config(config: &ClientConfig) -> Self {
        let api = Arc::new(HttpGroupApi::from_config(config));
        Self::new(api, config.activation.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Follows every published snapshot.
    pub fn snapshots(&self) -> watch::Receiver<StateSnapshot> {
        self.snapshot.clone()
    }

    /// Groups in display order, as last published.
    pub fn groups(&self) -> Vec<GroupRecord> {
        self.snapshot.borrow().groups.clone()
    }

    /// The open preview, as last published.
    pub fn preview(&self) -> Option<PreviewEditSession> {
        self.snapshot.borrow().preview.clone()
    }

    // ============================================================================
    // Backend activation
    // ============================================================================

    pub fn start_activation_monitor(&self) -> JoinHandle<ActivationState> {
        self.monitor.start()
    }

    pub fn activation(&self) -> watch::Receiver<ActivationState> {
        self.monitor.subscribe()
    }

    pub fn stop_activation_monitor(&self) {
        self.monitor.stop();
    }

    // ============================================================================
    // Group table
    // ============================================================================

    pub async fn analyze_files(&self, files: Vec<LocalFile>) -> Result<AnalyzeOutcome> {
        let mut state = self.state.lock().await;
        let result = self.usecase.analyze_files(&mut state, files).await;
        report(&state, result)
    }

    pub async fn create_group(&self, base_name: &str) -> Result<GroupRecord> {
        let mut state = self.state.lock().await;
        let result = self.usecase.create_group(&mut state, base_name).await;
        report(&state, result)
    }

    pub async fn rename_group(&self, group_id: GroupId, new_name: &str) -> Result<GroupRecord> {
        let mut state = self.state.lock().await;
        let result = self.usecase.rename_group(&mut state, group_id, new_name).await;
        report(&state, result)
    }

    pub async fn delete_group(&self, group_id: GroupId) -> Result<()> {
        let mut state = self.state.lock().await;
        let result = self.usecase.delete_group(&mut state, group_id).await;
        report(&state, result)
    }

    pub async fn delete_all(&self) -> Result<DeleteAllOutcome> {
        let mut state = self.state.lock().await;
        let result = self.usecase.delete_all(&mut state).await;
        report(&state, result)
    }

    pub async fn download_group(&self, group_id: GroupId) -> Result<DownloadedFile> {
        let state = self.state.lock().await;
        let result = self.usecase.download_group(&state, group_id).await;
        report(&state, result)
    }

    pub async fn download_all(&self) -> Result<DownloadedFile> {
        let state = self.state.lock().await;
        let result = self.usecase.download_all(&state).await;
        report(&state, result)
    }

    // ============================================================================
    // Preview editing
    // ============================================================================

    pub async fn open_preview(&self, group_id: GroupId) -> Result<PreviewEditSession> {
        let mut state = self.state.lock().await;
        let result = state.open_session(group_id).cloned();
        report(&state, result)
    }

    /// Discards the open preview.
    pub async fn close_preview(&self) {
        self.state.lock().await.close_session();
    }

    /// Applies a local edit to the open preview.
    pub async fn edit_preview<R>(&self, edit: impl FnOnce(&mut PreviewEditSession) -> R) -> Result<R> {
        let mut state = self.state.lock().await;
        let result = state.edit_session(edit);
        report(&state, result)
    }

    pub async fn reorder(&self, from: usize, to: usize) -> Result<bool> {
        self.edit_preview(|session| session.reorder(from, to)).await
    }

    pub async fn remove_from_preview(&self, index: usize) -> Result<bool> {
        self.edit_preview(|session| session.remove_at(index).is_some()).await
    }

    pub async fn add_files(&self, files: Vec<LocalFile>) -> Result<AddFilesOutcome> {
        let outcome = self.edit_preview(|session| session.add_files(files)).await?;
        if !outcome.rejected.is_empty() {
            self.state.lock().await.notify(
                NoticeLevel::Warning,
                format!("Only PDF files can be added: {}", outcome.rejected.join(", ")),
            );
        }
        Ok(outcome)
    }

    pub async fn stage_rename(&self, new_name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let result = state
            .edit_session(|session| session.rename(new_name))
            .and_then(|renamed| renamed);
        report(&state, result)
    }

    /// Saves the open preview and closes it.
    pub async fn commit(&self) -> Result<GroupRecord> {
        let mut state = self.state.lock().await;
        let result = self.sync.commit(&mut state).await;
        report(&state, result)
    }

    pub async fn move_pdf(&self, pdf_index: usize, target: GroupId) -> Result<GroupRecord> {
        let mut state = self.state.lock().await;
        let result = self.mover.move_pdf(&mut state, pdf_index, target).await;
        report(&state, result)
    }

    pub async fn split(&self, selected: &[usize], new_group_name: &str) -> Result<SplitOutcome> {
        let mut state = self.state.lock().await;
        let result = self
            .splitter
            .split_group(&mut state, selected, new_group_name)
            .await;
        report(&state, result)
    }

    /// Bytes of the PDF at `index` in the open preview.
    pub async fn open_pdf(&self, index: usize) -> Result<DownloadedFile> {
        let state = self.state.lock().await;
        let pdf = state.active_session().and_then(|session| {
            session
                .get(index)
                .cloned()
                .ok_or_else(|| FacturasError::validation(format!("No PDF at position {}", index)))
        });
        let result = match pdf {
            Ok(pdf) => self.usecase.open_pdf(&pdf).await,
            Err(e) => Err(e),
        };
        report(&state, result)
    }
}

/// Publishes a failure as an error notice and passes the result through.
fn report<T>(state: &ApplicationState, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        let level = if e.is_partial() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        state.notify(level, e.user_message());
    }
    result
}
