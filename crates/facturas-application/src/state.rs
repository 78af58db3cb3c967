//! ApplicationState - the single mutable state shared by every component.
//!
//! Components never keep their own copy of the groups; they receive
//! `&mut ApplicationState` for the duration of an operation. Views follow
//! along through the `StateEvent` broadcast channel and read the
//! `StateSnapshot` published before each change event.

use facturas_core::{
    FacturasError, GroupId, GroupRecord, GroupStore, PreviewEditSession, Provenance, Result,
    SessionId,
};
use tokio::sync::{broadcast, watch};

const EVENT_CAPACITY: usize = 64;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Change notifications published to views.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// The group list changed (upsert, removal or merge).
    GroupsChanged,
    /// A preview was opened on the group.
    SessionOpened(GroupId),
    SessionClosed,
    Notice { level: NoticeLevel, message: String },
}

/// Owned copy of what views render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    /// Groups in display order.
    pub groups: Vec<GroupRecord>,
    pub preview: Option<PreviewEditSession>,
}

/// Groups, the open preview (if any) and the analysis session id.
#[derive(Debug)]
pub struct ApplicationState {
    store: GroupStore,
    session: Option<PreviewEditSession>,
    session_id: Option<SessionId>,
    events: broadcast::Sender<StateEvent>,
    snapshot: watch::Sender<StateSnapshot>,
}

impl ApplicationState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (snapshot, _) = watch::channel(StateSnapshot::default());
        Self {
            store: GroupStore::new(),
            session: None,
            session_id: None,
            events,
            snapshot,
        }
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    pub(crate) fn sender(&self) -> broadcast::Sender<StateEvent> {
        self.events.clone()
    }

    /// Latest published snapshot; readable while an operation is in flight.
    pub fn snapshots(&self) -> watch::Receiver<StateSnapshot> {
        self.snapshot.subscribe()
    }

    // ============================================================================
    // Groups
    // ============================================================================

    pub fn store(&self) -> &GroupStore {
        &self.store
    }

    pub fn group(&self, id: GroupId) -> Result<&GroupRecord> {
        self.store
            .get(id)
            .ok_or_else(|| FacturasError::not_found("Group", id))
    }

    pub fn upsert_group(&mut self, record: GroupRecord) {
        self.store.upsert(record);
        self.changed(StateEvent::GroupsChanged);
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<GroupRecord> {
        let removed = self.store.remove(id);
        if removed.is_some() {
            self.changed(StateEvent::GroupsChanged);
        }
        removed
    }

    pub fn clear_groups(&mut self) {
        self.store.remove_all();
        self.changed(StateEvent::GroupsChanged);
    }

    pub fn merge_analysis(&mut self, groups: Vec<GroupRecord>) {
        self.store.merge_analysis(groups);
        self.changed(StateEvent::GroupsChanged);
    }

    /// Stores a record returned by a successful save.
    ///
    /// The backend does not echo provenance, so a group known locally as
    /// manual stays manual. An open preview on the same group adopts the
    /// new id and name but keeps its working list.
    pub fn apply_saved_group(&mut self, mut record: GroupRecord) -> GroupRecord {
        if self.store.get(record.id).is_some_and(GroupRecord::is_manual) {
            record.created_by = Provenance::Manual;
        }
        if let Some(session) = self.session.as_mut() {
            if session.group_id() == record.id {
                session.refresh_identity(&record);
            }
        }
        self.upsert_group(record.clone());
        record
    }

    // ============================================================================
    // Preview session
    // ============================================================================

    pub fn session(&self) -> Option<&PreviewEditSession> {
        self.session.as_ref()
    }

    /// The open preview, or `InvalidState` when none is open.
    pub fn active_session(&self) -> Result<&PreviewEditSession> {
        self.session
            .as_ref()
            .ok_or_else(|| FacturasError::invalid_state("No group is open for editing"))
    }

    pub fn active_session_mut(&mut self) -> Result<&mut PreviewEditSession> {
        self.session
            .as_mut()
            .ok_or_else(|| FacturasError::invalid_state("No group is open for editing"))
    }

    /// Opens a preview on `id`, replacing any preview already open.
    pub fn open_session(&mut self, id: GroupId) -> Result<&PreviewEditSession> {
        let session = PreviewEditSession::open(self.group(id)?);
        if self.session.take().is_some() {
            self.changed(StateEvent::SessionClosed);
        }
        self.session = Some(session);
        self.changed(StateEvent::SessionOpened(id));
        self.active_session()
    }

    /// Applies `edit` to the open preview and publishes the result.
    pub fn edit_session<R>(&mut self, edit: impl FnOnce(&mut PreviewEditSession) -> R) -> Result<R> {
        let result = edit(self.active_session_mut()?);
        self.publish();
        Ok(result)
    }

    /// Like `edit_session`, but only when the preview is editing `id`.
    pub fn edit_session_on<R>(
        &mut self,
        id: GroupId,
        edit: impl FnOnce(&mut PreviewEditSession) -> R,
    ) -> Option<R> {
        let session = self.session.as_mut().filter(|s| s.group_id() == id)?;
        let result = edit(session);
        self.publish();
        Some(result)
    }

    /// Drops the open preview without saving. The store is untouched.
    pub fn close_session(&mut self) -> Option<PreviewEditSession> {
        let closed = self.session.take();
        if closed.is_some() {
            self.changed(StateEvent::SessionClosed);
        }
        closed
    }

    /// Closes the preview if it is editing `id`.
    pub fn close_session_on(&mut self, id: GroupId) {
        if self.session.as_ref().is_some_and(|s| s.group_id() == id) {
            self.close_session();
        }
    }

    // ============================================================================
    // Analysis session id
    // ============================================================================

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn set_session_id(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
    }

    // ============================================================================
    // Notifications
    // ============================================================================

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(StateEvent::Notice {
            level,
            message: message.into(),
        });
    }

    /// Publishes the snapshot, then announces the change.
    fn changed(&self, event: StateEvent) {
        self.publish();
        self.emit(event);
    }

    fn publish(&self) {
        self.snapshot.send_replace(StateSnapshot {
            groups: self.store.list().to_vec(),
            preview: self.session.clone(),
        });
    }

    fn emit(&self, event: StateEvent) {
        // No subscriber is not an error.
        let _ = self.events.send(event);
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}
