//! Application layer for the Facturas client.
//!
//! Coordinates the core model with the backend: saving working lists,
//! multi-step move and split flows, group-table use cases and the backend
//! wake-up monitor. `FacturasApp` ties them together around one
//! `ApplicationState`.

pub mod activation;
pub mod app;
pub mod move_pdf;
pub mod split;
pub mod state;
pub mod sync;
pub mod usecase;

#[cfg(test)]
mod test_support;

pub use activation::{ActivationState, BackendActivationMonitor};
pub use app::FacturasApp;
pub use move_pdf::MoveOrchestrator;
pub use split::{SplitOrchestrator, SplitOutcome};
pub use state::{ApplicationState, NoticeLevel, StateEvent, StateSnapshot};
pub use sync::GroupSyncClient;
pub use usecase::{AnalyzeOutcome, DeleteAllOutcome, GroupUseCase};
