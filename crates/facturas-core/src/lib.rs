//! Core domain of the Facturas client.
//!
//! Holds the group/PDF model, the in-memory `GroupStore`, the preview
//! working copy, the save encoding and the transport traits. Nothing in this
//! crate performs I/O.

pub mod api;
pub mod config;
pub mod error;
pub mod group;
pub mod preview;

// Re-export common types
pub use api::{DownloadedFile, GroupApi, LivenessProbe};
pub use config::{ActivationConfig, ClientConfig};
pub use error::{FacturasError, Result};
pub use group::{GroupId, GroupRecord, GroupStore, LocalFile, PdfId, PdfRecord, Provenance, SessionId};
pub use preview::{AddFilesOutcome, PreviewEditSession};
