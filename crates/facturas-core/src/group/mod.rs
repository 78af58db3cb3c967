//! Group domain module.
//!
//! # Module Structure
//!
//! - `model`: passive entities (`GroupRecord`, `PdfRecord`, ids, `Provenance`)
//! - `store`: the in-memory `GroupStore`
//! - `request`: encoding of a group save (`PersistRequest`)

mod model;
mod request;
mod store;

pub use model::{
    AnalyzeResponse, GroupId, GroupRecord, LocalFile, PdfId, PdfOrigin, PdfRecord, Provenance,
    SessionId,
};
pub(crate) use model::has_extension;
pub use request::{
    BASE_NAME_FIELD, FilePart, JsonUpdate, MANIFEST_FIELD, ManifestEntry, MultipartUpdate,
    PersistRequest, StoredPdfEntry, file_field,
};
pub use store::GroupStore;
