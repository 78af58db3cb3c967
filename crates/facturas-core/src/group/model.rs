//! Group and PDF domain model.
//!
//! These are passive entities. A `PdfRecord` is either *stored* (the backend
//! holds its bytes and assigned it an id) or *pending* (a local file that has
//! not been uploaded yet). The two shapes are separate enum variants so a
//! stored record can never lack an id and a pending one can never lack bytes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Server-assigned group identifier, stable for the group's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned PDF identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PdfId(pub i64);

impl fmt::Display for PdfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque analysis session token returned by `POST /api/analyze`.
///
/// Threaded into later analyze calls so repeated uploads merge into one
/// grouping run, and required by the download-all endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a group came out of the analysis run or was created by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Auto,
    Manual,
}

/// Raw bytes of a file picked by the user, cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Case-insensitive extension check (`ext` without the dot).
    pub fn has_extension(&self, ext: &str) -> bool {
        has_extension(&self.name, ext)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Bytes are elided so logs and test failures stay readable.
impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

pub(crate) fn has_extension(name: &str, ext: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(&format!(".{}", ext.to_lowercase()))
}

/// Where the bytes behind a `PdfRecord` live.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfOrigin {
    /// Uploaded; the backend owns the bytes.
    Stored {
        id: PdfId,
        /// Any extra fields the backend attached, echoed back on save.
        metadata: Map<String, Value>,
    },
    /// Not uploaded yet. `temp_key` only gives list identity to views.
    Pending { temp_key: Uuid, file: LocalFile },
}

/// A single PDF inside a group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "StoredPdfWire")]
pub struct PdfRecord {
    name: String,
    origin: PdfOrigin,
}

#[derive(Deserialize)]
struct StoredPdfWire {
    id: PdfId,
    name: String,
    #[serde(flatten)]
    metadata: Map<String, Value>,
}

impl From<StoredPdfWire> for PdfRecord {
    fn from(wire: StoredPdfWire) -> Self {
        Self {
            name: wire.name,
            origin: PdfOrigin::Stored {
                id: wire.id,
                metadata: wire.metadata,
            },
        }
    }
}

impl PdfRecord {
    /// A PDF already persisted by the backend.
    pub fn stored(id: PdfId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: PdfOrigin::Stored {
                id,
                metadata: Map::new(),
            },
        }
    }

    /// A local file waiting to be uploaded on the next save.
    pub fn pending(file: LocalFile) -> Self {
        Self {
            name: file.name.clone(),
            origin: PdfOrigin::Pending {
                temp_key: Uuid::new_v4(),
                file,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &PdfOrigin {
        &self.origin
    }

    /// Server id, `None` while the file is pending upload.
    pub fn id(&self) -> Option<PdfId> {
        match &self.origin {
            PdfOrigin::Stored { id, .. } => Some(*id),
            PdfOrigin::Pending { .. } => None,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self.origin, PdfOrigin::Pending { .. })
    }

    /// Local bytes, present only while pending.
    pub fn file(&self) -> Option<&LocalFile> {
        match &self.origin {
            PdfOrigin::Pending { file, .. } => Some(file),
            PdfOrigin::Stored { .. } => None,
        }
    }

    /// Stable key for list rendering: the server id, or the temporary key.
    pub fn list_key(&self) -> String {
        match &self.origin {
            PdfOrigin::Stored { id, .. } => format!("pdf-{}", id),
            PdfOrigin::Pending { temp_key, .. } => format!("new-{}", temp_key),
        }
    }
}

/// A named, ordered collection of PDFs merged into one output document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    #[serde(rename = "baseName")]
    pub base_name: String,
    /// Order is the output document order.
    #[serde(default)]
    pub pdfs: Vec<PdfRecord>,
    #[serde(default)]
    pub created_by: Provenance,
}

impl GroupRecord {
    pub fn new(id: GroupId, base_name: impl Into<String>, created_by: Provenance) -> Self {
        Self {
            id,
            base_name: base_name.into(),
            pdfs: Vec::new(),
            created_by,
        }
    }

    pub fn with_pdfs(mut self, pdfs: Vec<PdfRecord>) -> Self {
        self.pdfs = pdfs;
        self
    }

    pub fn is_manual(&self) -> bool {
        self.created_by == Provenance::Manual
    }

    /// Filename used when the merged group is downloaded.
    pub fn download_file_name(&self) -> String {
        format!("{}.pdf", self.base_name)
    }
}

/// Body of a successful `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    pub session_id: SessionId,
}
