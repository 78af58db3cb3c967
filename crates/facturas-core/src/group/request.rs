//! Encoding of a group save (`PUT /api/groups/{id}`).
//!
//! A save carries the full final PDF order plus the group name. When every
//! PDF is already stored the body is plain JSON. As soon as one PDF is
//! pending, the body becomes multipart: one file part per pending PDF and an
//! ordering manifest covering every PDF, old and new.

use super::model::{LocalFile, PdfId, PdfOrigin, PdfRecord};
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Multipart field holding the JSON ordering manifest.
pub const MANIFEST_FIELD: &str = "pdfs_order";
/// Multipart field holding the group name.
pub const BASE_NAME_FIELD: &str = "baseName";

/// Multipart field name for the `index`-th pending file.
pub fn file_field(index: usize) -> String {
    format!("pdf_{}", index)
}

/// One line of the ordering manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestEntry {
    pub id: Option<PdfId>,
    pub name: String,
    #[serde(rename = "isNew")]
    pub is_new: bool,
}

/// A stored PDF as echoed back in a JSON save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPdfEntry {
    pub id: PdfId,
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// JSON body of a save without uploads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonUpdate {
    pub pdfs: Vec<StoredPdfEntry>,
    #[serde(rename = "baseName")]
    pub base_name: String,
}

/// A pending file bound to its multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file: LocalFile,
}

/// Multipart body of a save that uploads new files.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartUpdate {
    pub files: Vec<FilePart>,
    pub manifest: Vec<ManifestEntry>,
    pub base_name: String,
}

impl MultipartUpdate {
    pub fn manifest_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.manifest)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistRequest {
    Json(JsonUpdate),
    Multipart(MultipartUpdate),
}

impl PersistRequest {
    /// Chooses the transfer encoding for saving `pdfs` under `base_name`.
    pub fn build(base_name: &str, pdfs: &[PdfRecord]) -> Self {
        let has_pending = pdfs.iter().any(PdfRecord::is_new);
        if !has_pending {
            let pdfs = pdfs
                .iter()
                .filter_map(|pdf| match pdf.origin() {
                    PdfOrigin::Stored { id, metadata } => Some(StoredPdfEntry {
                        id: *id,
                        name: pdf.name().to_string(),
                        metadata: metadata.clone(),
                    }),
                    PdfOrigin::Pending { .. } => None,
                })
                .collect();
            return Self::Json(JsonUpdate {
                pdfs,
                base_name: base_name.to_string(),
            });
        }

        let files = pdfs
            .iter()
            .filter_map(PdfRecord::file)
            .enumerate()
            .map(|(index, file)| FilePart {
                field: file_field(index),
                file: file.clone(),
            })
            .collect();
        let manifest = pdfs
            .iter()
            .map(|pdf| ManifestEntry {
                id: pdf.id(),
                name: pdf.name().to_string(),
                is_new: pdf.is_new(),
            })
            .collect();

        Self::Multipart(MultipartUpdate {
            files,
            manifest,
            base_name: base_name.to_string(),
        })
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    pub fn base_name(&self) -> &str {
        match self {
            Self::Json(update) => &update.base_name,
            Self::Multipart(update) => &update.base_name,
        }
    }

    /// Number of PDFs the saved group will contain.
    pub fn pdf_count(&self) -> usize {
        match self {
            Self::Json(update) => update.pdfs.len(),
            Self::Multipart(update) => update.manifest.len(),
        }
    }
}
