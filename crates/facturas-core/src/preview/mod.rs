//! Preview editing: a detached, single-group working copy.
//!
//! Opening a preview snapshots a group's PDF list. Every edit here is local
//! and synchronous; the `GroupStore` entry stays untouched until a save
//! succeeds and the authoritative record comes back from the backend.

use crate::error::{FacturasError, Result};
use crate::group::{GroupId, GroupRecord, LocalFile, PdfRecord, has_extension};

/// Result of `PreviewEditSession::add_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFilesOutcome {
    /// Number of files appended to the working list.
    pub accepted: usize,
    /// Names of the files skipped because they are not PDFs.
    pub rejected: Vec<String>,
}

/// Working copy of one group opened for editing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEditSession {
    group_id: GroupId,
    base_name: String,
    staged_name: Option<String>,
    pdfs: Vec<PdfRecord>,
}

impl PreviewEditSession {
    /// Snapshots `group` into an independent working list.
    pub fn open(group: &GroupRecord) -> Self {
        Self {
            group_id: group.id,
            base_name: group.base_name.clone(),
            staged_name: None,
            pdfs: group.pdfs.clone(),
        }
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Name of the group as last confirmed by the backend.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Name that the next save will send: the staged rename, if any.
    pub fn pending_name(&self) -> &str {
        self.staged_name.as_deref().unwrap_or(&self.base_name)
    }

    pub fn is_renamed(&self) -> bool {
        self.staged_name.is_some()
    }

    pub fn pdfs(&self) -> &[PdfRecord] {
        &self.pdfs
    }

    pub fn get(&self, index: usize) -> Option<&PdfRecord> {
        self.pdfs.get(index)
    }

    pub fn len(&self) -> usize {
        self.pdfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdfs.is_empty()
    }

    /// Moves the PDF at `from` so that it ends up at `to`.
    ///
    /// Returns `false` and leaves the list unchanged when the indices are
    /// equal or either is out of bounds.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.pdfs.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let pdf = self.pdfs.remove(from);
        self.pdfs.insert(to, pdf);
        true
    }

    /// Drops the PDF at `index` from the working list.
    pub fn remove_at(&mut self, index: usize) -> Option<PdfRecord> {
        if index >= self.pdfs.len() {
            return None;
        }
        Some(self.pdfs.remove(index))
    }

    /// Puts `pdf` back at `index`, clamped to the end of the list.
    pub fn insert_at(&mut self, index: usize, pdf: PdfRecord) {
        let index = index.min(self.pdfs.len());
        self.pdfs.insert(index, pdf);
    }

    /// Replaces the whole working list.
    pub fn set_pdfs(&mut self, pdfs: Vec<PdfRecord>) {
        self.pdfs = pdfs;
    }

    /// Appends every `.pdf` file (case-insensitive) as a pending PDF.
    ///
    /// Other files are reported back in `rejected`, not treated as errors.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = LocalFile>) -> AddFilesOutcome {
        let mut outcome = AddFilesOutcome::default();
        for file in files {
            if has_extension(&file.name, "pdf") {
                self.pdfs.push(PdfRecord::pending(file));
                outcome.accepted += 1;
            } else {
                outcome.rejected.push(file.name);
            }
        }
        outcome
    }

    /// Stages a new group name for the next save.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(FacturasError::validation("Group name cannot be empty"));
        }
        if trimmed == self.base_name {
            self.staged_name = None;
        } else {
            self.staged_name = Some(trimmed.to_string());
        }
        Ok(())
    }

    /// Adopts the id and name of a freshly saved record.
    ///
    /// The working list is left alone: during a move or split the first of
    /// two saves does not describe the final list.
    pub fn refresh_identity(&mut self, record: &GroupRecord) {
        self.group_id = record.id;
        self.base_name = record.base_name.clone();
        if self.staged_name.as_deref() == Some(record.base_name.as_str()) {
            self.staged_name = None;
        }
    }
}
