//! Error types for the Facturas client.

use crate::group::GroupId;
use thiserror::Error;

/// A shared error type for every Facturas crate.
///
/// Variants map onto the three failure families the client distinguishes:
/// input rejected before any request (`Validation`), remote failures
/// (`Network`, `Api`, `Decode`), and multi-step operations that stopped
/// half-way (`MoveIncomplete`, `SplitAborted`, `SplitTorn`).
#[derive(Error, Debug, Clone)]
pub enum FacturasError {
    /// Input rejected locally; no request was sent and no state changed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered with success but the body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Entity not found in the local group store.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The operation does not apply to the current editing state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// The source group was saved without the PDF but the destination save failed.
    #[error(
        "PDF '{pdf_name}' was removed from its group but could not be added to group {target}: {cause}"
    )]
    MoveIncomplete {
        pdf_name: String,
        target: GroupId,
        cause: Box<FacturasError>,
    },

    /// The split stopped before the original group was touched.
    #[error("Split aborted: {cause}")]
    SplitAborted {
        /// Remote group created before the failure, left for manual cleanup.
        orphan: Option<GroupId>,
        cause: Box<FacturasError>,
    },

    /// The new group holds the selected PDFs but the original group still lists them too.
    #[error("Split incomplete: group {new_group} was created but the original group could not be saved: {cause}")]
    SplitTorn {
        new_group: GroupId,
        cause: Box<FacturasError>,
    },
}

impl FacturasError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error came from talking to the backend.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api { .. } | Self::Decode(_))
    }

    /// Check if a multi-step operation left local and remote state diverged.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::MoveIncomplete { .. } | Self::SplitTorn { .. })
    }

    /// The message to show the user.
    ///
    /// For API errors this is the server-provided text without the status
    /// prefix; everything else uses the `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FacturasError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FacturasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("JSON - {}", err))
    }
}

impl From<toml::de::Error> for FacturasError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML - {}", err))
    }
}

/// A type alias for `Result<T, FacturasError>`.
pub type Result<T> = std::result::Result<T, FacturasError>;
