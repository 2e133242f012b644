//! Error types for plotdoc operations

use crate::{CategoryId, DocumentId};
use thiserror::Error;

/// Failure of a single request to an external collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode response: {reason}")]
    Decode { reason: String },
}

impl LookupError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }
}

/// Input rejected before any network call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Unknown category: {category_id}")]
    UnknownCategory { category_id: CategoryId },

    #[error("Update contains no changes")]
    EmptyPatch,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field: field.into(),
        }
    }
}

/// A create, update or delete that did not happen.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("Upload failed: {source}")]
    Create {
        #[source]
        source: LookupError,
    },

    #[error("Update of document {id} failed: {source}")]
    Update {
        id: DocumentId,
        #[source]
        source: LookupError,
    },

    #[error("Delete of document {id} failed: {source}")]
    Delete {
        id: DocumentId,
        #[source]
        source: LookupError,
    },
}

/// Master error type for all plotdoc errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlotdocError {
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),
}

/// Result type alias for plotdoc operations.
pub type PlotdocResult<T> = Result<T, PlotdocError>;

// =============================================================================
// TESTS
// =============================================================================
