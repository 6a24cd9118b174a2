//! Error types produced by the ingest crate.
//!
//! Per-item failures inside a batch do not use these as `Err` — they travel
//! in the batch report so sibling items keep their own outcomes. Only
//! failures of the batch as a whole (transport, unusable collection) are
//! returned as `Err`.

use store::StoreError;
use thiserror::Error;

/// Errors attached to individual items or to a whole ingest batch.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum IngestError {
    /// The entity has no `id` and its `name` cannot produce one.
    #[error("cannot derive identifier: {0}")]
    InvalidIdentity(String),

    /// The identifier collides with an existing document in the same
    /// partition. Create-only semantics: never silently upserted.
    #[error("identifier {id} already exists")]
    DuplicateIdentifier { id: String },

    /// The store rejected the document, e.g. an embedding of the wrong
    /// dimension.
    #[error("document rejected by store: {0}")]
    Validation(String),

    /// Transport failure reaching the store.
    #[error("store unreachable: {0}")]
    Connectivity(String),

    /// The entity could not be serialized into a document.
    #[error("entity could not be serialized: {0}")]
    Serialize(String),

    /// Any other store-side failure, passed through verbatim.
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentifier { id } => IngestError::DuplicateIdentifier { id },
            StoreError::Validation(detail) => IngestError::Validation(detail),
            StoreError::Connectivity(detail) => IngestError::Connectivity(detail),
            other => IngestError::Store(other.to_string()),
        }
    }
}
