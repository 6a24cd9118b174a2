//! # Pantry Store
//!
//! The seam between pantry and its backing document store. Provisioning,
//! bulk ingestion, and similarity search all talk to a store through the
//! [`DocumentStore`] trait; the store owns persistence, consistency, and the
//! approximate-nearest-neighbor structures this crate only configures.
//!
//! ## Core pieces
//!
//! - [`CollectionDefinition`] and friends: the partitioning, scalar-indexing,
//!   and vector-indexing policy a collection is created with.
//! - [`DocumentStore`]: async, object-safe trait with the four operations the
//!   rest of the workspace needs — idempotent collection creation, batched
//!   create-only writes with per-item outcomes, vector-distance queries, and
//!   predicate counts.
//! - [`MemoryStore`]: in-process reference implementation used by tests and
//!   embedded callers. It honors the same contracts a networked store would:
//!   create-only conflicts, embedding validation, string-encoded scores on
//!   the wire, and insertion-order result ties.
//!
//! Every trait method is one network round-trip on a real backend and is the
//! only suspension point of the public operation built on it. Handles are
//! immutable after creation and safe to share across concurrent callers.

mod collection;
pub mod memory;

pub use collection::{
    CollectionDefinition, CollectionHandle, DistanceFunction, IndexingPolicy, ScoreOrdering,
    Throughput, VectorDataType, VectorEmbedding, VectorEmbeddingPolicy, VectorIndexKind,
    VectorIndexSpec,
};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a document store.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum StoreError {
    /// A collection already exists with a vector/indexing configuration that
    /// cannot serve the requested definition. Fatal: index specs cannot be
    /// altered on a live collection.
    #[error("collection {collection} exists with incompatible configuration: {detail}")]
    ConfigurationConflict { collection: String, detail: String },

    /// Transport failure reaching the store. The operation may be retried by
    /// the caller as a whole; this crate never retries internally.
    #[error("store unreachable: {0}")]
    Connectivity(String),

    /// A document key collided with an existing document in the same
    /// partition. Create-only writes report this per item.
    #[error("document id {id} already exists in its partition")]
    DuplicateIdentifier { id: String },

    /// The document violates the collection's schema constraints, e.g. an
    /// embedding of the wrong dimension or element type.
    #[error("document rejected: {0}")]
    Validation(String),

    /// The query could not be executed.
    #[error("query failed: {0}")]
    QueryExecution(String),

    /// The handle names a collection the store does not know.
    #[error("unknown collection: {collection}")]
    UnknownCollection { collection: String },
}

/// One create-only write in a bulk batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation {
    /// Full document body. Its partition-key field must agree with
    /// `partition_key`.
    pub document: Value,
    pub partition_key: String,
}

impl CreateOperation {
    pub fn new(document: Value, partition_key: impl Into<String>) -> Self {
        Self {
            document,
            partition_key: partition_key.into(),
        }
    }
}

/// Result of one item in a bulk batch, in submission order.
///
/// A failed item never aborts its siblings; callers receive the full
/// outcome sequence and decide what to do with partial failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Created { id: String },
    Failed { id: String, error: StoreError },
}

impl ItemOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ItemOutcome::Created { .. })
    }

    pub fn id(&self) -> &str {
        match self {
            ItemOutcome::Created { id } | ItemOutcome::Failed { id, .. } => id,
        }
    }
}

/// A vector-distance query evaluated server-side by the store.
///
/// The store computes the distance between each eligible document's vector at
/// `embedding_path` and `vector`, using the distance function the collection
/// was indexed with, and emits it under `score_alias` alongside the projected
/// fields. Scores travel the wire as string-encoded floats.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub embedding_path: String,
    pub vector: Vec<f32>,
    /// Top-level fields to project into each row; empty projects the whole
    /// document.
    pub projection: Vec<String>,
    pub score_alias: String,
}

impl VectorQuery {
    pub fn new(embedding_path: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            embedding_path: embedding_path.into(),
            vector,
            projection: Vec::new(),
            score_alias: "score".into(),
        }
    }

    pub fn with_projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_score_alias(mut self, alias: impl Into<String>) -> Self {
        self.score_alias = alias.into();
        self
    }
}

/// Predicate for [`DocumentStore::count_matching`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountPredicate {
    /// Every document in the collection.
    All,
    /// Documents whose embedding field is present (`true`) or absent
    /// (`false`).
    HasEmbedding(bool),
}

/// A backing document store.
///
/// Implementations must be safe for concurrent use; the handle returned by
/// provisioning is shared across every subsequent call. Each method presents
/// a single blocking call to the caller: it suspends on the store round-trip
/// and resolves only when the whole operation has completed or failed. No
/// method retries, and none spawns work that outlives its invocation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ensure a collection exists with the given definition and capacity.
    ///
    /// Idempotent: an existing collection with a compatible definition is
    /// returned as-is, never recreated or altered. An existing collection
    /// with an incompatible vector/indexing configuration fails with
    /// [`StoreError::ConfigurationConflict`].
    async fn create_collection_if_not_exists(
        &self,
        database: &str,
        definition: &CollectionDefinition,
        throughput: Throughput,
    ) -> Result<CollectionHandle, StoreError>;

    /// Submit a batch of create-only writes and wait for all of them.
    ///
    /// The store dispatches items concurrently at its discretion; no ordering
    /// is guaranteed between sibling completions, but the returned outcomes
    /// are in submission order. Per-item failures (duplicate key, validation)
    /// appear in the outcomes; only whole-batch failures (transport) surface
    /// as `Err`.
    async fn execute_bulk_create(
        &self,
        collection: &CollectionHandle,
        operations: Vec<CreateOperation>,
    ) -> Result<Vec<ItemOutcome>, StoreError>;

    /// Run a vector-distance query and collect every result row.
    ///
    /// Rows carry the projected fields plus the score alias; the score value
    /// is string-encoded. Row order is the store's native result order and is
    /// meaningful: ranking uses it to break ties reproducibly.
    async fn vector_query(
        &self,
        collection: &CollectionHandle,
        query: &VectorQuery,
    ) -> Result<Vec<Value>, StoreError>;

    /// Count documents matching a predicate.
    async fn count_matching(
        &self,
        collection: &CollectionHandle,
        predicate: CountPredicate,
    ) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_query_builder_defaults_to_score_alias() {
        let query = VectorQuery::new("/embedding", vec![1.0, 0.0]);
        assert_eq!(query.score_alias, "score");
        assert!(query.projection.is_empty());

        let query = query
            .with_projection(["name", "description"])
            .with_score_alias("similarity");
        assert_eq!(query.projection, vec!["name", "description"]);
        assert_eq!(query.score_alias, "similarity");
    }

    #[test]
    fn item_outcome_reports_identity() {
        let created = ItemOutcome::Created { id: "a".into() };
        let failed = ItemOutcome::Failed {
            id: "b".into(),
            error: StoreError::DuplicateIdentifier { id: "b".into() },
        };
        assert!(created.is_created());
        assert!(!failed.is_created());
        assert_eq!(created.id(), "a");
        assert_eq!(failed.id(), "b");
    }
}
