//! Workspace umbrella crate for pantry.
//!
//! Pantry provisions a vector-indexed recipe collection on a backing
//! document store, bulk-loads recipes carrying embedding vectors, and serves
//! top-k similarity searches over them. The store itself — persistence,
//! consistency, and ANN index construction — sits behind the
//! [`DocumentStore`] trait; this crate stitches the three operations into a
//! single [`Service`] handle.
//!
//! ```
//! use pantry::{provision, MemoryStore, Recipe, ServiceConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), pantry::ServiceError> {
//! let config = ServiceConfig::new("pantry", "recipes").with_dimensions(8);
//! let service = provision(Arc::new(MemoryStore::new()), &config).await?;
//!
//! let report = service
//!     .ingest(vec![
//!         Recipe::named("Beef Wellington")
//!             .with_embedding(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
//!     ])
//!     .await?;
//! assert!(report.is_complete_success());
//!
//! let hits = service
//!     .search_top(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
//!     .await?;
//! assert_eq!(hits[0].recipe.name, "Beef Wellington");
//! # Ok(())
//! # }
//! ```

mod config;
mod provision;

pub use crate::config::{ConfigError, ConsistencyMode, ServiceConfig, MIN_THROUGHPUT_RUS};
pub use crate::provision::{collection_definition, EMBEDDING_PATH, PARTITION_KEY_PATH};

pub use ingest::{IngestError, IngestOutcome, IngestReport, Recipe};
pub use search::{SearchError, SearchHit, DEFAULT_TOP_K};
pub use store::{
    CollectionDefinition, CollectionHandle, CountPredicate, DistanceFunction, DocumentStore,
    IndexingPolicy, ItemOutcome, MemoryStore, ScoreOrdering, StoreError, Throughput,
    VectorDataType, VectorEmbedding, VectorEmbeddingPolicy, VectorIndexKind, VectorIndexSpec,
};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

/// Errors surfaced by the service's public operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Handle to one provisioned collection.
///
/// Constructed once by [`provision`] and immutable afterwards: it holds the
/// store connection and the collection handle, nothing else. All mutation is
/// delegated to the store, so a `Service` can be shared freely across
/// concurrent callers.
pub struct Service {
    store: Arc<dyn DocumentStore>,
    collection: CollectionHandle,
    default_top_k: usize,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("collection", &self.collection)
            .field("default_top_k", &self.default_top_k)
            .finish_non_exhaustive()
    }
}

/// Ensure the configured collection exists and return a service bound to it.
///
/// Idempotent: re-provisioning with the same configuration yields a handle
/// to the same single collection. A collection that already exists with an
/// incompatible vector or indexing configuration fails with
/// [`StoreError::ConfigurationConflict`] — index definitions are never
/// altered in place.
pub async fn provision(
    store: Arc<dyn DocumentStore>,
    config: &ServiceConfig,
) -> Result<Service, ServiceError> {
    config.validate()?;

    let definition = provision::collection_definition(config);
    let collection = store
        .create_collection_if_not_exists(&config.database, &definition, provision::throughput(config))
        .await?;

    info!(
        database = %config.database,
        collection = %collection.name(),
        dimensions = config.embedding_dimensions,
        "collection_provisioned"
    );
    Ok(Service {
        store,
        collection,
        default_top_k: config.default_top_k,
    })
}

impl Service {
    /// Number of documents, split by embedding presence.
    pub async fn count(&self, has_embedding: bool) -> Result<u64, ServiceError> {
        let count = self
            .store
            .count_matching(&self.collection, CountPredicate::HasEmbedding(has_embedding))
            .await?;
        Ok(count)
    }

    /// Total number of documents in the collection.
    pub async fn total(&self) -> Result<u64, ServiceError> {
        let count = self
            .store
            .count_matching(&self.collection, CountPredicate::All)
            .await?;
        Ok(count)
    }

    /// Bulk-load recipes as create-only writes.
    ///
    /// The report carries one outcome per recipe in submission order;
    /// partial failure does not abort the batch and is never swallowed.
    pub async fn ingest(&self, recipes: Vec<Recipe>) -> Result<IngestReport, ServiceError> {
        let report = ingest::ingest_batch(self.store.as_ref(), &self.collection, recipes).await?;
        Ok(report)
    }

    /// Top-`k` most similar recipes, best first, each annotated with its
    /// similarity score. Returns `min(k, eligible)` hits.
    pub async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, ServiceError> {
        let hits = search::search(self.store.as_ref(), &self.collection, vector, k).await?;
        Ok(hits)
    }

    /// [`Service::search`] with the configured default result count.
    pub async fn search_top(&self, vector: &[f32]) -> Result<Vec<SearchHit>, ServiceError> {
        self.search(vector, self.default_top_k).await
    }

    pub fn collection(&self) -> &CollectionHandle {
        &self.collection
    }
}
