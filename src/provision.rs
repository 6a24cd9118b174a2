//! Collection provisioning policy.
//!
//! Translates a [`ServiceConfig`] into the collection definition the store
//! is asked to create: per-document partitioning on `/id`, scalar indexes on
//! the two filterable text fields only, and a disk-resident ANN index over
//! the embedding path.

use store::{
    CollectionDefinition, IndexingPolicy, Throughput, VectorEmbedding, VectorEmbeddingPolicy,
    VectorIndexKind, VectorIndexSpec,
};

use crate::ServiceConfig;

/// Document path carrying the partition key. Identical to the document key,
/// so partitioning is per-document.
pub const PARTITION_KEY_PATH: &str = "/id";

/// Document path carrying the semantic vector.
pub const EMBEDDING_PATH: &str = "/embedding";

/// Build the definition a collection must be created with.
pub fn collection_definition(config: &ServiceConfig) -> CollectionDefinition {
    CollectionDefinition {
        name: config.collection.clone(),
        partition_key_path: PARTITION_KEY_PATH.into(),
        vector_embedding_policy: VectorEmbeddingPolicy::single(VectorEmbedding::float32(
            EMBEDDING_PATH,
            config.embedding_dimensions,
            config.distance_function,
        )),
        indexing_policy: IndexingPolicy {
            // Everything is excluded by default; only the fields callers
            // filter on are worth scalar indexes.
            included_paths: vec!["/name/?".into(), "/description/?".into()],
            excluded_paths: vec!["/*".into()],
            vector_indexes: vec![VectorIndexSpec {
                path: EMBEDDING_PATH.into(),
                kind: VectorIndexKind::DiskAnn,
            }],
        },
    }
}

/// Capacity requested at creation time.
pub fn throughput(config: &ServiceConfig) -> Throughput {
    Throughput::manual(config.throughput_rus)
}
