//! Collection definition model: partitioning, scalar indexing, and the
//! vector-embedding policy a collection is created with.
//!
//! The definition is pure configuration. It is handed to a
//! [`DocumentStore`](crate::DocumentStore) at provisioning time and echoed
//! back inside the [`CollectionHandle`]; backing stores build their index
//! structures from it, this crate never does.

use serde::{Deserialize, Serialize};

/// Element type of a vector-embedding field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorDataType {
    #[default]
    Float32,
}

/// Distance function evaluated by the backing store's vector operator.
///
/// The function chosen at index time is the one the store evaluates at query
/// time; callers never recompute distances client-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFunction {
    /// Cosine similarity in [-1, 1]; higher means more similar.
    #[default]
    Cosine,
    /// Inner product; higher means more similar.
    DotProduct,
    /// Euclidean distance; lower means more similar.
    Euclidean,
}

impl DistanceFunction {
    /// Direction in which scores produced by this function improve.
    ///
    /// Ranking consumes this instead of assuming a direction, so switching a
    /// collection from a similarity to a distance metric flips the sort
    /// without touching the ranking code.
    pub fn score_ordering(self) -> ScoreOrdering {
        match self {
            DistanceFunction::Cosine | DistanceFunction::DotProduct => {
                ScoreOrdering::HigherIsBetter
            }
            DistanceFunction::Euclidean => ScoreOrdering::LowerIsBetter,
        }
    }
}

/// Whether a larger or a smaller score means a closer match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrdering {
    HigherIsBetter,
    LowerIsBetter,
}

/// Declares one vector-embedding field on a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEmbedding {
    /// Document path carrying the vector, e.g. `/embedding`.
    pub path: String,
    pub data_type: VectorDataType,
    /// Exact length every stored vector must have.
    pub dimensions: usize,
    pub distance_function: DistanceFunction,
}

impl VectorEmbedding {
    /// Float32 embedding declaration for `path`.
    pub fn float32(
        path: impl Into<String>,
        dimensions: usize,
        distance_function: DistanceFunction,
    ) -> Self {
        Self {
            path: path.into(),
            data_type: VectorDataType::Float32,
            dimensions,
            distance_function,
        }
    }

    /// Top-level document field named by `path`.
    pub fn field(&self) -> &str {
        field_of_path(&self.path)
    }
}

/// The set of vector-embedding fields declared on a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorEmbeddingPolicy {
    pub embeddings: Vec<VectorEmbedding>,
}

impl VectorEmbeddingPolicy {
    pub fn single(embedding: VectorEmbedding) -> Self {
        Self {
            embeddings: vec![embedding],
        }
    }

    /// Embedding declared for `path`, if any.
    pub fn for_path(&self, path: &str) -> Option<&VectorEmbedding> {
        self.embeddings.iter().find(|e| e.path == path)
    }
}

/// Approximate-nearest-neighbor index structure requested for a vector path.
///
/// These are requests to the backing store; the structures themselves live
/// there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorIndexKind {
    /// Exact scan, no approximation. Small collections only.
    Flat,
    /// Quantized in-memory structure.
    QuantizedFlat,
    /// Disk-resident ANN graph suited for large vector volumes.
    #[default]
    DiskAnn,
}

/// Binds a vector index structure to an embedding path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndexSpec {
    pub path: String,
    pub kind: VectorIndexKind,
}

/// Field-level indexing rules plus vector index bindings.
///
/// Paths use the store's convention: `/*` for everything, `/name/?` for the
/// scalar value at `/name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingPolicy {
    pub included_paths: Vec<String>,
    pub excluded_paths: Vec<String>,
    pub vector_indexes: Vec<VectorIndexSpec>,
}

/// Provisioned capacity for a collection. Always explicit, never autoscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Throughput {
    /// Fixed request units per second.
    Manual(u32),
}

impl Throughput {
    pub fn manual(request_units: u32) -> Self {
        Throughput::Manual(request_units)
    }

    pub fn request_units(self) -> u32 {
        match self {
            Throughput::Manual(rus) => rus,
        }
    }
}

/// Everything a collection is created with, minus capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDefinition {
    pub name: String,
    /// Path of the partition key, e.g. `/id`.
    pub partition_key_path: String,
    pub vector_embedding_policy: VectorEmbeddingPolicy,
    pub indexing_policy: IndexingPolicy,
}

impl CollectionDefinition {
    /// The first declared embedding. Collections provisioned by this system
    /// declare exactly one.
    pub fn embedding(&self) -> Option<&VectorEmbedding> {
        self.vector_embedding_policy.embeddings.first()
    }

    /// Top-level document field holding the partition key.
    pub fn partition_key_field(&self) -> &str {
        field_of_path(&self.partition_key_path)
    }

    /// Checks whether an existing collection can serve this definition.
    ///
    /// Returns a description of the first mismatch, or `None` when
    /// compatible. Vector and indexing specs cannot be changed on a live
    /// collection, so any difference there is a conflict; capacity is not
    /// compared because it is mutable after creation.
    pub fn incompatibility_with(&self, existing: &CollectionDefinition) -> Option<String> {
        if self.partition_key_path != existing.partition_key_path {
            return Some(format!(
                "partition key path {} differs from existing {}",
                self.partition_key_path, existing.partition_key_path
            ));
        }
        if self.vector_embedding_policy != existing.vector_embedding_policy {
            return Some("vector embedding policy differs from existing collection".into());
        }
        if self.indexing_policy != existing.indexing_policy {
            return Some("indexing policy differs from existing collection".into());
        }
        None
    }
}

/// Handle to a provisioned collection.
///
/// Created once by
/// [`DocumentStore::create_collection_if_not_exists`](crate::DocumentStore::create_collection_if_not_exists)
/// and shared read-only across ingest and search calls; it carries the live
/// definition so query builders can read the embedding policy without another
/// round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionHandle {
    database: String,
    definition: CollectionDefinition,
}

impl CollectionHandle {
    pub fn new(database: impl Into<String>, definition: CollectionDefinition) -> Self {
        Self {
            database: database.into(),
            definition,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &CollectionDefinition {
        &self.definition
    }
}

/// `/embedding` -> `embedding`; nested paths keep their first segment.
pub(crate) fn field_of_path(path: &str) -> &str {
    path.trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> CollectionDefinition {
        CollectionDefinition {
            name: "recipes".into(),
            partition_key_path: "/id".into(),
            vector_embedding_policy: VectorEmbeddingPolicy::single(VectorEmbedding::float32(
                "/embedding",
                8,
                DistanceFunction::Cosine,
            )),
            indexing_policy: IndexingPolicy {
                included_paths: vec!["/name/?".into(), "/description/?".into()],
                excluded_paths: vec!["/*".into()],
                vector_indexes: vec![VectorIndexSpec {
                    path: "/embedding".into(),
                    kind: VectorIndexKind::DiskAnn,
                }],
            },
        }
    }

    #[test]
    fn identical_definitions_are_compatible() {
        let a = definition();
        let b = definition();
        assert!(a.incompatibility_with(&b).is_none());
    }

    #[test]
    fn changed_dimensions_conflict() {
        let a = definition();
        let mut b = definition();
        b.vector_embedding_policy.embeddings[0].dimensions = 16;
        let detail = a.incompatibility_with(&b).expect("should conflict");
        assert!(detail.contains("vector embedding policy"));
    }

    #[test]
    fn changed_partition_key_conflicts() {
        let a = definition();
        let mut b = definition();
        b.partition_key_path = "/name".into();
        let detail = a.incompatibility_with(&b).expect("should conflict");
        assert!(detail.contains("partition key"));
    }

    #[test]
    fn changed_vector_index_kind_conflicts() {
        let a = definition();
        let mut b = definition();
        b.indexing_policy.vector_indexes[0].kind = VectorIndexKind::Flat;
        let detail = a.incompatibility_with(&b).expect("should conflict");
        assert!(detail.contains("indexing policy"));
    }

    #[test]
    fn cosine_ranks_descending_and_euclidean_ascending() {
        assert_eq!(
            DistanceFunction::Cosine.score_ordering(),
            ScoreOrdering::HigherIsBetter
        );
        assert_eq!(
            DistanceFunction::Euclidean.score_ordering(),
            ScoreOrdering::LowerIsBetter
        );
    }

    #[test]
    fn path_fields_are_extracted() {
        assert_eq!(field_of_path("/embedding"), "embedding");
        assert_eq!(field_of_path("/name/?"), "name");
        let def = definition();
        assert_eq!(def.partition_key_field(), "id");
        assert_eq!(def.embedding().expect("embedding declared").field(), "embedding");
    }
}
