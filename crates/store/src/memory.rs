//! In-process document store.
//!
//! `MemoryStore` is the reference [`DocumentStore`]: tests and embedded
//! callers run against it, and it models the contracts a networked backend
//! provides — create-only conflicts, embedding validation at write time,
//! server-side distance computation with string-encoded scores, and result
//! rows in a stable native order (here: insertion order).
//!
//! Similarity is a straight scan. That is deliberate: ANN structures belong
//! to real backends; this store only has to be correct.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    CollectionDefinition, CollectionHandle, CountPredicate, CreateOperation, DistanceFunction,
    DocumentStore, ItemOutcome, StoreError, Throughput, VectorQuery,
};

/// In-memory [`DocumentStore`] holding collections behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, StoredCollection>>,
}

struct StoredCollection {
    definition: CollectionDefinition,
    /// Documents in insertion order; query results preserve this order.
    documents: Vec<StoredDocument>,
}

struct StoredDocument {
    partition_key: String,
    id: String,
    body: Value,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(database: &str, collection: &str) -> String {
        format!("{database}/{collection}")
    }

    fn lock_poisoned() -> StoreError {
        StoreError::Connectivity("store lock poisoned".into())
    }
}

impl StoredCollection {
    /// Validates and applies one create-only write. Sibling items are not
    /// affected by a failure here; the caller records the outcome and moves
    /// on.
    fn apply_create(&mut self, op: CreateOperation) -> ItemOutcome {
        let pk_field = self.definition.partition_key_field().to_string();
        let id = match op.document.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return ItemOutcome::Failed {
                    id: op.partition_key.clone(),
                    error: StoreError::Validation(
                        "document is missing a non-empty id".into(),
                    ),
                }
            }
        };

        let pk_value = op.document.get(&pk_field).and_then(Value::as_str);
        if pk_value != Some(op.partition_key.as_str()) {
            return ItemOutcome::Failed {
                id,
                error: StoreError::Validation(format!(
                    "partition key {} does not match document field /{pk_field}",
                    op.partition_key
                )),
            };
        }

        if let Err(error) = self.validate_embedding(&op.document) {
            return ItemOutcome::Failed { id, error };
        }

        let exists = self
            .documents
            .iter()
            .any(|doc| doc.partition_key == op.partition_key && doc.id == id);
        if exists {
            return ItemOutcome::Failed {
                id: id.clone(),
                error: StoreError::DuplicateIdentifier { id },
            };
        }

        self.documents.push(StoredDocument {
            partition_key: op.partition_key,
            id: id.clone(),
            body: op.document,
        });
        ItemOutcome::Created { id }
    }

    /// Embedding fields are optional, but a present one must match the
    /// collection's declared dimension and element type.
    fn validate_embedding(&self, document: &Value) -> Result<(), StoreError> {
        for embedding in &self.definition.vector_embedding_policy.embeddings {
            let Some(value) = document.get(embedding.field()) else {
                continue;
            };
            let Some(elements) = value.as_array() else {
                return Err(StoreError::Validation(format!(
                    "field {} is not a vector",
                    embedding.path
                )));
            };
            if elements.len() != embedding.dimensions {
                return Err(StoreError::Validation(format!(
                    "embedding at {} has {} dimensions, collection requires {}",
                    embedding.path,
                    elements.len(),
                    embedding.dimensions
                )));
            }
            if elements.iter().any(|e| !e.is_number()) {
                return Err(StoreError::Validation(format!(
                    "embedding at {} contains non-numeric elements",
                    embedding.path
                )));
            }
        }
        Ok(())
    }

    fn embedding_field(&self) -> Result<String, StoreError> {
        self.definition
            .embedding()
            .map(|e| e.field().to_string())
            .ok_or_else(|| {
                StoreError::QueryExecution(
                    "collection has no vector embedding policy".into(),
                )
            })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_collection_if_not_exists(
        &self,
        database: &str,
        definition: &CollectionDefinition,
        throughput: Throughput,
    ) -> Result<CollectionHandle, StoreError> {
        let key = Self::key(database, &definition.name);
        let mut collections = self.collections.write().map_err(|_| Self::lock_poisoned())?;

        if let Some(existing) = collections.get(&key) {
            if let Some(detail) = definition.incompatibility_with(&existing.definition) {
                return Err(StoreError::ConfigurationConflict {
                    collection: definition.name.clone(),
                    detail,
                });
            }
            return Ok(CollectionHandle::new(database, existing.definition.clone()));
        }

        tracing::debug!(
            database,
            collection = %definition.name,
            request_units = throughput.request_units(),
            "collection_created"
        );
        collections.insert(
            key,
            StoredCollection {
                definition: definition.clone(),
                documents: Vec::new(),
            },
        );
        Ok(CollectionHandle::new(database, definition.clone()))
    }

    async fn execute_bulk_create(
        &self,
        collection: &CollectionHandle,
        operations: Vec<CreateOperation>,
    ) -> Result<Vec<ItemOutcome>, StoreError> {
        let key = Self::key(collection.database(), collection.name());
        let mut collections = self.collections.write().map_err(|_| Self::lock_poisoned())?;
        let stored = collections
            .get_mut(&key)
            .ok_or_else(|| StoreError::UnknownCollection {
                collection: collection.name().to_string(),
            })?;

        // One lock for the whole batch; outcomes in submission order.
        let outcomes = operations
            .into_iter()
            .map(|op| stored.apply_create(op))
            .collect();
        Ok(outcomes)
    }

    async fn vector_query(
        &self,
        collection: &CollectionHandle,
        query: &VectorQuery,
    ) -> Result<Vec<Value>, StoreError> {
        let key = Self::key(collection.database(), collection.name());
        let collections = self.collections.read().map_err(|_| Self::lock_poisoned())?;
        let stored = collections
            .get(&key)
            .ok_or_else(|| StoreError::UnknownCollection {
                collection: collection.name().to_string(),
            })?;

        let embedding = stored
            .definition
            .vector_embedding_policy
            .for_path(&query.embedding_path)
            .ok_or_else(|| {
                StoreError::QueryExecution(format!(
                    "no vector embedding policy for path {}",
                    query.embedding_path
                ))
            })?;
        if query.vector.len() != embedding.dimensions {
            return Err(StoreError::QueryExecution(format!(
                "query vector has {} dimensions, collection requires {}",
                query.vector.len(),
                embedding.dimensions
            )));
        }

        let field = embedding.field();
        let query_vector: Vec<f64> = query.vector.iter().map(|&v| f64::from(v)).collect();

        let mut rows = Vec::new();
        for doc in &stored.documents {
            // Documents without the embedding field are not eligible rows.
            let Some(stored_vector) = doc.body.get(field).and_then(numeric_vector) else {
                continue;
            };
            let score = distance(embedding.distance_function, &query_vector, &stored_vector);
            rows.push(project_row(&doc.body, query, score));
        }
        Ok(rows)
    }

    async fn count_matching(
        &self,
        collection: &CollectionHandle,
        predicate: CountPredicate,
    ) -> Result<u64, StoreError> {
        let key = Self::key(collection.database(), collection.name());
        let collections = self.collections.read().map_err(|_| Self::lock_poisoned())?;
        let stored = collections
            .get(&key)
            .ok_or_else(|| StoreError::UnknownCollection {
                collection: collection.name().to_string(),
            })?;

        let count = match predicate {
            CountPredicate::All => stored.documents.len(),
            CountPredicate::HasEmbedding(wanted) => {
                let field = stored.embedding_field()?;
                stored
                    .documents
                    .iter()
                    .filter(|doc| {
                        doc.body.get(&field).map(Value::is_array).unwrap_or(false) == wanted
                    })
                    .count()
            }
        };
        Ok(count as u64)
    }
}

fn numeric_vector(value: &Value) -> Option<Vec<f64>> {
    let elements = value.as_array()?;
    elements.iter().map(Value::as_f64).collect()
}

/// Scores travel the wire as string-encoded floats.
fn project_row(body: &Value, query: &VectorQuery, score: f64) -> Value {
    let mut row = Map::new();
    if query.projection.is_empty() {
        if let Some(fields) = body.as_object() {
            row.extend(fields.clone());
        }
    } else {
        for field in &query.projection {
            if let Some(value) = body.get(field) {
                row.insert(field.clone(), value.clone());
            }
        }
    }
    row.insert(query.score_alias.clone(), Value::String(score.to_string()));
    Value::Object(row)
}

fn distance(function: DistanceFunction, a: &[f64], b: &[f64]) -> f64 {
    match function {
        DistanceFunction::Cosine => cosine_similarity(a, b),
        DistanceFunction::DotProduct => dot(a, b),
        DistanceFunction::Euclidean => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt(),
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}
