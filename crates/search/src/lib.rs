//! # Pantry Search
//!
//! Similarity search over a vector-indexed recipe collection.
//!
//! A search is one query round-trip plus a client-side ranking pass:
//!
//! 1. The query vector is checked against the collection's embedding policy.
//! 2. The store evaluates its native vector-distance operator server-side —
//!    the same distance function the collection was indexed with — and
//!    returns every eligible row with a string-encoded score.
//! 3. Rows are parsed, ranked best-first with a stable sort whose direction
//!    comes from the distance function's [`ScoreOrdering`], and truncated to
//!    `min(k, available)`.
//!
//! Searches are read-only and side-effect-free; any number may run
//! concurrently against the same handle.

mod error;
mod rank;

pub use crate::error::SearchError;
pub use crate::rank::{parse_score, rank};

use ingest::Recipe;
use serde::{Deserialize, Serialize};
use store::{CollectionHandle, DocumentStore, VectorQuery};
use tracing::{info, Instrument, Level};

/// Number of results returned when the caller does not choose a `k`.
pub const DEFAULT_TOP_K: usize = 3;

/// One ranked result: the stored recipe annotated with its similarity score.
///
/// The score is transient — it exists only in search results and is never
/// persisted with the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub recipe: Recipe,
    pub score: f64,
}

/// Run a similarity search and return the top `k` recipes, best first.
///
/// Fewer than `k` eligible documents yields fewer hits, never an error.
/// `k == 0` short-circuits without a store round-trip.
pub async fn search(
    store: &dyn DocumentStore,
    collection: &CollectionHandle,
    vector: &[f32],
    k: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let span = tracing::span!(
        Level::INFO,
        "search.query",
        collection = %collection.name(),
        k
    );

    async move {
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding = collection
            .definition()
            .embedding()
            .ok_or_else(|| SearchError::NotSearchable(collection.name().to_string()))?;
        if vector.len() != embedding.dimensions {
            return Err(SearchError::DimensionMismatch {
                expected: embedding.dimensions,
                actual: vector.len(),
            });
        }

        let query = VectorQuery::new(embedding.path.clone(), vector.to_vec())
            .with_projection(Recipe::projection());
        let ordering = embedding.distance_function.score_ordering();

        let rows = store.vector_query(collection, &query).await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            let score = parse_score(row.get(query.score_alias.as_str()))?;
            let recipe: Recipe = serde_json::from_value(row)
                .map_err(|err| SearchError::MalformedRow(err.to_string()))?;
            hits.push(SearchHit { recipe, score });
        }

        let hits = rank(hits, ordering, k);
        info!(returned = hits.len(), "search_complete");
        Ok(hits)
    }
    .instrument(span)
    .await
}
