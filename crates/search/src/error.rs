//! Error types produced by the search crate.

use store::StoreError;
use thiserror::Error;

/// Failures of a single search call. All are fatal for that call; nothing is
/// retried here.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum SearchError {
    /// The store could not execute the query (transport or query failure).
    #[error("query failed: {0}")]
    QueryExecution(String),

    /// A row's score could not be parsed as a number. Scores are
    /// string-encoded floats on the wire; anything else means a schema
    /// mismatch upstream.
    #[error("malformed score: {0}")]
    MalformedScore(String),

    /// A row did not deserialize as a recipe.
    #[error("malformed result row: {0}")]
    MalformedRow(String),

    /// The query vector does not match the collection's embedding dimension.
    #[error("query vector has {actual} dimensions, collection requires {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The collection has no vector embedding policy to search against.
    #[error("collection {0} has no vector embedding policy")]
    NotSearchable(String),
}

impl From<StoreError> for SearchError {
    fn from(err: StoreError) -> Self {
        SearchError::QueryExecution(err.to_string())
    }
}
