//! # Pantry Ingest
//!
//! Bulk loading of recipe documents into a provisioned collection.
//!
//! ## What happens here
//!
//! - **Identity** - Recipes without an `id` get one derived from their name
//!   (whitespace removed). Same name, same id, every time.
//! - **Create-only writes** - Every item becomes a create operation
//!   partitioned by its own id. Collisions fail that item, nothing else.
//! - **One batch, one call** - The whole sequence goes to the store as a
//!   single bulk request; the store dispatches items concurrently and the
//!   call returns once every item has completed or failed.
//! - **Nothing swallowed** - Per-item outcomes come back in submission order
//!   in an [`IngestReport`]; partial failure is the caller's to inspect, not
//!   a log line.
//!
//! ## Entry point
//!
//! Call [`ingest_batch`] with a store, a collection handle, and the recipes.
//! Batch-level failures (transport, unknown collection) are the only `Err`s.

mod error;
mod types;

pub use crate::error::IngestError;
pub use crate::types::Recipe;

use store::{CreateOperation, DocumentStore, ItemOutcome};
use tracing::{info, warn, Instrument, Level};

/// Outcome of one recipe in a batch, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Created { id: String },
    Failed { id: String, error: IngestError },
}

impl IngestOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, IngestOutcome::Created { .. })
    }

    pub fn id(&self) -> &str {
        match self {
            IngestOutcome::Created { id } | IngestOutcome::Failed { id, .. } => id,
        }
    }
}

/// Aggregate result of one bulk ingest call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub outcomes: Vec<IngestOutcome>,
}

impl IngestReport {
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_created()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.created()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    /// Failed items with their reasons, in submission order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &IngestError)> {
        self.outcomes.iter().filter_map(|o| match o {
            IngestOutcome::Failed { id, error } => Some((id.as_str(), error)),
            IngestOutcome::Created { .. } => None,
        })
    }
}

/// Slot for one submitted recipe while the batch is in flight.
enum Pending {
    /// Will be filled from the store's outcome stream.
    Submitted,
    /// Failed before submission; the store never saw it.
    Rejected(IngestOutcome),
}

/// Bulk-load recipes into the collection as create-only writes.
///
/// Identifiers are assigned first (derived from names where absent), then the
/// whole batch is submitted through the store's bulk path. The returned
/// report has one outcome per input recipe, in input order; recipes that
/// could not produce an identity or a document are reported as failed items
/// without aborting their siblings.
pub async fn ingest_batch(
    store: &dyn DocumentStore,
    collection: &store::CollectionHandle,
    recipes: Vec<Recipe>,
) -> Result<IngestReport, IngestError> {
    let span = tracing::span!(
        Level::INFO,
        "ingest.batch",
        collection = %collection.name(),
        items = recipes.len()
    );

    async move {
        let mut slots = Vec::with_capacity(recipes.len());
        let mut operations = Vec::with_capacity(recipes.len());

        for mut recipe in recipes {
            let id = match recipe.ensure_id() {
                Ok(id) => id.to_string(),
                Err(error) => {
                    slots.push(Pending::Rejected(IngestOutcome::Failed {
                        id: recipe.name.clone(),
                        error,
                    }));
                    continue;
                }
            };
            match serde_json::to_value(&recipe) {
                Ok(document) => {
                    operations.push(CreateOperation::new(document, id));
                    slots.push(Pending::Submitted);
                }
                Err(err) => {
                    slots.push(Pending::Rejected(IngestOutcome::Failed {
                        id,
                        error: IngestError::Serialize(err.to_string()),
                    }));
                }
            }
        }

        let store_outcomes: Vec<IngestOutcome> = if operations.is_empty() {
            Vec::new()
        } else {
            store
                .execute_bulk_create(collection, operations)
                .await?
                .into_iter()
                .map(|outcome| match outcome {
                    ItemOutcome::Created { id } => IngestOutcome::Created { id },
                    ItemOutcome::Failed { id, error } => IngestOutcome::Failed {
                        id,
                        error: error.into(),
                    },
                })
                .collect()
        };

        // Merge pre-submission rejections back into submission order.
        let mut store_outcomes = store_outcomes.into_iter();
        let outcomes: Vec<IngestOutcome> = slots
            .into_iter()
            .map(|slot| match slot {
                Pending::Rejected(outcome) => outcome,
                Pending::Submitted => store_outcomes
                    .next()
                    .unwrap_or_else(|| unreachable!("store returned fewer outcomes than items")),
            })
            .collect();

        let report = IngestReport { outcomes };
        for (id, error) in report.failures() {
            warn!(id, error = %error, "ingest_item_failed");
        }
        info!(
            created = report.created(),
            failed = report.failed(),
            "ingest_batch_complete"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
