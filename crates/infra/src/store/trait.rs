//! Store abstraction for forecasts and composite scores.

use async_trait::async_trait;

use licewatch_core::{PopulationId, Prediction, RiskScore};

use super::query::{Pagination, PredictionFilter, PredictionPage, PredictionSummary};

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing storage rejected or failed the operation. A failed batch
    /// append leaves the store untouched.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored row could not be decoded back into its domain type.
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Persistence seam for the forecast engine.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Append one cycle's batch of predictions as a single atomic unit:
    /// either every row lands or none does. Batch appends never interleave.
    /// There is no update path; predictions are log entries.
    async fn append_predictions(&self, batch: &[Prediction]) -> Result<(), StoreError>;

    /// Read predictions matching the filter, newest generation first,
    /// paginated.
    async fn query_predictions(
        &self,
        filter: &PredictionFilter,
        page: &Pagination,
    ) -> Result<PredictionPage, StoreError>;

    /// Summary statistics over the most recent generation per population at
    /// one horizon.
    async fn prediction_summary(&self, horizon_days: u32)
        -> Result<PredictionSummary, StoreError>;

    /// Record a freshly computed composite score.
    async fn record_score(&self, score: &RiskScore) -> Result<(), StoreError>;

    /// Latest composite score for one population, if any.
    async fn latest_score(
        &self,
        population: PopulationId,
    ) -> Result<Option<RiskScore>, StoreError>;

    /// Latest composite score per population, highest overall first.
    async fn latest_scores(&self) -> Result<Vec<RiskScore>, StoreError>;
}
