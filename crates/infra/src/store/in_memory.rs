//! In-memory prediction store for tests/dev.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use licewatch_core::{PopulationId, Prediction, RiskScore};

use super::query::{Pagination, PredictionFilter, PredictionPage, PredictionSummary};
use super::r#trait::{PredictionStore, StoreError};

/// In-memory [`PredictionStore`].
///
/// Batch atomicity falls out of holding the write lock for the whole append;
/// `fail_next_append` lets tests exercise the rollback path.
#[derive(Debug, Default)]
pub struct InMemoryPredictionStore {
    predictions: RwLock<Vec<Prediction>>,
    scores: RwLock<Vec<RiskScore>>,
    fail_next_append: AtomicBool,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make the next `append_predictions` fail without persisting anything.
    pub fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }

    /// Total prediction rows currently held (test helper).
    pub fn prediction_count(&self) -> usize {
        self.predictions.read().unwrap().len()
    }
}

#[async_trait]
impl PredictionStore for InMemoryPredictionStore {
    async fn append_predictions(&self, batch: &[Prediction]) -> Result<(), StoreError> {
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Storage("injected append failure".to_string()));
        }
        let mut predictions = self.predictions.write().unwrap();
        predictions.extend_from_slice(batch);
        Ok(())
    }

    async fn query_predictions(
        &self,
        filter: &PredictionFilter,
        page: &Pagination,
    ) -> Result<PredictionPage, StoreError> {
        let predictions = self.predictions.read().unwrap();
        let mut matched: Vec<Prediction> =
            predictions.iter().filter(|p| filter.matches(p)).cloned().collect();
        matched.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));

        let total = matched.len() as u64;
        let items: Vec<Prediction> = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();

        Ok(PredictionPage { items, total, page: page.page, per_page: page.per_page })
    }

    async fn prediction_summary(
        &self,
        horizon_days: u32,
    ) -> Result<PredictionSummary, StoreError> {
        let predictions = self.predictions.read().unwrap();

        // Latest generation per population at this horizon is "current".
        let mut current: HashMap<PopulationId, &Prediction> = HashMap::new();
        for p in predictions.iter().filter(|p| p.horizon_days == horizon_days) {
            current
                .entry(p.population_id)
                .and_modify(|held| {
                    if p.generated_at > held.generated_at {
                        *held = p;
                    }
                })
                .or_insert(p);
        }

        let current: Vec<&Prediction> = current.into_values().collect();
        Ok(PredictionSummary::from_current(&current))
    }

    async fn record_score(&self, score: &RiskScore) -> Result<(), StoreError> {
        self.scores.write().unwrap().push(score.clone());
        Ok(())
    }

    async fn latest_score(
        &self,
        population: PopulationId,
    ) -> Result<Option<RiskScore>, StoreError> {
        let scores = self.scores.read().unwrap();
        Ok(scores
            .iter()
            .filter(|s| s.population_id == population)
            .max_by_key(|s| s.computed_at)
            .cloned())
    }

    async fn latest_scores(&self) -> Result<Vec<RiskScore>, StoreError> {
        let scores = self.scores.read().unwrap();
        let mut latest: HashMap<PopulationId, &RiskScore> = HashMap::new();
        for s in scores.iter() {
            latest
                .entry(s.population_id)
                .and_modify(|held| {
                    if s.computed_at > held.computed_at {
                        *held = s;
                    }
                })
                .or_insert(s);
        }
        let mut result: Vec<RiskScore> = latest.into_values().cloned().collect();
        result.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        Ok(result)
    }
}
