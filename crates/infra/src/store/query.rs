//! Query and pagination types for the prediction store.

use serde::{Deserialize, Serialize};

use licewatch_core::{PopulationId, Prediction, RiskLevel};

/// Filter for reading back predictions. Empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredictionFilter {
    pub population_id: Option<PopulationId>,
    pub risk_level: Option<RiskLevel>,
    pub horizon_days: Option<u32>,
}

impl PredictionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_population(mut self, population_id: PopulationId) -> Self {
        self.population_id = Some(population_id);
        self
    }

    pub fn with_risk_level(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }

    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = Some(horizon_days);
        self
    }

    pub fn matches(&self, prediction: &Prediction) -> bool {
        self.population_id.is_none_or(|id| prediction.population_id == id)
            && self.risk_level.is_none_or(|level| prediction.risk_level == level)
            && self.horizon_days.is_none_or(|h| prediction.horizon_days == h)
    }
}

/// 1-based pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: 50 }
    }
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page: page.max(1), per_page: per_page.max(1) }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// One page of predictions plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPage {
    pub items: Vec<Prediction>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Fleet summary over the latest generation per population at one horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub avg_predicted_value: f64,
    pub avg_exceedance_probability: f64,
    /// Populations whose recommended action is a treatment.
    pub treatment_needed: usize,
}

impl PredictionSummary {
    /// Aggregate a set of current predictions (one per population).
    pub fn from_current(predictions: &[&Prediction]) -> Self {
        let mut summary = Self { total: predictions.len(), ..Self::default() };
        if predictions.is_empty() {
            return summary;
        }

        for p in predictions {
            match p.risk_level {
                RiskLevel::Critical => summary.critical += 1,
                RiskLevel::High => summary.high += 1,
                RiskLevel::Medium => summary.medium += 1,
                RiskLevel::Low => summary.low += 1,
            }
            if matches!(
                p.recommended_action,
                licewatch_core::RecommendedAction::ScheduleTreatment
                    | licewatch_core::RecommendedAction::ImmediateTreatment
            ) {
                summary.treatment_needed += 1;
            }
            summary.avg_predicted_value += p.predicted_value;
            summary.avg_exceedance_probability += p.exceedance_probability;
        }
        summary.avg_predicted_value /= predictions.len() as f64;
        summary.avg_exceedance_probability /= predictions.len() as f64;
        summary
    }
}
