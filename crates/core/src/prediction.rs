//! Forecast output records.
//!
//! A [`Prediction`] is an append-only log entry: one row per population per
//! horizon per generation cycle, never mutated afterwards. Consumers looking
//! for "current" state must filter by the most recent generation timestamp.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::id::PopulationId;
use crate::risk::{RecommendedAction, RiskLevel};

/// The factor inputs that shaped one forecast, kept for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub seasonal_factor: f64,
    pub temperature_factor: f64,
    /// Water temperature (°C) the temperature factor was computed from.
    pub temperature: f64,
    pub trend_slope: f64,
    pub trend_r2: f64,
    /// Number of history points the fit/projection saw.
    pub sample_count: usize,
    /// Number of recent completed treatments considered.
    pub treatment_count: usize,
}

/// Per-source provenance flags: which inputs fell back to their documented
/// defaults because the read failed or no data existed.
///
/// A forecast with flags set is still valid: it is a cold-start or degraded
/// forecast, and downstream consumers can tell it apart from a confident one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsUsed {
    pub history: bool,
    pub temperature: bool,
    pub treatments: bool,
}

impl DefaultsUsed {
    pub fn any(&self) -> bool {
        self.history || self.temperature || self.treatments
    }
}

/// One forward-looking lice forecast for a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub population_id: PopulationId,
    /// When this forecast was generated.
    pub generated_at: DateTime<Utc>,
    /// The date the forecast targets (`generated_at` date + horizon).
    pub target_date: NaiveDate,
    /// Days ahead the forecast targets.
    pub horizon_days: u32,
    /// Latest observed count ratio (0 on cold start).
    pub current_value: f64,
    /// Projected count ratio, clamped to `[0, 3.0]`.
    pub predicted_value: f64,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Estimated probability of crossing the regulatory limit, in `[0, 1]`.
    pub exceedance_probability: f64,
    pub risk_level: RiskLevel,
    pub recommended_action: RecommendedAction,
    /// Model version tag; never empty.
    pub model_version: String,
    pub factors: FactorBreakdown,
    pub defaults_used: DefaultsUsed,
}

impl Prediction {
    /// Whether this prediction should feed the downstream alerting hook.
    pub fn is_critical(&self) -> bool {
        self.risk_level == RiskLevel::Critical
    }
}
