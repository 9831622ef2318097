//! Composite risk score records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::PopulationId;
use crate::risk::ScoreLevel;

/// A 0–100 composite risk index blending parasite, mortality, environmental
/// and treatment-history signals.
///
/// Each computation produces a fresh row; consumers treat only the latest
/// row per population as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub population_id: PopulationId,
    /// `100 × exceedance probability` from the 7-day forecast.
    pub lice_score: u8,
    /// Trailing-week mortality, scaled ×10 and capped at 100.
    pub mortality_score: u8,
    /// Environment quality (higher is better; inverted when blended).
    pub environment_score: u8,
    /// Mean treatment effectiveness (higher is better; inverted when blended).
    pub treatment_score: u8,
    /// Weighted blend of the components, in `[0, 100]`.
    pub overall_score: u8,
    pub risk_level: ScoreLevel,
    pub computed_at: DateTime<Utc>,
}
