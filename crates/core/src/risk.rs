//! Risk classification enums shared by forecasts and composite scores.

use serde::{Deserialize, Serialize};

/// Forecast risk level, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl core::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator guidance derived from a forecast's risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    NoAction,
    Monitor,
    ScheduleTreatment,
    ImmediateTreatment,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::NoAction => "NO_ACTION",
            RecommendedAction::Monitor => "MONITOR",
            RecommendedAction::ScheduleTreatment => "SCHEDULE_TREATMENT",
            RecommendedAction::ImmediateTreatment => "IMMEDIATE_TREATMENT",
        }
    }
}

impl core::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RiskLevel> for RecommendedAction {
    /// The action recommendation is a pure function of the risk level.
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => RecommendedAction::ImmediateTreatment,
            RiskLevel::High => RecommendedAction::ScheduleTreatment,
            RiskLevel::Medium => RecommendedAction::Monitor,
            RiskLevel::Low => RecommendedAction::NoAction,
        }
    }
}

/// Composite-score level. Distinct from [`RiskLevel`]: the score scale uses
/// MODERATE where forecasts use MEDIUM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl ScoreLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLevel::Low => "LOW",
            ScoreLevel::Moderate => "MODERATE",
            ScoreLevel::High => "HIGH",
            ScoreLevel::Critical => "CRITICAL",
        }
    }
}

impl core::fmt::Display for ScoreLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
