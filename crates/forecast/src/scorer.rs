//! Composite risk scoring.
//!
//! Blends the lice exceedance signal with independently-read mortality,
//! environment-quality and treatment-efficacy signals into one 0–100 index.
//! Environment and treatment are quality scores (higher is better) and are
//! inverted when blended, so good conditions lower the contributed risk.

use licewatch_core::{EnvironmentQuality, ScoreLevel};

/// Blend weights: lice 0.4, mortality 0.2, environment 0.2, treatment 0.2.
const WEIGHT_LICE: f64 = 0.4;
const WEIGHT_MORTALITY: f64 = 0.2;
const WEIGHT_ENVIRONMENT: f64 = 0.2;
const WEIGHT_TREATMENT: f64 = 0.2;

/// Defaults used when the corresponding read fails or finds nothing.
pub const DEFAULT_MORTALITY_SCORE: f64 = 20.0;
pub const DEFAULT_ENVIRONMENT_SCORE: f64 = 80.0;
pub const DEFAULT_TREATMENT_SCORE: f64 = 50.0;

/// The four component scores feeding the blend, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub lice: f64,
    pub mortality: f64,
    pub environment: f64,
    pub treatment: f64,
}

/// Lice sub-score: the exceedance probability on a 0–100 scale.
pub fn lice_score(exceedance_probability: f64) -> f64 {
    (exceedance_probability * 100.0).round()
}

/// Mortality sub-score: trailing-week average mortality ×10, capped at 100.
pub fn mortality_score(avg_weekly_mortality: f64) -> f64 {
    (avg_weekly_mortality * 10.0).min(100.0)
}

fn temperature_subscore(temperature: f64) -> f64 {
    if temperature < 4.0 || temperature > 18.0 {
        50.0
    } else if temperature < 6.0 || temperature > 16.0 {
        70.0
    } else if temperature < 8.0 || temperature > 14.0 {
        85.0
    } else {
        100.0
    }
}

fn oxygen_subscore(oxygen_percent: f64) -> f64 {
    if oxygen_percent < 60.0 {
        30.0
    } else if oxygen_percent < 70.0 {
        50.0
    } else if oxygen_percent < 80.0 {
        70.0
    } else if oxygen_percent < 90.0 {
        85.0
    } else {
        100.0
    }
}

/// Environment-quality sub-score: temperature and oxygen band scores,
/// averaged. Optimal water (8–14 °C, ≥90 % O₂) scores 100.
pub fn environment_score(quality: &EnvironmentQuality) -> f64 {
    ((temperature_subscore(quality.temperature) + oxygen_subscore(quality.oxygen_percent)) / 2.0)
        .round()
}

/// Composite-score level bands.
pub fn level_for(overall: u8) -> ScoreLevel {
    match overall {
        70.. => ScoreLevel::Critical,
        50..=69 => ScoreLevel::High,
        30..=49 => ScoreLevel::Moderate,
        _ => ScoreLevel::Low,
    }
}

/// Weighted blend of the components into the overall 0–100 score.
pub fn blend(components: &ComponentScores) -> (u8, ScoreLevel) {
    let overall = components.lice * WEIGHT_LICE
        + components.mortality * WEIGHT_MORTALITY
        + (100.0 - components.environment) * WEIGHT_ENVIRONMENT
        + (100.0 - components.treatment) * WEIGHT_TREATMENT;
    let overall = overall.round().clamp(0.0, 100.0) as u8;
    (overall, level_for(overall))
}
