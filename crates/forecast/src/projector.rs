//! Forward projection of the count ratio.
//!
//! Two modes: extrapolate the regression line when the history supports it,
//! otherwise fall back to bounded exponential growth from the latest
//! observation. Either way the result is clamped to the prediction ceiling.

use serde::{Deserialize, Serialize};

use licewatch_core::CountPoint;

use crate::limits::PREDICTION_CEILING;
use crate::trend::TrendEstimate;

/// Minimum history length for the regression mode.
const MIN_REGRESSION_POINTS: usize = 5;
/// Minimum goodness-of-fit for the regression mode.
const MIN_REGRESSION_R2: f64 = 0.5;

/// Which projection path produced the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Linear extrapolation of the fitted trend.
    Regression,
    /// Exponential growth from the current value at the adjusted weekly rate.
    ExponentialFallback,
}

/// A single forward point estimate with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthProjection {
    /// Projected count ratio, clamped to `[0, PREDICTION_CEILING]`.
    pub predicted_value: f64,
    /// Confidence in `[0.5, 0.9]`: 0.7–0.9 for regression (scaling with R²),
    /// 0.5–0.7 for the fallback (penalizing sparse history).
    pub confidence: f64,
    pub mode: ProjectionMode,
}

/// Project the count ratio `horizon_days` ahead.
///
/// Regression mode requires at least [`MIN_REGRESSION_POINTS`] history points
/// and a fit better than [`MIN_REGRESSION_R2`]; it extrapolates the line to
/// `history length + horizon/7` index units (histories are sampled roughly
/// weekly, and the fit is positional). The fallback compounds the latest
/// observation by the adjusted weekly growth rate.
pub fn project(
    history: &[CountPoint],
    trend: &TrendEstimate,
    adjusted_weekly_rate: f64,
    horizon_days: u32,
) -> GrowthProjection {
    let current = history.last().map(|p| p.value).unwrap_or(0.0);
    let horizon_weeks = f64::from(horizon_days) / 7.0;

    let (raw, confidence, mode) =
        if history.len() >= MIN_REGRESSION_POINTS && trend.r2 > MIN_REGRESSION_R2 {
            let predicted_index = history.len() as f64 + horizon_weeks;
            let extrapolated = (trend.slope * predicted_index + trend.intercept).max(0.0);
            (extrapolated, 0.7 + trend.r2 * 0.2, ProjectionMode::Regression)
        } else {
            let compounded = current * (1.0 + adjusted_weekly_rate).powf(horizon_weeks);
            let sparse_penalty = 0.05 * (7.0 - (history.len().min(7) as f64));
            (
                compounded,
                (0.7 - sparse_penalty).max(0.5),
                ProjectionMode::ExponentialFallback,
            )
        };

    GrowthProjection {
        predicted_value: raw.clamp(0.0, PREDICTION_CEILING),
        confidence,
        mode,
    }
}
