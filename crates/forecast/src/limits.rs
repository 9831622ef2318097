//! Regulatory limits and model constants.
//!
//! The limits mirror the food-safety authority's adult-female thresholds and
//! live in one module so the policy constants stay auditable and testable in
//! isolation. The stricter spring limit applies during the April–May
//! sensitive period for migrating smolt.

use serde_json::{json, Value as JsonValue};

/// Regulatory lice thresholds, per adult female per fish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiceLimits {
    /// Standard limit for adult females.
    pub adult_female_limit: f64,
    /// Early-warning level below the limit.
    pub warning_threshold: f64,
    /// Critical level (double the standard limit, rounded up in policy).
    pub critical_threshold: f64,
    /// Stricter limit during the spring period.
    pub spring_limit: f64,
}

/// The thresholds in force. Policy constants, not derived data.
pub const LICE_LIMITS: LiceLimits = LiceLimits {
    adult_female_limit: 0.5,
    warning_threshold: 0.3,
    critical_threshold: 0.7,
    spring_limit: 0.2,
};

/// Hard ceiling on projected values; extrapolation beyond it is clamped,
/// never an error.
pub const PREDICTION_CEILING: f64 = 3.0;

/// Base weekly growth rate under neutral conditions, before the seasonal,
/// temperature and treatment factors are applied.
pub const BASE_WEEKLY_GROWTH_RATE: f64 = 0.12;

/// Version tag stamped on every prediction row.
pub const MODEL_VERSION: &str = "statistical-v1.0";

/// The regulatory limit applicable in a given calendar month (1–12).
///
/// April and May carry the stricter spring limit; every other month uses the
/// standard adult-female limit.
pub fn limit_for_month(month: u32) -> f64 {
    if month == 4 || month == 5 {
        LICE_LIMITS.spring_limit
    } else {
        LICE_LIMITS.adult_female_limit
    }
}

/// Static model metadata for operational surfaces (CLI/HTTP layers excluded
/// from this workspace).
pub fn model_info() -> JsonValue {
    json!({
        "name": "licewatch statistical forecast model",
        "version": MODEL_VERSION,
        "type": "statistical/trend-analysis",
        "limits": {
            "adult_female_limit": LICE_LIMITS.adult_female_limit,
            "warning_threshold": LICE_LIMITS.warning_threshold,
            "critical_threshold": LICE_LIMITS.critical_threshold,
            "spring_limit": LICE_LIMITS.spring_limit,
        },
        "base_weekly_growth_rate": BASE_WEEKLY_GROWTH_RATE,
        "seasonal_factors": crate::factors::SEASONAL_FACTORS,
        "prediction_ceiling": PREDICTION_CEILING,
    })
}
