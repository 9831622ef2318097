//! Deterministic single-population forecast assembly.
//!
//! `forecast_at` is the full 4.1→4.5 pipeline minus I/O: callers (the infra
//! service) resolve the reads and pass the clock in, the engine computes.
//! Clock injection keeps every forecast reproducible in tests.

use chrono::{DateTime, Datelike, Duration, Utc};

use licewatch_core::{
    CountPoint, DefaultsUsed, FactorBreakdown, PopulationId, Prediction, TreatmentRecord,
};

use crate::classifier::{classify, exceedance_probability};
use crate::factors::{seasonal_factor, temperature_factor, treatment_damping};
use crate::limits::{limit_for_month, BASE_WEEKLY_GROWTH_RATE, MODEL_VERSION};
use crate::projector::project;
use crate::trend::estimate;

/// Resolved inputs for one population's forecast.
///
/// `treatments` is ordered most-recent-first, completed-only, as delivered
/// by the read boundary.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInputs<'a> {
    pub history: &'a [CountPoint],
    /// Latest water temperature, °C.
    pub temperature: f64,
    pub treatments: &'a [TreatmentRecord],
}

/// Compute one forecast at the injected instant.
///
/// Provenance flags default to "no defaults used"; the caller that resolved
/// the reads overwrites them.
pub fn forecast_at(
    population_id: PopulationId,
    inputs: ForecastInputs<'_>,
    horizon_days: u32,
    now: DateTime<Utc>,
) -> Prediction {
    let today = now.date_naive();
    let month = today.month();

    let seasonal = seasonal_factor(month);
    let temp_factor = temperature_factor(inputs.temperature);

    // Only the most recent completed treatment inside the window damps growth.
    let days_since_treatment = inputs
        .treatments
        .first()
        .map(|t| (today - t.completed_date).num_days());
    let damping = treatment_damping(days_since_treatment);

    let adjusted_rate = BASE_WEEKLY_GROWTH_RATE * seasonal * temp_factor * damping;

    let trend = estimate(inputs.history);
    let projection = project(inputs.history, &trend, adjusted_rate, horizon_days);

    let limit = limit_for_month(month);
    let probability = exceedance_probability(limit, projection.predicted_value);
    let risk_level = classify(projection.predicted_value, probability);

    Prediction {
        population_id,
        generated_at: now,
        target_date: today + Duration::days(i64::from(horizon_days)),
        horizon_days,
        current_value: inputs.history.last().map(|p| p.value).unwrap_or(0.0),
        predicted_value: projection.predicted_value,
        confidence: projection.confidence,
        exceedance_probability: probability,
        risk_level,
        recommended_action: risk_level.into(),
        model_version: MODEL_VERSION.to_string(),
        factors: FactorBreakdown {
            seasonal_factor: seasonal,
            temperature_factor: temp_factor,
            temperature: inputs.temperature,
            trend_slope: trend.slope,
            trend_r2: trend.r2,
            sample_count: inputs.history.len(),
            treatment_count: inputs.treatments.len(),
        },
        defaults_used: DefaultsUsed::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use licewatch_core::{RecommendedAction, RiskLevel};

    /// A fixed "now" in July: peak season, non-spring limit.
    fn july_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 7, 6, 0, 0).unwrap()
    }

    fn weekly_history(now: DateTime<Utc>, values: &[f64]) -> Vec<CountPoint> {
        let today = now.date_naive();
        values
            .iter()
            .rev()
            .enumerate()
            .map(|(weeks_back, &v)| {
                CountPoint::new(today - Duration::days(7 * weeks_back as i64), v)
            })
            .rev()
            .collect()
    }

    #[test]
    fn near_linear_history_uses_regression_and_flags_high_risk() {
        let now = july_now();
        // Perfect weekly climb: y = 0.06x + 0.10, extrapolated to index 6.
        let history = weekly_history(now, &[0.10, 0.16, 0.22, 0.28, 0.34]);
        let inputs = ForecastInputs {
            history: &history,
            temperature: 12.0,
            treatments: &[],
        };

        let p = forecast_at(PopulationId::new(), inputs, 7, now);

        assert!(p.factors.trend_r2 > 0.9, "r2 was {}", p.factors.trend_r2);
        // Regression confidence band is 0.7–0.9; the fallback tops out at 0.7.
        assert!(p.confidence > 0.7);
        assert!((p.predicted_value - 0.46).abs() < 1e-9);
        // 0.04 from July's 0.5 limit → probability 0.8 → HIGH.
        assert!((p.exceedance_probability - 0.8).abs() < 1e-12);
        assert!(
            matches!(p.risk_level, RiskLevel::High | RiskLevel::Critical),
            "level was {:?}",
            p.risk_level
        );
        assert_eq!(p.horizon_days, 7);
        assert_eq!(p.target_date, NaiveDate::from_ymd_opt(2026, 7, 14).unwrap());
        assert_eq!(p.model_version, MODEL_VERSION);
    }

    #[test]
    fn cold_start_forecasts_zero_and_low_risk() {
        let p = forecast_at(
            PopulationId::new(),
            ForecastInputs { history: &[], temperature: 10.0, treatments: &[] },
            7,
            july_now(),
        );

        assert_eq!(p.current_value, 0.0);
        assert_eq!(p.predicted_value, 0.0);
        assert!(p.confidence <= 0.7);
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.recommended_action, RecommendedAction::NoAction);
        assert_eq!(p.factors.sample_count, 0);
    }

    #[test]
    fn recent_treatment_damps_the_projection() {
        let now = july_now();
        // Short history keeps both runs in fallback mode, where the damped
        // growth rate is visible in the output.
        let history = weekly_history(now, &[0.10, 0.15, 0.22, 0.30]);
        let treated = [TreatmentRecord {
            completed_date: now.date_naive() - Duration::days(3),
            effectiveness_percent: 90.0,
        }];

        let untreated = forecast_at(
            PopulationId::new(),
            ForecastInputs { history: &history, temperature: 12.0, treatments: &[] },
            7,
            now,
        );
        let damped = forecast_at(
            PopulationId::new(),
            ForecastInputs { history: &history, temperature: 12.0, treatments: &treated },
            7,
            now,
        );

        // July at 12 °C: rate 0.12·1.5·1.0 = 0.18 undamped, 0.054 damped.
        assert!((untreated.predicted_value - 0.30 * 1.18).abs() < 1e-9);
        assert!((damped.predicted_value - 0.30 * 1.054).abs() < 1e-9);
        assert!(damped.predicted_value < untreated.predicted_value);
        assert_eq!(damped.factors.treatment_count, 1);
    }

    #[test]
    fn treatment_older_than_two_weeks_does_not_damp() {
        let now = july_now();
        let history = weekly_history(now, &[0.10, 0.15, 0.22, 0.30]);
        let stale = [TreatmentRecord {
            completed_date: now.date_naive() - Duration::days(20),
            effectiveness_percent: 90.0,
        }];

        let with_stale = forecast_at(
            PopulationId::new(),
            ForecastInputs { history: &history, temperature: 12.0, treatments: &stale },
            7,
            now,
        );
        assert!((with_stale.predicted_value - 0.30 * 1.18).abs() < 1e-9);
    }

    #[test]
    fn spring_limit_tightens_classification() {
        // Same projection in May (spring limit 0.2) vs October (limit 0.5).
        let may = Utc.with_ymd_and_hms(2026, 5, 5, 6, 0, 0).unwrap();
        let october = Utc.with_ymd_and_hms(2026, 10, 5, 6, 0, 0).unwrap();
        let history_may = weekly_history(may, &[0.18, 0.19, 0.20]);
        let history_oct = weekly_history(october, &[0.18, 0.19, 0.20]);

        let p_may = forecast_at(
            PopulationId::new(),
            ForecastInputs { history: &history_may, temperature: 12.0, treatments: &[] },
            7,
            may,
        );
        let p_oct = forecast_at(
            PopulationId::new(),
            ForecastInputs { history: &history_oct, temperature: 12.0, treatments: &[] },
            7,
            october,
        );

        assert!(p_may.exceedance_probability > p_oct.exceedance_probability);
    }
}
