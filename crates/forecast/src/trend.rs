//! Ordinary least-squares trend fit over a count history.

use serde::{Deserialize, Serialize};

use licewatch_core::CountPoint;

/// Closed-form OLS fit of a count history, with R² goodness-of-fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination against the mean, in `[0, 1]` for any
    /// least-squares fit.
    pub r2: f64,
}

/// Fit a line through the history by sample position.
///
/// Samples are treated as evenly spaced by index, not by elapsed days, so
/// the fit is sampling-density invariant rather than time invariant. That is
/// a deliberate modeling shortcut carried over for numeric parity with the
/// established model; irregular sampling biases the slope accordingly.
///
/// With fewer than 2 points there is nothing to fit: slope, intercept and R²
/// are all zero, and callers must not treat such a fit as statistically
/// meaningful.
pub fn estimate(points: &[CountPoint]) -> TrendEstimate {
    if points.len() < 2 {
        return TrendEstimate::default();
    }

    let n = points.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, p) in points.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += p.value;
        sum_xy += x * p.value;
        sum_x2 += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, p) in points.iter().enumerate() {
        let fitted = slope * i as f64 + intercept;
        ss_res += (p.value - fitted).powi(2);
        ss_tot += (p.value - y_mean).powi(2);
    }
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    TrendEstimate { slope, intercept, r2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn weekly_points(values: &[f64]) -> Vec<CountPoint> {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| CountPoint::new(start + chrono::Duration::days(7 * i as i64), v))
            .collect()
    }

    #[test]
    fn fewer_than_two_points_yields_the_zero_fit() {
        assert_eq!(estimate(&[]), TrendEstimate::default());
        assert_eq!(estimate(&weekly_points(&[0.4])), TrendEstimate::default());
    }

    #[test]
    fn perfect_line_is_recovered_exactly() {
        // y = 0.05x + 0.1
        let points = weekly_points(&[0.10, 0.15, 0.20, 0.25, 0.30]);
        let fit = estimate(&points);
        assert!((fit.slope - 0.05).abs() < 1e-12);
        assert!((fit.intercept - 0.10).abs() < 1e-12);
        assert!((fit.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_history_has_zero_slope_and_zero_r2() {
        // ss_tot is zero for a flat series; R² is defined as 0 there.
        let fit = estimate(&weekly_points(&[0.2, 0.2, 0.2, 0.2]));
        assert!(fit.slope.abs() < 1e-12);
        assert!((fit.intercept - 0.2).abs() < 1e-12);
        assert_eq!(fit.r2, 0.0);
    }

    #[test]
    fn noisy_growth_still_fits_well() {
        let fit = estimate(&weekly_points(&[0.10, 0.15, 0.22, 0.30]));
        assert!(fit.slope > 0.0);
        assert!(fit.r2 > 0.9, "near-linear series should fit tightly, got {}", fit.r2);
    }

    #[test]
    fn index_spacing_ignores_calendar_gaps() {
        // Same values, irregular dates: the fit must be identical because
        // the estimator is positional.
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let irregular: Vec<CountPoint> = [0.1, 0.2, 0.3]
            .iter()
            .enumerate()
            .map(|(i, &v)| CountPoint::new(start + chrono::Duration::days(3i64.pow(i as u32)), v))
            .collect();
        let regular = weekly_points(&[0.1, 0.2, 0.3]);
        assert_eq!(estimate(&irregular), estimate(&regular));
    }
}
