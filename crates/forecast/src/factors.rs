//! Environmental adjustment factors.
//!
//! Pure, stateless multipliers applied to the base weekly growth rate.
//! The constants encode regional salmon-lice biology and must be reproduced
//! exactly; they are policy/model constants, not derived data.

/// Optimal water temperature for lice development, °C.
pub const OPTIMAL_TEMP: f64 = 12.0;
/// Below this, development slows sharply.
pub const MIN_TEMP: f64 = 4.0;
/// Above this, heat stress reduces reproduction.
pub const MAX_TEMP: f64 = 20.0;

/// Seasonal growth multipliers by calendar month (index 0 = January).
///
/// February is the coldest trough (0.5), July/August the peak (1.5).
pub const SEASONAL_FACTORS: [f64; 12] = [
    0.6, // January
    0.5, // February
    0.7, // March
    0.9, // April
    1.2, // May
    1.4, // June
    1.5, // July
    1.5, // August
    1.3, // September
    1.0, // October
    0.8, // November
    0.7, // December
];

/// Growth-rate multiplier for a water temperature, degree-day style.
///
/// Triangular response centered on [`OPTIMAL_TEMP`], floored at 0.5 so
/// cold/heat stress never fully halts projected growth. Outside the
/// operating band the response is a flat 0.3 (cold) or 0.8 (heat stress).
pub fn temperature_factor(temperature: f64) -> f64 {
    if temperature < MIN_TEMP {
        return 0.3;
    }
    if temperature > MAX_TEMP {
        return 0.8;
    }

    let deviation = (temperature - OPTIMAL_TEMP).abs();
    (1.0 - deviation * 0.05).max(0.5)
}

/// Seasonal growth multiplier for a calendar month (1–12).
///
/// Out-of-range months fall back to a neutral 1.0 rather than panicking.
pub fn seasonal_factor(month: u32) -> f64 {
    match month {
        1..=12 => SEASONAL_FACTORS[(month - 1) as usize],
        _ => 1.0,
    }
}

/// Growth damping from the most recent completed treatment.
///
/// Under 7 days since completion the growth rate is cut to 0.3×; between 7
/// and 13 days the population partially recovers at 0.6×; afterwards the
/// treatment no longer damps growth. Only the single most recent treatment
/// inside the lookback window is considered by callers.
pub fn treatment_damping(days_since_treatment: Option<i64>) -> f64 {
    match days_since_treatment {
        Some(days) if days < 7 => 0.3,
        Some(days) if days < 14 => 0.6,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn optimum_temperature_gives_full_factor() {
        assert_eq!(temperature_factor(12.0), 1.0);
    }

    #[test]
    fn cold_water_flattens_to_point_three() {
        assert_eq!(temperature_factor(3.9), 0.3);
        assert_eq!(temperature_factor(-2.0), 0.3);
    }

    #[test]
    fn warm_water_flattens_to_point_eight() {
        assert_eq!(temperature_factor(20.1), 0.8);
        assert_eq!(temperature_factor(30.0), 0.8);
    }

    #[test]
    fn in_band_response_is_triangular() {
        // 4 and 20 are the band edges with deviation 8 → 0.6.
        assert!((temperature_factor(4.0) - 0.6).abs() < 1e-12);
        assert!((temperature_factor(20.0) - 0.6).abs() < 1e-12);
        assert!((temperature_factor(10.0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn seasonal_table_matches_the_published_constants() {
        let expected = [
            (1, 0.6),
            (2, 0.5),
            (3, 0.7),
            (4, 0.9),
            (5, 1.2),
            (6, 1.4),
            (7, 1.5),
            (8, 1.5),
            (9, 1.3),
            (10, 1.0),
            (11, 0.8),
            (12, 0.7),
        ];
        for (month, factor) in expected {
            assert_eq!(seasonal_factor(month), factor, "month {month}");
        }
    }

    #[test]
    fn out_of_range_month_is_neutral() {
        assert_eq!(seasonal_factor(0), 1.0);
        assert_eq!(seasonal_factor(13), 1.0);
    }

    #[test]
    fn damping_bands() {
        assert_eq!(treatment_damping(Some(0)), 0.3);
        assert_eq!(treatment_damping(Some(6)), 0.3);
        assert_eq!(treatment_damping(Some(7)), 0.6);
        assert_eq!(treatment_damping(Some(13)), 0.6);
        assert_eq!(treatment_damping(Some(14)), 1.0);
        assert_eq!(treatment_damping(None), 1.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: the temperature factor is bounded for any finite input.
        #[test]
        fn temperature_factor_is_bounded(t in -50.0f64..60.0) {
            let f = temperature_factor(t);
            prop_assert!((0.3..=1.0).contains(&f), "factor {f} out of bounds for t={t}");
        }
    }
}
