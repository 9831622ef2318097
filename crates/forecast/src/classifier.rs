//! Risk classification of a projected count ratio.

use licewatch_core::RiskLevel;

use crate::limits::LICE_LIMITS;

/// Estimated probability that the projection crosses the regulatory limit.
///
/// A step function of the signed distance `limit − predicted`; the
/// calendar-dependent limit (spring vs standard) enters through the `limit`
/// argument. Monotonically non-increasing in the distance and always in
/// `[0.1, 0.95]`.
pub fn exceedance_probability(limit: f64, predicted: f64) -> f64 {
    let distance = limit - predicted;
    if distance <= 0.0 {
        0.95
    } else if distance < 0.1 {
        0.80
    } else if distance < 0.2 {
        0.50
    } else if distance < 0.3 {
        0.30
    } else {
        0.10
    }
}

/// Ordinal risk level from the projected value and exceedance probability.
///
/// First-matching rule, highest severity first; the level thresholds use the
/// standard (non-spring) limits, with the spring tightening flowing in
/// through the probability input.
pub fn classify(predicted: f64, probability: f64) -> RiskLevel {
    if predicted >= LICE_LIMITS.critical_threshold || probability >= 0.9 {
        RiskLevel::Critical
    } else if predicted >= LICE_LIMITS.adult_female_limit || probability >= 0.7 {
        RiskLevel::High
    } else if predicted >= LICE_LIMITS.warning_threshold || probability >= 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::{limit_for_month, LICE_LIMITS};
    use proptest::prelude::*;

    #[test]
    fn probability_steps_match_the_distance_bands() {
        let limit = 0.5;
        assert_eq!(exceedance_probability(limit, 0.60), 0.95); // over the limit
        assert_eq!(exceedance_probability(limit, 0.50), 0.95); // at the limit
        assert_eq!(exceedance_probability(limit, 0.45), 0.80);
        assert_eq!(exceedance_probability(limit, 0.35), 0.50);
        assert_eq!(exceedance_probability(limit, 0.25), 0.30);
        assert_eq!(exceedance_probability(limit, 0.10), 0.10);
    }

    #[test]
    fn critical_rule_takes_precedence() {
        // At the critical threshold with a near-certain exceedance the level
        // must resolve CRITICAL, never a lower rule.
        assert_eq!(classify(LICE_LIMITS.critical_threshold, 0.95), RiskLevel::Critical);
        // Either branch alone suffices.
        assert_eq!(classify(LICE_LIMITS.critical_threshold, 0.10), RiskLevel::Critical);
        assert_eq!(classify(0.05, 0.95), RiskLevel::Critical);
    }

    #[test]
    fn high_medium_low_bands() {
        assert_eq!(classify(0.55, 0.10), RiskLevel::High);
        assert_eq!(classify(0.10, 0.80), RiskLevel::High);
        assert_eq!(classify(0.35, 0.10), RiskLevel::Medium);
        assert_eq!(classify(0.10, 0.50), RiskLevel::Medium);
        assert_eq!(classify(0.10, 0.10), RiskLevel::Low);
    }

    #[test]
    fn spring_limit_raises_the_probability_for_the_same_projection() {
        let predicted = 0.25;
        let spring = exceedance_probability(limit_for_month(4), predicted);
        let standard = exceedance_probability(limit_for_month(7), predicted);
        assert!(spring > standard, "spring {spring} vs standard {standard}");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: probability is in [0, 1] and non-increasing as the
        /// distance to the limit grows.
        #[test]
        fn probability_is_bounded_and_monotone(
            predicted_a in 0.0f64..3.0,
            predicted_b in 0.0f64..3.0,
        ) {
            let limit = LICE_LIMITS.adult_female_limit;
            let pa = exceedance_probability(limit, predicted_a);
            let pb = exceedance_probability(limit, predicted_b);
            prop_assert!((0.0..=1.0).contains(&pa));
            // Larger distance (smaller prediction) never yields a larger
            // probability.
            let (near, far) = if predicted_a >= predicted_b {
                (pa, pb)
            } else {
                (pb, pa)
            };
            prop_assert!(near >= far);
        }
    }
}
