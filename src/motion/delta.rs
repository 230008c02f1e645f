//! Motion delta monitor.
//!
//! The motion-intensity signal is the L1 distance between two consecutive
//! gravity-inclusive samples. It is cheap enough to evaluate on every sensor
//! event and needs no per-axis calibration.

use crate::models::AccelerationSample;

/// `|Δx| + |Δy| + |Δz|` between `previous` and `current`.
pub fn compute_delta(previous: &AccelerationSample, current: &AccelerationSample) -> f64 {
    (current.x - previous.x).abs() + (current.y - previous.y).abs() + (current.z - previous.z).abs()
}

/// A delta qualifies as a step only when it is strictly above the threshold.
pub fn exceeds(delta: f64, sensitivity: f64) -> bool {
    delta > sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_l1_norm() {
        let a = AccelerationSample::new(1.0, -2.0, 9.5);
        let b = AccelerationSample::new(-1.0, 1.0, 10.0);
        assert_eq!(compute_delta(&a, &b), 2.0 + 3.0 + 0.5);
        assert_eq!(compute_delta(&b, &a), compute_delta(&a, &b));
    }

    #[test]
    fn identical_samples_have_zero_delta() {
        let a = AccelerationSample::new(0.3, 9.81, -0.2);
        assert_eq!(compute_delta(&a, &a), 0.0);
    }

    #[test]
    fn bootstrap_delta_against_zero_seed_is_magnitude_sum() {
        let first = AccelerationSample::new(0.0, 0.0, 9.81);
        assert_eq!(compute_delta(&AccelerationSample::ZERO, &first), 9.81);
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!exceeds(12.0, 12.0));
        assert!(exceeds(12.0001, 12.0));
        assert!(!exceeds(5.0, 12.0));
    }
}
