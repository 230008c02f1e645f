//! Derived walking metrics.
//!
//! Always recomputed from the counters, never accumulated, so repeated ticks and
//! steps cannot drift.

use serde::Serialize;

/// Average adult stride in meters.
pub const DEFAULT_STRIDE_LENGTH_M: f64 = 0.762;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkStats {
    pub distance_meters: f64,
    /// Steps per minute over the current session.
    pub frequency: u32,
}

pub fn compute(steps: u64, duration_seconds: u64, stride_length_m: f64) -> WalkStats {
    WalkStats {
        distance_meters: distance_meters(steps, stride_length_m),
        frequency: frequency(steps, duration_seconds),
    }
}

pub fn distance_meters(steps: u64, stride_length_m: f64) -> f64 {
    round2(steps as f64 * stride_length_m)
}

pub fn frequency(steps: u64, duration_seconds: u64) -> u32 {
    if duration_seconds == 0 {
        return 0;
    }
    let minutes = duration_seconds as f64 / 60.0;
    (steps as f64 / minutes).round() as u32
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_steps_in_a_minute() {
        let stats = compute(10, 60, DEFAULT_STRIDE_LENGTH_M);
        assert_eq!(stats.frequency, 10);
        assert_eq!(stats.distance_meters, 7.62);
    }

    #[test]
    fn frequency_is_zero_without_elapsed_time() {
        assert_eq!(frequency(500, 0), 0);
        assert_eq!(compute(0, 0, DEFAULT_STRIDE_LENGTH_M), WalkStats::default());
    }

    #[test]
    fn frequency_rounds_to_nearest_step() {
        // 7 steps in 40s = 10.5 spm
        assert_eq!(frequency(7, 40), 11);
        // 1 step in 7s = 8.57 spm
        assert_eq!(frequency(1, 7), 9);
    }

    #[test]
    fn distance_rounds_to_centimeters() {
        assert_eq!(distance_meters(3, DEFAULT_STRIDE_LENGTH_M), 2.29);
        assert_eq!(distance_meters(42, DEFAULT_STRIDE_LENGTH_M), 32.0);
        assert_eq!(distance_meters(0, DEFAULT_STRIDE_LENGTH_M), 0.0);
    }
}
