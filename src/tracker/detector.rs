use serde::Serialize;

use crate::models::AccelerationSample;
use crate::motion::delta::{compute_delta, exceeds};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    /// Step count after this step.
    pub steps: u64,
    pub delta: f64,
}

/// Threshold step detector.
///
/// Keeps the previous sample and the cumulative step counter. The sensitivity
/// threshold is the only noise rejection: there is no smoothing or debounce.
#[derive(Debug, Clone, Default)]
pub struct StepDetector {
    last_sample: AccelerationSample,
    steps: u64,
}

impl StepDetector {
    pub fn new(steps: u64) -> Self {
        Self {
            last_sample: AccelerationSample::ZERO,
            steps,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn last_sample(&self) -> AccelerationSample {
        self.last_sample
    }

    /// Feeds one sample. While not tracking the sample only becomes the new
    /// reference, so motion captured while idle is never counted later.
    pub fn on_sample(
        &mut self,
        sample: AccelerationSample,
        tracking: bool,
        sensitivity: f64,
    ) -> Option<StepEvent> {
        let delta = compute_delta(&self.last_sample, &sample);
        self.last_sample = sample;

        if !tracking || !exceeds(delta, sensitivity) {
            return None;
        }

        self.steps = self.steps.saturating_add(1);
        Some(StepEvent {
            steps: self.steps,
            delta,
        })
    }

    /// Zeroes the counter. The reference sample is kept.
    pub fn reset_count(&mut self) {
        self.steps = 0;
    }
}
