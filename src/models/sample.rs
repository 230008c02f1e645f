use serde::{Deserialize, Serialize};

/// One instant of gravity-inclusive acceleration, in m/s².
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerationSample {
    pub const ZERO: AccelerationSample = AccelerationSample {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A motion event as delivered by the host sensor.
///
/// Devices without a gravity-inclusive accelerometer deliver events with no
/// sample; those are dropped before they reach the step detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionReading {
    pub acceleration_including_gravity: Option<AccelerationSample>,
}

impl MotionReading {
    pub fn from_sample(sample: AccelerationSample) -> Self {
        Self {
            acceleration_including_gravity: Some(sample),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
