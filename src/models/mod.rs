pub mod sample;
pub mod session;

pub use sample::{AccelerationSample, MotionReading};
pub use session::Session;
