pub mod commands;
pub mod controller;
pub mod detector;
pub mod state;

pub use controller::TrackerController;
pub use detector::{StepDetector, StepEvent};
pub use state::{TrackerSnapshot, TrackerState, TrackerStatus};
