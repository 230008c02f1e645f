pub mod delta;
pub mod listener;
pub mod simulated;
pub mod source;

pub use listener::MotionListener;
pub use simulated::{GaitSignal, SimulatedWalk};
pub use source::{ChannelSource, InlineSource, MotionSource, UnsupportedSource};
