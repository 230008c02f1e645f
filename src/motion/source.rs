use tokio::sync::mpsc;

use crate::models::MotionReading;

/// A push-based acceleration feed.
///
/// Support is decided once, when the source is attached to a tracker. An
/// unsupported source is never asked for its feed.
pub trait MotionSource: Send + 'static {
    fn is_supported(&self) -> bool;

    /// The queue the tracker drains on its own task, or `None` when the host
    /// calls `TrackerController::on_motion` itself.
    fn into_feed(self: Box<Self>) -> Option<mpsc::Receiver<MotionReading>>;
}

/// Feed driven by the host through the paired sender.
///
/// Readings are applied by a listener task, so they are not ordered against
/// commands the host issues directly on the controller.
pub struct ChannelSource {
    receiver: mpsc::Receiver<MotionReading>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<MotionReading>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (sender, Self { receiver })
    }
}

impl MotionSource for ChannelSource {
    fn is_supported(&self) -> bool {
        true
    }

    fn into_feed(self: Box<Self>) -> Option<mpsc::Receiver<MotionReading>> {
        Some(self.receiver)
    }
}

/// Readings arrive on the same path as the host's commands and are applied
/// in call order.
pub struct InlineSource;

impl MotionSource for InlineSource {
    fn is_supported(&self) -> bool {
        true
    }

    fn into_feed(self: Box<Self>) -> Option<mpsc::Receiver<MotionReading>> {
        None
    }
}

/// Stand-in for hosts without an accelerometer.
pub struct UnsupportedSource;

impl MotionSource for UnsupportedSource {
    fn is_supported(&self) -> bool {
        false
    }

    fn into_feed(self: Box<Self>) -> Option<mpsc::Receiver<MotionReading>> {
        None
    }
}
