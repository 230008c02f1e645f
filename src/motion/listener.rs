use anyhow::{bail, Context, Result};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{models::MotionReading, tracker::TrackerController};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Owns the task that forwards a motion feed into a tracker.
pub struct MotionListener {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for MotionListener {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionListener {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn start(
        &mut self,
        feed: mpsc::Receiver<MotionReading>,
        tracker: TrackerController,
    ) -> Result<()> {
        if self.is_active() {
            bail!("motion listener already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(listen_loop(feed, tracker, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("motion listener task failed to join")
        } else {
            Ok(())
        }
    }
}

async fn listen_loop(
    mut feed: mpsc::Receiver<MotionReading>,
    tracker: TrackerController,
    cancel_token: CancellationToken,
) {
    log_info!("motion listener attached");
    let mut readings: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                // Readings delivered before the cancel still count.
                feed.close();
                while let Some(reading) = feed.recv().await {
                    readings = readings.wrapping_add(1);
                    forward(&tracker, reading).await;
                }
                log_info!("motion listener shutting down after {} readings", readings);
                break;
            }
            reading = feed.recv() => match reading {
                Some(reading) => {
                    readings = readings.wrapping_add(1);
                    forward(&tracker, reading).await;
                }
                None => {
                    log_info!("motion feed closed after {} readings", readings);
                    break;
                }
            }
        }
    }
}

async fn forward(tracker: &TrackerController, reading: MotionReading) {
    if let Some(event) = tracker.on_motion(reading).await {
        log_debug!("step {} (delta {:.2})", event.steps, event.delta);
    }
}
