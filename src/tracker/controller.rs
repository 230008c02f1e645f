use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use log::{debug, info, warn};
use tokio::{
    sync::{watch, Mutex},
    task::{self, JoinHandle},
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    config::TrackerConfig,
    models::MotionReading,
    motion::{MotionListener, MotionSource},
    share,
    store::PersistenceStore,
};

use super::{
    detector::StepEvent,
    state::{TrackerSnapshot, TrackerState},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Drives a [`TrackerState`] from motion readings, the duration ticker and
/// UI commands.
///
/// Each handler holds the state lock for its whole run, so handlers never
/// interleave and run in the order they acquire the lock. A snapshot is
/// published before the lock is released.
#[derive(Clone)]
pub struct TrackerController {
    state: Arc<Mutex<TrackerState>>,
    store: PersistenceStore,
    config: Arc<TrackerConfig>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    motion: Arc<Mutex<MotionListener>>,
    snapshots: Arc<watch::Sender<TrackerSnapshot>>,
}

impl TrackerController {
    pub fn new(config: TrackerConfig, store: PersistenceStore) -> Self {
        let counters = store.load();
        let sensitivity = config
            .normalize_sensitivity(counters.sensitivity)
            .unwrap_or(config.default_sensitivity);
        if sensitivity != counters.sensitivity {
            warn!(
                "Stored sensitivity {} outside {}..={}, using {}",
                counters.sensitivity, config.min_sensitivity, config.max_sensitivity, sensitivity
            );
            store.save_sensitivity(sensitivity);
        }

        let mut state = TrackerState::restore(counters, config.stride_length_m);
        state.sensitivity = sensitivity;
        info!(
            "Tracker restored: {} steps, sensitivity {}",
            state.steps(),
            state.sensitivity
        );

        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            state: Arc::new(Mutex::new(state)),
            store,
            config: Arc::new(config),
            ticker: Arc::new(Mutex::new(None)),
            motion: Arc::new(Mutex::new(MotionListener::new())),
            snapshots: Arc::new(snapshots),
        }
    }

    /// Same as [`TrackerController::new`], with the store reads moved off
    /// the async runtime.
    pub async fn open(config: TrackerConfig, store: PersistenceStore) -> Result<Self> {
        task::spawn_blocking(move || Self::new(config, store))
            .await
            .context("tracker restore task failed")
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Receives every snapshot published after a completed handler.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn start(&self) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        if !guard.begin_tracking(Utc::now()) {
            debug!("start ignored: already tracking");
            return guard.snapshot();
        }

        // Spawned under the state lock: no tick can run before the new
        // session is visible.
        self.spawn_ticker(guard.epoch).await;
        info!("Tracking started (session #{})", guard.sessions.len());
        self.publish(&guard)
    }

    pub async fn stop(&self) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        if !guard.end_tracking(Utc::now()) {
            debug!("stop ignored: not tracking");
            return guard.snapshot();
        }

        // Cancelled under the same lock as the transition; a tick already
        // waiting on the lock sees Idle and exits without counting.
        self.cancel_ticker().await;
        info!(
            "Tracking stopped after {}s with {} steps",
            guard.duration_seconds,
            guard.steps()
        );
        self.publish(&guard)
    }

    /// Zeroes steps, distance, duration and frequency. History is kept.
    pub async fn reset(&self) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        guard.reset_counters();
        self.store.save_steps(0);
        info!("Counters reset");
        self.publish(&guard)
    }

    /// `reset` plus clearing every closed session.
    pub async fn reset_all(&self) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        guard.reset_counters();
        self.store.save_steps(0);
        let removed = guard.clear_history();
        info!("Counters reset and {removed} sessions cleared");
        self.publish(&guard)
    }

    pub async fn clear_history(&self) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        let removed = guard.clear_history();
        debug!("Cleared {removed} sessions");
        self.publish(&guard)
    }

    pub async fn delete_session(&self, index: usize) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        match guard.delete_session(index) {
            Some(session) => {
                debug!("Deleted session {} at index {index}", session.id);
                self.publish(&guard)
            }
            None => {
                debug!(
                    "delete ignored: index {index} out of range ({} sessions)",
                    guard.sessions.len()
                );
                guard.snapshot()
            }
        }
    }

    /// Applies a slider value. Out-of-range values are clamped and snapped
    /// to the slider step; non-finite values are ignored.
    pub async fn set_sensitivity(&self, value: f64) -> TrackerSnapshot {
        let mut guard = self.state.lock().await;
        let Some(sensitivity) = self.config.normalize_sensitivity(value) else {
            debug!("sensitivity ignored: {value} is not finite");
            return guard.snapshot();
        };

        guard.sensitivity = sensitivity;
        self.store.save_sensitivity(sensitivity);
        debug!("Sensitivity set to {sensitivity}");
        self.publish(&guard)
    }

    /// Handles one sensor event. Readings without gravity-inclusive data are
    /// dropped.
    pub async fn on_motion(&self, reading: MotionReading) -> Option<StepEvent> {
        let sample = reading.acceleration_including_gravity?;
        let mut guard = self.state.lock().await;
        let event = guard.apply_sample(sample)?;
        self.store.save_steps(event.steps);
        self.publish(&guard);
        Some(event)
    }

    /// Checks the source once and, if supported, starts forwarding its feed.
    /// The outcome is exposed as `motion_supported` on snapshots.
    pub async fn attach_motion(&self, source: Box<dyn MotionSource>) -> Result<bool> {
        let supported = source.is_supported();
        if supported {
            match source.into_feed() {
                Some(feed) => self.motion.lock().await.start(feed, self.clone())?,
                None => debug!("Motion delivered inline by the host"),
            }
        } else {
            warn!("Motion sensing unsupported; steps will not increment from motion");
        }

        let mut guard = self.state.lock().await;
        guard.motion_supported = supported;
        self.publish(&guard);
        Ok(supported)
    }

    /// Human-readable summary of the most recent session, in local time.
    pub async fn share_summary(&self) -> Option<String> {
        let guard = self.state.lock().await;
        share::summarize_latest(
            &guard.sessions,
            guard.distance_meters,
            guard.duration_seconds,
            &Local,
        )
    }

    /// Tears down the background tasks and stops tracking. Readings already
    /// queued on the motion feed are applied before the session closes.
    pub async fn shutdown(&self) -> Result<()> {
        let detached = self.motion.lock().await.stop().await;
        self.stop().await;
        self.cancel_ticker().await;
        detached
    }

    pub async fn ticker_active(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn spawn_ticker(&self, epoch: u64) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let snapshots = self.snapshots.clone();
        let period = self.config.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let mut guard = state.lock().await;
                if !guard.tick(epoch) {
                    log_debug!("ticker for epoch {} exiting", epoch);
                    break;
                }
                snapshots.send_replace(guard.snapshot());
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn publish(&self, state: &TrackerState) -> TrackerSnapshot {
        let snapshot = state.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}
