use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{AccelerationSample, Session},
    stats,
    store::PersistedCounters,
    utils::format::format_duration,
};

use super::detector::{StepDetector, StepEvent};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TrackerStatus {
    #[default]
    Idle,
    Tracking,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub status: TrackerStatus,
    pub is_tracking: bool,
    pub steps: u64,
    pub sensitivity: f64,
    pub duration_seconds: u64,
    pub duration_label: String,
    pub distance_meters: f64,
    pub frequency: u32,
    pub motion_supported: bool,
    pub sessions: Vec<Session>,
}

/// The engine's single mutable aggregate.
///
/// Every mutation goes through one of the methods below; derived metrics are
/// recomputed at the end of each one that touches steps or duration.
#[derive(Debug, Clone)]
pub struct TrackerState {
    pub status: TrackerStatus,
    pub sensitivity: f64,
    pub duration_seconds: u64,
    pub distance_meters: f64,
    pub frequency: u32,
    pub sessions: Vec<Session>,
    pub motion_supported: bool,
    /// Bumped on every start; a ticker only counts for the epoch it was
    /// spawned in.
    pub epoch: u64,
    detector: StepDetector,
    stride_length_m: f64,
}

impl TrackerState {
    pub fn restore(counters: PersistedCounters, stride_length_m: f64) -> Self {
        let mut state = Self {
            status: TrackerStatus::Idle,
            sensitivity: counters.sensitivity,
            duration_seconds: 0,
            distance_meters: 0.0,
            frequency: 0,
            sessions: Vec::new(),
            motion_supported: false,
            epoch: 0,
            detector: StepDetector::new(counters.steps),
            stride_length_m,
        };
        state.recompute();
        state
    }

    pub fn steps(&self) -> u64 {
        self.detector.steps()
    }

    pub fn is_tracking(&self) -> bool {
        self.status == TrackerStatus::Tracking
    }

    pub fn last_sample(&self) -> AccelerationSample {
        self.detector.last_sample()
    }

    /// Idle -> Tracking. Returns `false` if already tracking.
    pub fn begin_tracking(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_tracking() {
            return false;
        }
        self.status = TrackerStatus::Tracking;
        self.epoch = self.epoch.wrapping_add(1);
        self.duration_seconds = 0;
        self.sessions.push(Session::begin(now));
        self.recompute();
        true
    }

    /// Tracking -> Idle, closing the last session if it is still open.
    /// Returns `false` if already idle.
    pub fn end_tracking(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_tracking() {
            return false;
        }
        self.status = TrackerStatus::Idle;
        if let Some(last) = self.sessions.last_mut() {
            last.close(now);
        }
        true
    }

    pub fn apply_sample(&mut self, sample: AccelerationSample) -> Option<StepEvent> {
        let event = self
            .detector
            .on_sample(sample, self.is_tracking(), self.sensitivity)?;
        self.recompute();
        Some(event)
    }

    /// One elapsed second for the ticker spawned in `epoch`. Returns `false`
    /// when that ticker is stale and must exit.
    pub fn tick(&mut self, epoch: u64) -> bool {
        if !self.is_tracking() || self.epoch != epoch {
            return false;
        }
        self.duration_seconds = self.duration_seconds.saturating_add(1);
        self.recompute();
        true
    }

    pub fn reset_counters(&mut self) {
        self.detector.reset_count();
        self.duration_seconds = 0;
        self.recompute();
    }

    pub fn delete_session(&mut self, index: usize) -> Option<Session> {
        if index >= self.sessions.len() {
            return None;
        }
        Some(self.sessions.remove(index))
    }

    /// Drops every closed session; an ongoing one is kept. Returns how many
    /// were removed.
    pub fn clear_history(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(Session::is_ongoing);
        before - self.sessions.len()
    }

    pub fn recompute(&mut self) {
        let walk = stats::compute(self.steps(), self.duration_seconds, self.stride_length_m);
        self.distance_meters = walk.distance_meters;
        self.frequency = walk.frequency;
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            status: self.status,
            is_tracking: self.is_tracking(),
            steps: self.steps(),
            sensitivity: self.sensitivity,
            duration_seconds: self.duration_seconds,
            duration_label: format_duration(self.duration_seconds),
            distance_meters: self.distance_meters,
            frequency: self.frequency,
            motion_supported: self.motion_supported,
            sessions: self.sessions.clone(),
        }
    }
}
