use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::stats::DEFAULT_STRIDE_LENGTH_M;

pub const CONFIG_FILE_NAME: &str = "steptrack.json";

/// Tunables for the tracking engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    pub stride_length_m: f64,
    pub default_sensitivity: f64,
    pub min_sensitivity: f64,
    pub max_sensitivity: f64,
    pub sensitivity_step: f64,
    /// Period of the duration ticker. One second outside of tests.
    #[serde(with = "millis")]
    pub tick_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stride_length_m: DEFAULT_STRIDE_LENGTH_M,
            default_sensitivity: 12.0,
            min_sensitivity: 5.0,
            max_sensitivity: 20.0,
            sensitivity_step: 0.5,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl TrackerConfig {
    /// Clamps into the slider range and snaps to the slider step.
    /// Non-finite input yields `None`.
    pub fn normalize_sensitivity(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let clamped = value.clamp(self.min_sensitivity, self.max_sensitivity);
        if self.sensitivity_step <= 0.0 {
            return Some(clamped);
        }
        let steps = ((clamped - self.min_sensitivity) / self.sensitivity_step).round();
        let snapped = self.min_sensitivity + steps * self.sensitivity_step;
        Some(snapped.clamp(self.min_sensitivity, self.max_sensitivity))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.stride_length_m.is_finite() && self.stride_length_m > 0.0) {
            bail!("stride length must be positive, got {}", self.stride_length_m);
        }
        if !(self.min_sensitivity > 0.0 && self.min_sensitivity <= self.max_sensitivity) {
            bail!(
                "invalid sensitivity bounds {}..={}",
                self.min_sensitivity,
                self.max_sensitivity
            );
        }
        if self.tick_interval.is_zero() {
            bail!("tick interval must be non-zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreBackend {
    Sqlite,
    Json,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "json" => Some(Self::Json),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MotionSourceKind {
    /// Samples arrive as `sample` messages on stdin.
    Stdin,
    Simulated,
    None,
}

impl MotionSourceKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdin" => Some(Self::Stdin),
            "simulated" => Some(Self::Simulated),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Host-level settings for the `steptrack` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store: StoreBackend,
    pub motion: MotionSourceKind,
    pub debug: bool,
    pub tracker: TrackerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".steptrack"),
            store: StoreBackend::Sqlite,
            motion: MotionSourceKind::Stdin,
            debug: false,
            tracker: TrackerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `steptrack.json` from `dir` if present, then applies environment
    /// overrides. A config file that does not parse falls back to defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::from_file(dir)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.tracker.validate()?;
        Ok(config)
    }

    pub fn from_file(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        let config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed {}: {err}", path.display());
                AppConfig::default()
            })
        } else {
            AppConfig::default()
        };
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("STEPTRACK_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(store) = lookup("STEPTRACK_STORE").as_deref().and_then(StoreBackend::parse) {
            self.store = store;
        }
        if let Some(motion) = lookup("STEPTRACK_MOTION")
            .as_deref()
            .and_then(MotionSourceKind::parse)
        {
            self.motion = motion;
        }
        if let Some(debug) = lookup("STEPTRACK_DEBUG") {
            self.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
