use std::path::Path;

use serde::Deserialize;

use crate::error::{PerfError, Result};

// ─── Defaults ────────────────────────────────────────────────────

/// Frame-rate samples kept (one second at 60 Hz).
const DEFAULT_FPS_CAPACITY: usize = 60;
/// Memory samples kept (100 s at the default cadence).
const DEFAULT_MEMORY_CAPACITY: usize = 100;
/// Block-execution and render records kept.
const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Env var pointing at an optional JSON `MonitorConfig` file.
pub const CONFIG_PATH_ENV: &str = "PERF_CONFIG";
/// Env var overriding the HTTP bind address.
pub const BIND_ENV: &str = "PERF_BIND";
/// Env var overriding the static dashboard directory.
pub const STATIC_DIR_ENV: &str = "PERF_STATIC_DIR";

// ─── Monitor configuration ───────────────────────────────────────

/// Tunables for a `MetricsCollector`.
///
/// Every field has a default, so `{}` is a valid config file and partial
/// files only override what they name.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_fps_capacity")]
    pub fps_capacity: usize,

    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Shared by the block-execution and render series
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Cadence of the self-driven frame loop and overlay refresh (ms)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Cadence of the memory sampling loop (ms)
    #[serde(default = "default_memory_interval_ms")]
    pub memory_interval_ms: u64,

    /// Frames whose delta exceeds this are counted and logged as slow (ms)
    #[serde(default = "default_slow_frame_threshold_ms")]
    pub slow_frame_threshold_ms: f64,

    /// Default cut-off for `slow_blocks` when the caller gives none (ms)
    #[serde(default = "default_slow_block_threshold_ms")]
    pub slow_block_threshold_ms: f64,

    /// Set false to skip memory sampling even when the host supports it
    #[serde(default = "default_true")]
    pub track_memory: bool,

    /// Set false to stop forwarding marks/measures to the native timeline
    #[serde(default = "default_true")]
    pub native_timeline: bool,
}

fn default_fps_capacity() -> usize {
    DEFAULT_FPS_CAPACITY
}
fn default_memory_capacity() -> usize {
    DEFAULT_MEMORY_CAPACITY
}
fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_memory_interval_ms() -> u64 {
    1_000
}
fn default_slow_frame_threshold_ms() -> f64 {
    33.0
}
fn default_slow_block_threshold_ms() -> f64 {
    16.0
}
fn default_true() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            fps_capacity: default_fps_capacity(),
            memory_capacity: default_memory_capacity(),
            event_capacity: default_event_capacity(),
            frame_interval_ms: default_frame_interval_ms(),
            memory_interval_ms: default_memory_interval_ms(),
            slow_frame_threshold_ms: default_slow_frame_threshold_ms(),
            slow_block_threshold_ms: default_slow_block_threshold_ms(),
            track_memory: true,
            native_timeline: true,
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| {
            PerfError::ConfigIo {
                path: display.clone(),
                source,
            }
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| {
            PerfError::ConfigParse {
                path: display,
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$PERF_CONFIG` if set, otherwise the defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps_capacity == 0
            || self.memory_capacity == 0
            || self.event_capacity == 0
        {
            return Err(PerfError::Config(
                "series capacities must be at least 1".into(),
            ));
        }
        if self.frame_interval_ms == 0 || self.memory_interval_ms == 0 {
            return Err(PerfError::Config(
                "sampling intervals must be at least 1 ms".into(),
            ));
        }
        let thresholds = [self.slow_frame_threshold_ms, self.slow_block_threshold_ms];
        if thresholds.iter().any(|t| t.is_nan() || *t < 0.0) {
            return Err(PerfError::Config(
                "thresholds must be non-negative numbers".into(),
            ));
        }
        Ok(())
    }
}

// ─── Server configuration ────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub static_dir: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var(BIND_ENV)
                .unwrap_or_else(|_| "0.0.0.0:3000".into()),
            static_dir: std::env::var(STATIC_DIR_ENV)
                .unwrap_or_else(|_| "static".into()),
        }
    }
}
