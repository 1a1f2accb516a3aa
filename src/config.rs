//! Runtime configuration
//!
//! [`RuntimeConfig`] is plain serde data so hosts can keep it next to their
//! other settings files:
//!
//! ```
//! use asset_runtime::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_json_str(r#"{ "support_async_loading": false }"#).unwrap();
//! assert!(!config.support_async_loading);
//! assert_eq!(config.root_data_dirs.len(), 1);
//! ```

use crate::error::{AssetError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the resource manager, the job scheduler and the frame clock
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// When false every asynchronous create request is served immediately
    pub support_async_loading: bool,
    /// Directories searched in order by [`crate::assets::FileSource`]
    pub root_data_dirs: Vec<PathBuf>,
    /// Suffix inserted before the texture extension ("@2x" turns "a.png" into "a@2x.png")
    pub texture_version: Option<String>,
    /// Size scale recorded on textures loaded through the versioned name
    pub texture_version_size_multiplier: f32,
    /// Upper bound for finalizing completed jobs in one frame
    pub drain_budget_ms: f64,
    /// Frame time the host aims for
    pub target_frame_ms: f64,
    /// Per-iteration drain budget used by `wait_for_all`
    pub wait_all_drain_budget_ms: f64,
    /// How long blocking waits sleep before re-checking the queues
    pub wait_poll_ms: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            support_async_loading: true,
            root_data_dirs: vec![PathBuf::from(".")],
            texture_version: None,
            texture_version_size_multiplier: 1.0,
            drain_budget_ms: 1000.0 / 120.0,
            target_frame_ms: 1000.0 / 60.0,
            wait_all_drain_budget_ms: 1000.0,
            wait_poll_ms: 100.0,
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AssetError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.root_data_dirs.is_empty() {
            return Err(AssetError::Config(
                "root_data_dirs must name at least one directory".to_string(),
            ));
        }
        let multiplier = self.texture_version_size_multiplier;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(AssetError::Config(format!(
                "texture_version_size_multiplier must be positive, got {multiplier}"
            )));
        }
        for (name, value) in [
            ("drain_budget_ms", self.drain_budget_ms),
            ("target_frame_ms", self.target_frame_ms),
            ("wait_all_drain_budget_ms", self.wait_all_drain_budget_ms),
            ("wait_poll_ms", self.wait_poll_ms),
        ] {
            if !value.is_finite() || value <= 0.0 || millis(value).is_none() {
                return Err(AssetError::Config(format!(
                    "{name} must be a positive number of milliseconds, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn drain_budget(&self) -> Duration {
        saturating_millis(self.drain_budget_ms)
    }

    pub fn target_frame(&self) -> Duration {
        saturating_millis(self.target_frame_ms)
    }

    pub fn wait_all_drain_budget(&self) -> Duration {
        saturating_millis(self.wait_all_drain_budget_ms)
    }

    pub fn wait_poll(&self) -> Duration {
        saturating_millis(self.wait_poll_ms)
    }
}

fn millis(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value / 1000.0).ok()
}

/// Fields are public, so getters clamp values `validate` would reject
fn saturating_millis(value: f64) -> Duration {
    millis(value).unwrap_or(if value > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}
