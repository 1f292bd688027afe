//! Configuration loading for ADSPA.
//!
//! Reads `~/.adspa/config.toml` (or an explicit path) and resolves the raw
//! TOML sections into [`SimulationSettings`] and [`UiOptions`].
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [simulation]
//! total_duration_ms = 10000
//! grace_period_ms = 500
//! result_video = "after.mp4"
//!
//! [[simulation.phases]]
//! label = "Choosing the best spot to insert"
//! duration_ms = 3000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use adspa_types::{
    DEFAULT_RESULT_VIDEO, Phase, PlanError, SimulationSettings, TotalOverride, UiOptions,
    default_phases,
};

#[derive(Debug, Default, Deserialize)]
pub struct AdspaConfig {
    pub app: Option<AppConfig>,
    pub simulation: Option<SimulationConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid simulation phases: {0}")]
    Plan(#[from] PlanError),
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Freeze spinners and other motion effects.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulationConfig {
    /// Stretch or shrink all phases to this total. Non-positive values are ignored.
    pub total_duration_ms: Option<f64>,
    pub grace_period_ms: Option<u64>,
    pub result_video: Option<String>,
    /// Ordered phase list. Empty means the built-in three phases.
    #[serde(default)]
    pub phases: Vec<PhaseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhaseConfig {
    pub label: String,
    pub duration_ms: f64,
}

impl AdspaConfig {
    /// Load from the default location. A missing file is not an error.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            })
            .unwrap_or_default()
    }

    /// Resolve the `[simulation]` section, filling gaps with defaults.
    pub fn simulation_settings(&self) -> Result<SimulationSettings, ConfigError> {
        let Some(sim) = self.simulation.as_ref() else {
            return Ok(SimulationSettings::default());
        };

        let phases = if sim.phases.is_empty() {
            default_phases()
        } else {
            sim.phases
                .iter()
                .map(|entry| Phase::from_millis(entry.label.clone(), entry.duration_ms))
                .collect::<Result<Vec<_>, _>>()?
        };

        let total_override = sim.total_duration_ms.and_then(|millis| {
            let parsed = TotalOverride::from_millis(millis);
            if parsed.is_none() {
                tracing::warn!(
                    total_duration_ms = millis,
                    "Ignoring out-of-range total duration override"
                );
            }
            parsed
        });

        Ok(SimulationSettings {
            phases,
            total_override,
            grace_period: Duration::from_millis(sim.grace_period_ms.unwrap_or(0)),
            result_video: sim
                .result_video
                .clone()
                .unwrap_or_else(|| DEFAULT_RESULT_VIDEO.to_string()),
        })
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".adspa").join("config.toml"))
}
