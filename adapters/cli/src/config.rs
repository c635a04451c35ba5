//! TOML configuration for the command-line driver.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tilequest_system_actor::Config as ActorConfig;
use tilequest_world::Config as WorldConfig;

const DEFAULT_STEP_RATE: u32 = 60;

/// Settings for a driver run; every key is optional.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Simulation steps per second.
    pub(crate) step_rate: u32,
    /// Actor movement and probe geometry.
    pub(crate) actor: ActorConfig,
    /// World seed, hazard interval and inventory capacity.
    pub(crate) world: WorldConfig,
}

impl AppConfig {
    /// Reads the configuration from `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Parses the configuration from TOML text.
    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.step_rate == 0 {
            anyhow::bail!("step_rate must be positive");
        }
        Ok(config)
    }

    /// Simulated time covered by one step.
    #[must_use]
    pub(crate) fn step_duration(&self) -> Duration {
        Duration::from_secs(1) / self.step_rate.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            step_rate: DEFAULT_STEP_RATE,
            actor: ActorConfig::default(),
            world: WorldConfig::default(),
        }
    }
}
