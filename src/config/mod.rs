//! Configuration loading and management

mod io;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::progression::{
    Achievement, Catalog, EvaluationMode, LevelCurve, ProgressionStore, RemainderPolicy,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Leveling and evaluation settings
    #[serde(default)]
    pub progression: ProgressionSettings,

    /// Replacement achievement catalog (`[[achievement]]` tables).
    /// Empty means the builtin catalog.
    #[serde(default, rename = "achievement", skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<Achievement>,
}

/// Leveling and evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionSettings {
    /// XP needed to go from level 1 to level 2
    /// Default: 100
    #[serde(default = "default_base_exp_to_next_level")]
    pub base_exp_to_next_level: u64,

    /// Threshold multiplier applied on every level-up (floored)
    /// Default: 1.5
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,

    /// "carry" keeps surplus XP after a level-up, "reset" drops it
    #[serde(default)]
    pub remainder: RemainderPolicy,

    /// "single_pass" or "fixed_point" achievement evaluation
    #[serde(default)]
    pub evaluation: EvaluationMode,
}

fn default_base_exp_to_next_level() -> u64 {
    100
}

fn default_growth_factor() -> f64 {
    1.5
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            base_exp_to_next_level: default_base_exp_to_next_level(),
            growth_factor: default_growth_factor(),
            remainder: RemainderPolicy::default(),
            evaluation: EvaluationMode::default(),
        }
    }
}

impl ProgressionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.base_exp_to_next_level == 0 {
            bail!("progression.base_exp_to_next_level must be at least 1");
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            bail!(
                "progression.growth_factor must be a finite number above 1.0, got {}",
                self.growth_factor
            );
        }
        Ok(())
    }

    pub fn level_curve(&self) -> LevelCurve {
        LevelCurve {
            base_exp_to_next_level: self.base_exp_to_next_level,
            growth_factor: self.growth_factor,
            remainder: self.remainder,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.progression.validate()?;
        Ok(config)
    }

    /// The configured catalog, or the builtin one if none is configured
    pub fn catalog(&self) -> Result<Catalog> {
        if self.achievements.is_empty() {
            return Ok(Catalog::builtin());
        }
        Catalog::new(self.achievements.clone()).context("Invalid achievement catalog")
    }

    /// Build a fresh store from this configuration
    pub fn build_store(&self) -> Result<ProgressionStore> {
        self.progression.validate()?;
        Ok(ProgressionStore::new(
            self.catalog()?,
            self.progression.level_curve(),
            self.progression.evaluation,
        ))
    }
}
