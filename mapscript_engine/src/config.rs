//! Engine tuning loaded from `engine.toml`.
//!
//! Loading never fails: a missing or malformed file logs a warning and the
//! built-in defaults are used instead.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Built-in messages shown by nodes that reject an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineMessages {
    pub spinner_seen: String,
    pub trap_seen: String,
    pub search_failed: String,
    pub place_refused: String,
}

impl Default for EngineMessages {
    fn default() -> Self {
        Self {
            spinner_seen: "The floor here looks oddly worn in a circle.".to_string(),
            trap_seen: "You notice a trap!".to_string(),
            search_failed: "You find nothing of interest.".to_string(),
            place_refused: "You are not admitted.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weight units per gold coin.
    pub gold_weight: u32,
    /// Weight units per food ration.
    pub food_weight: u32,
    /// Skill index used for the chest search check.
    pub searching_skill: usize,
    /// Nodes a single walk may visit before it is treated as a cycle.
    pub max_chain_steps: usize,
    /// Fixed RNG seed; random when absent.
    pub rng_seed: Option<u64>,
    pub messages: EngineMessages,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gold_weight: 5,
            food_weight: 250,
            searching_skill: 8,
            max_chain_steps: 4096,
            rng_seed: None,
            messages: EngineMessages::default(),
        }
    }
}

/// Load the engine configuration, falling back to defaults on any error.
///
/// # Logging
/// - `info!` on successful load
/// - `warn!` if the file cannot be read or parsed
pub fn load_config(toml_path: &Path) -> EngineConfig {
    match try_load_config(toml_path) {
        Ok(config) => {
            info!("engine configuration loaded from '{}'", toml_path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load engine configuration from '{}': {e:#}. Using built-in defaults.",
                toml_path.display()
            );
            EngineConfig::default()
        },
    }
}

fn try_load_config(toml_path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading engine configuration from '{}'", toml_path.display()))?;
    let config: EngineConfig = toml::from_str(&text)
        .with_context(|| format!("parsing engine configuration from '{}'", toml_path.display()))?;
    if config.max_chain_steps == 0 {
        anyhow::bail!("max_chain_steps must be at least 1");
    }
    Ok(config)
}
