/// Configuration management (`horde_survivor.toml`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entities::BOSS_SIZE;
use crate::error::GameError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Tuning carried inside the world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    /// Simulation time advanced per tick.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Chance per tick of an enemy spawn attempt.
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f64,
    #[serde(default = "default_ability_cooldown_ms")]
    pub ability_cooldown_ms: u64,
}

/// Which event classes ring the terminal bell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub shot: bool,
    #[serde(default)]
    pub exp: bool,
    #[serde(default = "default_true")]
    pub ability: bool,
    #[serde(default = "default_true")]
    pub game_over: bool,
}

fn default_width() -> f32 { 800.0 }
fn default_height() -> f32 { 600.0 }
fn default_frame_ms() -> u64 { 16 }
fn default_spawn_chance() -> f64 { 0.02 }
fn default_ability_cooldown_ms() -> u64 { 10_000 }
fn default_true() -> bool { true }

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frame_ms: default_frame_ms(),
            spawn_chance: default_spawn_chance(),
            ability_cooldown_ms: default_ability_cooldown_ms(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            shot: false,
            exp: false,
            ability: true,
            game_over: true,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        let sim = &self.sim;
        // Every entity, the boss included, has to fit inside the playfield.
        let fits = |extent: f32| extent.is_finite() && extent >= BOSS_SIZE;
        if !(fits(sim.width) && fits(sim.height)) {
            return Err(GameError::InvalidConfig(format!(
                "playfield must be finite and at least {}x{}, got {}x{}",
                BOSS_SIZE, BOSS_SIZE, sim.width, sim.height
            )));
        }
        if !(0.0..=1.0).contains(&sim.spawn_chance) {
            return Err(GameError::InvalidConfig(format!(
                "spawn_chance must be within [0, 1], got {}",
                sim.spawn_chance
            )));
        }
        if sim.frame_ms == 0 {
            return Err(GameError::InvalidConfig("frame_ms must be > 0".into()));
        }
        Ok(())
    }
}

pub fn parse(content: &str) -> Result<GameConfig, GameError> {
    let config: GameConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config file. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<GameConfig, GameError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("no config at {}, using defaults", path.display());
            Ok(GameConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
