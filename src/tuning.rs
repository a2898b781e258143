//! Data-driven game balance
//!
//! Every duration is expressed in ticks (see `consts::TICK_HZ`) so the
//! simulation never depends on wall-clock timers.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Balance knobs for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player health at session start (also the health pack cap)
    pub max_health: u8,
    /// Invulnerability window after taking a hit (10 seconds)
    pub invulnerability_ticks: u32,
    /// Damage dealt by one player bullet
    pub bullet_damage: i32,
    /// Score awarded per destroyed enemy
    pub score_per_kill: u64,
    /// Chance a destroyed enemy drops a power-up
    pub powerup_drop_chance: f64,
    /// Duration of timed power-ups (10 seconds)
    pub powerup_duration_ticks: u32,
    /// Let enemies drop the timed Triple Burst pickup
    pub triple_burst_drops: bool,
    /// Base interval between shots in milliseconds
    pub base_fire_rate_ms: f32,
    /// Floor for the effective fire-rate interval
    pub min_fire_rate_ms: f32,
    /// Auto-fire cadence (500 ms)
    pub shot_interval_ticks: u32,
    /// Enemy volley interval is drawn once per session from this range
    pub enemy_fire_min_ms: f32,
    pub enemy_fire_max_ms: f32,
    /// Enemies re-roll direction and step on this cadence
    pub enemy_move_interval_ticks: u64,
    /// Chance an enemy re-rolls its direction on a movement step
    pub enemy_turn_chance: f64,
    /// Delay between a cleared wave and the next (2 seconds)
    pub wave_delay_ticks: u32,
    /// Cutscene rise speed in pixels per tick
    pub cutscene_rise_per_tick: f32,
    /// Hold after the cutscene before the first wave (10 seconds)
    pub cutscene_hold_ticks: u32,
    /// Length of the defeat sequence before game over (5 seconds)
    pub death_sequence_ticks: u32,
    /// Slowest sub-step stride reached at the end of the defeat sequence
    pub death_max_slowdown: u32,
    /// Background stars
    pub star_count: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            invulnerability_ticks: 600,
            bullet_damage: 2,
            score_per_kill: 100,
            powerup_drop_chance: 0.2,
            powerup_duration_ticks: 600,
            triple_burst_drops: false,
            base_fire_rate_ms: 50.0,
            min_fire_rate_ms: 12.5,
            shot_interval_ticks: 30,
            enemy_fire_min_ms: 500.0,
            enemy_fire_max_ms: 1500.0,
            enemy_move_interval_ticks: 30,
            enemy_turn_chance: 0.3,
            wave_delay_ticks: 120,
            cutscene_rise_per_tick: crate::consts::TILE_SIZE / 8.0,
            cutscene_hold_ticks: 600,
            death_sequence_ticks: 300,
            death_max_slowdown: 6,
            star_count: 100,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.max_health == 0 {
            return Err(invalid("max_health", "must be at least 1"));
        }
        if self.bullet_damage <= 0 {
            return Err(invalid("bullet_damage", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return Err(invalid("powerup_drop_chance", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.enemy_turn_chance) {
            return Err(invalid("enemy_turn_chance", "must be within 0..=1"));
        }
        if self.shot_interval_ticks == 0 {
            return Err(invalid("shot_interval_ticks", "must be at least 1"));
        }
        if self.enemy_move_interval_ticks == 0 {
            return Err(invalid("enemy_move_interval_ticks", "must be at least 1"));
        }
        if self.min_fire_rate_ms <= 0.0 || self.base_fire_rate_ms < self.min_fire_rate_ms {
            return Err(invalid(
                "base_fire_rate_ms",
                format!(
                    "{} must be >= min_fire_rate_ms ({}) and positive",
                    self.base_fire_rate_ms, self.min_fire_rate_ms
                ),
            ));
        }
        if self.enemy_fire_min_ms <= 0.0 || self.enemy_fire_max_ms < self.enemy_fire_min_ms {
            return Err(invalid(
                "enemy_fire_max_ms",
                "range must be positive and ordered",
            ));
        }
        if self.cutscene_rise_per_tick <= 0.0 {
            return Err(invalid("cutscene_rise_per_tick", "must be positive"));
        }
        if self.death_max_slowdown == 0 {
            return Err(invalid("death_max_slowdown", "must be at least 1"));
        }
        Ok(())
    }
}
