//! Star Raid - A top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pools, collisions, waves, power-ups)
//! - `classic`: The older five-level ruleset, kept as a second game mode
//! - `audio`: Maps simulation events to named sound cues
//! - `settings`: Player-facing options (quality preset, volumes)
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod classic;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::{ConfigError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (one tick per display frame)
    pub const TICK_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield grid
    pub const TILE_SIZE: f32 = 32.0;
    pub const GRID_COLS: u32 = 24;
    pub const GRID_ROWS: u32 = 32;
    pub const SCREEN_WIDTH: f32 = TILE_SIZE * GRID_COLS as f32; // 768px
    pub const SCREEN_HEIGHT: f32 = TILE_SIZE * GRID_ROWS as f32; // 1024px

    /// Player ship occupies 3x3 tiles
    pub const PLAYER_SIZE: f32 = TILE_SIZE * 3.0;
    /// Distance moved per directional key event
    pub const PLAYER_STEP: f32 = TILE_SIZE * 2.0;
    /// Resting height once the intro cutscene finishes
    pub const PLAYER_HOME_Y: f32 = SCREEN_HEIGHT - 4.0 * TILE_SIZE;

    /// Player bullets
    pub const PLAYER_BULLET_WIDTH: f32 = 12.0;
    pub const PLAYER_BULLET_HEIGHT: f32 = 30.0;
    pub const PLAYER_BULLET_SPEED: f32 = TILE_SIZE / 2.0;

    /// Enemy bullets (one tile square, very slow)
    pub const ENEMY_BULLET_SIZE: f32 = TILE_SIZE;
    pub const ENEMY_BULLET_SPEED: f32 = TILE_SIZE / 100.0;

    /// Enemies occupy 3x3 tiles regardless of kind
    pub const ENEMY_SIZE: f32 = TILE_SIZE * 3.0;

    /// Power-ups
    pub const POWERUP_SIZE: f32 = TILE_SIZE;
    pub const POWERUP_FALL_SPEED: f32 = TILE_SIZE / 50.0;

    /// Starfield
    pub const STAR_SPEED: f32 = 0.2;

    /// Explosions
    pub const EXPLOSION_PARTICLES: usize = 20;
    pub const PARTICLE_FADE_PER_TICK: f32 = 0.02;

    /// Explosion colors (0xRRGGBB)
    pub const COLOR_ENEMY_EXPLOSION: u32 = 0xFF0000;
    pub const COLOR_PLAYER_EXPLOSION: u32 = 0xFFFF00;
}

/// Convert a wall-clock duration in milliseconds to whole ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: f32) -> u32 {
    (ms * consts::TICK_HZ as f32 / 1000.0).ceil().max(0.0) as u32
}
