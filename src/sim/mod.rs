//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (timers are tick counters)
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod events;
pub mod particles;
pub mod player;
pub mod pool;
pub mod powerup;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{Bounds, Rect, intersects, touches};
pub use events::GameEvent;
pub use particles::{Particle, ParticleShape, Star};
pub use player::Direction;
pub use pool::{EntityId, Pool};
pub use powerup::{ActiveEffects, PowerUpEffect, PowerUpKind, TimedEffect};
pub use snapshot::{Hud, Snapshot};
pub use state::{
    Bullet, Drift, Enemy, EnemyKind, Facing, GamePhase, GameState, Player, PowerUp, ShotStyle,
    SpriteAnim,
};
pub use tick::{TickInput, tick};
pub use wave::{WaveState, enemies_per_wave};
