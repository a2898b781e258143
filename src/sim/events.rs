//! Notifications raised by the simulation
//!
//! The tick never plays audio or touches assets. It pushes events onto the
//! session queue and the host drains them after each tick.

use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;
use super::state::EnemyKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    BackgroundMusicStart,
    BackgroundMusicStop,
    /// Intro finished; the first wave is about to spawn
    GameStarted,
    WaveStarted {
        wave: u32,
        level: u32,
        enemies: u32,
    },
    WaveCleared {
        wave: u32,
    },
    EnemyDestroyed {
        kind: EnemyKind,
        x: f32,
        y: f32,
    },
    PlayerHit {
        health: u8,
    },
    PowerUpCollected {
        kind: PowerUpKind,
    },
    /// A timed power-up ran out
    PowerUpExpired {
        kind: PowerUpKind,
    },
    PlayerDeath,
    GameOver {
        score: u64,
    },
}
