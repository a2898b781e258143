//! Read-only view of a session for renderers and the HUD

use serde::Serialize;

use super::particles::{Particle, Star};
use super::pool::Pool;
use super::powerup::ActiveEffects;
use super::state::{Bullet, Enemy, GamePhase, GameState, Player, PowerUp, ShotStyle};

/// Numbers shown on the heads-up display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub level: u32,
    pub wave: u32,
    pub health: u8,
    pub max_health: u8,
    pub phase: GamePhase,
    pub style: ShotStyle,
    pub invulnerable: bool,
    pub enemies_remaining: usize,
    pub destroyed: u32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub hud: Hud,
    pub player: &'a Player,
    pub effects: ActiveEffects,
    pub player_bullets: &'a Pool<Bullet>,
    pub enemy_bullets: &'a Pool<Bullet>,
    pub enemies: &'a Pool<Enemy>,
    pub powerups: &'a Pool<PowerUp>,
    pub particles: &'a Pool<Particle>,
    pub stars: &'a Pool<Star>,
}

impl GameState {
    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            level: self.wave.level,
            wave: self.wave.wave,
            health: self.player.health,
            max_health: self.player.max_health,
            phase: self.phase,
            style: self.effective_style(),
            invulnerable: self.player.invulnerable,
            enemies_remaining: self.enemies.len(),
            destroyed: self.wave.destroyed,
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tick: self.time_ticks,
            hud: self.hud(),
            player: &self.player,
            effects: self.effects,
            player_bullets: &self.player_bullets,
            enemy_bullets: &self.enemy_bullets,
            enemies: &self.enemies,
            powerups: &self.powerups,
            particles: &self.particles,
            stars: &self.stars,
        }
    }
}
