//! Power-up kinds and their effects on the player
//!
//! Each kind maps to one `PowerUpEffect`. Permanent upgrades change the
//! player's own style/fire rate; timed effects only tick down in
//! `ActiveEffects` and are folded in when the effective values are read,
//! so expiry never has to undo anything.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::{GameState, PowerUp, ShotStyle};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    DualShot,
    FireRateBoost,
    TripleShot,
    HealthPack,
    TripleBurst,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::DualShot,
        PowerUpKind::FireRateBoost,
        PowerUpKind::TripleShot,
        PowerUpKind::HealthPack,
        PowerUpKind::TripleBurst,
    ];

    /// Standard drop table
    pub const DROPS: [PowerUpKind; 4] = [
        PowerUpKind::DualShot,
        PowerUpKind::FireRateBoost,
        PowerUpKind::TripleShot,
        PowerUpKind::HealthPack,
    ];

    /// Uniform pick over the drop table. Triple Burst joins it only when
    /// `triple_burst_drops` is enabled.
    pub fn random(rng: &mut impl Rng, tuning: &Tuning) -> Self {
        let table: &[PowerUpKind] = if tuning.triple_burst_drops {
            &Self::ALL
        } else {
            &Self::DROPS
        };
        table[rng.random_range(0..table.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::DualShot => "Dual Shot",
            PowerUpKind::FireRateBoost => "Fire Rate Boost",
            PowerUpKind::TripleShot => "Triple Shot",
            PowerUpKind::HealthPack => "Health Pack",
            PowerUpKind::TripleBurst => "Triple Burst",
        }
    }
}

/// Timed effects tracked in `ActiveEffects`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedEffect {
    /// Halves the shot interval
    FireRateBoost,
    /// Triple pattern plus a halved interval
    TripleBurst,
}

impl TimedEffect {
    pub fn kind(&self) -> PowerUpKind {
        match self {
            TimedEffect::FireRateBoost => PowerUpKind::FireRateBoost,
            TimedEffect::TripleBurst => PowerUpKind::TripleBurst,
        }
    }
}

/// What collecting a power-up does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerUpEffect {
    /// Raise the permanent style if it is weaker; optionally halve the fire rate once
    UpgradeStyle {
        style: ShotStyle,
        halve_fire_rate: bool,
    },
    Timed {
        effect: TimedEffect,
        duration_ticks: u32,
    },
    Heal {
        amount: u8,
    },
}

impl PowerUpEffect {
    pub fn for_kind(kind: PowerUpKind, tuning: &Tuning) -> Self {
        match kind {
            PowerUpKind::DualShot => PowerUpEffect::UpgradeStyle {
                style: ShotStyle::Dual,
                halve_fire_rate: false,
            },
            PowerUpKind::TripleShot => PowerUpEffect::UpgradeStyle {
                style: ShotStyle::Triple,
                halve_fire_rate: true,
            },
            PowerUpKind::FireRateBoost => PowerUpEffect::Timed {
                effect: TimedEffect::FireRateBoost,
                duration_ticks: tuning.powerup_duration_ticks,
            },
            PowerUpKind::TripleBurst => PowerUpEffect::Timed {
                effect: TimedEffect::TripleBurst,
                duration_ticks: tuning.powerup_duration_ticks,
            },
            PowerUpKind::HealthPack => PowerUpEffect::Heal { amount: 1 },
        }
    }
}

/// Remaining ticks on each timed effect (0 = inactive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub fire_rate_boost_ticks: u32,
    pub triple_burst_ticks: u32,
}

impl ActiveEffects {
    fn slot(&mut self, effect: TimedEffect) -> &mut u32 {
        match effect {
            TimedEffect::FireRateBoost => &mut self.fire_rate_boost_ticks,
            TimedEffect::TripleBurst => &mut self.triple_burst_ticks,
        }
    }

    pub fn remaining(&self, effect: TimedEffect) -> u32 {
        match effect {
            TimedEffect::FireRateBoost => self.fire_rate_boost_ticks,
            TimedEffect::TripleBurst => self.triple_burst_ticks,
        }
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.remaining(effect) > 0
    }

    /// Start or refresh an effect. Refreshing resets the timer without stacking.
    pub fn activate(&mut self, effect: TimedEffect, ticks: u32) {
        *self.slot(effect) = ticks;
    }

    /// Count every active effect down one tick, returning the ones that ended
    pub fn tick(&mut self) -> Vec<TimedEffect> {
        let mut expired = Vec::new();
        for effect in [TimedEffect::FireRateBoost, TimedEffect::TripleBurst] {
            let slot = self.slot(effect);
            if *slot > 0 {
                *slot -= 1;
                if *slot == 0 {
                    expired.push(effect);
                }
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl GameState {
    /// Shooting pattern after temporary overrides
    pub fn effective_style(&self) -> ShotStyle {
        if self.effects.is_active(TimedEffect::TripleBurst) {
            ShotStyle::TripleBurst
        } else {
            self.player.style
        }
    }

    /// Shot interval in milliseconds after temporary modifiers, never below the floor
    pub fn effective_fire_rate_ms(&self) -> f32 {
        let mut rate = self.player.fire_rate_ms;
        if self.effects.is_active(TimedEffect::FireRateBoost) {
            rate /= 2.0;
        }
        if self.effects.is_active(TimedEffect::TripleBurst) {
            rate /= 2.0;
        }
        rate.max(self.tuning.min_fire_rate_ms)
    }
}

/// Drop a random power-up at `pos`
pub fn spawn_powerup(state: &mut GameState, pos: Vec2) -> PowerUpKind {
    let kind = PowerUpKind::random(&mut state.rng, &state.tuning);
    state.powerups.spawn(PowerUp::new(kind, pos));
    log::debug!("{} dropped at ({:.0}, {:.0})", kind.name(), pos.x, pos.y);
    kind
}

/// Apply a collected power-up to the player
pub fn apply_powerup(state: &mut GameState, kind: PowerUpKind) {
    match PowerUpEffect::for_kind(kind, &state.tuning) {
        PowerUpEffect::UpgradeStyle {
            style,
            halve_fire_rate,
        } => {
            let player = &mut state.player;
            if player.style < style {
                player.style = style;
                if halve_fire_rate {
                    player.fire_rate_ms =
                        (player.fire_rate_ms / 2.0).max(state.tuning.min_fire_rate_ms);
                }
            }
        }
        PowerUpEffect::Timed {
            effect,
            duration_ticks,
        } => state.effects.activate(effect, duration_ticks),
        PowerUpEffect::Heal { amount } => {
            let player = &mut state.player;
            player.health = player.health.saturating_add(amount).min(player.max_health);
        }
    }
    log::debug!("Collected {}", kind.name());
    state.emit(GameEvent::PowerUpCollected { kind });
}

/// Count timed effects down and announce the ones that ended
pub fn expire_effects(state: &mut GameState) {
    for effect in state.effects.tick() {
        log::debug!("{} wore off", effect.kind().name());
        state.emit(GameEvent::PowerUpExpired {
            kind: effect.kind(),
        });
    }
}
