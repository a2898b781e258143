//! Wave progression and the intro cutscene

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::{Drift, Enemy, EnemyKind, GamePhase, GameState};
use crate::consts::*;

/// Enemies in a wave for a given level
pub fn enemies_per_wave(level: u32) -> u32 {
    5 + level.saturating_sub(1) * 2
}

/// Wave bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    pub wave: u32,
    pub level: u32,
    pub enemies_per_wave: u32,
    /// Enemies destroyed this session
    pub destroyed: u32,
    /// Ticks until the pending wave spawns
    pub next_wave_in: Option<u32>,
}

impl WaveState {
    pub fn new() -> Self {
        Self {
            wave: 1,
            level: 1,
            enemies_per_wave: enemies_per_wave(1),
            destroyed: 0,
            next_wave_in: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.next_wave_in.is_some()
    }
}

impl Default for WaveState {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill the enemy pool for the current wave, staggered above the screen
pub fn spawn_wave(state: &mut GameState) {
    let count = state.wave.enemies_per_wave;
    // Rightmost column that still fits a whole ship on screen
    let last_col = GRID_COLS - (ENEMY_SIZE / TILE_SIZE) as u32;
    state.enemies.clear();

    for i in 0..count {
        let kind = EnemyKind::random(&mut state.rng);
        let column = state.rng.random_range(0..=last_col);
        let pos = Vec2::new(column as f32 * TILE_SIZE, -TILE_SIZE * (i % 5) as f32);
        let drift = Drift::random(&mut state.rng);
        state.enemies.spawn(Enemy::new(kind, pos, drift));
    }

    log::info!(
        "Wave {} (level {}): {} enemies",
        state.wave.wave,
        state.wave.level,
        count
    );
    state.emit(GameEvent::WaveStarted {
        wave: state.wave.wave,
        level: state.wave.level,
        enemies: count,
    });
}

/// Advance counters and schedule the next wave after a clear
pub fn schedule_next_wave(state: &mut GameState) {
    let cleared = state.wave.wave;
    let wave = &mut state.wave;
    wave.wave += 1;
    wave.level += 1;
    wave.enemies_per_wave = enemies_per_wave(wave.level);

    log::info!("Wave {} cleared", cleared);
    state.emit(GameEvent::WaveCleared { wave: cleared });

    if state.tuning.wave_delay_ticks == 0 {
        spawn_wave(state);
    } else {
        state.wave.next_wave_in = Some(state.tuning.wave_delay_ticks);
        state.phase = GamePhase::WaitingForNextWave;
    }
}

/// Clear detection and the between-waves countdown
pub fn update_waves(state: &mut GameState) {
    match state.phase {
        GamePhase::Playing if state.enemies.is_empty() => schedule_next_wave(state),
        GamePhase::WaitingForNextWave => {
            let remaining = state.wave.next_wave_in.unwrap_or(0).saturating_sub(1);
            if remaining == 0 {
                state.wave.next_wave_in = None;
                state.phase = GamePhase::Playing;
                spawn_wave(state);
            } else {
                state.wave.next_wave_in = Some(remaining);
            }
        }
        _ => {}
    }
}

/// Drop any pending wave (the player died before it spawned)
pub fn cancel_pending_wave(state: &mut GameState) {
    if state.wave.next_wave_in.take().is_some() {
        log::debug!("Pending wave {} cancelled", state.wave.wave);
    }
}

/// Rise the ship to its resting height, hold, then start the game
pub fn update_cutscene(state: &mut GameState) {
    match state.cutscene_hold_ticks {
        None => {
            let rise = state.tuning.cutscene_rise_per_tick;
            let player = &mut state.player;
            if player.pos.y > PLAYER_HOME_Y {
                player.pos.y = (player.pos.y - rise).max(PLAYER_HOME_Y);
            } else {
                log::debug!("Cutscene: ship in position");
                state.cutscene_hold_ticks = Some(state.tuning.cutscene_hold_ticks);
            }
        }
        Some(remaining) => {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                state.cutscene_hold_ticks = None;
                start_game(state);
            } else {
                state.cutscene_hold_ticks = Some(remaining);
            }
        }
    }
}

fn start_game(state: &mut GameState) {
    state.game_started = true;
    state.phase = GamePhase::Playing;
    log::info!("Game started");
    state.emit(GameEvent::GameStarted);
    spawn_wave(state);
}

/// Skip the intro: place the ship and start wave one immediately
pub fn skip_cutscene(state: &mut GameState) {
    if state.phase != GamePhase::Cutscene {
        return;
    }
    state.player.pos.y = PLAYER_HOME_Y;
    state.cutscene_hold_ticks = None;
    start_game(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemies_per_wave() {
        assert_eq!(enemies_per_wave(1), 5);
        assert_eq!(enemies_per_wave(2), 7);
        assert_eq!(enemies_per_wave(5), 13);
    }

    #[test]
    fn test_spawn_wave_layout() {
        let mut state = GameState::new(21);
        spawn_wave(&mut state);
        assert_eq!(state.enemies.len(), 5);
        for (i, enemy) in state.enemies.values().enumerate() {
            assert_eq!(enemy.pos.x % TILE_SIZE, 0.0);
            assert_eq!(enemy.pos.y, -TILE_SIZE * (i % 5) as f32);
        }
    }

    #[test]
    fn test_spawned_enemies_fit_on_screen() {
        let mut rightmost = 0.0f32;
        for seed in 0..50 {
            let mut state = GameState::new(seed);
            state.wave.enemies_per_wave = enemies_per_wave(10);
            spawn_wave(&mut state);
            for enemy in state.enemies.values() {
                assert!(enemy.pos.x >= 0.0);
                assert!(enemy.pos.x + enemy.size.x <= SCREEN_WIDTH);
                rightmost = rightmost.max(enemy.pos.x + enemy.size.x);
            }
        }
        // The last column is still reachable
        assert_eq!(rightmost, SCREEN_WIDTH);
    }

    #[test]
    fn test_clear_schedules_then_spawns() {
        let mut state = GameState::new(3);
        skip_cutscene(&mut state);
        state.enemies.clear();
        state.drain_events();

        update_waves(&mut state);
        assert_eq!(state.phase, GamePhase::WaitingForNextWave);
        assert_eq!(state.wave.wave, 2);
        assert_eq!(state.wave.level, 2);
        assert_eq!(state.drain_events(), vec![GameEvent::WaveCleared { wave: 1 }]);

        for _ in 0..119 {
            update_waves(&mut state);
        }
        assert!(state.enemies.is_empty());
        update_waves(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.enemies.len(), 7);
    }

    #[test]
    fn test_cutscene_rises_then_holds() {
        let mut state = GameState::new(1);
        // 128 px at 4 px/tick
        for _ in 0..32 {
            update_cutscene(&mut state);
        }
        assert_eq!(state.player.pos.y, PLAYER_HOME_Y);
        assert!(state.cutscene_hold_ticks.is_none());
        update_cutscene(&mut state);
        assert_eq!(state.cutscene_hold_ticks, Some(600));

        for _ in 0..600 {
            update_cutscene(&mut state);
        }
        assert!(state.game_started);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.enemies.len(), 5);
    }
}
