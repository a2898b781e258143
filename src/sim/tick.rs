//! Fixed timestep simulation tick
//!
//! One call advances the session by exactly one frame. Every timer in the
//! game is a tick counter checked here, so a session is fully reproducible
//! from its seed and input stream.

use glam::Vec2;
use rand::Rng;

use super::collision::{Bounds, intersects};
use super::events::GameEvent;
use super::particles::{spawn_explosion, update_particles, update_stars};
use super::player::{self, Direction};
use super::pool::{EntityId, Pool};
use super::powerup::{PowerUpKind, apply_powerup, expire_effects, spawn_powerup};
use super::state::{Bullet, Drift, EnemyKind, GamePhase, GameState, ShotStyle};
use super::wave;
use crate::consts::*;

/// Ticks between autopilot decisions
const AUTOPILOT_INTERVAL: u64 = 8;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement events received since the last tick, in arrival order
    pub moves: Vec<Direction>,
    /// Skip the intro cutscene
    pub skip_intro: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

impl TickInput {
    pub fn with_moves(moves: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// Advance the game state by one tick
///
/// Order: input, stars, timers, bullets, enemy movement, enemy fire,
/// collisions, particles, power-ups, wave progression.
pub fn tick(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::GameOver => return,
        GamePhase::Dying => {
            advance_defeat(state);
            state.time_ticks += 1;
            return;
        }
        _ => {}
    }

    if input.skip_intro {
        wave::skip_cutscene(state);
    }

    // Movement is locked until the intro hands over control
    if state.game_started {
        let autopilot = if input.idle_mode {
            autopilot_move(state)
        } else {
            None
        };
        for dir in input.moves.iter().copied().chain(autopilot) {
            player::move_player(&mut state.player, dir);
        }
    }
    player::update_animation(&mut state.player);

    update_stars(&mut state.stars, &mut state.rng);

    player::update_invulnerability(&mut state.player);
    expire_effects(state);
    if state.phase == GamePhase::Cutscene {
        wave::update_cutscene(state);
    }
    if state.phase.is_active() {
        player::update_shooting(state);
    }

    update_bullets(state);
    move_enemies(state);
    update_enemy_fire(state);

    resolve_player_bullet_hits(state);
    resolve_enemy_bullet_hits(state);

    update_particles(&mut state.particles);
    update_powerups(state);
    wave::update_waves(state);

    state.time_ticks += 1;
}

fn update_bullets(state: &mut GameState) {
    state.player_bullets.for_each_alive(|_, b| b.pos.y += b.vel_y);
    state.player_bullets.remove_where(|_, b| b.pos.y <= 0.0);

    state.enemy_bullets.for_each_alive(|_, b| {
        b.pos.y += b.vel_y;
        b.anim.advance();
    });
    state
        .enemy_bullets
        .remove_where(|_, b| b.pos.y >= SCREEN_HEIGHT);
}

/// Animate every tick; drift and descend on the movement cadence
fn move_enemies(state: &mut GameState) {
    let step_due = state.time_ticks % state.tuning.enemy_move_interval_ticks.max(1) == 0;
    let turn_chance = state.tuning.enemy_turn_chance.clamp(0.0, 1.0);
    let rng = &mut state.rng;

    state.enemies.for_each_alive(|_, enemy| {
        enemy.anim.advance();
        if !step_due {
            return;
        }

        if rng.random_bool(turn_chance) {
            enemy.drift = Drift::random(rng);
        }
        let max_x = SCREEN_WIDTH - enemy.size.x;
        match enemy.drift {
            Drift::Left if enemy.pos.x > 0.0 => {
                enemy.pos.x = (enemy.pos.x - enemy.speed).max(0.0);
            }
            Drift::Right if enemy.pos.x < max_x => {
                enemy.pos.x = (enemy.pos.x + enemy.speed).min(max_x);
            }
            _ => {}
        }
        // Enemies stop descending halfway down the screen
        if enemy.pos.y < SCREEN_HEIGHT / 2.0 {
            enemy.pos.y += enemy.speed;
        }
    });
}

fn owns_live_bullet(bullets: &Pool<Bullet>, owner: EntityId) -> bool {
    bullets.values().any(|b| b.owner == Some(owner))
}

/// Volley on the session's fire cadence. Each enemy keeps at most one bullet alive.
fn update_enemy_fire(state: &mut GameState) {
    state.enemy_fire_ticks = state.enemy_fire_ticks.saturating_sub(1);
    if state.enemy_fire_ticks > 0 {
        return;
    }
    state.enemy_fire_ticks = state.enemy_fire_interval_ticks;

    let shooters: Vec<(EntityId, Vec2)> = state
        .enemies
        .iter()
        .filter(|(id, enemy)| {
            enemy.fully_on_screen() && !owns_live_bullet(&state.enemy_bullets, *id)
        })
        .map(|(id, enemy)| (id, enemy.muzzle()))
        .collect();

    for (owner, muzzle) in shooters {
        state
            .enemy_bullets
            .spawn(Bullet::enemy(muzzle.x, muzzle.y, owner));
    }
}

struct Kill {
    kind: EnemyKind,
    pos: Vec2,
    center: Vec2,
}

/// Player bullets vs enemies. A bullet only ever damages the first enemy it
/// overlaps in pool order, then is spent.
fn resolve_player_bullet_hits(state: &mut GameState) {
    let damage = state.tuning.bullet_damage;
    let mut spent = Vec::new();
    let mut destroyed: Vec<EntityId> = Vec::new();
    let mut kills = Vec::new();

    for (bullet_id, bullet) in state.player_bullets.iter() {
        let bullet_rect = bullet.rect();
        let target = state
            .enemies
            .iter_mut()
            .find(|(id, enemy)| !destroyed.contains(id) && intersects(bullet_rect, enemy.rect()));
        let Some((enemy_id, enemy)) = target else {
            continue;
        };

        spent.push(bullet_id);
        enemy.health -= damage;
        if enemy.health <= 0 {
            destroyed.push(enemy_id);
            kills.push(Kill {
                kind: enemy.kind,
                pos: enemy.pos,
                center: enemy.rect().center(),
            });
        }
    }

    state.player_bullets.remove_ids(&spent);
    state.enemies.remove_ids(&destroyed);
    for kill in kills {
        on_enemy_destroyed(state, kill);
    }
}

fn on_enemy_destroyed(state: &mut GameState, kill: Kill) {
    spawn_explosion(
        &mut state.particles,
        &mut state.rng,
        kill.center,
        COLOR_ENEMY_EXPLOSION,
        state.max_particles,
    );
    state.wave.destroyed += 1;
    state.score += state.tuning.score_per_kill;
    state.emit(GameEvent::EnemyDestroyed {
        kind: kill.kind,
        x: kill.pos.x,
        y: kill.pos.y,
    });

    let drop_chance = state.tuning.powerup_drop_chance.clamp(0.0, 1.0);
    if state.rng.random_bool(drop_chance) {
        spawn_powerup(state, kill.pos);
    }
}

/// Enemy bullets vs player. Ignored entirely while invulnerable; at most one
/// hit lands per tick.
fn resolve_enemy_bullet_hits(state: &mut GameState) {
    if !state.phase.is_active() || state.player.invulnerable {
        return;
    }

    let player_rect = state.player.rect();
    let hit = state
        .enemy_bullets
        .iter()
        .find(|(_, b)| intersects(b.rect(), player_rect))
        .map(|(id, _)| id);
    let Some(bullet_id) = hit else {
        return;
    };

    state.enemy_bullets.remove(bullet_id);
    spawn_explosion(
        &mut state.particles,
        &mut state.rng,
        state.player.center(),
        COLOR_PLAYER_EXPLOSION,
        state.max_particles,
    );

    state.player.health = state.player.health.saturating_sub(1);
    let health = state.player.health;
    state.emit(GameEvent::PlayerHit { health });

    if health == 0 {
        begin_defeat(state);
        return;
    }

    state
        .player
        .grant_invulnerability(state.tuning.invulnerability_ticks);
    // Losing a life costs the dual-shot upgrade
    if state.player.style == ShotStyle::Dual {
        state.player.style = ShotStyle::Single;
    }
    log::debug!("Player hit, {} health left", health);
}

fn begin_defeat(state: &mut GameState) {
    state.phase = GamePhase::Dying;
    state.death_ticks = 0;
    wave::cancel_pending_wave(state);
    state.effects.clear();
    log::info!(
        "Player destroyed on wave {} with score {}",
        state.wave.wave,
        state.score
    );
    state.emit(GameEvent::PlayerDeath);
    state.emit(GameEvent::BackgroundMusicStop);
}

/// Sub-step stride during the defeat sequence: 1 (normal speed) at the start,
/// `max_slowdown` at the end.
pub fn slow_motion_stride(elapsed: u32, total: u32, max_slowdown: u32) -> u32 {
    if total == 0 {
        return 1;
    }
    let max_slowdown = max_slowdown.max(1);
    1 + elapsed.min(total) * (max_slowdown - 1) / total
}

/// Slow-motion wind-down. The world keeps moving but the player is out of play.
fn advance_defeat(state: &mut GameState) {
    state.death_ticks += 1;
    let stride = slow_motion_stride(
        state.death_ticks,
        state.tuning.death_sequence_ticks,
        state.tuning.death_max_slowdown,
    );

    if state.death_ticks % stride == 0 {
        update_stars(&mut state.stars, &mut state.rng);
        update_bullets(state);
        move_enemies(state);
        update_particles(&mut state.particles);
        fall_powerups(state);
    }

    if state.death_ticks >= state.tuning.death_sequence_ticks {
        state.phase = GamePhase::GameOver;
        log::info!("Game over, final score {}", state.score);
        state.emit(GameEvent::GameOver { score: state.score });
    }
}

fn fall_powerups(state: &mut GameState) {
    state.powerups.for_each_alive(|_, p| p.pos.y += p.fall_speed);
    state.powerups.remove_where(|_, p| p.pos.y > SCREEN_HEIGHT);
}

fn update_powerups(state: &mut GameState) {
    if state.phase.is_active() {
        state.powerups.for_each_alive(|_, p| p.pos.y += p.fall_speed);

        let player_rect = state.player.rect();
        let collected: Vec<(EntityId, PowerUpKind)> = state
            .powerups
            .iter()
            .filter(|(_, p)| intersects(p.rect(), player_rect))
            .map(|(id, p)| (id, p.kind))
            .collect();
        for (id, kind) in collected {
            state.powerups.remove(id);
            apply_powerup(state, kind);
        }
        state.powerups.remove_where(|_, p| p.pos.y > SCREEN_HEIGHT);
    } else {
        fall_powerups(state);
    }
}

/// Demo autopilot: dodge the closest incoming bullet, otherwise line up under
/// a power-up or the lowest enemy.
fn autopilot_move(state: &GameState) -> Option<Direction> {
    if state.time_ticks % AUTOPILOT_INTERVAL != 0 {
        return None;
    }

    let ship = state.player.rect();
    let ship_x = ship.center().x;

    let threat = state
        .enemy_bullets
        .values()
        .map(|b| b.rect())
        .filter(|b| {
            b.bottom() <= ship.y + ship.h
                && ship.y - b.bottom() < TILE_SIZE * 6.0
                && b.right() > ship.x
                && b.x < ship.right()
        })
        .max_by(|a, b| a.y.total_cmp(&b.y));
    if let Some(bullet) = threat {
        let dodge_right = bullet.center().x < ship_x;
        let can_right = ship.right() < SCREEN_WIDTH;
        let can_left = ship.x > 0.0;
        return Some(match (dodge_right, can_right, can_left) {
            (true, true, _) | (false, _, false) => Direction::Right,
            _ => Direction::Left,
        });
    }

    let target_x = state
        .powerups
        .values()
        .map(|p| p.rect().center().x)
        .next()
        .or_else(|| {
            state
                .enemies
                .values()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.rect().center().x)
        })?;

    if (target_x - ship_x).abs() < PLAYER_STEP / 2.0 {
        None
    } else if target_x < ship_x {
        Some(Direction::Left)
    } else {
        Some(Direction::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::{Enemy, PowerUp};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// A started session with enemy volleys switched off
    fn playing_state(seed: u64, tuning: Tuning) -> GameState {
        let mut state = GameState::with_config(seed, tuning, &Settings::default());
        wave::skip_cutscene(&mut state);
        state.enemy_fire_interval_ticks = u32::MAX;
        state.enemy_fire_ticks = u32::MAX;
        state.drain_events();
        state
    }

    fn place_enemy(state: &mut GameState, kind: EnemyKind, x: f32, y: f32) -> EntityId {
        state
            .enemies
            .spawn(Enemy::new(kind, Vec2::new(x, y), Drift::Left))
    }

    fn enemy_bullet_on_player(state: &mut GameState) {
        let c = state.player.center();
        state.enemy_bullets.spawn(Bullet::enemy(
            c.x - ENEMY_BULLET_SIZE / 2.0,
            c.y - ENEMY_BULLET_SIZE / 2.0,
            EntityId(9999),
        ));
    }

    fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_input_ignored_during_cutscene() {
        let mut state = GameState::new(1);
        let x = state.player.pos.x;
        tick(&mut state, &TickInput::with_moves([Direction::Left]));
        assert_eq!(state.player.pos.x, x);
        assert_eq!(state.phase, GamePhase::Cutscene);
    }

    #[test]
    fn test_cutscene_hands_over_to_wave_one() {
        let mut state = GameState::new(1);
        for _ in 0..700 {
            tick(&mut state, &idle());
        }
        assert!(state.game_started);
        assert_eq!(state.player.pos.y, PLAYER_HOME_Y);
        let events = state.drain_events();
        assert_eq!(count(&events, |e| *e == GameEvent::GameStarted), 1);
        assert!(events.contains(&GameEvent::WaveStarted {
            wave: 1,
            level: 1,
            enemies: 5
        }));
    }

    #[test]
    fn test_skip_intro_input() {
        let mut state = GameState::new(1);
        tick(
            &mut state,
            &TickInput {
                skip_intro: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.enemies.len(), 5);
    }

    #[test]
    fn test_moves_apply_once_started() {
        let mut state = playing_state(2, Tuning::default());
        let x = state.player.pos.x;
        tick(
            &mut state,
            &TickInput::with_moves([Direction::Left, Direction::Left]),
        );
        assert_eq!(state.player.pos.x, x - 2.0 * PLAYER_STEP);
    }

    #[test]
    fn test_enemy_health_drops_by_two_per_hit() {
        let mut state = playing_state(3, Tuning::default());
        state.enemies.clear();
        let brute = place_enemy(&mut state, EnemyKind::Brute, 300.0, 300.0);
        // Keep the enemy off its movement step
        state.time_ticks = 1;

        state.player_bullets.spawn(Bullet::player(340.0, 360.0));
        tick(&mut state, &idle());
        assert_eq!(state.enemies.get(brute).map(|e| e.health), Some(1));
        assert!(state.player_bullets.is_empty());
        assert_eq!(state.score, 0);

        state.player_bullets.spawn(Bullet::player(340.0, 360.0));
        tick(&mut state, &idle());
        assert!(state.enemies.get(brute).is_none());
        assert_eq!(state.score, 100);
        assert_eq!(state.wave.destroyed, 1);
        assert_eq!(state.particles.len(), EXPLOSION_PARTICLES);
        let events = state.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::EnemyDestroyed { .. })),
            1
        );
    }

    #[test]
    fn test_bullet_hits_only_first_overlapping_enemy() {
        let mut state = playing_state(4, Tuning::default());
        state.enemies.clear();
        let first = place_enemy(&mut state, EnemyKind::Scout, 300.0, 300.0);
        let second = place_enemy(&mut state, EnemyKind::Scout, 300.0, 300.0);
        state.time_ticks = 1;

        state.player_bullets.spawn(Bullet::player(340.0, 360.0));
        tick(&mut state, &idle());
        assert!(!state.enemies.contains(first));
        assert!(state.enemies.contains(second));
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_enemy_keeps_one_bullet_alive() {
        let mut state = playing_state(5, Tuning::default());
        state.enemies.clear();
        let shooter = place_enemy(&mut state, EnemyKind::Scout, 300.0, 100.0);
        place_enemy(&mut state, EnemyKind::Scout, 500.0, -10.0);
        state.time_ticks = 1;
        state.enemy_fire_interval_ticks = 1;
        state.enemy_fire_ticks = 1;

        tick(&mut state, &idle());
        assert_eq!(state.enemy_bullets.len(), 1);
        let bullet = state.enemy_bullets.values().next().cloned().unwrap();
        assert_eq!(bullet.owner, Some(shooter));
        assert_eq!(bullet.pos.x, 300.0 + 48.0 - 16.0);

        tick(&mut state, &idle());
        assert_eq!(state.enemy_bullets.len(), 1);

        // Bullet outlives its owner
        state.enemies.remove(shooter);
        tick(&mut state, &idle());
        assert_eq!(state.enemy_bullets.len(), 1);
    }

    #[test]
    fn test_hit_reverts_dual_shot() {
        let mut state = playing_state(6, Tuning::default());
        state.player.style = ShotStyle::Dual;
        enemy_bullet_on_player(&mut state);
        tick(&mut state, &idle());
        assert_eq!(state.player.health, 2);
        assert_eq!(state.player.style, ShotStyle::Single);
        assert!(state.player.invulnerable);
    }

    #[test]
    fn test_hit_keeps_triple_shot() {
        let mut state = playing_state(6, Tuning::default());
        state.player.style = ShotStyle::Triple;
        enemy_bullet_on_player(&mut state);
        tick(&mut state, &idle());
        assert_eq!(state.player.style, ShotStyle::Triple);
    }

    #[test]
    fn test_three_hits_trigger_defeat_once() {
        let tuning = Tuning {
            powerup_drop_chance: 0.0,
            ..Default::default()
        };
        let mut state = playing_state(7, tuning);
        let mut events = Vec::new();

        for expected in [2u8, 1] {
            enemy_bullet_on_player(&mut state);
            tick(&mut state, &idle());
            assert_eq!(state.player.health, expected);
            assert!(state.player.invulnerable);

            // Bullets landing inside the window do nothing
            enemy_bullet_on_player(&mut state);
            for _ in 0..10 {
                tick(&mut state, &idle());
                assert_eq!(state.player.health, expected);
            }
            state.enemy_bullets.clear();
            for _ in 0..600 {
                tick(&mut state, &idle());
            }
            assert!(!state.player.invulnerable);
            events.extend(state.drain_events());
        }

        enemy_bullet_on_player(&mut state);
        tick(&mut state, &idle());
        assert_eq!(state.player.health, 0);
        assert_eq!(state.phase, GamePhase::Dying);

        enemy_bullet_on_player(&mut state);
        for _ in 0..400 {
            tick(&mut state, &idle());
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        events.extend(state.drain_events());

        assert_eq!(count(&events, |e| matches!(e, GameEvent::PlayerHit { .. })), 3);
        assert_eq!(count(&events, |e| *e == GameEvent::PlayerDeath), 1);
        assert_eq!(count(&events, |e| *e == GameEvent::BackgroundMusicStop), 1);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::GameOver { .. })), 1);
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut state = playing_state(8, Tuning::default());
        state.player.health = 1;
        enemy_bullet_on_player(&mut state);
        for _ in 0..301 {
            tick(&mut state, &idle());
        }
        assert!(state.is_game_over());
        let ticks = state.time_ticks;
        state.drain_events();
        tick(&mut state, &idle());
        assert_eq!(state.time_ticks, ticks);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_slow_motion_stride() {
        assert_eq!(slow_motion_stride(0, 300, 6), 1);
        assert_eq!(slow_motion_stride(150, 300, 6), 3);
        assert_eq!(slow_motion_stride(300, 300, 6), 6);
        assert_eq!(slow_motion_stride(900, 300, 6), 6);
        assert_eq!(slow_motion_stride(10, 0, 6), 1);
    }

    #[test]
    fn test_wave_clear_spawns_seven() {
        let mut state = playing_state(9, Tuning::default());
        assert_eq!(state.enemies.len(), 5);
        state.time_ticks = 1;
        for (i, enemy) in state.enemies.values_mut().enumerate() {
            enemy.pos = Vec2::new(i as f32 * 150.0, 200.0);
            enemy.health = 1;
        }
        for i in 0..5 {
            state
                .player_bullets
                .spawn(Bullet::player(i as f32 * 150.0 + 40.0, 260.0));
        }

        tick(&mut state, &idle());
        assert!(state.enemies.is_empty());
        assert_eq!(state.phase, GamePhase::WaitingForNextWave);

        let mut events = state.drain_events();
        let mut spawned = false;
        for _ in 0..200 {
            tick(&mut state, &idle());
            let batch = state.drain_events();
            let started = batch
                .iter()
                .any(|e| matches!(e, GameEvent::WaveStarted { .. }));
            events.extend(batch);
            if started {
                assert_eq!(state.enemies.len(), 7);
                spawned = true;
                break;
            }
        }

        assert!(spawned);
        assert_eq!(state.wave.wave, 2);
        assert_eq!(state.wave.level, 2);
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::WaveCleared { .. })),
            1
        );
        assert!(events.contains(&GameEvent::WaveStarted {
            wave: 2,
            level: 2,
            enemies: 7
        }));
    }

    #[test]
    fn test_death_cancels_pending_wave() {
        let mut state = playing_state(10, Tuning::default());
        state.enemies.clear();
        state.player.health = 1;
        tick(&mut state, &idle());
        assert_eq!(state.phase, GamePhase::WaitingForNextWave);

        enemy_bullet_on_player(&mut state);
        tick(&mut state, &idle());
        assert_eq!(state.phase, GamePhase::Dying);
        assert!(!state.wave.is_pending());
        for _ in 0..400 {
            tick(&mut state, &idle());
        }
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_powerup_drop_rate() {
        let mut state = playing_state(11, Tuning::default());
        let trials = 10_000;
        let mut drops = 0;
        for _ in 0..trials {
            on_enemy_destroyed(
                &mut state,
                Kill {
                    kind: EnemyKind::Scout,
                    pos: Vec2::new(100.0, 100.0),
                    center: Vec2::new(148.0, 148.0),
                },
            );
            drops += state.powerups.len();
            state.powerups.clear();
            state.particles.clear();
        }
        let rate = drops as f64 / trials as f64;
        assert!((rate - 0.2).abs() < 0.02, "drop rate {rate}");
        assert_eq!(state.score, 100 * trials as u64);
    }

    #[test]
    fn test_powerup_collected_on_contact() {
        let mut state = playing_state(12, Tuning::default());
        state.player.health = 2;
        state.powerups.spawn(PowerUp::new(
            PowerUpKind::HealthPack,
            state.player.center(),
        ));
        tick(&mut state, &idle());
        assert!(state.powerups.is_empty());
        assert_eq!(state.player.health, 3);
        assert!(state.drain_events().contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::HealthPack
        }));
    }

    #[test]
    fn test_powerups_leave_bottom() {
        let mut state = playing_state(13, Tuning::default());
        state.powerups.spawn(PowerUp::new(
            PowerUpKind::DualShot,
            Vec2::new(0.0, SCREEN_HEIGHT - 0.1),
        ));
        tick(&mut state, &idle());
        assert!(state.powerups.is_empty());
        assert_eq!(state.player.style, ShotStyle::Single);
    }

    #[test]
    fn test_enemies_stop_descending_at_midscreen() {
        let mut state = playing_state(14, Tuning::default());
        state.enemies.clear();
        let id = place_enemy(&mut state, EnemyKind::Brute, 300.0, SCREEN_HEIGHT / 2.0);
        state.time_ticks = 0;
        tick(&mut state, &idle());
        let enemy = state.enemies.get(id).unwrap();
        assert_eq!(enemy.pos.y, SCREEN_HEIGHT / 2.0);
    }

    fn steady_drift() -> Tuning {
        Tuning {
            enemy_turn_chance: 0.0,
            ..Default::default()
        }
    }

    fn lone_enemy(state: &mut GameState, x: f32, drift: Drift) -> EntityId {
        state.enemies.clear();
        state
            .enemies
            .spawn(Enemy::new(EnemyKind::Brute, Vec2::new(x, 100.0), drift))
    }

    #[test]
    fn test_enemies_hold_still_between_steps() {
        let mut state = playing_state(15, Tuning::default());
        let id = lone_enemy(&mut state, 300.0, Drift::Left);
        for t in 1..30 {
            state.time_ticks = t;
            move_enemies(&mut state);
        }
        let enemy = state.enemies.get(id).unwrap();
        assert_eq!(enemy.pos, Vec2::new(300.0, 100.0));
        assert_eq!(enemy.drift, Drift::Left);

        state.time_ticks = 30;
        move_enemies(&mut state);
        assert_ne!(state.enemies.get(id).unwrap().pos, Vec2::new(300.0, 100.0));
    }

    #[test]
    fn test_left_drift_clamps_at_left_edge() {
        let mut state = playing_state(16, steady_drift());
        let id = lone_enemy(&mut state, 1.0, Drift::Left);
        state.time_ticks = 0;
        move_enemies(&mut state);
        let enemy = state.enemies.get(id).unwrap();
        assert_eq!(enemy.pos.x, 0.0);
        assert_eq!(enemy.pos.y, 100.0 + enemy.speed);

        move_enemies(&mut state);
        assert_eq!(state.enemies.get(id).unwrap().pos.x, 0.0);
    }

    #[test]
    fn test_right_drift_clamps_at_right_edge() {
        let mut state = playing_state(17, steady_drift());
        let max_x = SCREEN_WIDTH - ENEMY_SIZE;
        let id = lone_enemy(&mut state, max_x - 1.0, Drift::Right);
        state.time_ticks = 0;
        move_enemies(&mut state);
        assert_eq!(state.enemies.get(id).unwrap().pos.x, max_x);

        move_enemies(&mut state);
        assert_eq!(state.enemies.get(id).unwrap().pos.x, max_x);
    }

    #[test]
    fn test_zero_turn_chance_keeps_drift() {
        let mut state = playing_state(18, steady_drift());
        let id = lone_enemy(&mut state, 300.0, Drift::Right);
        state.time_ticks = 0;
        for _ in 0..1_000 {
            move_enemies(&mut state);
            assert_eq!(state.enemies.get(id).unwrap().drift, Drift::Right);
        }
    }

    #[test]
    fn test_drift_reroll_rate() {
        let mut state = playing_state(19, Tuning::default());
        let id = lone_enemy(&mut state, 300.0, Drift::Left);
        state.time_ticks = 0;

        let steps = 10_000;
        let mut changes = 0;
        let mut last = Drift::Left;
        for _ in 0..steps {
            move_enemies(&mut state);
            let drift = state.enemies.get(id).unwrap().drift;
            if drift != last {
                changes += 1;
            }
            last = drift;
        }
        // A 30% re-roll lands on the other direction half the time
        let rate = changes as f64 / steps as f64;
        assert!((rate - 0.15).abs() < 0.02, "change rate {}", rate);
    }

    #[test]
    fn test_full_turn_chance_rerolls_every_step() {
        let mut state = playing_state(20, Tuning {
            enemy_turn_chance: 1.0,
            ..Default::default()
        });
        let id = lone_enemy(&mut state, 300.0, Drift::Left);
        state.time_ticks = 0;

        let mut lefts = 0;
        for _ in 0..2_000 {
            move_enemies(&mut state);
            if state.enemies.get(id).unwrap().drift == Drift::Left {
                lefts += 1;
            }
        }
        assert!((800..=1_200).contains(&lefts), "{} lefts", lefts);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = GameState::new(77);
        let mut b = GameState::new(77);
        let input = TickInput {
            idle_mode: true,
            skip_intro: true,
            ..Default::default()
        };
        for _ in 0..2_000 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.hud(), b.hud());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_autopilot_soak() {
        let mut state = GameState::new(2024);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..20_000 {
            tick(&mut state, &input);
            assert!(state.player.health <= state.player.max_health);
            assert!(state.enemies.values().all(|e| e.health > 0));
            assert!(state.particles.len() <= state.max_particles);
            assert_eq!(state.score % 100, 0);
            state.drain_events();
        }
        assert!(state.game_started);
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_under_random_input(
            seed in any::<u64>(),
            moves in proptest::collection::vec(0u8..6, 1..300),
        ) {
            let mut state = GameState::new(seed);
            wave::skip_cutscene(&mut state);
            for m in moves {
                let input = match m {
                    0 => TickInput::with_moves([Direction::Left]),
                    1 => TickInput::with_moves([Direction::Right]),
                    2 => TickInput::with_moves([Direction::Up]),
                    3 => TickInput::with_moves([Direction::Down]),
                    _ => TickInput::default(),
                };
                tick(&mut state, &input);

                let p = &state.player;
                prop_assert!(p.pos.x >= 0.0 && p.pos.x + p.size.x <= SCREEN_WIDTH);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y + p.size.y <= SCREEN_HEIGHT);
                prop_assert!(p.health <= p.max_health);
                prop_assert!(state.enemies.values().all(|e| e.health > 0));
                prop_assert!(state.player_bullets.values().all(|b| b.pos.y > 0.0));
                prop_assert!(state.effective_fire_rate_ms() >= state.tuning.min_fire_rate_ms);
            }
        }
    }
}
