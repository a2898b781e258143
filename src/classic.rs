//! Classic mode
//!
//! The older, simpler ruleset: a 20 × 20 tile field, ten enemies per level
//! that fall straight down and fire at random, one-hit kills, three lives and
//! a fixed five-level campaign. Shares pools, rectangles and directions with
//! the main simulation but none of its waves or power-ups.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Direction, Pool, Rect, touches};

pub const FIELD_SIZE: f32 = 640.0;
pub const SHIP_SIZE: f32 = 32.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const BULLET_SPEED: f32 = 10.0;
pub const BULLET_WIDTH: f32 = 4.0;
pub const BULLET_HEIGHT: f32 = 10.0;
pub const ENEMY_SPEED: f32 = 2.0;
/// Per-enemy, per-tick chance to open fire
pub const ENEMY_FIRE_CHANCE: f64 = 0.02;
/// Vertical gap between spawned enemies
pub const ENEMY_SPACING: f32 = 50.0;
pub const ENEMIES_PER_LEVEL: u32 = 10;
pub const FINAL_LEVEL: u32 = 5;
pub const STARTING_LIVES: u32 = 3;
pub const POINTS_PER_KILL: u64 = 10;
/// Auto-fire cadence (500 ms)
pub const SHOT_INTERVAL_TICKS: u32 = 30;
/// Highest the ship can lift off the bottom edge
pub const MAX_LIFT: f32 = 20.0;
/// Player bullets spawn this far above the bottom edge
const MUZZLE_HEIGHT: f32 = 52.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassicPhase {
    Playing,
    GameOver,
    /// All five levels cleared
    Victory,
}

/// A classic-mode session
#[derive(Debug, Clone)]
pub struct ClassicGame {
    rng: Pcg32,
    pub phase: ClassicPhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    /// Left edge of the ship
    pub player_x: f32,
    /// Distance between the ship and the bottom edge
    pub player_lift: f32,
    pub enemies: Pool<Rect>,
    pub player_bullets: Pool<Rect>,
    pub enemy_bullets: Pool<Rect>,
    shot_timer: u32,
    pub time_ticks: u64,
}

impl ClassicGame {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(seed),
            phase: ClassicPhase::Playing,
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            player_x: 0.0,
            player_lift: MAX_LIFT,
            enemies: Pool::new(),
            player_bullets: Pool::new(),
            enemy_bullets: Pool::new(),
            shot_timer: 0,
            time_ticks: 0,
        };
        game.start_level();
        game
    }

    pub fn player_rect(&self) -> Rect {
        Rect::new(
            self.player_x,
            FIELD_SIZE - self.player_lift - SHIP_SIZE,
            SHIP_SIZE,
            SHIP_SIZE,
        )
    }

    pub fn is_over(&self) -> bool {
        self.phase != ClassicPhase::Playing
    }

    /// Back to level one with full lives
    pub fn restart(&mut self) {
        self.phase = ClassicPhase::Playing;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.level = 1;
        self.player_lift = MAX_LIFT;
        self.shot_timer = 0;
        self.enemies.clear();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.start_level();
    }

    fn start_level(&mut self) {
        let count = self.level * ENEMIES_PER_LEVEL;
        for i in 0..count {
            let left = self.rng.random::<f32>() * (FIELD_SIZE - SHIP_SIZE);
            self.enemies.spawn(Rect::new(
                left,
                -(i as f32) * ENEMY_SPACING,
                SHIP_SIZE,
                SHIP_SIZE,
            ));
        }
        log::info!("Classic level {}: {} enemies", self.level, count);
    }

    pub fn move_player(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.player_x = (self.player_x - PLAYER_SPEED).max(0.0),
            Direction::Right => {
                self.player_x = (self.player_x + PLAYER_SPEED).min(FIELD_SIZE - SHIP_SIZE);
            }
            Direction::Up => self.player_lift = (self.player_lift + PLAYER_SPEED).min(MAX_LIFT),
            Direction::Down => self.player_lift = (self.player_lift - PLAYER_SPEED).max(0.0),
        }
    }

    fn shoot(&mut self) {
        self.player_bullets.spawn(Rect::new(
            self.player_x + SHIP_SIZE / 2.0 - 2.0,
            FIELD_SIZE - MUZZLE_HEIGHT - BULLET_HEIGHT,
            BULLET_WIDTH,
            BULLET_HEIGHT,
        ));
    }

    /// Advance one tick
    pub fn tick(&mut self, moves: &[Direction]) {
        if self.is_over() {
            return;
        }

        for dir in moves {
            self.move_player(*dir);
        }

        self.shot_timer += 1;
        if self.shot_timer >= SHOT_INTERVAL_TICKS {
            self.shot_timer = 0;
            self.shoot();
        }

        self.move_enemies();
        self.update_player_bullets();
        self.update_enemy_bullets();
        self.check_level_clear();
        self.time_ticks += 1;
    }

    fn move_enemies(&mut self) {
        let rng = &mut self.rng;
        let bullets = &mut self.enemy_bullets;
        self.enemies.for_each_alive(|_, enemy| {
            enemy.y += ENEMY_SPEED;
            if rng.random_bool(ENEMY_FIRE_CHANCE) {
                bullets.spawn(Rect::new(
                    enemy.x + SHIP_SIZE / 2.0,
                    enemy.y + SHIP_SIZE,
                    BULLET_WIDTH,
                    BULLET_HEIGHT,
                ));
            }
        });
        // Escaped enemies are dropped without score so the level can end
        self.enemies.remove_where(|_, e| e.y > FIELD_SIZE);
    }

    fn update_player_bullets(&mut self) {
        self.player_bullets.for_each_alive(|_, b| b.y -= BULLET_SPEED);

        let mut spent = Vec::new();
        let mut destroyed = Vec::new();
        for (bullet_id, bullet) in self.player_bullets.iter() {
            let hit = self
                .enemies
                .iter()
                .find(|(id, enemy)| !destroyed.contains(id) && touches(*bullet, **enemy))
                .map(|(id, _)| id);
            if let Some(enemy_id) = hit {
                spent.push(bullet_id);
                destroyed.push(enemy_id);
            }
        }
        self.player_bullets.remove_ids(&spent);
        self.enemies.remove_ids(&destroyed);
        self.score += destroyed.len() as u64 * POINTS_PER_KILL;

        self.player_bullets.remove_where(|_, b| b.bottom() < 0.0);
    }

    fn update_enemy_bullets(&mut self) {
        self.enemy_bullets.for_each_alive(|_, b| b.y += BULLET_SPEED);

        let player = self.player_rect();
        let hits = self.enemy_bullets.remove_where(|_, b| touches(*b, player));
        if hits > 0 {
            self.lives = self.lives.saturating_sub(hits as u32);
            log::debug!("Classic: hit, {} lives left", self.lives);
            if self.lives == 0 {
                log::info!("Classic game over, score {}", self.score);
                self.phase = ClassicPhase::GameOver;
            }
        }

        self.enemy_bullets.remove_where(|_, b| b.y > FIELD_SIZE);
    }

    fn check_level_clear(&mut self) {
        if self.phase != ClassicPhase::Playing || !self.enemies.is_empty() {
            return;
        }
        self.level += 1;
        if self.level > FINAL_LEVEL {
            log::info!("Classic campaign won, score {}", self.score);
            self.phase = ClassicPhase::Victory;
        } else {
            self.start_level();
        }
    }
}
