//! Game state and core simulation types
//!
//! One `GameState` is one session. Everything the tick mutates lives here;
//! there is no ambient global state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Bounds, Rect};
use super::events::GameEvent;
use super::particles::{Particle, Star, create_stars};
use super::pool::{EntityId, Pool};
use super::powerup::{ActiveEffects, PowerUpKind};
use super::wave::WaveState;
use crate::consts::*;
use crate::ms_to_ticks;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Intro: ship rises into place, then holds before the first wave
    Cutscene,
    /// A wave is on screen
    Playing,
    /// Wave cleared, next one spawns after a short delay
    WaitingForNextWave,
    /// Player destroyed; slow-motion wind-down before game over
    Dying,
    /// Terminal. A new session is required to play again.
    GameOver,
}

impl GamePhase {
    /// Phases in which the player can move, shoot, be hit and collect pickups
    pub fn is_active(&self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::WaitingForNextWave)
    }
}

/// Player shooting pattern. Ordered by strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShotStyle {
    Single,
    Dual,
    Triple,
    /// Temporary triple pattern with a faster fire rate
    TripleBurst,
}

/// Sprite-sheet frame stepping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteAnim {
    pub frame: u32,
    pub frame_count: u32,
    pub delay: u32,
    pub delay_max: u32,
}

impl SpriteAnim {
    pub fn new(frame_count: u32, delay_max: u32) -> Self {
        Self {
            frame: 0,
            frame_count: frame_count.max(1),
            delay: 0,
            delay_max,
        }
    }

    /// Single-frame sprite
    pub fn still() -> Self {
        Self::new(1, 0)
    }

    /// Step once per tick. The frame changes after the delay counter passes
    /// `delay_max`, i.e. every `delay_max + 2` ticks.
    pub fn advance(&mut self) {
        let elapsed = self.delay;
        self.delay += 1;
        if elapsed > self.delay_max {
            self.frame = (self.frame + 1) % self.frame_count;
            self.delay = 0;
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.delay = 0;
    }
}

/// Which sprite the player ship shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Idle,
    Left,
    Right,
    Down,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u8,
    pub max_health: u8,
    pub invulnerable: bool,
    pub invulnerability_ticks: u32,
    /// Permanent shooting style (temporary effects override it)
    pub style: ShotStyle,
    /// Permanent interval between shots in milliseconds
    pub fire_rate_ms: f32,
    /// Ticks until the next shot is allowed
    pub shot_cooldown_ticks: u32,
    /// Ticks since the auto-fire timer last fired
    pub shot_timer_ticks: u32,
    pub facing: Facing,
    pub moving: bool,
    /// Ticks since the last movement event
    pub idle_ticks: u32,
    pub anim: SpriteAnim,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            // Starts below the screen; the cutscene flies it in
            pos: Vec2::new((GRID_COLS / 2) as f32 * TILE_SIZE, SCREEN_HEIGHT),
            size: Vec2::splat(PLAYER_SIZE),
            health: tuning.max_health,
            max_health: tuning.max_health,
            invulnerable: false,
            invulnerability_ticks: 0,
            style: ShotStyle::Single,
            fire_rate_ms: tuning.base_fire_rate_ms,
            shot_cooldown_ticks: 0,
            shot_timer_ticks: 0,
            facing: Facing::Idle,
            moving: false,
            idle_ticks: 0,
            anim: SpriteAnim::new(2, 15),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Grant the post-hit invulnerability window
    pub fn grant_invulnerability(&mut self, ticks: u32) {
        self.invulnerable = ticks > 0;
        self.invulnerability_ticks = ticks;
    }
}

impl Bounds for Player {
    fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// A projectile. Player bullets travel up, enemy bullets down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity in pixels per tick (negative = up)
    pub vel_y: f32,
    /// Firing enemy, if any. A lookup key only; the enemy may already be gone.
    pub owner: Option<EntityId>,
    pub anim: SpriteAnim,
}

impl Bullet {
    pub fn player(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(PLAYER_BULLET_WIDTH, PLAYER_BULLET_HEIGHT),
            vel_y: -PLAYER_BULLET_SPEED,
            owner: None,
            anim: SpriteAnim::still(),
        }
    }

    pub fn enemy(x: f32, y: f32, owner: EntityId) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::splat(ENEMY_BULLET_SIZE),
            vel_y: ENEMY_BULLET_SPEED,
            owner: Some(owner),
            anim: SpriteAnim::new(4, 10),
        }
    }
}

impl Bounds for Bullet {
    fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// Base stats for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: i32,
    /// Pixels moved per movement step
    pub speed: f32,
    /// Sprite-sheet frame size
    pub frame_width: f32,
    pub frame_height: f32,
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Scout,
    Raider,
    Brute,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Scout, EnemyKind::Raider, EnemyKind::Brute];

    pub fn stats(&self) -> EnemyStats {
        // Sprite speeds are quartered when the wave is built
        match self {
            EnemyKind::Scout => EnemyStats {
                health: 1,
                speed: TILE_SIZE / 4.0 / 4.0,
                frame_width: 96.0,
                frame_height: 103.0,
            },
            EnemyKind::Raider => EnemyStats {
                health: 2,
                speed: TILE_SIZE / 3.0 / 4.0,
                frame_width: 96.0,
                frame_height: 103.0,
            },
            EnemyKind::Brute => EnemyStats {
                health: 3,
                speed: TILE_SIZE / 2.0 / 4.0,
                frame_width: 96.0,
                frame_height: 128.0,
            },
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Horizontal drift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Drift {
    Left,
    Right,
}

impl Drift {
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) {
            Drift::Left
        } else {
            Drift::Right
        }
    }
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub drift: Drift,
    pub health: i32,
    pub anim: SpriteAnim,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, drift: Drift) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            pos,
            size: Vec2::splat(ENEMY_SIZE),
            speed: stats.speed,
            drift,
            health: stats.health,
            anim: SpriteAnim::new(4, 10),
        }
    }

    /// Enemies only open fire once entirely inside the screen vertically
    pub fn fully_on_screen(&self) -> bool {
        self.pos.y >= 0.0 && self.pos.y + self.size.y <= SCREEN_HEIGHT
    }

    /// Where this enemy's bullet spawns (centered under the ship)
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(
            self.pos.x + self.size.x / 2.0 - ENEMY_BULLET_SIZE / 2.0,
            self.pos.y + self.size.y,
        )
    }
}

impl Bounds for Enemy {
    fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// A falling power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub fall_speed: f32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            size: Vec2::splat(POWERUP_SIZE),
            fall_speed: POWERUP_FALL_SPEED,
        }
    }
}

impl Bounds for PowerUp {
    fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Particle budget from settings
    pub max_particles: usize,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Set once the intro finishes; gates movement and the first wave
    pub game_started: bool,
    /// Remaining intro hold once the ship is in place
    pub cutscene_hold_ticks: Option<u32>,
    /// Ticks spent in the defeat sequence
    pub death_ticks: u32,
    pub score: u64,
    pub wave: WaveState,
    pub player: Player,
    pub player_bullets: Pool<Bullet>,
    pub enemy_bullets: Pool<Bullet>,
    pub enemies: Pool<Enemy>,
    pub powerups: Pool<PowerUp>,
    pub particles: Pool<Particle>,
    pub stars: Pool<Star>,
    /// Active timed power-ups
    pub effects: ActiveEffects,
    /// Enemy volley cadence, rolled once per session
    pub enemy_fire_interval_ticks: u32,
    /// Ticks until the next enemy volley
    pub enemy_fire_ticks: u32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session with default tuning and settings
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), &Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: &Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let fire_ms = if tuning.enemy_fire_max_ms > tuning.enemy_fire_min_ms {
            rng.random_range(tuning.enemy_fire_min_ms..=tuning.enemy_fire_max_ms)
        } else {
            tuning.enemy_fire_min_ms
        };
        let enemy_fire_interval_ticks = ms_to_ticks(fire_ms).max(1);
        let stars = create_stars(&mut rng, settings.star_count(tuning.star_count));

        let mut state = Self {
            seed,
            rng,
            player: Player::new(&tuning),
            wave: WaveState::new(),
            max_particles: settings.max_particles(),
            time_ticks: 0,
            phase: GamePhase::Cutscene,
            game_started: false,
            cutscene_hold_ticks: None,
            death_ticks: 0,
            score: 0,
            player_bullets: Pool::new(),
            enemy_bullets: Pool::new(),
            enemies: Pool::new(),
            powerups: Pool::new(),
            particles: Pool::new(),
            stars,
            effects: ActiveEffects::default(),
            enemy_fire_interval_ticks,
            enemy_fire_ticks: enemy_fire_interval_ticks,
            events: Vec::new(),
            tuning,
        };

        log::info!(
            "New session seed={} enemy fire every {} ticks",
            seed,
            enemy_fire_interval_ticks
        );
        state.emit(GameEvent::BackgroundMusicStart);
        state
    }

    /// Queue an event for the audio/asset layer
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_in_cutscene() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Cutscene);
        assert!(!state.game_started);
        assert_eq!(state.player.health, 3);
        assert!(state.enemies.is_empty());
        assert_eq!(state.stars.len(), 100);
        assert_eq!(state.events(), &[GameEvent::BackgroundMusicStart]);
    }

    #[test]
    fn test_enemy_fire_interval_in_range() {
        for seed in 0..50 {
            let state = GameState::new(seed);
            // 500..=1500 ms at 60 Hz
            assert!((30..=90).contains(&state.enemy_fire_interval_ticks));
        }
    }

    #[test]
    fn test_sprite_anim_period() {
        let mut anim = SpriteAnim::new(4, 10);
        let mut changes = Vec::new();
        for tick in 0..30 {
            let before = anim.frame;
            anim.advance();
            if anim.frame != before {
                changes.push(tick);
            }
        }
        assert_eq!(changes, vec![11, 23]);
    }

    #[test]
    fn test_enemy_kind_stats() {
        assert_eq!(EnemyKind::Scout.stats().health, 1);
        assert_eq!(EnemyKind::Raider.stats().health, 2);
        assert_eq!(EnemyKind::Brute.stats().health, 3);
        assert_eq!(EnemyKind::Brute.stats().speed, 4.0);
        assert_eq!(EnemyKind::Brute.stats().frame_height, 128.0);
    }

    #[test]
    fn test_enemy_muzzle_centered_below() {
        let enemy = Enemy::new(EnemyKind::Scout, Vec2::new(100.0, 50.0), Drift::Left);
        assert_eq!(enemy.muzzle(), Vec2::new(100.0 + 48.0 - 16.0, 50.0 + 96.0));
    }

    #[test]
    fn test_fully_on_screen() {
        let mut enemy = Enemy::new(EnemyKind::Scout, Vec2::new(0.0, -1.0), Drift::Left);
        assert!(!enemy.fully_on_screen());
        enemy.pos.y = 0.0;
        assert!(enemy.fully_on_screen());
        enemy.pos.y = SCREEN_HEIGHT - ENEMY_SIZE + 1.0;
        assert!(!enemy.fully_on_screen());
    }

    #[test]
    fn test_shot_style_ordering() {
        assert!(ShotStyle::Single < ShotStyle::Dual);
        assert!(ShotStyle::Dual < ShotStyle::Triple);
        assert!(ShotStyle::Triple < ShotStyle::TripleBurst);
    }
}
