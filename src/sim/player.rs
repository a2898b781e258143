//! Player movement, auto-fire and ship animation

use serde::{Deserialize, Serialize};

use super::state::{Bullet, Facing, GameState, Player, ShotStyle};
use crate::consts::*;
use crate::ms_to_ticks;

/// Ticks without a movement event before the ship shows its idle sprite
pub const FACING_RESET_TICKS: u32 = 6;

/// Discrete movement command (one step per event)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Move one step, clamped to the screen
pub fn move_player(player: &mut Player, dir: Direction) {
    let max_x = SCREEN_WIDTH - player.size.x;
    let max_y = SCREEN_HEIGHT - player.size.y;
    let pos = &mut player.pos;
    match dir {
        Direction::Left => {
            pos.x = (pos.x - PLAYER_STEP).max(0.0);
            player.facing = Facing::Left;
        }
        Direction::Right => {
            pos.x = (pos.x + PLAYER_STEP).min(max_x);
            player.facing = Facing::Right;
        }
        // No dedicated sprite for climbing
        Direction::Up => pos.y = (pos.y - PLAYER_STEP).max(0.0),
        Direction::Down => {
            pos.y = (pos.y + PLAYER_STEP).min(max_y);
            player.facing = Facing::Down;
        }
    }
    player.moving = true;
    player.idle_ticks = 0;
}

/// Idle-frame cycling, and falling back to it once movement stops
pub fn update_animation(player: &mut Player) {
    if player.moving {
        player.idle_ticks += 1;
        if player.idle_ticks >= FACING_RESET_TICKS {
            player.moving = false;
            player.facing = Facing::Idle;
            player.anim.reset();
        }
    } else {
        player.anim.advance();
    }
}

pub fn update_invulnerability(player: &mut Player) {
    if player.invulnerability_ticks > 0 {
        player.invulnerability_ticks -= 1;
        if player.invulnerability_ticks == 0 {
            player.invulnerable = false;
            log::debug!("Invulnerability ended");
        }
    }
}

/// Horizontal bullet offsets (left edge) for a pattern, relative to the ship
pub fn shot_offsets(style: ShotStyle, ship_width: f32) -> Vec<f32> {
    let half_bullet = PLAYER_BULLET_WIDTH / 2.0;
    let center = ship_width / 2.0 - half_bullet;
    match style {
        ShotStyle::Single => vec![center],
        ShotStyle::Dual => vec![ship_width / 4.0 - half_bullet, ship_width * 0.75 - half_bullet],
        ShotStyle::Triple | ShotStyle::TripleBurst => vec![center, center - 14.0, center + 14.0],
    }
}

/// Fire one volley if the cooldown allows. Returns whether bullets spawned.
pub fn try_fire(state: &mut GameState) -> bool {
    if state.player.shot_cooldown_ticks > 0 {
        return false;
    }

    let style = state.effective_style();
    let origin = state.player.pos;
    for dx in shot_offsets(style, state.player.size.x) {
        state.player_bullets.spawn(Bullet::player(origin.x + dx, origin.y));
    }
    state.player.shot_cooldown_ticks = ms_to_ticks(state.effective_fire_rate_ms());
    true
}

/// Auto-fire timer. Runs only once the game has started.
pub fn update_shooting(state: &mut GameState) {
    let interval = state.tuning.shot_interval_ticks;
    let player = &mut state.player;
    player.shot_cooldown_ticks = player.shot_cooldown_ticks.saturating_sub(1);
    player.shot_timer_ticks += 1;
    if player.shot_timer_ticks < interval {
        return;
    }
    player.shot_timer_ticks = 0;
    try_fire(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::wave::skip_cutscene;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn player_at(x: f32, y: f32) -> Player {
        let mut player = Player::new(&Tuning::default());
        player.pos = Vec2::new(x, y);
        player
    }

    #[test]
    fn test_move_steps_two_tiles() {
        let mut player = player_at(384.0, 896.0);
        move_player(&mut player, Direction::Left);
        assert_eq!(player.pos, Vec2::new(320.0, 896.0));
        assert_eq!(player.facing, Facing::Left);
        move_player(&mut player, Direction::Up);
        assert_eq!(player.pos, Vec2::new(320.0, 832.0));
    }

    #[test]
    fn test_move_clamps_to_screen() {
        let mut player = player_at(32.0, 928.0);
        move_player(&mut player, Direction::Left);
        assert_eq!(player.pos.x, 0.0);
        move_player(&mut player, Direction::Down);
        assert_eq!(player.pos.y, SCREEN_HEIGHT - PLAYER_SIZE);

        let mut player = player_at(SCREEN_WIDTH - PLAYER_SIZE - 10.0, 0.0);
        move_player(&mut player, Direction::Right);
        assert_eq!(player.pos.x, SCREEN_WIDTH - PLAYER_SIZE);
        move_player(&mut player, Direction::Up);
        assert_eq!(player.pos.y, 0.0);
    }

    #[test]
    fn test_facing_reverts_to_idle() {
        let mut player = player_at(384.0, 896.0);
        move_player(&mut player, Direction::Right);
        for _ in 0..FACING_RESET_TICKS - 1 {
            update_animation(&mut player);
        }
        assert_eq!(player.facing, Facing::Right);
        update_animation(&mut player);
        assert_eq!(player.facing, Facing::Idle);
        assert!(!player.moving);
    }

    #[test]
    fn test_shot_offsets() {
        assert_eq!(shot_offsets(ShotStyle::Single, 96.0), vec![42.0]);
        assert_eq!(shot_offsets(ShotStyle::Dual, 96.0), vec![18.0, 66.0]);
        assert_eq!(shot_offsets(ShotStyle::Triple, 96.0), vec![42.0, 28.0, 56.0]);
    }

    #[test]
    fn test_fire_spawns_pattern_at_ship_top() {
        let mut state = GameState::new(5);
        skip_cutscene(&mut state);
        state.player.style = ShotStyle::Dual;
        assert!(try_fire(&mut state));
        assert_eq!(state.player_bullets.len(), 2);
        for bullet in state.player_bullets.values() {
            assert_eq!(bullet.pos.y, state.player.pos.y);
            assert_eq!(bullet.vel_y, -PLAYER_BULLET_SPEED);
        }
        // 50 ms cooldown
        assert_eq!(state.player.shot_cooldown_ticks, 3);
        assert!(!try_fire(&mut state));
    }

    #[test]
    fn test_auto_fire_cadence() {
        let mut state = GameState::new(5);
        skip_cutscene(&mut state);
        for _ in 0..29 {
            update_shooting(&mut state);
        }
        assert!(state.player_bullets.is_empty());
        update_shooting(&mut state);
        assert_eq!(state.player_bullets.len(), 1);
        for _ in 0..30 {
            update_shooting(&mut state);
        }
        assert_eq!(state.player_bullets.len(), 2);
    }

    #[test]
    fn test_invulnerability_counts_down() {
        let mut player = player_at(0.0, 0.0);
        player.grant_invulnerability(2);
        update_invulnerability(&mut player);
        assert!(player.invulnerable);
        update_invulnerability(&mut player);
        assert!(!player.invulnerable);
    }
}
