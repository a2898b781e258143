//! Explosion debris and the scrolling starfield
//!
//! Purely cosmetic, but still simulated in the tick so a replay with the same
//! seed renders identically.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pool::Pool;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleShape {
    Triangle,
    Square,
    Shard,
}

impl ParticleShape {
    pub const ALL: [ParticleShape; 3] = [
        ParticleShape::Triangle,
        ParticleShape::Square,
        ParticleShape::Shard,
    ];
}

/// A single explosion fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Packed 0xRRGGBB
    pub color: u32,
    /// Remaining lifetime in ticks
    pub life: f32,
    pub alpha: f32,
    pub shape: ParticleShape,
    /// Rotation in radians
    pub angle: f32,
}

impl Particle {
    fn random(rng: &mut impl Rng, origin: Vec2, color: u32) -> Self {
        Self {
            pos: origin,
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 4.0,
                (rng.random::<f32>() - 0.5) * 4.0,
            ),
            size: rng.random::<f32>() * 10.0 + 5.0,
            color,
            life: rng.random::<f32>() * 30.0 + 20.0,
            alpha: 1.0,
            shape: ParticleShape::ALL[rng.random_range(0..ParticleShape::ALL.len())],
            angle: rng.random::<f32>() * std::f32::consts::TAU,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= 1.0;
        self.alpha -= PARTICLE_FADE_PER_TICK;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0 || self.alpha <= 0.0
    }
}

/// Burst of debris at `origin`, respecting the particle budget
pub fn spawn_explosion(
    particles: &mut Pool<Particle>,
    rng: &mut impl Rng,
    origin: Vec2,
    color: u32,
    max_particles: usize,
) {
    for _ in 0..EXPLOSION_PARTICLES {
        if particles.len() >= max_particles {
            break;
        }
        particles.spawn(Particle::random(rng, origin, color));
    }
}

/// Advance all particles and drop the expired ones
pub fn update_particles(particles: &mut Pool<Particle>) {
    particles.for_each_alive(|_, p| p.update());
    particles.remove_where(|_, p| p.is_dead());
}

/// Background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

pub fn create_stars(rng: &mut impl Rng, count: usize) -> Pool<Star> {
    let mut stars = Pool::new();
    for _ in 0..count {
        stars.spawn(Star {
            pos: Vec2::new(
                rng.random::<f32>() * SCREEN_WIDTH,
                rng.random::<f32>() * SCREEN_HEIGHT,
            ),
            size: rng.random::<f32>() * 2.0 + 1.0,
            speed: STAR_SPEED,
        });
    }
    stars
}

/// Scroll stars down, wrapping to the top at a fresh column
pub fn update_stars(stars: &mut Pool<Star>, rng: &mut impl Rng) {
    stars.for_each_alive(|_, star| {
        star.pos.y += star.speed;
        if star.pos.y > SCREEN_HEIGHT {
            star.pos.y = 0.0;
            star.pos.x = rng.random::<f32>() * SCREEN_WIDTH;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_explosion_spawns_twenty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = Pool::new();
        spawn_explosion(&mut pool, &mut rng, Vec2::ZERO, COLOR_ENEMY_EXPLOSION, 200);
        assert_eq!(pool.len(), EXPLOSION_PARTICLES);
        for p in pool.values() {
            assert!((5.0..15.0).contains(&p.size));
            assert!((20.0..50.0).contains(&p.life));
            assert!(p.vel.x.abs() <= 2.0 && p.vel.y.abs() <= 2.0);
            assert_eq!(p.alpha, 1.0);
        }
    }

    #[test]
    fn test_explosion_respects_budget() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = Pool::new();
        spawn_explosion(&mut pool, &mut rng, Vec2::ZERO, 0, 25);
        spawn_explosion(&mut pool, &mut rng, Vec2::ZERO, 0, 25);
        assert_eq!(pool.len(), 25);
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = Pool::new();
        spawn_explosion(&mut pool, &mut rng, Vec2::ZERO, 0, 200);
        // Life is at most 50 and alpha reaches zero after 50 ticks
        for _ in 0..51 {
            update_particles(&mut pool);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_stars_wrap_to_top() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut stars = Pool::new();
        stars.spawn(Star {
            pos: Vec2::new(10.0, SCREEN_HEIGHT - 0.1),
            size: 2.0,
            speed: STAR_SPEED,
        });
        update_stars(&mut stars, &mut rng);
        let star = stars.values().next().unwrap();
        assert_eq!(star.pos.y, 0.0);
        assert!((0.0..SCREEN_WIDTH).contains(&star.pos.x));
    }

    #[test]
    fn test_star_sizes() {
        let mut rng = Pcg32::seed_from_u64(4);
        let stars = create_stars(&mut rng, 100);
        assert_eq!(stars.len(), 100);
        assert!(stars.values().all(|s| (1.0..3.0).contains(&s.size)));
    }
}
