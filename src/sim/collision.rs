//! Axis-aligned bounding box collision
//!
//! Every interaction in the game (bullets, pickups) is a rectangle overlap
//! test. There is no spatial index: pools hold tens of entities, so the
//! pairwise scan is cheap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Anything that occupies a rectangle on screen
pub trait Bounds {
    fn rect(&self) -> Rect;
}

impl Bounds for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

/// Strict AABB overlap. Rectangles that only share an edge do not intersect.
#[inline]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Inclusive overlap used by the classic ruleset: shared edges count as contact
#[inline]
pub fn touches(a: Rect, b: Rect) -> bool {
    !(a.y > b.bottom() || a.right() < b.x || a.bottom() < b.y || a.x > b.right())
}
