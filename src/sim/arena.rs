//! Rectangular arena and wall-bounce resolution
//!
//! The arena is an axis-aligned rectangle fixed for the lifetime of a match.
//! Bodies are kept inside it by clamping and reflecting per axis.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::consts::*;
use crate::{mix, rand_range};

/// Axis-aligned arena rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            x: ARENA_INSET,
            y: ARENA_INSET,
            width: CANVAS_WIDTH - ARENA_INSET * 2.0,
            height: CANVAS_HEIGHT - ARENA_INSET * 2.0,
        }
    }
}

/// Wall response parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallBounce {
    /// Outgoing/incoming normal speed ratio (may exceed 1.0)
    pub elasticity: f32,
    /// Floor on the outgoing normal speed
    pub min_rebound: f32,
    /// Max random nudge added to the tangential component
    pub jitter: f32,
    /// Cap post-bounce speed at this multiple of the pre-bounce speed
    pub speed_cap: Option<f32>,
}

impl Default for WallBounce {
    fn default() -> Self {
        Self {
            elasticity: WALL_ELASTICITY,
            min_rebound: WALL_MIN_REBOUND,
            jitter: WALL_JITTER,
            speed_cap: Some(WALL_SPEED_CAP),
        }
    }
}

impl Arena {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.point_at(0.5, 0.5)
    }

    /// Point at fractional coordinates (0,0 = top-left, 1,1 = bottom-right)
    pub fn point_at(&self, fx: f32, fy: f32) -> Vec2 {
        Vec2::new(
            mix(self.x, self.x + self.width, fx),
            mix(self.y, self.y + self.height, fy),
        )
    }

    /// True when a circle of `radius` at `pos` lies fully inside
    pub fn contains_circle(&self, pos: Vec2, radius: f32) -> bool {
        let lo = self.min() + Vec2::splat(radius);
        let hi = self.max() - Vec2::splat(radius);
        pos.x >= lo.x && pos.x <= hi.x && pos.y >= lo.y && pos.y <= hi.y
    }

    /// Reflect a body off any wall its collision circle has crossed.
    ///
    /// Each axis is handled independently: position is clamped to the wall,
    /// the outward component becomes `max(|v| * elasticity, min_rebound)` and
    /// the other component gets a random nudge. Returns whether any axis
    /// bounced.
    pub fn bounce<R: Rng + ?Sized>(&self, body: &mut Body, wall: &WallBounce, rng: &mut R) -> bool {
        let r = body.collision_radius;
        let lo = self.min() + Vec2::splat(r);
        let hi = self.max() - Vec2::splat(r);
        let speed_before = body.speed();
        let mut bounced = false;

        let rebound = |v: f32| (v.abs() * wall.elasticity).max(wall.min_rebound);

        if body.pos.x < lo.x {
            body.pos.x = lo.x;
            body.vel.x = rebound(body.vel.x);
            body.vel.y += rand_range(rng, -wall.jitter, wall.jitter);
            bounced = true;
        } else if body.pos.x > hi.x {
            body.pos.x = hi.x;
            body.vel.x = -rebound(body.vel.x);
            body.vel.y += rand_range(rng, -wall.jitter, wall.jitter);
            bounced = true;
        }

        if body.pos.y < lo.y {
            body.pos.y = lo.y;
            body.vel.y = rebound(body.vel.y);
            body.vel.x += rand_range(rng, -wall.jitter, wall.jitter);
            bounced = true;
        } else if body.pos.y > hi.y {
            body.pos.y = hi.y;
            body.vel.y = -rebound(body.vel.y);
            body.vel.x += rand_range(rng, -wall.jitter, wall.jitter);
            bounced = true;
        }

        if bounced {
            if let Some(cap) = wall.speed_cap {
                let max_speed = (speed_before * cap).max(wall.min_rebound);
                let speed_after = body.speed();
                if speed_after > max_speed {
                    body.vel *= max_speed / speed_after;
                }
            }
        }

        bounced
    }
}
