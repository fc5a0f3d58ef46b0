//! Collision detection and response between balls, pegs and walls

use glam::Vec2;

use super::state::Peg;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward ball center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a round peg
pub fn ball_peg_collision(ball_pos: Vec2, ball_radius: f32, peg: &Peg) -> CollisionResult {
    let offset = ball_pos - peg.pos;
    let dist = offset.length();
    let min_dist = ball_radius + peg.radius;

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    // Ball center exactly on the peg: push straight up
    let normal = if dist < 0.0001 {
        Vec2::new(0.0, -1.0)
    } else {
        offset / dist
    };

    CollisionResult {
        hit: true,
        point: peg.pos + normal * peg.radius,
        normal,
        penetration: min_dist - dist,
    }
}

/// Check collision with the left (x = 0) and right (x = width) walls
pub fn ball_side_wall_collision(ball_pos: Vec2, ball_radius: f32, width: f32) -> CollisionResult {
    if ball_pos.x - ball_radius < 0.0 {
        return CollisionResult {
            hit: true,
            point: Vec2::new(0.0, ball_pos.y),
            normal: Vec2::X,
            penetration: ball_radius - ball_pos.x,
        };
    }
    if ball_pos.x + ball_radius > width {
        return CollisionResult {
            hit: true,
            point: Vec2::new(width, ball_pos.y),
            normal: Vec2::NEG_X,
            penetration: ball_pos.x + ball_radius - width,
        };
    }
    CollisionResult::miss()
}

/// Reflect velocity off a surface, keeping `restitution` of the normal component
///
/// v' = v - (1 + e)(v·n)n, so e = 1 is a mirror reflection. Velocity already
/// moving away from the surface is returned unchanged.
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * vn * normal
}
