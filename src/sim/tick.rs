//! Fixed timestep board simulation
//!
//! Advances every ball deterministically: gravity, steering toward the
//! target bucket, peg and wall bounces, then landing or timeout.

use glam::Vec2;

use super::collision::{ball_peg_collision, ball_side_wall_collision, bounce_velocity};
use super::state::{Board, BoardEvent, DropBall, Peg};
use crate::consts::*;

/// Horizontal pull toward `target.x`, damped by the current horizontal velocity
#[inline]
pub fn steering_force(pos: Vec2, vel: Vec2, target: Vec2, strength: f32) -> Vec2 {
    let strength = strength.max(0.0);
    let damping = STEER_DAMPING * (strength / STEER_STRENGTH).sqrt();
    Vec2::new((target.x - pos.x) * strength - vel.x * damping, 0.0)
}

/// Advance the board by one fixed timestep, returning landings and timeouts
pub fn tick(board: &mut Board, dt: f32) -> Vec<BoardEvent> {
    board.time_ticks += 1;

    let mut events = Vec::new();
    let pegs = &board.pegs;
    let (width, floor_y) = (board.width, board.floor_y);
    let (strength, ttl) = (board.steer_strength, board.ball_ttl_ticks);

    board.balls.retain_mut(|ball| {
        match step_ball(ball, pegs, width, floor_y, strength, ttl, dt) {
            Some(event) => {
                events.push(event);
                false
            }
            None => true,
        }
    });

    events
}

/// Run as many fixed ticks as `frame_dt` covers (capped at `MAX_SUBSTEPS`),
/// carrying the remainder in `accumulator`
pub fn advance(board: &mut Board, accumulator: &mut f32, frame_dt: f32) -> Vec<BoardEvent> {
    *accumulator += frame_dt;
    let mut events = Vec::new();
    let mut steps = 0;
    while *accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
        events.extend(tick(board, SIM_DT));
        *accumulator -= SIM_DT;
        steps += 1;
    }
    // Drop backlog rather than spiral
    if steps == MAX_SUBSTEPS {
        *accumulator = accumulator.min(SIM_DT);
    }
    events
}

fn step_ball(
    ball: &mut DropBall,
    pegs: &[Peg],
    width: f32,
    floor_y: f32,
    strength: f32,
    ttl: u32,
    dt: f32,
) -> Option<BoardEvent> {
    ball.age_ticks += 1;
    if ball.age_ticks > ttl {
        return Some(BoardEvent::TimedOut {
            drop_id: ball.drop_id,
        });
    }

    let accel = Vec2::new(0.0, GRAVITY) + steering_force(ball.pos, ball.vel, ball.target, strength);
    ball.vel += accel * dt;
    ball.vel = ball.vel.clamp_length_max(BALL_MAX_SPEED);
    ball.pos += ball.vel * dt;

    for peg in pegs {
        let hit = ball_peg_collision(ball.pos, ball.radius, peg);
        if hit.hit {
            ball.pos += hit.normal * hit.penetration;
            ball.vel = bounce_velocity(ball.vel, hit.normal, RESTITUTION);
        }
    }

    let wall = ball_side_wall_collision(ball.pos, ball.radius, width);
    if wall.hit {
        ball.pos += wall.normal * wall.penetration;
        ball.vel = bounce_velocity(ball.vel, wall.normal, RESTITUTION);
    }

    if ball.pos.y + ball.radius >= floor_y {
        return Some(BoardEvent::Landed {
            drop_id: ball.drop_id,
            pos: ball.pos,
        });
    }

    None
}
