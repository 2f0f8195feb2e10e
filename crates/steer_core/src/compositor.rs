//! Force composition and integration
//!
//! One call per agent per frame. Forces are summed, clamped, integrated
//! into velocity (clamped, kept on the ground plane) and then into
//! position. Velocity is in units per second; `dt` scales both the force
//! applied to velocity and the displacement applied to position.

use crate::agent::Steerable;
use glam::Vec3;
use steer_math::Vec3Ext;

/// Apply `forces` to `agent` for a frame of length `dt` seconds.
///
/// Afterwards `|steering_force| <= max_steering_force`,
/// `|velocity| <= max_velocity` and `velocity.y == 0`. The agent is turned
/// to face its new velocity unless that velocity is zero.
pub fn steer<S: Steerable + ?Sized>(agent: &mut S, forces: &[Vec3], dt: f32) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    let net = forces.iter().fold(Vec3::ZERO, |acc, force| acc + *force);
    let force = net.clamp_magnitude(agent.max_steering_force());
    agent.set_steering_force(force);

    let velocity = (agent.velocity() + force * dt)
        .clamp_magnitude(agent.max_velocity())
        .flatten();
    agent.set_velocity(velocity);
    agent.set_position(agent.position() + velocity * dt);

    let forward = velocity.safe_normalize();
    if forward != Vec3::ZERO {
        agent.face(forward);
    }

    log::trace!(
        "{:?} steered: force {:?} -> velocity {:?}",
        agent.id(),
        force,
        velocity
    );
}
