//! Seek, flee, pursue and evade

use crate::agent::{Kinematic, Steerable};
use crate::config::PursuitConfig;
use glam::Vec3;
use steer_math::Vec3Ext;

/// Force towards `target`.
///
/// Inside `arrival_distance` the agent's velocity is clamped to
/// `min(1, d² / arrival²) * max_velocity` before the force is computed, so
/// the agent decelerates onto the target. This mutates the agent; callers
/// composing several forces see the slowed velocity from here on. An
/// `arrival_distance` of zero disables arrival entirely.
pub fn seek<S: Steerable + ?Sized>(agent: &mut S, target: Vec3, arrival_distance: f32) -> Vec3 {
    let desired = target - agent.position();

    if arrival_distance > 0.0 {
        let arrival_sq = arrival_distance * arrival_distance;
        let distance_sq = desired.length_squared();
        if distance_sq <= arrival_sq {
            let scale = (distance_sq / arrival_sq).min(1.0);
            let slowed = agent
                .velocity()
                .clamp_magnitude(scale * agent.max_velocity());
            agent.set_velocity(slowed);
        }
    }

    desired - agent.velocity()
}

/// Force away from `threat`, without arrival
pub fn flee<S: Kinematic + ?Sized>(agent: &S, threat: Vec3) -> Vec3 {
    (agent.position() - threat) - agent.velocity()
}

/// Seconds of target motion to extrapolate.
///
/// Shrinks linearly once the target is closer than the falloff distance,
/// which keeps a pursuer from overshooting a target it has nearly caught.
pub fn look_ahead(distance: f32, pursuit: &PursuitConfig) -> f32 {
    if pursuit.falloff_distance > 0.0 {
        pursuit.horizon * (distance / pursuit.falloff_distance).min(1.0)
    } else {
        pursuit.horizon
    }
}

/// Where `target` is expected to be, seen from `from`
pub fn predict_position<T: Kinematic + ?Sized>(
    from: Vec3,
    target: &T,
    pursuit: &PursuitConfig,
) -> Vec3 {
    let distance = (target.position() - from).length();
    target.position() + target.velocity() * look_ahead(distance, pursuit)
}

/// Seek the target's predicted position
pub fn pursue<S, T>(
    agent: &mut S,
    target: &T,
    arrival_distance: f32,
    pursuit: &PursuitConfig,
) -> Vec3
where
    S: Steerable + ?Sized,
    T: Kinematic + ?Sized,
{
    let predicted = predict_position(agent.position(), target, pursuit);
    seek(agent, predicted, arrival_distance)
}

/// Flee the target's predicted position
pub fn evade<S, T>(agent: &S, target: &T, pursuit: &PursuitConfig) -> Vec3
where
    S: Kinematic + ?Sized,
    T: Kinematic + ?Sized,
{
    let predicted = predict_position(agent.position(), target, pursuit);
    flee(agent, predicted)
}
