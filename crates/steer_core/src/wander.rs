//! Randomized heading perturbation
//!
//! Randomness is always injected. Simulations own one seeded generator and
//! pass it down, so a run replays exactly from its seed.

use crate::agent::Steerable;
use crate::targeting::seek;
use glam::Vec3;
use rand::Rng;
use steer_math::Vec3Ext;

/// Uniform angle in degrees within `[-cone/2, cone/2]`
pub fn heading_offset<R: Rng + ?Sized>(cone_angle: f32, rng: &mut R) -> f32 {
    let half = cone_angle.abs() * 0.5;
    if half > 0.0 && half.is_finite() {
        rng.gen_range(-half..=half)
    } else {
        0.0
    }
}

/// The agent's heading turned by a random angle inside `cone_angle` degrees.
///
/// This is a desired heading for the frame, unit length, or zero when the
/// agent is not moving.
pub fn wander<S, R>(agent: &S, cone_angle: f32, rng: &mut R) -> Vec3
where
    S: Steerable + ?Sized,
    R: Rng + ?Sized,
{
    let angle = heading_offset(cone_angle, rng);
    agent.velocity().safe_normalize().rotate_about_up(angle)
}

/// Wander while inside the circle, seek its centre once outside
pub fn wander_within_circle<S, R>(
    agent: &mut S,
    cone_angle: f32,
    circle_center: Vec3,
    circle_radius: f32,
    rng: &mut R,
) -> Vec3
where
    S: Steerable + ?Sized,
    R: Rng + ?Sized,
{
    let offset = agent.position() - circle_center;
    if offset.length_squared() <= circle_radius * circle_radius {
        wander(agent, cone_angle, rng)
    } else {
        seek(agent, circle_center, 0.0)
    }
}
