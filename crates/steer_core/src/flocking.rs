//! Alignment, cohesion and separation
//!
//! Each rule issues its own sphere query and averages over the steerable
//! entities it finds, always excluding the querying agent. An empty
//! neighbourhood yields zero for that rule.

use crate::agent::Steerable;
use crate::config::FlockingConfig;
use glam::Vec3;
use steer_math::Vec3Ext;
use steer_spatial::{LayerMask, Motion, SpatialQuery};

/// Steerable entities within `radius` of the agent, self excluded
pub fn neighbours<S, Q>(agent: &S, query: &Q, radius: f32, mask: LayerMask) -> Vec<Motion>
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let id = agent.id();
    query
        .overlap_sphere(agent.position(), radius, mask)
        .into_iter()
        .filter(|proxy| proxy.entity != id)
        .filter_map(|proxy| proxy.motion)
        .collect()
}

fn average(values: impl Iterator<Item = Vec3>) -> Option<Vec3> {
    let (sum, count) = values.fold((Vec3::ZERO, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f32)
}

/// Unit vector along the neighbours' mean velocity
pub fn align<S, Q>(agent: &S, query: &Q, radius: f32, mask: LayerMask) -> Vec3
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let found = neighbours(agent, query, radius, mask);
    average(found.iter().map(|n| n.velocity))
        .map(|mean| mean.safe_normalize())
        .unwrap_or(Vec3::ZERO)
}

/// Unit vector towards the neighbours' mean position
pub fn cohere<S, Q>(agent: &S, query: &Q, radius: f32, mask: LayerMask) -> Vec3
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let found = neighbours(agent, query, radius, mask);
    // no neighbours must not turn into a pull towards the world origin
    average(found.iter().map(|n| n.position))
        .map(|centre| (centre - agent.position()).safe_normalize())
        .unwrap_or(Vec3::ZERO)
}

/// Push away from the neighbours' mean offset, scaled by `weight`
pub fn separate<S, Q>(agent: &S, query: &Q, radius: f32, weight: f32, mask: LayerMask) -> Vec3
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let found = neighbours(agent, query, radius, mask);
    let position = agent.position();
    average(found.iter().map(|n| n.position - position))
        .map(|offset| -offset.safe_normalize() * weight)
        .unwrap_or(Vec3::ZERO)
}

/// Sum of alignment, cohesion and separation
pub fn flock<S, Q>(agent: &S, query: &Q, config: &FlockingConfig, mask: LayerMask) -> Vec3
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    align(agent, query, config.neighbourhood_radius, mask)
        + cohere(agent, query, config.neighbourhood_radius, mask)
        + separate(
            agent,
            query,
            config.separation_radius,
            config.separation_weight,
            mask,
        )
}
