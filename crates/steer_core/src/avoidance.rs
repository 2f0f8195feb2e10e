//! Ray-march obstacle avoidance
//!
//! A ray is cast along the agent's heading. The nearest hit whose volume
//! actually contains one of the sampled ray points is "in the way" and the
//! agent is pushed from that volume's centre towards the ray's far end.
//! With no ray hits at all, every volume within the aversion radius pushes
//! instead, which covers agents that already overlap something.

use crate::agent::Steerable;
use crate::config::AvoidanceConfig;
use glam::Vec3;
use steer_math::{Aabb, Ray, Vec3Ext};
use steer_spatial::{EntityId, LayerMask, RaycastHit, SpatialQuery};

/// Push from `bounds` if the marched ray enters it, zero otherwise
fn march(ray: &Ray, bounds: &Aabb, config: &AvoidanceConfig) -> Vec3 {
    let blocked = ray
        .march(config.aversion_distance, config.precision)
        .any(|point| bounds.contains_point(point));

    if blocked {
        ray.at(config.aversion_distance) - bounds.center
    } else {
        Vec3::ZERO
    }
}

/// Obstacle avoidance with an optional cache of the blocking hit.
///
/// While an obstacle stays in the way the cached volume is re-marched
/// instead of casting again. Once the cached volume no longer blocks, the
/// cache is dropped and a fresh query runs in the same frame.
#[derive(Debug, Clone, Default)]
pub struct Avoidance {
    cached: Option<RaycastHit>,
}

impl Avoidance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit currently held by the cache
    pub fn cached_hit(&self) -> Option<&RaycastHit> {
        self.cached.as_ref()
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }

    /// The cached hit, if caching is on and its volume still blocks `ray`
    pub(crate) fn blocking_hit(&self, ray: &Ray, config: &AvoidanceConfig) -> Option<&RaycastHit> {
        if !config.cache_hits {
            return None;
        }
        self.cached
            .as_ref()
            .filter(|hit| march(ray, &hit.bounds, config) != Vec3::ZERO)
    }

    /// Avoidance force for this frame
    pub fn avert<S, Q>(
        &mut self,
        agent: &S,
        query: &Q,
        config: &AvoidanceConfig,
        mask: LayerMask,
    ) -> Vec3
    where
        S: Steerable + ?Sized,
        Q: SpatialQuery + ?Sized,
    {
        let ray = Ray::new(agent.position(), agent.velocity());

        if let Some(hit) = self.blocking_hit(&ray, config) {
            return march(&ray, &hit.bounds, config).safe_normalize() * config.weight;
        }
        if let Some(hit) = self.cached {
            log::debug!("{:?} cleared cached obstacle {:?}", agent.id(), hit.entity);
            self.clear();
        }

        let id = agent.id();
        let hits: Vec<RaycastHit> = query
            .raycast_all(ray.origin, ray.direction, config.aversion_distance, mask)
            .into_iter()
            .filter(|hit| hit.entity != id)
            .collect();

        let aversion = if hits.is_empty() {
            surrounding(agent, query, &ray, config, mask)
        } else {
            let blocking = hits
                .iter()
                .map(|hit| (hit, march(&ray, &hit.bounds, config)))
                .find(|(_, aversion)| *aversion != Vec3::ZERO);

            match blocking {
                Some((hit, aversion)) => {
                    if config.cache_hits {
                        log::debug!("{:?} caching obstacle {:?}", id, hit.entity);
                        self.cached = Some(*hit);
                    }
                    aversion
                }
                None => Vec3::ZERO,
            }
        };

        aversion.safe_normalize() * config.weight
    }
}

/// Close-range fallback: every nearby volume pushes, summed then normalized
fn surrounding<S, Q>(agent: &S, query: &Q, ray: &Ray, config: &AvoidanceConfig, mask: LayerMask) -> Vec3
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let id: EntityId = agent.id();
    let reach = ray.at(config.aversion_distance);
    query
        .overlap_sphere(agent.position(), config.aversion_radius, mask)
        .into_iter()
        .filter(|proxy| proxy.entity != id)
        .fold(Vec3::ZERO, |sum, proxy| sum + (reach - proxy.bounds.center))
}

/// Stateless avoidance, casting every frame
pub fn avert<S, Q>(agent: &S, query: &Q, config: &AvoidanceConfig, mask: LayerMask) -> Vec3
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let uncached = AvoidanceConfig {
        cache_hits: false,
        ..*config
    };
    Avoidance::new().avert(agent, query, &uncached, mask)
}
