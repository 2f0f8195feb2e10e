//! Reference spatial backend
//!
//! Proxies are mirrored into a rapier `ColliderSet` as parentless cuboid
//! colliders and every query goes through a `QueryPipeline`. The proxy's
//! entity id rides along in the collider's user data. Results are put back
//! into a fixed order (hits by distance, overlaps by entity) so a replay
//! from the same seed sees the same sums.

use crate::error::{Result, SpatialError};
use crate::layers::{CollisionLayer, LayerMask};
use crate::query::{EntityId, Motion, Proxy, RaycastHit, SpatialQuery};
use glam::Vec3;
use rapier3d::parry::shape::Ball;
use rapier3d::prelude as rapier;
use std::collections::BTreeMap;
use std::fmt;
use steer_math::{Aabb, Ray};

struct Entry {
    proxy: Proxy,
    collider: rapier::ColliderHandle,
}

/// Collection of proxies backed by a rapier query pipeline
pub struct SpatialWorld {
    entries: BTreeMap<EntityId, Entry>,
    next_id: u64,

    /// Acceleration structure for ray and shape queries
    query_pipeline: rapier::QueryPipeline,

    /// One collider per proxy
    colliders: rapier::ColliderSet,

    /// Always empty, rapier queries and removals still ask for it
    bodies: rapier::RigidBodySet,

    islands: rapier::IslandManager,
}

impl SpatialWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
            query_pipeline: rapier::QueryPipeline::new(),
            colliders: rapier::ColliderSet::new(),
            bodies: rapier::RigidBodySet::new(),
            islands: rapier::IslandManager::new(),
        }
    }

    /// Number of registered proxies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ==================== Registration ====================

    /// Register a static obstacle
    pub fn insert_obstacle(&mut self, layer: CollisionLayer, bounds: Aabb) -> Result<EntityId> {
        validate_bounds(&bounds)?;
        let entity = self.allocate();
        self.insert(Proxy::obstacle(entity, layer, bounds))
    }

    /// Register a steerable entity
    pub fn insert_steerable(
        &mut self,
        layer: CollisionLayer,
        bounds: Aabb,
        motion: Motion,
    ) -> Result<EntityId> {
        validate_bounds(&bounds)?;
        let entity = self.allocate();
        self.insert(Proxy::steerable(entity, layer, bounds, motion))
    }

    fn allocate(&mut self) -> EntityId {
        let entity = EntityId(self.next_id);
        self.next_id += 1;
        entity
    }

    fn insert(&mut self, proxy: Proxy) -> Result<EntityId> {
        let collider = self.colliders.insert(build_collider(&proxy));
        self.entries.insert(proxy.entity, Entry { proxy, collider });
        self.query_pipeline.update(&self.colliders);

        log::debug!(
            "Registered {:?} on layer {} at {:?}",
            proxy.entity,
            proxy.layer.0,
            proxy.bounds.center
        );
        Ok(proxy.entity)
    }

    /// Move a steerable proxy to its committed state
    pub fn update_motion(&mut self, entity: EntityId, motion: Motion) -> Result<()> {
        self.update_motions(std::iter::once((entity, motion)))
    }

    /// Move several proxies, rebuilding the query pipeline once.
    ///
    /// Stops at the first unknown entity. Proxies moved before it stay moved
    /// and are visible to queries.
    pub fn update_motions<I>(&mut self, motions: I) -> Result<()>
    where
        I: IntoIterator<Item = (EntityId, Motion)>,
    {
        let mut result = Ok(());
        for (entity, motion) in motions {
            let Some(entry) = self.entries.get_mut(&entity) else {
                result = Err(SpatialError::UnknownEntity(entity));
                break;
            };
            entry.proxy.bounds = entry.proxy.bounds.with_center(motion.position);
            entry.proxy.motion = Some(motion);
            if let Some(collider) = self.colliders.get_mut(entry.collider) {
                collider.set_translation(to_vector(motion.position));
            }
        }

        self.query_pipeline.update(&self.colliders);
        result
    }

    /// Remove a proxy
    pub fn remove(&mut self, entity: EntityId) -> Result<Proxy> {
        let entry = self
            .entries
            .remove(&entity)
            .ok_or(SpatialError::UnknownEntity(entity))?;
        self.colliders
            .remove(entry.collider, &mut self.islands, &mut self.bodies, false);
        self.query_pipeline.update(&self.colliders);
        Ok(entry.proxy)
    }

    /// Look up a proxy
    pub fn get(&self, entity: EntityId) -> Option<&Proxy> {
        self.entries.get(&entity).map(|entry| &entry.proxy)
    }

    fn proxy_of(&self, handle: rapier::ColliderHandle) -> Option<&Proxy> {
        let collider = self.colliders.get(handle)?;
        self.get(EntityId(collider.user_data as u64))
    }
}

impl Default for SpatialWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpatialWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialWorld")
            .field("proxies", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

fn validate_bounds(bounds: &Aabb) -> Result<()> {
    if bounds.is_valid() {
        Ok(())
    } else {
        Err(SpatialError::InvalidShape(format!(
            "center {:?}, half extents {:?}",
            bounds.center, bounds.half_extents
        )))
    }
}

fn build_collider(proxy: &Proxy) -> rapier::Collider {
    let half = proxy.bounds.half_extents;
    rapier::ColliderBuilder::cuboid(half.x, half.y, half.z)
        .translation(to_vector(proxy.bounds.center))
        .collision_groups(rapier::InteractionGroups::new(
            rapier::Group::from_bits_truncate(proxy.layer.as_mask().0),
            rapier::Group::ALL,
        ))
        .user_data(proxy.entity.0 as u128)
        .build()
}

/// Queries see colliders whose layer is in `mask`
fn query_filter(mask: LayerMask) -> rapier::QueryFilter<'static> {
    rapier::QueryFilter::new().groups(rapier::InteractionGroups::new(
        rapier::Group::ALL,
        rapier::Group::from_bits_truncate(mask.0),
    ))
}

#[inline]
fn to_vector(v: Vec3) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y, v.z)
}

#[inline]
fn to_point(v: Vec3) -> rapier::Point<f32> {
    rapier::Point::new(v.x, v.y, v.z)
}

impl SpatialQuery for SpatialWorld {
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RaycastHit> {
        let ray = Ray::new(origin, direction);
        if !ray.is_valid() || !origin.is_finite() || !(max_distance > 0.0) || mask.is_empty() {
            return Vec::new();
        }

        let cast = rapier::Ray::new(to_point(ray.origin), to_vector(ray.direction));
        let mut hits = Vec::new();

        self.query_pipeline.intersections_with_ray(
            &self.bodies,
            &self.colliders,
            &cast,
            max_distance,
            true,
            query_filter(mask),
            |handle, intersection| {
                // Volumes enclosing the origin are not reported
                if let Some(proxy) = self.proxy_of(handle) {
                    if !proxy.bounds.contains_point(ray.origin) {
                        let distance = intersection.time_of_impact;
                        hits.push(RaycastHit {
                            entity: proxy.entity,
                            bounds: proxy.bounds,
                            distance,
                            point: ray.at(distance),
                            motion: proxy.motion,
                        });
                    }
                }
                true // Continue searching
            },
        );

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.entity.cmp(&b.entity))
        });
        hits
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Proxy> {
        if !(radius >= 0.0) || !radius.is_finite() || !center.is_finite() || mask.is_empty() {
            return Vec::new();
        }

        let ball = Ball::new(radius);
        let position = rapier::Isometry::translation(center.x, center.y, center.z);
        let mut found = Vec::new();

        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            &position,
            &ball,
            query_filter(mask),
            |handle| {
                if let Some(proxy) = self.proxy_of(handle) {
                    found.push(*proxy);
                }
                true // Continue
            },
        );

        found.sort_by_key(|proxy| proxy.entity);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world_with_wall() -> (SpatialWorld, EntityId) {
        let mut world = SpatialWorld::new();
        let wall = world
            .insert_obstacle(
                CollisionLayer::ENVIRONMENT,
                Aabb::new(Vec3::new(0.0, 0.0, 4.0), Vec3::new(2.0, 1.0, 0.5)),
            )
            .unwrap();
        (world, wall)
    }

    #[test]
    fn test_insert_and_remove() {
        let (mut world, wall) = world_with_wall();
        assert_eq!(world.len(), 1);
        assert!(world.get(wall).is_some());

        world.remove(wall).unwrap();
        assert!(world.is_empty());
        assert!(matches!(
            world.remove(wall),
            Err(SpatialError::UnknownEntity(id)) if id == wall
        ));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut world = SpatialWorld::new();
        let result = world.insert_obstacle(
            CollisionLayer::ENVIRONMENT,
            Aabb::new(Vec3::ZERO, Vec3::new(1.0, -1.0, 1.0)),
        );
        assert!(matches!(result, Err(SpatialError::InvalidShape(_))));
    }

    #[test]
    fn test_raycast_hits_sorted() {
        let (mut world, wall) = world_with_wall();
        let near = world
            .insert_obstacle(CollisionLayer::ENVIRONMENT, Aabb::cube(Vec3::new(0.0, 0.0, 2.0), 0.25))
            .unwrap();

        let hits = world.raycast_all(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity, near);
        assert_eq!(hits[1].entity, wall);
        assert_relative_eq!(hits[0].distance, 1.75, epsilon = 1e-4);
        assert_relative_eq!(hits[1].distance, 3.5, epsilon = 1e-4);
        assert!(hits[0].point.abs_diff_eq(Vec3::new(0.0, 0.0, 1.75), 1e-4));
    }

    #[test]
    fn test_raycast_respects_distance_and_mask() {
        let (world, _) = world_with_wall();
        assert!(world.raycast_all(Vec3::ZERO, Vec3::Z, 3.0, LayerMask::ALL).is_empty());
        assert!(world
            .raycast_all(
                Vec3::ZERO,
                Vec3::Z,
                10.0,
                LayerMask::all_except(CollisionLayer::ENVIRONMENT)
            )
            .is_empty());
    }

    #[test]
    fn test_raycast_zero_direction() {
        let (world, _) = world_with_wall();
        assert!(world.raycast_all(Vec3::ZERO, Vec3::ZERO, 10.0, LayerMask::ALL).is_empty());
    }

    #[test]
    fn test_raycast_skips_enclosing_volume() {
        let mut world = SpatialWorld::new();
        world
            .insert_obstacle(CollisionLayer::ENVIRONMENT, Aabb::cube(Vec3::ZERO, 1.0))
            .unwrap();
        assert!(world.raycast_all(Vec3::ZERO, Vec3::X, 10.0, LayerMask::ALL).is_empty());
    }

    #[test]
    fn test_overlap_sphere() {
        let (mut world, wall) = world_with_wall();
        let agent = world
            .insert_steerable(
                CollisionLayer::AGENTS,
                Aabb::cube(Vec3::new(1.0, 0.0, 0.0), 0.5),
                Motion::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X),
            )
            .unwrap();

        let found = world.overlap_sphere(Vec3::ZERO, 1.0, LayerMask::ALL);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity, agent);
        assert!(found[0].motion.is_some());

        let found = world.overlap_sphere(Vec3::ZERO, 4.0, LayerMask::ALL);
        let ids: Vec<_> = found.iter().map(|p| p.entity).collect();
        assert_eq!(ids, vec![wall, agent]);

        let found = world.overlap_sphere(Vec3::ZERO, 4.0, LayerMask::only(CollisionLayer::AGENTS));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_update_motion_moves_bounds() {
        let mut world = SpatialWorld::new();
        let agent = world
            .insert_steerable(CollisionLayer::AGENTS, Aabb::cube(Vec3::ZERO, 0.5), Motion::default())
            .unwrap();

        let moved = Motion::new(Vec3::new(5.0, 0.0, 0.0), Vec3::X);
        world.update_motion(agent, moved).unwrap();

        let proxy = world.get(agent).unwrap();
        assert_eq!(proxy.bounds.center, moved.position);
        assert_eq!(proxy.bounds.half_extents, Vec3::splat(0.5));
        assert_eq!(proxy.motion, Some(moved));

        assert!(world.update_motion(EntityId(99), moved).is_err());
    }

    #[test]
    fn test_queries_follow_moved_proxies() {
        let mut world = SpatialWorld::new();
        let a = world
            .insert_steerable(CollisionLayer::AGENTS, Aabb::cube(Vec3::ZERO, 0.5), Motion::default())
            .unwrap();
        let b = world
            .insert_steerable(CollisionLayer::AGENTS, Aabb::cube(Vec3::ZERO, 0.5), Motion::default())
            .unwrap();

        world
            .update_motions([
                (a, Motion::new(Vec3::new(0.0, 0.0, 6.0), Vec3::Z)),
                (b, Motion::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Z)),
            ])
            .unwrap();

        let hits = world.raycast_all(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL);
        let ids: Vec<_> = hits.iter().map(|hit| hit.entity).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(hits[1].motion.map(|m| m.velocity), Some(Vec3::Z));

        // nothing is left behind at the old position
        assert!(world.overlap_sphere(Vec3::ZERO, 1.0, LayerMask::ALL).is_empty());
    }

    #[test]
    fn test_update_motions_stops_at_unknown_entity() {
        let mut world = SpatialWorld::new();
        let a = world
            .insert_steerable(CollisionLayer::AGENTS, Aabb::cube(Vec3::ZERO, 0.5), Motion::default())
            .unwrap();

        let moved = Motion::new(Vec3::new(4.0, 0.0, 0.0), Vec3::X);
        let result = world.update_motions([(a, moved), (EntityId(42), moved)]);
        assert!(matches!(result, Err(SpatialError::UnknownEntity(EntityId(42)))));

        let found = world.overlap_sphere(Vec3::new(4.0, 0.0, 0.0), 0.1, LayerMask::ALL);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity, a);
    }

    #[test]
    fn test_removed_proxy_not_queried() {
        let (mut world, wall) = world_with_wall();
        world.remove(wall).unwrap();
        assert!(world.raycast_all(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL).is_empty());
        assert!(world.overlap_sphere(Vec3::ZERO, 10.0, LayerMask::ALL).is_empty());
    }
}
