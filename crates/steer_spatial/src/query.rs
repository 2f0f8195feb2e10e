//! Spatial queries (raycasting, sphere overlap)
//!
//! [`SpatialQuery`] is the contract between steering and whatever collision
//! backend the host runs. Steering only issues the two queries below and
//! reads the bounding volumes and motion they report.

use crate::layers::{CollisionLayer, LayerMask};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use steer_math::Aabb;

/// Opaque handle of an entity known to the spatial backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Committed position and velocity of a steerable entity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Motion {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }
}

/// An entity's presence in the backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    /// The entity this proxy stands for
    pub entity: EntityId,
    /// Layer used for mask filtering
    pub layer: CollisionLayer,
    /// World-space bounding volume
    pub bounds: Aabb,
    /// Present only for steerable entities
    pub motion: Option<Motion>,
}

impl Proxy {
    /// A static obstacle
    pub fn obstacle(entity: EntityId, layer: CollisionLayer, bounds: Aabb) -> Self {
        Self {
            entity,
            layer,
            bounds,
            motion: None,
        }
    }

    /// A steerable entity
    pub fn steerable(entity: EntityId, layer: CollisionLayer, bounds: Aabb, motion: Motion) -> Self {
        Self {
            entity,
            layer,
            bounds,
            motion: Some(motion),
        }
    }
}

/// Result of a raycast query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The entity whose volume was hit
    pub entity: EntityId,
    /// Its bounding volume at query time
    pub bounds: Aabb,
    /// Distance from ray origin
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
    /// Present only for steerable entities
    pub motion: Option<Motion>,
}

/// Queries the steering core issues against a collision backend
pub trait SpatialQuery {
    /// Every volume crossed by the ray within `max_distance`, nearest first.
    ///
    /// A zero `direction` hits nothing.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RaycastHit>;

    /// Every proxy whose volume touches the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Proxy>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RaycastHit> {
        (**self).raycast_all(origin, direction, max_distance, mask)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Proxy> {
        (**self).overlap_sphere(center, radius, mask)
    }
}
