//! Steer Spatial - Collision Backend Contract
//!
//! Steering never owns collision geometry. It asks a backend two questions
//! and interprets the answers:
//!
//! - Which volumes does this ray cross, nearest first?
//! - Which volumes touch this sphere?
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │               steer_core                  │
//! │  flocking ──┐            ┌── avoidance    │
//! └─────────────┼────────────┼────────────────┘
//!               ▼            ▼
//!        overlap_sphere   raycast_all      (SpatialQuery)
//!               │            │
//!         ┌─────┴────────────┴──────┐
//!         │  SpatialWorld / host    │
//!         │  Proxy { layer, Aabb,   │
//!         │    Option<Motion> }     │
//!         └────────────┬────────────┘
//!                      ▼
//!         rapier QueryPipeline + ColliderSet
//! ```
//!
//! # Example
//!
//! ```
//! use steer_spatial::prelude::*;
//! use steer_math::{Aabb, Vec3};
//!
//! let mut world = SpatialWorld::new();
//! world
//!     .insert_obstacle(CollisionLayer::ENVIRONMENT, Aabb::cube(Vec3::new(0.0, 0.0, 5.0), 1.0))
//!     .unwrap();
//!
//! let hits = world.raycast_all(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL);
//! assert_eq!(hits.len(), 1);
//! ```

pub mod error;
pub mod layers;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for spatial queries
    pub use crate::error::{Result, SpatialError};
    pub use crate::layers::{CollisionLayer, LayerMask};
    pub use crate::query::{EntityId, Motion, Proxy, RaycastHit, SpatialQuery};
    pub use crate::world::SpatialWorld;
}

pub use prelude::*;
