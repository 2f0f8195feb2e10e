//! Steer Core - Steering Behaviours
//!
//! Per-frame locomotion for autonomous agents on a ground plane, built from
//! classic steering behaviours composed into a single force.
//!
//! # Features
//!
//! - Seek with arrival slowing, flee
//! - Predictive pursuit and evasion
//! - Flocking (alignment, cohesion, separation)
//! - Wander, optionally kept inside a circle
//! - Ray-march obstacle avoidance with a close-range fallback
//! - Role drivers and a frame-stable simulation
//! - Debug gizmos for every behaviour
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   Simulation                     │
//! │  Snapshot (frame start) ──► RoleDriver per agent │
//! └──────────────────────────────┬───────────────────┘
//!                                │ forces
//!      ┌──────────┬──────────────┼────────────┬──────────┐
//!      ▼          ▼              ▼            ▼          ▼
//! ┌─────────┐┌──────────┐┌────────────┐┌──────────┐┌────────┐
//! │targeting││ flocking ││ avoidance  ││  wander  ││ debug  │
//! └─────────┘└────┬─────┘└─────┬──────┘└──────────┘└────────┘
//!                 └──────┬─────┘
//!                        ▼
//!               SpatialQuery (steer_spatial)
//!
//!              forces ──► compositor::steer ──► commit
//! ```
//!
//! # Example
//!
//! ```
//! use steer_core::prelude::*;
//!
//! let mut sim = Simulation::new(7);
//! let flocker = sim
//!     .spawn(Vec3::ZERO, Vec3::Z, Role::Flocker, SteeringConfig::flocker(), Vec3::splat(0.5))
//!     .unwrap();
//! sim.set_goal(Some(Vec3::new(10.0, 0.0, 10.0)));
//!
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0).unwrap();
//! }
//! assert!(sim.agent(flocker).unwrap().position().length() > 0.0);
//! ```

pub mod agent;
pub mod avoidance;
pub mod compositor;
pub mod config;
pub mod debug;
pub mod error;
pub mod flocking;
pub mod roles;
pub mod simulation;
pub mod targeting;
pub mod wander;

pub mod prelude {
    //! Common imports for steering
    pub use crate::agent::{Kinematic, Steerable, SteeringAgent};
    pub use crate::avoidance::{avert, Avoidance};
    pub use crate::compositor::steer;
    pub use crate::config::{
        AgentLimits, AvoidanceConfig, FlockingConfig, PursuitConfig, SteeringConfig, WanderConfig,
        DOMINANT_WEIGHT,
    };
    pub use crate::debug::{Color, Gizmo, GizmoSink};
    pub use crate::error::{Result, SteeringError};
    pub use crate::flocking::{align, cohere, flock, separate};
    pub use crate::roles::{FrameContext, Role, RoleDriver};
    pub use crate::simulation::{Simulation, Snapshot};
    pub use crate::targeting::{evade, flee, pursue, seek};
    pub use crate::wander::{wander, wander_within_circle};
    pub use glam::Vec3;
    pub use steer_spatial::{CollisionLayer, EntityId, LayerMask, Motion};
}

pub use prelude::*;
