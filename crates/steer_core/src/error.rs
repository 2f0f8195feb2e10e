//! Error types for steering setup
//!
//! Per-frame behaviours are total and never fail. Everything here is raised
//! while configuring agents or wiring a simulation together.

use steer_spatial::{EntityId, SpatialError};
use thiserror::Error;

/// Steering setup errors
#[derive(Debug, Error)]
pub enum SteeringError {
    /// A tuning value is negative or not finite
    #[error("Invalid steering configuration: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    /// Obstacle sampling needs at least one point
    #[error("Avoidance precision must be at least 1")]
    ZeroPrecision,

    /// A role was wired to an entity the simulation does not know
    #[error("Unknown target entity: {0:?}")]
    UnknownTarget(EntityId),

    /// No agent with this id is part of the simulation
    #[error("Unknown agent: {0:?}")]
    UnknownAgent(EntityId),

    /// A role cannot replace another that lives on a different layer
    #[error("Agent {entity:?} cannot switch to role {role}")]
    InvalidRole { entity: EntityId, role: &'static str },

    /// The spatial backend rejected an operation
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

/// Result type for steering setup
pub type Result<T> = std::result::Result<T, SteeringError>;
