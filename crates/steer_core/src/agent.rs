//! Steerable entities
//!
//! [`Kinematic`] is what every behaviour may read from a neighbour or a
//! target. [`Steerable`] adds what the compositor needs to write back and
//! is implemented by every agent role through [`SteeringAgent`]; hosts with
//! their own entity storage can implement it directly.

use crate::config::AgentLimits;
use glam::Vec3;
use steer_math::Vec3Ext;
use steer_spatial::{EntityId, Motion};

/// Anything with a position and a velocity
pub trait Kinematic {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;

    /// Snapshot of both
    fn motion(&self) -> Motion {
        Motion::new(self.position(), self.velocity())
    }
}

impl Kinematic for Motion {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

/// An entity driven by steering forces
pub trait Steerable: Kinematic {
    /// Identity used to skip self in spatial query results
    fn id(&self) -> EntityId;

    fn set_position(&mut self, position: Vec3);
    fn set_velocity(&mut self, velocity: Vec3);

    /// Net force from the last composition
    fn steering_force(&self) -> Vec3;
    fn set_steering_force(&mut self, force: Vec3);

    fn max_velocity(&self) -> f32;
    fn max_steering_force(&self) -> f32;

    /// Orientation sink. Only ever called with a unit vector.
    fn face(&mut self, forward: Vec3);
}

/// Default [`Steerable`] state used by the role drivers
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringAgent {
    id: EntityId,
    position: Vec3,
    velocity: Vec3,
    steering_force: Vec3,
    facing: Vec3,
    limits: AgentLimits,
}

impl SteeringAgent {
    /// Create an agent moving along `facing` at full speed.
    ///
    /// A zero `facing` leaves the agent at rest, looking down +Z.
    pub fn new(id: EntityId, position: Vec3, facing: Vec3, limits: AgentLimits) -> Self {
        let forward = facing.flatten().safe_normalize();
        let velocity = (forward * limits.max_velocity).clamp_magnitude(limits.max_velocity);

        Self {
            id,
            position,
            velocity,
            steering_force: Vec3::ZERO,
            facing: if forward == Vec3::ZERO { Vec3::Z } else { forward },
            limits,
        }
    }

    /// Override the initial velocity, clamped to the agent's limit
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity.flatten().clamp_magnitude(self.limits.max_velocity);
        self
    }

    /// Current facing, always unit length
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    pub fn limits(&self) -> &AgentLimits {
        &self.limits
    }
}

impl Kinematic for SteeringAgent {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

impl Steerable for SteeringAgent {
    fn id(&self) -> EntityId {
        self.id
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn steering_force(&self) -> Vec3 {
        self.steering_force
    }

    fn set_steering_force(&mut self, force: Vec3) {
        self.steering_force = force;
    }

    fn max_velocity(&self) -> f32 {
        self.limits.max_velocity
    }

    fn max_steering_force(&self) -> f32 {
        self.limits.max_steering_force
    }

    fn face(&mut self, forward: Vec3) {
        self.facing = forward;
    }
}
