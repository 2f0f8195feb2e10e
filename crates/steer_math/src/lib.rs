//! # steer_math - Zero-Safe Steering Math
//!
//! Thin layer over `glam` for the numeric edge cases steering code keeps
//! running into: normalizing a zero vector, clamping to a maximum
//! magnitude, keeping motion on the ground plane.
//!
//! Every helper here is total. A zero-length or non-finite input produces
//! the zero vector, never NaN.

pub mod bounds;
pub mod ray;
pub mod vector;

pub use bounds::*;
pub use ray::*;
pub use vector::*;

pub use glam::{Quat, Vec3};

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

pub mod prelude {
    pub use crate::bounds::Aabb;
    pub use crate::ray::Ray;
    pub use crate::vector::{Vec3Ext, UP};
    pub use crate::{degrees, radians};
    pub use glam::{Quat, Vec3};
}
