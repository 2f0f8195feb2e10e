//! Rays for look-ahead probing
//!
//! A ray built from a zero velocity has a zero direction. Such a ray is
//! still usable: every point along it is the origin, and it hits nothing.

use crate::vector::Vec3Ext;
use glam::Vec3;

/// 3D ray with a unit (or zero) direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing `direction` (zero stays zero)
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.safe_normalize(),
        }
    }

    /// Get a point at distance t along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Check if the ray direction is valid (non-zero length)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.direction.length_squared() > 1e-10
    }

    /// `precision` evenly spaced points from the origin towards `length`.
    ///
    /// Point `i` sits at `length / precision * i`, so the origin is sampled
    /// and the far end is not.
    pub fn march(&self, length: f32, precision: usize) -> impl Iterator<Item = Vec3> + '_ {
        let step = if precision == 0 {
            0.0
        } else {
            length / precision as f32
        };
        (0..precision).map(move |i| self.at(step * i as f32))
    }
}
