//! Axis-aligned bounding volumes reported by spatial queries

use glam::Vec3;

/// Axis-Aligned Bounding Box, stored as centre and half-extents
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    /// Create from center and half-extents
    #[inline]
    pub const fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Cube of side `2 * half_size` around `center`
    #[inline]
    pub fn cube(center: Vec3, half_size: f32) -> Self {
        Self::new(center, Vec3::splat(half_size))
    }

    /// Same box moved so its centre sits at `center`
    #[inline]
    pub fn with_center(self, center: Vec3) -> Self {
        Self { center, ..self }
    }

    /// Check the box is well formed (finite, non-negative extents)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.half_extents.is_finite()
            && self.half_extents.cmpge(Vec3::ZERO).all()
    }

    /// Check if a point is inside. Faces count as inside.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.cmple(self.half_extents).all()
    }
}
