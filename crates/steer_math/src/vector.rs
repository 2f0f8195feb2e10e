//! Zero-safe vector operations on top of `glam::Vec3`

use glam::{Quat, Vec3};

/// World up axis. Steering happens in the plane orthogonal to it.
pub const UP: Vec3 = Vec3::Y;

/// Steering-specific extensions for [`Vec3`]
pub trait Vec3Ext: Sized {
    /// Unit vector in the same direction, or zero for zero-length and
    /// non-finite input.
    fn safe_normalize(self) -> Self;

    /// Rescale so the magnitude does not exceed `max`.
    ///
    /// Vectors already within the limit come back unchanged. A non-positive
    /// limit or non-finite input yields zero.
    fn clamp_magnitude(self, max: f32) -> Self;

    /// Drop the vertical component.
    fn flatten(self) -> Self;

    /// Rotate about [`UP`] by `degrees`.
    fn rotate_about_up(self, degrees: f32) -> Self;

    /// Unsigned angle to `other` in degrees, zero if either is zero-length.
    fn angle_to_degrees(self, other: Self) -> f32;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn safe_normalize(self) -> Self {
        if !self.is_finite() {
            return Vec3::ZERO;
        }
        // Rescale first so the squared length cannot overflow
        let scale = self.abs().max_element();
        if scale == 0.0 {
            return Vec3::ZERO;
        }
        (self / scale).normalize_or_zero()
    }

    #[inline]
    fn clamp_magnitude(self, max: f32) -> Self {
        if !self.is_finite() || !(max > 0.0) {
            return Vec3::ZERO;
        }
        let scale = self.abs().max_element();
        if scale == 0.0 {
            return Vec3::ZERO;
        }
        let unit = self / scale;
        let unit_length = unit.length();
        if unit_length * scale <= max {
            self
        } else {
            unit * (max / unit_length)
        }
    }

    #[inline]
    fn flatten(self) -> Self {
        Vec3::new(self.x, 0.0, self.z)
    }

    #[inline]
    fn rotate_about_up(self, degrees: f32) -> Self {
        Quat::from_axis_angle(UP, crate::radians(degrees)) * self
    }

    fn angle_to_degrees(self, other: Self) -> f32 {
        let a = self.safe_normalize();
        let b = other.safe_normalize();
        if a == Vec3::ZERO || b == Vec3::ZERO {
            return 0.0;
        }
        crate::degrees(a.dot(b).clamp(-1.0, 1.0).acos())
    }
}
