// Math utilities for the goal scene

use glam::{Mat4, Vec3};

/// Convert an angular speed in degrees to radians.
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// Represents an accumulated 3D transformation.
///
/// Thin wrapper over a column-major matrix. All interactive mutation goes
/// through `apply`, which premultiplies: applying a rotation to an object
/// that already carries a translation rotates the translated position around
/// the origin as well. Repeated application accumulates without bound.
#[derive(Debug, Clone, Copy)]
pub struct Transform(pub Mat4);

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self(Mat4::IDENTITY)
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self(Mat4::from_translation(translation))
    }

    /// Premultiply a matrix onto the accumulated transform.
    pub fn apply(&mut self, m: Mat4) {
        self.0 = m * self.0;
    }

    /// X component of the translation column.
    pub fn position_x(&self) -> f32 {
        self.0.w_axis.x
    }

    /// Generate transformation matrix
    pub fn matrix(&self) -> Mat4 {
        self.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
