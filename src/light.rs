//! The scene's single directional light.

use glam::{Vec3, Vec4};

/// Directional light read once per frame by the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (from the light into the scene).
    pub direction: Vec3,
    /// Radiance scale.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(-0.3, -1.0, -0.5), 1.0)
    }
}

impl DirectionalLight {
    /// Light travelling along `direction` (normalized here).
    #[must_use]
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Y),
            intensity,
        }
    }

    /// Packed `(direction, intensity)` as uploaded to the kernel.
    pub fn to_vec4(&self) -> Vec4 {
        self.direction.extend(self.intensity)
    }
}
