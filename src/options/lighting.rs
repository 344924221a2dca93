use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::light::DirectionalLight;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// The directional light.
pub struct LightingOptions {
    /// Direction the light travels.
    pub direction: [f32; 3],
    /// Radiance scale.
    pub intensity: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            direction: [-0.3, -1.0, -0.5],
            intensity: 1.0,
        }
    }
}

impl LightingOptions {
    /// Light described by these options.
    #[must_use]
    pub fn to_light(&self) -> DirectionalLight {
        DirectionalLight::new(Vec3::from_array(self.direction), self.intensity)
    }
}
