use serde::{Deserialize, Serialize};

use crate::renderer::layout::Sphere;
use crate::scene::generate_spheres;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Procedural sphere field parameters.
pub struct SphereOptions {
    /// Generator seed; equal seeds give equal fields.
    pub seed: u64,
    /// Placement attempts (upper bound on the sphere count).
    pub max_count: u32,
    /// Smallest and largest radius.
    pub radius_range: [f32; 2],
    /// Radius of the disk sphere centers are drawn from.
    pub placement_radius: f32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            max_count: 100,
            radius_range: [3.0, 8.0],
            placement_radius: 100.0,
        }
    }
}

impl SphereOptions {
    /// Generate the sphere field.
    #[must_use]
    pub fn generate(&self) -> Vec<Sphere> {
        generate_spheres(
            self.seed,
            self.max_count,
            self.radius_range,
            self.placement_radius,
        )
    }
}
