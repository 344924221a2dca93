//! Packed GPU record layouts shared with the ray-tracing kernel.
//!
//! Field order and sizes are a binary contract with
//! `assets/shaders/compute/raytrace.wgsl`, which reads the storage buffers as
//! flat scalar arrays. Every record is built from 4-byte scalars only, so
//! `#[repr(C)]` introduces no padding and the strides below are exact.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::gpu::buffer_registry::SceneCounts;

/// Byte stride of a [`Sphere`] record.
pub const SPHERE_STRIDE: usize = 56;
/// Byte stride of a [`MeshInstance`] record.
pub const MESH_INSTANCE_STRIDE: usize = 72;
/// Byte stride of a [`Vertex`] record.
pub const VERTEX_STRIDE: usize = 12;
/// Byte stride of one triangle-list index.
pub const INDEX_STRIDE: usize = 4;

/// A sphere with its surface material.
///
/// Older scene revisions used a 40-byte record without smoothness and
/// emission; this layout is the superset.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Sphere {
    /// World-space center.
    pub center: [f32; 3],
    /// Radius in world units.
    pub radius: f32,
    /// Diffuse reflectance.
    pub albedo: [f32; 3],
    /// Specular reflectance (F0).
    pub specular: [f32; 3],
    /// 0 = rough, 1 = mirror.
    pub smoothness: f32,
    /// Emitted radiance.
    pub emission: [f32; 3],
}

impl Sphere {
    /// Center as a vector.
    pub fn center(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }

    /// Whether this sphere's bounding volume intersects `other`'s.
    ///
    /// Compares squared distances, so touching spheres do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        let min_distance = self.radius + other.radius;
        self.center().distance_squared(other.center())
            < min_distance * min_distance
    }
}

/// One registered mesh object: its world transform and its run of indices in
/// the global index buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshInstance {
    /// Column-major local-to-world matrix.
    pub local_to_world: [[f32; 4]; 4],
    /// First index of this object in the global index array.
    pub index_offset: u32,
    /// Number of indices belonging to this object.
    pub index_count: u32,
}

impl MeshInstance {
    /// Record for an object with the given transform and index range.
    #[must_use]
    pub fn new(transform: Mat4, index_offset: u32, index_count: u32) -> Self {
        Self {
            local_to_world: transform.to_cols_array_2d(),
            index_offset,
            index_count,
        }
    }

    /// The transform as a matrix.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.local_to_world)
    }
}

/// A mesh-local vertex position.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
}

impl From<Vec3> for Vertex {
    fn from(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
        }
    }
}

/// Per-frame kernel parameters (`FrameUniforms` in the kernel).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Camera-to-world transform.
    pub camera_to_world: [[f32; 4]; 4],
    /// Inverse of the camera projection.
    pub inverse_projection: [[f32; 4]; 4],
    /// xyz: direction the light travels, w: intensity.
    pub light: [f32; 4],
    /// Sub-pixel jitter in `[0, 1)²`.
    pub pixel_offset: [f32; 2],
    /// Seed for the kernel's random sequence.
    pub seed: f32,
    /// Records in the sphere buffer.
    pub sphere_count: u32,
    /// Records in the mesh-object buffer.
    pub mesh_count: u32,
    /// Records in the vertex buffer.
    pub vertex_count: u32,
    /// Entries in the index buffer.
    pub index_count: u32,
    /// Keeps the struct a multiple of 16 bytes.
    pub _pad: u32,
}

impl FrameUniforms {
    /// Replace the element counts with those of the live buffers.
    #[must_use]
    pub fn with_counts(mut self, counts: SceneCounts) -> Self {
        self.sphere_count = counts.spheres;
        self.mesh_count = counts.mesh_objects;
        self.vertex_count = counts.vertices;
        self.index_count = counts.indices;
        self
    }
}

/// Blend-pass parameters (`Accumulation` in the blend shader).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct AccumulationUniforms {
    /// Samples already in the running average.
    pub sample_count: u32,
    /// Uniform buffers are sized in 16-byte units.
    pub _pad: [u32; 3],
}

impl AccumulationUniforms {
    /// Uniforms for blending sample number `sample_count + 1`.
    #[must_use]
    pub fn new(sample_count: u32) -> Self {
        Self {
            sample_count,
            _pad: [0; 3],
        }
    }
}

const _: () = assert!(size_of::<Sphere>() == SPHERE_STRIDE);
const _: () = assert!(size_of::<MeshInstance>() == MESH_INSTANCE_STRIDE);
const _: () = assert!(size_of::<Vertex>() == VERTEX_STRIDE);
const _: () = assert!(size_of::<u32>() == INDEX_STRIDE);
const _: () = assert!(size_of::<FrameUniforms>() == 176);
const _: () = assert!(size_of::<AccumulationUniforms>() == 16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_fields_land_at_kernel_offsets() {
        let sphere = Sphere {
            center: [1.0, 2.0, 3.0],
            radius: 4.0,
            albedo: [5.0, 6.0, 7.0],
            specular: [8.0, 9.0, 10.0],
            smoothness: 11.0,
            emission: [12.0, 13.0, 14.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&sphere));
        let expected: Vec<f32> = (1..=14).map(|i| i as f32).collect();
        assert_eq!(floats, expected.as_slice());
    }

    #[test]
    fn mesh_instance_index_range_follows_matrix() {
        let instance =
            MeshInstance::new(Mat4::from_translation(Vec3::X), 9, 6);
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&instance));
        assert_eq!(words.len(), 18);
        assert_eq!(words[16], 9);
        assert_eq!(words[17], 6);
        // Translation sits in the fourth column.
        assert_eq!(f32::from_bits(words[12]), 1.0);
        assert_eq!(instance.transform(), Mat4::from_translation(Vec3::X));
    }

    #[test]
    fn touching_spheres_do_not_overlap() {
        let a = Sphere {
            radius: 1.0,
            ..Sphere::default()
        };
        let b = Sphere {
            center: [2.0, 0.0, 0.0],
            radius: 1.0,
            ..Sphere::default()
        };
        let c = Sphere {
            center: [1.5, 0.0, 0.0],
            radius: 1.0,
            ..Sphere::default()
        };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }
}
