use std::fmt;

use glam::{Mat4, Vec3};

/// Stable handle to an object stored in a [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// Raw numeric value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Indexed triangle list in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle-list indices into `positions`.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Mesh from raw positions and indices.
    #[must_use]
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Axis-aligned cube centred on the origin, faces wound counter-clockwise
    /// when seen from outside.
    #[must_use]
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +z
            1, 0, 3, 1, 3, 2, // -z
            5, 1, 2, 5, 2, 6, // +x
            0, 4, 7, 0, 7, 3, // -x
            7, 6, 2, 7, 2, 3, // +y
            0, 1, 5, 0, 5, 4, // -y
        ];
        Self { positions, indices }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// A renderable triangle mesh placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct RayTracingObject {
    /// Geometry in object space.
    pub mesh: Mesh,
    /// Local-to-world transform.
    pub transform: Mat4,
}

impl RayTracingObject {
    /// Object with an identity transform.
    #[must_use]
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            transform: Mat4::IDENTITY,
        }
    }

    /// Builder-style transform override.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}
