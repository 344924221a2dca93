//! Flattening of registered objects into the kernel's linear arrays.

use super::{ObjectId, RayTracingObject, Scene};
use crate::renderer::layout::{MeshInstance, Vertex};

/// The three arrays consumed by the mesh storage buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedScene {
    /// One record per registered object, in registration order.
    pub mesh_objects: Vec<MeshInstance>,
    /// All object-space vertex positions, concatenated.
    pub vertices: Vec<Vertex>,
    /// Global triangle-list indices, rebased onto `vertices`.
    pub indices: Vec<u32>,
}

impl FlattenedScene {
    /// Empty all three arrays, keeping their capacity.
    pub fn clear(&mut self) {
        self.mesh_objects.clear();
        self.vertices.clear();
        self.indices.clear();
    }

    /// Whether no mesh objects are present.
    pub fn is_empty(&self) -> bool {
        self.mesh_objects.is_empty()
    }

    fn append(&mut self, id: ObjectId, object: &RayTracingObject) {
        let first_vertex = self.vertices.len() as u32;
        let index_offset = self.indices.len() as u32;
        let vertex_count = object.mesh.positions.len() as u32;

        self.vertices
            .extend(object.mesh.positions.iter().copied().map(Vertex::from));

        let mut dropped = 0usize;
        for triangle in object.mesh.indices.chunks(3) {
            if triangle.len() == 3 && triangle.iter().all(|&i| i < vertex_count)
            {
                self.indices
                    .extend(triangle.iter().map(|&i| i + first_vertex));
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!("object {id}: dropped {dropped} malformed triangle(s)");
        }

        let index_count = self.indices.len() as u32 - index_offset;
        self.mesh_objects.push(MeshInstance::new(
            object.transform,
            index_offset,
            index_count,
        ));
    }
}

/// Rebuilds the flattened arrays when the scene is dirty.
#[derive(Default)]
pub struct SceneBuilder {
    geometry: FlattenedScene,
    rebuilds: u64,
}

impl SceneBuilder {
    /// Builder with empty output arrays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-flatten every registered object if the scene is dirty, then clear
    /// the dirty flag.
    ///
    /// Returns `true` if a rebuild happened; callers must then re-upload the
    /// mesh buffers and restart accumulation. A second call without
    /// intervening scene changes is a no-op.
    pub fn rebuild(&mut self, scene: &mut Scene) -> bool {
        if !scene.is_dirty() {
            return false;
        }

        self.geometry.clear();
        for (id, object) in scene.registered() {
            self.geometry.append(id, object);
        }
        scene.mark_rendered();
        self.rebuilds += 1;

        log::info!(
            "scene rebuilt: {} objects, {} vertices, {} indices",
            self.geometry.mesh_objects.len(),
            self.geometry.vertices.len(),
            self.geometry.indices.len()
        );
        true
    }

    /// Output of the last rebuild.
    pub fn geometry(&self) -> &FlattenedScene {
        &self.geometry
    }

    /// Number of rebuilds performed so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::scene::Mesh;

    fn mesh(vertices: usize, indices: Vec<u32>) -> RayTracingObject {
        let positions = (0..vertices).map(|i| Vec3::splat(i as f32)).collect();
        RayTracingObject::new(Mesh::new(positions, indices))
    }

    #[test]
    fn second_object_indices_are_rebased() {
        let mut scene = Scene::new();
        let _ = scene.add(mesh(3, vec![0, 1, 2]));
        let _ = scene.add(mesh(4, vec![0, 1, 2, 0, 2, 3]));
        let mut builder = SceneBuilder::new();

        assert!(builder.rebuild(&mut scene));

        let geometry = builder.geometry();
        assert_eq!(geometry.indices.len(), 9);
        assert_eq!(geometry.indices[..3], [0, 1, 2]);
        assert_eq!(geometry.indices[3..], [3, 4, 5, 3, 5, 6]);
        assert_eq!(geometry.vertices.len(), 7);
        assert_eq!(geometry.mesh_objects[0].index_offset, 0);
        assert_eq!(geometry.mesh_objects[0].index_count, 3);
        assert_eq!(geometry.mesh_objects[1].index_offset, 3);
        assert_eq!(geometry.mesh_objects[1].index_count, 6);
    }

    #[test]
    fn empty_scene_rebuild_clears_dirty_flag() {
        let mut scene = Scene::new();
        scene.force_dirty();
        let mut builder = SceneBuilder::new();

        assert!(builder.rebuild(&mut scene));
        assert!(builder.geometry().is_empty());
        assert!(builder.geometry().vertices.is_empty());
        assert!(builder.geometry().indices.is_empty());
        assert!(!scene.is_dirty());
    }

    #[test]
    fn rebuild_without_changes_is_a_noop() {
        let mut scene = Scene::new();
        let _ = scene.add(mesh(3, vec![0, 1, 2]));
        let mut builder = SceneBuilder::new();

        assert!(builder.rebuild(&mut scene));
        let first = builder.geometry().clone();
        assert!(!builder.rebuild(&mut scene));
        assert_eq!(builder.geometry(), &first);
        assert_eq!(builder.rebuild_count(), 1);
    }

    #[test]
    fn unregistered_objects_are_skipped_and_arrays_reset() {
        let mut scene = Scene::new();
        let a = scene.add(mesh(3, vec![0, 1, 2]));
        let _b = scene.add(mesh(3, vec![2, 1, 0]));
        let mut builder = SceneBuilder::new();
        let _ = builder.rebuild(&mut scene);

        let _ = scene.unregister(a);
        assert!(builder.rebuild(&mut scene));
        let geometry = builder.geometry();
        assert_eq!(geometry.mesh_objects.len(), 1);
        assert_eq!(geometry.vertices.len(), 3);
        assert_eq!(geometry.indices, vec![2, 1, 0]);
    }

    #[test]
    fn empty_and_malformed_meshes_do_not_break_the_rebuild() {
        let mut scene = Scene::new();
        let _ = scene.add(mesh(0, vec![]));
        // One good triangle, one out-of-range, one dangling index.
        let _ = scene.add(mesh(3, vec![0, 1, 2, 0, 1, 9, 2]));
        let mut builder = SceneBuilder::new();

        assert!(builder.rebuild(&mut scene));
        let geometry = builder.geometry();
        assert_eq!(geometry.mesh_objects.len(), 2);
        assert_eq!(geometry.mesh_objects[0].index_count, 0);
        assert_eq!(geometry.mesh_objects[1].index_offset, 0);
        assert_eq!(geometry.mesh_objects[1].index_count, 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
    }

    #[test]
    fn instance_captures_current_transform() {
        let mut scene = Scene::new();
        let id = scene.add(mesh(3, vec![0, 1, 2]));
        let mut builder = SceneBuilder::new();
        let _ = builder.rebuild(&mut scene);

        let moved = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let _ = scene.set_transform(id, moved);
        assert!(builder.rebuild(&mut scene));
        assert_eq!(builder.geometry().mesh_objects[0].transform(), moved);
    }
}
