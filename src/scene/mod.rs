//! Authoritative scene: stored objects, the ordered registered set, and
//! dirty tracking for the flattened mesh buffers.
//!
//! Objects are stored once and then registered for rendering. Registration
//! order is stable and decides where each object's geometry lands in the
//! global vertex/index arrays. Mutations never rebuild anything directly;
//! they bump a generation counter that the [`SceneBuilder`] checks and
//! clears on the next frame.

mod builder;
mod object;
mod spheres;

use glam::Mat4;
use rustc_hash::FxHashMap;

pub use builder::{FlattenedScene, SceneBuilder};
pub use object::{Mesh, ObjectId, RayTracingObject};
pub use spheres::generate_spheres;

/// The authoritative scene.
#[derive(Default)]
pub struct Scene {
    objects: FxHashMap<ObjectId, RayTracingObject>,
    /// Registered objects in registration order.
    registered: Vec<ObjectId>,
    next_id: u64,
    /// Monotonically increasing generation; bumped on any mutation that
    /// affects the flattened geometry.
    generation: u64,
    /// Generation that was last flattened.
    rendered_generation: u64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Mutation helpers --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether registered geometry changed since the last
    /// [`mark_rendered`](Self::mark_rendered).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Force the next frame to rebuild the mesh buffers.
    pub fn force_dirty(&mut self) {
        self.invalidate();
    }

    /// Mark the current generation as flattened.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    // -- Objects --

    /// Store an object without registering it. Returns its handle.
    pub fn insert(&mut self, object: RayTracingObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let _ = self.objects.insert(id, object);
        id
    }

    /// Store and register an object in one step.
    pub fn add(&mut self, object: RayTracingObject) -> ObjectId {
        let id = self.insert(object);
        let _ = self.register(id);
        id
    }

    /// Unregister and drop an object.
    pub fn remove(&mut self, id: ObjectId) -> Option<RayTracingObject> {
        let _ = self.unregister(id);
        self.objects.remove(&id)
    }

    /// Look up a stored object.
    pub fn object(&self, id: ObjectId) -> Option<&RayTracingObject> {
        self.objects.get(&id)
    }

    /// Number of stored objects (registered or not).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Replace an object's world transform. Marks the scene dirty when a
    /// registered object actually moves.
    pub fn set_transform(&mut self, id: ObjectId, transform: Mat4) -> bool {
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        if object.transform == transform {
            return false;
        }
        object.transform = transform;
        if self.registered.contains(&id) {
            self.invalidate();
        }
        true
    }

    // -- Registration --

    /// Add a stored object to the rendered set.
    ///
    /// Returns `false` (and leaves the set untouched) if the object is
    /// unknown or already registered.
    pub fn register(&mut self, id: ObjectId) -> bool {
        if !self.objects.contains_key(&id) {
            log::warn!("register: unknown object {id}");
            return false;
        }
        if self.registered.contains(&id) {
            return false;
        }
        self.registered.push(id);
        self.invalidate();
        true
    }

    /// Remove an object from the rendered set. Returns `false` if it was not
    /// registered.
    pub fn unregister(&mut self, id: ObjectId) -> bool {
        let Some(pos) = self.registered.iter().position(|&r| r == id) else {
            return false;
        };
        let _ = self.registered.remove(pos);
        self.invalidate();
        true
    }

    /// Whether `id` is in the rendered set.
    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.registered.contains(&id)
    }

    /// Number of registered objects.
    pub fn registered_len(&self) -> usize {
        self.registered.len()
    }

    /// Registered objects in registration order.
    pub fn registered(
        &self,
    ) -> impl Iterator<Item = (ObjectId, &RayTracingObject)> + '_ {
        self.registered
            .iter()
            .filter_map(|&id| self.objects.get(&id).map(|object| (id, object)))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn triangle() -> RayTracingObject {
        RayTracingObject::new(Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        ))
    }

    #[test]
    fn new_scene_is_clean() {
        let scene = Scene::new();
        assert!(!scene.is_dirty());
        assert!(scene.is_empty());
    }

    #[test]
    fn insert_alone_does_not_dirty() {
        let mut scene = Scene::new();
        let id = scene.insert(triangle());
        assert!(!scene.is_dirty());
        assert!(!scene.is_registered(id));
    }

    #[test]
    fn register_and_unregister_dirty_the_scene() {
        let mut scene = Scene::new();
        let id = scene.insert(triangle());

        assert!(scene.register(id));
        assert!(scene.is_dirty());
        scene.mark_rendered();

        assert!(scene.unregister(id));
        assert!(scene.is_dirty());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut scene = Scene::new();
        let id = scene.add(triangle());
        scene.mark_rendered();

        assert!(!scene.register(id));
        assert!(!scene.is_dirty());
        assert_eq!(scene.registered_len(), 1);

        assert!(scene.unregister(id));
        assert!(!scene.unregister(id));
        assert_eq!(scene.registered_len(), 0);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut scene = Scene::new();
        let id = scene.add(triangle());
        let _ = scene.remove(id);
        assert!(!scene.register(id));
        assert!(!scene.set_transform(id, Mat4::IDENTITY));
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut scene = Scene::new();
        let a = scene.insert(triangle());
        let b = scene.insert(triangle());
        let c = scene.insert(triangle());
        let _ = scene.register(c);
        let _ = scene.register(a);
        let _ = scene.register(b);
        let order: Vec<ObjectId> = scene.registered().map(|(id, _)| id).collect();
        assert_eq!(order, vec![c, a, b]);
    }

    #[test]
    fn moving_a_registered_object_dirties() {
        let mut scene = Scene::new();
        let shown = scene.add(triangle());
        let hidden = scene.insert(triangle());
        scene.mark_rendered();

        let moved = Mat4::from_translation(Vec3::Y);
        assert!(scene.set_transform(hidden, moved));
        assert!(!scene.is_dirty());

        assert!(!scene.set_transform(shown, Mat4::IDENTITY));
        assert!(!scene.is_dirty());

        assert!(scene.set_transform(shown, moved));
        assert!(scene.is_dirty());
    }
}
