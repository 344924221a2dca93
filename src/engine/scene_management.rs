//! Scene editing for [`RayTracingEngine`].
//!
//! Edits only mark the scene dirty; flattening and re-upload happen at the
//! start of the next frame.

use glam::Mat4;

use super::RayTracingEngine;
use crate::renderer::layout::Sphere;
use crate::scene::{ObjectId, RayTracingObject, Scene};

impl RayTracingEngine {
    /// Store and register a mesh object.
    pub fn add_object(&mut self, object: RayTracingObject) -> ObjectId {
        let id = self.dispatcher.scene_mut().add(object);
        log::debug!("added object {id}");
        id
    }

    /// Store a mesh object without registering it.
    pub fn insert_object(&mut self, object: RayTracingObject) -> ObjectId {
        self.dispatcher.scene_mut().insert(object)
    }

    /// Unregister and drop a mesh object.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<RayTracingObject> {
        self.dispatcher.scene_mut().remove(id)
    }

    /// Add a stored object to the rendered set. Returns `false` if it is
    /// unknown or already registered.
    pub fn register(&mut self, id: ObjectId) -> bool {
        self.dispatcher.scene_mut().register(id)
    }

    /// Remove an object from the rendered set. Returns `false` if it was not
    /// registered.
    pub fn unregister(&mut self, id: ObjectId) -> bool {
        self.dispatcher.scene_mut().unregister(id)
    }

    /// Move an object. Returns `false` if it is unknown or already there.
    pub fn set_transform(&mut self, id: ObjectId, transform: Mat4) -> bool {
        self.dispatcher.scene_mut().set_transform(id, transform)
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        self.dispatcher.scene()
    }

    /// The procedural sphere field.
    pub fn spheres(&self) -> &[Sphere] {
        self.dispatcher.spheres()
    }
}
