//! CPU half of a frame: change detection, deferred scene rebuild, dispatch
//! grid and kernel uniforms.
//!
//! The GPU half lives in [`RayTracingEngine`](crate::engine::RayTracingEngine),
//! which turns a [`FramePlan`] into command buffers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::accumulation::{AccumulationController, ChangeTracker, ViewChanges};
use super::layout::{FrameUniforms, Sphere};
use crate::camera::Camera;
use crate::error::LumenError;
use crate::gpu::buffer_registry::{BufferAllocator, SceneBuffers};
use crate::light::DirectionalLight;
use crate::scene::{FlattenedScene, Scene, SceneBuilder};

/// Threads per work-group along each axis (`@workgroup_size(8, 8, 1)`).
pub const THREAD_UNIT: u32 = 8;

/// Number of work-groups launched to cover the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGrid {
    /// Work-groups along x.
    pub x: u32,
    /// Work-groups along y.
    pub y: u32,
}

impl DispatchGrid {
    /// `ceil(width / 8) × ceil(height / 8)`.
    #[must_use]
    pub fn for_viewport((width, height): (u32, u32)) -> Self {
        Self {
            x: width.div_ceil(THREAD_UNIT),
            y: height.div_ceil(THREAD_UNIT),
        }
    }
}

/// Result of [`RayTracingEngine::render_frame`](crate::engine::RayTracingEngine::render_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The kernel ran and the blended average was presented.
    Rendered {
        /// Samples in the average after this frame.
        samples: u32,
    },
    /// A prerequisite was missing; the backdrop was copied through unchanged.
    PassThrough,
}

/// Everything the GPU half needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FramePlan {
    /// Kernel dispatch size.
    pub grid: DispatchGrid,
    /// Kernel uniforms.
    pub uniforms: FrameUniforms,
    /// Weight of the existing average in this frame's blend.
    pub sample: u32,
    /// The mesh arrays were re-flattened; mesh buffers must be re-uploaded.
    pub geometry_rebuilt: bool,
    /// What changed since the previous frame.
    pub changes: ViewChanges,
}

/// Owns the scene state and drives the per-frame protocol.
pub struct FrameDispatcher {
    scene: Scene,
    builder: SceneBuilder,
    spheres: Vec<Sphere>,
    accumulation: AccumulationController,
    tracker: ChangeTracker,
    rng: StdRng,
}

impl FrameDispatcher {
    /// Dispatcher over an empty scene and the given sphere field. `seed`
    /// drives the per-frame jitter and kernel seed.
    #[must_use]
    pub fn new(spheres: Vec<Sphere>, seed: u64) -> Self {
        Self {
            scene: Scene::new(),
            builder: SceneBuilder::new(),
            spheres,
            accumulation: AccumulationController::new(),
            tracker: ChangeTracker::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The scene, for inspection.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, for registration and edits. Changes take effect on the
    /// next [`prepare`](Self::prepare).
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The sphere field.
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Swap in a new sphere field and restart accumulation.
    pub fn replace_spheres(&mut self, spheres: Vec<Sphere>) {
        self.spheres = spheres;
        self.accumulation.reset();
    }

    /// Upload a new sphere field and make it current. Returns `true` if the
    /// sphere binding changed.
    ///
    /// A failed allocation leaves the sphere slot empty, so the field is
    /// emptied to match and the binding must be rebuilt anyway.
    pub fn upload_spheres<A>(
        &mut self,
        buffers: &mut SceneBuffers<A::Buffer>,
        allocator: &mut A,
        spheres: Vec<Sphere>,
    ) -> Result<bool, LumenError>
    where
        A: BufferAllocator,
    {
        match buffers.upload_spheres(allocator, &spheres) {
            Ok(rebind) => {
                self.replace_spheres(spheres);
                Ok(rebind)
            }
            Err(e) => {
                self.replace_spheres(Vec::new());
                Err(e)
            }
        }
    }

    /// Upload the mesh arrays flattened by the last [`prepare`](Self::prepare).
    /// Returns `true` if any mesh binding changed.
    ///
    /// On failure the scene is marked dirty, so the next frame rebuilds and
    /// retries the upload.
    pub fn upload_geometry<A>(
        &mut self,
        buffers: &mut SceneBuffers<A::Buffer>,
        allocator: &mut A,
    ) -> Result<bool, LumenError>
    where
        A: BufferAllocator,
    {
        let uploaded = buffers.upload_geometry(allocator, self.builder.geometry());
        if uploaded.is_err() {
            self.scene.force_dirty();
        }
        uploaded
    }

    /// Flattened mesh arrays from the last rebuild.
    pub fn geometry(&self) -> &FlattenedScene {
        self.builder.geometry()
    }

    /// The accumulation controller.
    pub fn accumulation(&self) -> &AccumulationController {
        &self.accumulation
    }

    /// Samples accumulated so far.
    pub fn samples(&self) -> u32 {
        self.accumulation.current_weight()
    }

    /// Restart accumulation on the next frame.
    pub fn reset_accumulation(&mut self) {
        self.accumulation.reset();
    }

    /// Run the CPU side of a frame.
    ///
    /// Detects camera/light/viewport changes, rebuilds the flattened mesh
    /// arrays if the scene is dirty (either restarts accumulation), then
    /// draws the kernel seed followed by the sub-pixel jitter.
    pub fn prepare(
        &mut self,
        viewport: (u32, u32),
        camera: &Camera,
        light: &DirectionalLight,
    ) -> FramePlan {
        let changes = self.tracker.observe(camera, light, viewport);
        self.accumulation
            .on_frame_start(changes.camera || changes.viewport, changes.light);

        let geometry_rebuilt = self.builder.rebuild(&mut self.scene);
        if geometry_rebuilt {
            self.accumulation.reset();
        }

        let seed: f32 = self.rng.random();
        let pixel_offset: [f32; 2] = [self.rng.random(), self.rng.random()];

        let geometry = self.builder.geometry();
        let uniforms = FrameUniforms {
            camera_to_world: camera.camera_to_world().to_cols_array_2d(),
            inverse_projection: camera.inverse_projection().to_cols_array_2d(),
            light: light.to_vec4().to_array(),
            pixel_offset,
            seed,
            sphere_count: self.spheres.len() as u32,
            mesh_count: geometry.mesh_objects.len() as u32,
            vertex_count: geometry.vertices.len() as u32,
            index_count: geometry.indices.len() as u32,
            _pad: 0,
        };

        FramePlan {
            grid: DispatchGrid::for_viewport(viewport),
            uniforms,
            sample: self.accumulation.current_weight(),
            geometry_rebuilt,
            changes,
        }
    }

    /// Count the frame just blended.
    pub fn frame_rendered(&mut self) {
        self.accumulation.on_frame_rendered();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::camera::Projection;
    use crate::gpu::buffer_registry::testing::CountingAllocator;
    use crate::gpu::buffer_registry::SceneCounts;
    use crate::scene::{Mesh, RayTracingObject};

    fn camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::ZERO,
            Projection::Perspective {
                fovy: 60.0,
                aspect: 1.0,
                znear: 0.3,
                zfar: 1000.0,
            },
        )
    }

    fn render(dispatcher: &mut FrameDispatcher, camera: &Camera) -> FramePlan {
        let plan = dispatcher.prepare((64, 48), camera, &DirectionalLight::default());
        dispatcher.frame_rendered();
        plan
    }

    #[test]
    fn grid_rounds_up() {
        assert_eq!(DispatchGrid::for_viewport((64, 48)), DispatchGrid { x: 8, y: 6 });
        assert_eq!(DispatchGrid::for_viewport((65, 1)), DispatchGrid { x: 9, y: 1 });
        assert_eq!(DispatchGrid::for_viewport((1920, 1080)), DispatchGrid { x: 240, y: 135 });
    }

    #[test]
    fn static_view_accumulates_k_samples() {
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let cam = camera();
        for k in 0..10 {
            let plan = render(&mut dispatcher, &cam);
            assert_eq!(plan.sample, k);
        }
        assert_eq!(dispatcher.samples(), 10);
    }

    #[test]
    fn camera_move_resets_on_next_frame() {
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let mut cam = camera();
        for _ in 0..4 {
            let _ = render(&mut dispatcher, &cam);
        }
        cam.position.y += 1.0;
        let plan = render(&mut dispatcher, &cam);
        assert_eq!(plan.sample, 0);
        assert!(plan.changes.camera);
        assert_eq!(dispatcher.samples(), 1);
    }

    #[test]
    fn registration_is_deferred_to_the_next_frame() {
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let cam = camera();
        for _ in 0..3 {
            let _ = render(&mut dispatcher, &cam);
        }

        let _ = dispatcher.scene_mut().add(RayTracingObject::new(Mesh::cube(1.0)));
        assert!(dispatcher.geometry().is_empty());
        assert_eq!(dispatcher.samples(), 3);

        let plan = render(&mut dispatcher, &cam);
        assert!(plan.geometry_rebuilt);
        assert_eq!(plan.sample, 0);
        assert_eq!(plan.uniforms.mesh_count, 1);
        assert_eq!(plan.uniforms.vertex_count, 8);
        assert_eq!(plan.uniforms.index_count, 36);

        let plan = render(&mut dispatcher, &cam);
        assert!(!plan.geometry_rebuilt);
        assert_eq!(plan.sample, 1);
    }

    #[test]
    fn uniforms_carry_camera_light_and_jitter() {
        let spheres = crate::scene::generate_spheres(5, 10, [1.0, 2.0], 50.0);
        let count = spheres.len() as u32;
        let mut dispatcher = FrameDispatcher::new(spheres, 1);
        let cam = camera();
        let light = DirectionalLight::new(Vec3::NEG_Y, 2.0);
        let plan = dispatcher.prepare((64, 48), &cam, &light);

        let u = plan.uniforms;
        assert_eq!(u.sphere_count, count);
        assert_eq!(u.light, [0.0, -1.0, 0.0, 2.0]);
        assert_eq!(u.camera_to_world, cam.camera_to_world().to_cols_array_2d());
        assert!(u.pixel_offset.iter().all(|o| (0.0..1.0).contains(o)));
        assert!((0.0..1.0).contains(&u.seed));
    }

    #[test]
    fn jitter_sequence_is_reproducible() {
        let cam = camera();
        let light = DirectionalLight::default();
        let mut a = FrameDispatcher::new(Vec::new(), 99);
        let mut b = FrameDispatcher::new(Vec::new(), 99);
        for _ in 0..5 {
            let pa = a.prepare((8, 8), &cam, &light);
            let pb = b.prepare((8, 8), &cam, &light);
            assert_eq!(pa.uniforms, pb.uniforms);
        }
    }

    #[test]
    fn replacing_spheres_restarts_accumulation() {
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let cam = camera();
        for _ in 0..3 {
            let _ = render(&mut dispatcher, &cam);
        }
        dispatcher.replace_spheres(crate::scene::generate_spheres(1, 4, [1.0, 2.0], 40.0));
        let plan = render(&mut dispatcher, &cam);
        assert_eq!(plan.sample, 0);
        assert_eq!(plan.uniforms.sphere_count, dispatcher.spheres().len() as u32);
    }

    #[test]
    fn failed_geometry_upload_is_retried_next_frame() {
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let mut buffers = SceneBuffers::new();
        let cam = camera();
        let light = DirectionalLight::default();
        let _ = dispatcher.scene_mut().add(RayTracingObject::new(Mesh::cube(1.0)));

        let plan = dispatcher.prepare((64, 48), &cam, &light);
        assert!(plan.geometry_rebuilt);
        let mut starved = CountingAllocator::with_limit(64);
        let err = dispatcher
            .upload_geometry(&mut buffers, &mut starved)
            .unwrap_err();
        assert!(matches!(err, LumenError::OutOfMemory { .. }));
        assert!(dispatcher.scene().is_dirty());
        let stale = plan.uniforms.with_counts(buffers.counts());
        assert_eq!(stale.vertex_count, buffers.vertices.count() as u32);
        assert_eq!(stale.index_count, 0);

        let mut alloc = CountingAllocator::default();
        let plan = dispatcher.prepare((64, 48), &cam, &light);
        assert!(plan.geometry_rebuilt);
        assert!(dispatcher.upload_geometry(&mut buffers, &mut alloc).unwrap());
        assert_eq!(
            buffers.counts(),
            SceneCounts {
                spheres: 0,
                mesh_objects: plan.uniforms.mesh_count,
                vertices: plan.uniforms.vertex_count,
                indices: plan.uniforms.index_count,
            }
        );
        assert_eq!(plan.uniforms.vertex_count, 8);
    }

    #[test]
    fn failed_sphere_upload_empties_the_field() {
        let spheres = crate::scene::generate_spheres(3, 10, [1.0, 2.0], 50.0);
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let mut buffers = SceneBuffers::new();
        let mut alloc = CountingAllocator::with_limit(16);

        let err = dispatcher
            .upload_spheres(&mut buffers, &mut alloc, spheres)
            .unwrap_err();
        assert!(matches!(err, LumenError::OutOfMemory { .. }));
        assert!(dispatcher.spheres().is_empty());
        assert_eq!(buffers.counts().spheres, 0);
    }

    #[test]
    fn empty_scene_allocates_nothing() {
        let mut dispatcher = FrameDispatcher::new(Vec::new(), 0);
        let mut buffers = SceneBuffers::new();
        let mut alloc = CountingAllocator::default();
        dispatcher.scene_mut().force_dirty();

        let plan = dispatcher.prepare((64, 48), &camera(), &DirectionalLight::default());
        assert!(plan.geometry_rebuilt);
        assert!(!dispatcher.upload_geometry(&mut buffers, &mut alloc).unwrap());
        assert_eq!(alloc.allocations, 0);
        assert_eq!(buffers.counts(), SceneCounts::default());
        assert_eq!(plan.uniforms.mesh_count, 0);
    }
}
