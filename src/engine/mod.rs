//! The ray-tracing engine: GPU resources, scene state and the frame loop.
//!
//! Split across submodules by concern; all of them extend
//! [`RayTracingEngine`].

mod accessors;
mod construction;
mod input;
mod render;
mod scene_management;

use crate::camera::FlyCamera;
use crate::gpu::buffer_registry::{SceneBuffers, WgpuAllocator};
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::{AccumulationTextures, RenderTarget, StorageTexture};
use crate::input::InputProcessor;
use crate::light::DirectionalLight;
use crate::options::Options;
use crate::renderer::accumulate_pass::AccumulatePass;
use crate::renderer::blit_pass::BlitPass;
use crate::renderer::raytrace_pass::RayTracePass;
use crate::renderer::FrameDispatcher;
use crate::util::frame_timing::FrameTiming;

/// Frame-rate cap of the interactive loop.
const TARGET_FPS: u32 = 300;

/// Textures sized to the viewport.
struct ViewportTextures {
    /// Raw kernel output for the current frame.
    raw: StorageTexture,
    /// Ping-pong running average.
    accumulation: AccumulationTextures,
    /// Background shown while tracing is unavailable.
    backdrop: RenderTarget,
}

/// The progressive ray-tracing engine.
///
/// Owns the GPU context, the scene, the structured scene buffers and the
/// three passes (kernel, accumulation blend, blit). Each frame traces one
/// jittered sample per pixel and folds it into a running average that
/// restarts whenever the camera, light, viewport or registered geometry
/// changes.
///
/// # Frame loop
///
/// ```ignore
/// engine.update(dt);
/// engine.render_frame()?;
/// ```
///
/// Call [`resize`](Self::resize) when the window size changes. Input is
/// forwarded via [`handle_input`](Self::handle_input) and
/// [`handle_key`](Self::handle_key).
///
/// # Scene management
///
/// Mesh objects are added with [`add_object`](Self::add_object) and can be
/// (un)registered at any time; the flattened geometry is rebuilt lazily at
/// the start of the next frame.
///
/// # Pass-through
///
/// Without a camera, or when the kernel or blend shader failed to build,
/// frames copy a solid backdrop to the output instead of tracing.
pub struct RayTracingEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    /// Scene state and the per-frame protocol.
    dispatcher: FrameDispatcher,
    /// GPU copies of the sphere and mesh arrays.
    buffers: SceneBuffers<wgpu::Buffer>,
    raytrace: Option<RayTracePass>,
    accumulate: Option<AccumulatePass>,
    blit: BlitPass,
    textures: ViewportTextures,
    /// Fly controller; `None` renders pass-through frames.
    camera: Option<FlyCamera>,
    light: DirectionalLight,
    /// Mouse and keyboard state.
    input: InputProcessor,
    options: Options,
    /// Per-frame timing and FPS tracking.
    frame_timing: FrameTiming,
}

impl Drop for RayTracingEngine {
    fn drop(&mut self) {
        let mut allocator =
            WgpuAllocator::new(&self.context.device, &self.context.queue);
        self.buffers.release_all(&mut allocator);
    }
}
