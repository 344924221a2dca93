//! Engine construction and viewport-sized resource creation.

use super::{RayTracingEngine, ViewportTextures, TARGET_FPS};
use crate::error::LumenError;
use crate::gpu::buffer_registry::{SceneBuffers, WgpuAllocator};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{
    AccumulationTextures, RenderTarget, StorageTexture, RADIANCE_FORMAT,
};
use crate::input::InputProcessor;
use crate::options::Options;
use crate::renderer::accumulate_pass::AccumulatePass;
use crate::renderer::blit_pass::BlitPass;
use crate::renderer::raytrace_pass::RayTracePass;
use crate::renderer::FrameDispatcher;
use crate::util::frame_timing::FrameTiming;

impl RayTracingEngine {
    /// Engine presenting to a window surface.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError`] if GPU initialization, blit shader
    /// composition or the sphere upload fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, LumenError> {
        let context = RenderContext::new(window, size).await?;
        Self::with_context(context, options)
    }

    /// Engine over an existing context (windowed or texture-only).
    ///
    /// A kernel or blend shader that fails to build is logged and leaves the
    /// engine in pass-through mode; the blit shader is required.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError`] if the blit shader cannot be composed or the
    /// sphere buffer cannot be allocated.
    pub fn with_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, LumenError> {
        let mut shader_composer = ShaderComposer::new()?;
        let device = &context.device;

        let raytrace = RayTracePass::new(device, &mut shader_composer)
            .inspect_err(|e| log::error!("ray tracing pass unavailable: {e}"))
            .ok();
        let accumulate = AccumulatePass::new(device, &mut shader_composer)
            .inspect_err(|e| log::error!("accumulation pass unavailable: {e}"))
            .ok();
        let blit =
            BlitPass::new(device, &mut shader_composer, context.format())?;

        let size = context.size();
        let textures = ViewportTextures::new(device, size);

        let spheres = options.spheres.generate();
        log::info!("generated {} spheres", spheres.len());
        let dispatcher =
            FrameDispatcher::new(spheres, options.render.frame_seed);

        let mut buffers = SceneBuffers::new();
        {
            let mut allocator = WgpuAllocator::new(device, &context.queue);
            let _ = buffers.upload_spheres(&mut allocator, dispatcher.spheres())?;
        }

        let camera = Some(options.camera.build_fly_camera(size));
        let light = options.lighting.to_light();
        let input = InputProcessor::with_key_bindings(options.keybindings.clone());

        let mut engine = Self {
            context,
            dispatcher,
            buffers,
            raytrace,
            accumulate,
            blit,
            textures,
            camera,
            light,
            input,
            options,
            frame_timing: FrameTiming::new(TARGET_FPS),
        };
        engine.rebind_textures();
        Ok(engine)
    }

    /// Rebuild every bind group that references a viewport texture.
    pub(super) fn rebind_textures(&mut self) {
        let device = &self.context.device;
        let textures = &self.textures;
        self.blit
            .rebind(device, &textures.accumulation, &textures.backdrop);
        if let Some(accumulate) = &mut self.accumulate {
            accumulate.rebind(device, &textures.raw, &textures.accumulation);
        }
        self.rebind_kernel();
    }

    /// Rebuild the kernel bind group after a scene buffer or the raw texture
    /// was recreated.
    pub(super) fn rebind_kernel(&mut self) {
        if let Some(raytrace) = &mut self.raytrace {
            raytrace.rebind(
                &self.context.device,
                &self.textures.raw,
                &self.buffers,
            );
        }
    }
}

impl ViewportTextures {
    pub(super) fn new(device: &wgpu::Device, size: (u32, u32)) -> Self {
        Self {
            raw: StorageTexture::new(device, "Raw Radiance Texture", size),
            accumulation: AccumulationTextures::new(device, size),
            backdrop: RenderTarget::new(
                device,
                "Backdrop Texture",
                size,
                RADIANCE_FORMAT,
            ),
        }
    }
}
