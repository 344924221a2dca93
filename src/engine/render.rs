//! Per-frame rendering: trace, blend, present.

use super::{RayTracingEngine, ViewportTextures};
use crate::error::LumenError;
use crate::gpu::buffer_registry::WgpuAllocator;
use crate::renderer::blit_pass::BlitSource;
use crate::renderer::{FrameOutcome, FramePlan};

impl RayTracingEngine {
    /// Render one frame to the window surface and present it.
    ///
    /// Returns `Ok(None)` when the frame was skipped by the FPS cap.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError::Surface`] if the swapchain frame cannot be
    /// acquired (the caller reconfigures on `Lost`/`Outdated`), or
    /// [`LumenError::OutOfMemory`] if re-uploading scene geometry fails.
    pub fn render_frame(&mut self) -> Result<Option<FrameOutcome>, LumenError> {
        if !self.frame_timing.should_render() {
            return Ok(None);
        }

        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let outcome = self.render_to(&view)?;
        frame.present();
        Ok(Some(outcome))
    }

    /// Render one frame into a caller-owned view in the context's format.
    /// No surface is presented.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError::OutOfMemory`] if re-uploading scene geometry
    /// fails.
    pub fn render_to(
        &mut self,
        view: &wgpu::TextureView,
    ) -> Result<FrameOutcome, LumenError> {
        let outcome = if self.can_trace() {
            self.trace_frame(view)?
        } else {
            self.pass_through(view);
            FrameOutcome::PassThrough
        };
        let _ = self.frame_timing.end_frame();
        Ok(outcome)
    }

    fn can_trace(&self) -> bool {
        self.camera.is_some()
            && self.raytrace.is_some()
            && self.accumulate.is_some()
    }

    /// Copy the solid backdrop to `view` unchanged.
    fn pass_through(&self, view: &wgpu::TextureView) {
        let mut encoder = self.context.create_encoder();
        self.textures
            .backdrop
            .clear(&mut encoder, self.options.render.background_color());
        self.blit.render(&mut encoder, view, BlitSource::Backdrop);
        self.context.submit(encoder);
    }

    fn trace_frame(
        &mut self,
        view: &wgpu::TextureView,
    ) -> Result<FrameOutcome, LumenError> {
        let Some(fly) = &self.camera else {
            self.pass_through(view);
            return Ok(FrameOutcome::PassThrough);
        };
        let plan = self.dispatcher.prepare(
            self.context.size(),
            &fly.camera,
            &self.light,
        );

        if plan.geometry_rebuilt {
            self.upload_geometry()?;
        }

        if self.options.render.is_converged(plan.sample) {
            let mut encoder = self.context.create_encoder();
            self.blit.render(
                &mut encoder,
                view,
                BlitSource::Accumulated(self.textures.accumulation.current_index()),
            );
            self.context.submit(encoder);
            return Ok(FrameOutcome::Rendered {
                samples: plan.sample,
            });
        }

        if !self.encode_sample(view, &plan) {
            self.pass_through(view);
            return Ok(FrameOutcome::PassThrough);
        }
        self.textures.accumulation.swap();
        self.dispatcher.frame_rendered();
        Ok(FrameOutcome::Rendered {
            samples: self.dispatcher.samples(),
        })
    }

    /// Push freshly flattened geometry to the GPU, rebinding the kernel if a
    /// buffer was reallocated. A failed upload may already have destroyed a
    /// bound buffer, so the kernel is rebound before the error propagates.
    fn upload_geometry(&mut self) -> Result<(), LumenError> {
        let uploaded = {
            let mut allocator =
                WgpuAllocator::new(&self.context.device, &self.context.queue);
            self.dispatcher
                .upload_geometry(&mut self.buffers, &mut allocator)
        };
        if !matches!(uploaded, Ok(false)) {
            self.rebind_kernel();
        }
        uploaded.map(|_| ())
    }

    /// Record and submit kernel, blend and blit. Returns `false` without
    /// submitting if a pass is missing or unbound.
    fn encode_sample(&self, view: &wgpu::TextureView, plan: &FramePlan) -> bool {
        let (Some(raytrace), Some(accumulate)) = (&self.raytrace, &self.accumulate)
        else {
            return false;
        };
        let ViewportTextures { accumulation, .. } = &self.textures;

        raytrace.write_uniforms(
            &self.context.queue,
            &plan.uniforms.with_counts(self.buffers.counts()),
        );
        accumulate.write_uniforms(&self.context.queue, plan.sample);

        let mut encoder = self.context.create_encoder();
        if !raytrace.dispatch(&mut encoder, plan.grid)
            || !accumulate.dispatch(&mut encoder, plan.grid, accumulation)
        {
            return false;
        }
        let written = 1 - accumulation.current_index();
        self.blit
            .render(&mut encoder, view, BlitSource::Accumulated(written));
        self.context.submit(encoder);
        true
    }
}
