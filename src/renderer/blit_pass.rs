//! Fullscreen copy of a radiance texture onto the output target.

use crate::error::LumenError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, texture_2d_unfilterable,
};
use crate::gpu::shader_composer::{sources, ShaderComposer};
use crate::gpu::texture::{AccumulationTextures, RenderTarget};

/// Which texture a [`BlitPass::render`] copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitSource {
    /// Accumulation texture by ping-pong index.
    Accumulated(usize),
    /// The pass-through backdrop.
    Backdrop,
}

struct BlitBindGroups {
    accumulated: [wgpu::BindGroup; 2],
    backdrop: wgpu::BindGroup,
}

/// Presents radiance textures in the output format.
pub struct BlitPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_groups: Option<BlitBindGroups>,
}

impl BlitPass {
    /// Create the blit pipeline targeting `format`.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        format: wgpu::TextureFormat,
    ) -> Result<Self, LumenError> {
        let shader =
            shader_composer.compose(device, "Blit Shader", sources::BLIT)?;

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blit Bind Group Layout"),
                entries: &[texture_2d_unfilterable(
                    0,
                    wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let pipeline = create_screen_space_pipeline(
            device,
            "Blit",
            &shader,
            format,
            &[&bind_group_layout],
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_groups: None,
        })
    }

    /// Rebuild the bind groups after the source textures were recreated.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        textures: &AccumulationTextures,
        backdrop: &RenderTarget,
    ) {
        let [a, b] = textures.pair();
        self.bind_groups = Some(BlitBindGroups {
            accumulated: [
                self.create_bind_group(device, "Blit Bind Group A", &a.view),
                self.create_bind_group(device, "Blit Bind Group B", &b.view),
            ],
            backdrop: self.create_bind_group(
                device,
                "Blit Bind Group Backdrop",
                &backdrop.view,
            ),
        });
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            }],
        })
    }

    /// Draw `source` over the whole `target`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        source: BlitSource,
    ) {
        let Some(groups) = &self.bind_groups else {
            return;
        };
        let bind_group = match source {
            BlitSource::Accumulated(index) => &groups.accumulated[index & 1],
            BlitSource::Backdrop => &groups.backdrop,
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
