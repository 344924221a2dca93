//! Progressive blend of the raw kernel output into the running average.

use super::frame::DispatchGrid;
use super::layout::AccumulationUniforms;
use crate::error::LumenError;
use crate::gpu::pipeline_helpers::{
    create_compute_pipeline, storage_texture, texture_2d_unfilterable,
    uniform_buffer,
};
use crate::gpu::shader_composer::{sources, ShaderComposer};
use crate::gpu::texture::{
    AccumulationTextures, StorageTexture, RADIANCE_FORMAT,
};

/// Compute pass computing `(average * n + raw) / (n + 1)`.
///
/// Holds one bind group per ping-pong direction: group `i` reads texture
/// `i` as the previous average and writes texture `1 - i`.
pub struct AccumulatePass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_groups: Option<[wgpu::BindGroup; 2]>,
}

impl AccumulatePass {
    /// Compose the blend shader and create its pipeline.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, LumenError> {
        let shader = shader_composer.compose(
            device,
            "Accumulation Shader",
            sources::ACCUMULATE,
        )?;

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Accumulation Bind Group Layout"),
                entries: &[
                    uniform_buffer(0, wgpu::ShaderStages::COMPUTE),
                    texture_2d_unfilterable(1, wgpu::ShaderStages::COMPUTE),
                    texture_2d_unfilterable(2, wgpu::ShaderStages::COMPUTE),
                    storage_texture(3, RADIANCE_FORMAT),
                ],
            });

        let pipeline = create_compute_pipeline(
            device,
            "Accumulation",
            &shader,
            &[&bind_group_layout],
        );

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Accumulation Uniform Buffer"),
            size: size_of::<AccumulationUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            bind_groups: None,
        })
    }

    /// Rebuild both bind groups after the textures were (re)created.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        raw: &StorageTexture,
        textures: &AccumulationTextures,
    ) {
        let [a, b] = textures.pair();
        self.bind_groups = Some([
            self.create_bind_group(device, "Accumulation Bind Group A→B", raw, a, b),
            self.create_bind_group(device, "Accumulation Bind Group B→A", raw, b, a),
        ]);
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        raw: &StorageTexture,
        previous: &StorageTexture,
        next: &StorageTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&raw.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&previous.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&next.view),
                },
            ],
        })
    }

    /// Upload the weight of the existing average.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, sample_count: u32) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&AccumulationUniforms::new(sample_count)),
        );
    }

    /// Record the blend from `textures.current()` into `textures.next()`.
    /// The caller swaps the pair once the frame is submitted. Returns
    /// `false` if the pass has not been bound yet.
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        grid: DispatchGrid,
        textures: &AccumulationTextures,
    ) -> bool {
        let Some(bind_groups) = &self.bind_groups else {
            return false;
        };
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Accumulation Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_groups[textures.current_index()], &[]);
        pass.dispatch_workgroups(grid.x, grid.y, 1);
        true
    }
}
