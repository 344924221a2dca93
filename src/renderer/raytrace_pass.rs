//! The ray-tracing kernel pass: one jittered path-traced sample per pixel,
//! written to the raw radiance texture.

use super::frame::DispatchGrid;
use super::layout::FrameUniforms;
use crate::error::LumenError;
use crate::gpu::buffer_registry::SceneBuffers;
use crate::gpu::pipeline_helpers::{
    create_compute_pipeline, storage_buffer, storage_texture, uniform_buffer,
};
use crate::gpu::shader_composer::{sources, ShaderComposer};
use crate::gpu::texture::{StorageTexture, RADIANCE_FORMAT};

/// Size of the stand-in bound for an empty scene buffer. The kernel never
/// reads it because the matching count uniform is zero.
const PLACEHOLDER_SIZE: u64 = 16;

/// Compute pipeline, uniforms and bind group for the kernel.
///
/// The bind group is rebuilt only when a scene buffer is reallocated or the
/// output texture is recreated; the uniforms are rewritten every frame.
pub struct RayTracePass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    placeholder: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
}

impl RayTracePass {
    /// Compose the kernel and create its pipeline.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, LumenError> {
        let shader = shader_composer.compose(
            device,
            "Ray Tracing Kernel",
            sources::RAYTRACE,
        )?;

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Ray Tracing Bind Group Layout"),
                entries: &[
                    uniform_buffer(0, wgpu::ShaderStages::COMPUTE),
                    storage_texture(1, RADIANCE_FORMAT),
                    storage_buffer(2),
                    storage_buffer(3),
                    storage_buffer(4),
                    storage_buffer(5),
                ],
            });

        let pipeline = create_compute_pipeline(
            device,
            "Ray Tracing",
            &shader,
            &[&bind_group_layout],
        );

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let placeholder = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Empty Scene Buffer"),
            size: PLACEHOLDER_SIZE,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            placeholder,
            bind_group: None,
        })
    }

    /// Rebuild the bind group against the current output texture and scene
    /// buffers. Empty buffers are bound as a placeholder.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        output: &StorageTexture,
        buffers: &SceneBuffers<wgpu::Buffer>,
    ) {
        let placeholder = &self.placeholder;
        self.bind_group =
            Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Ray Tracing Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            &output.view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: or_placeholder(buffers.spheres.buffer(), placeholder),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: or_placeholder(buffers.mesh_objects.buffer(), placeholder),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: or_placeholder(buffers.vertices.buffer(), placeholder),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: or_placeholder(buffers.indices.buffer(), placeholder),
                    },
                ],
            }));
    }

    /// Upload this frame's uniforms.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(uniforms),
        );
    }

    /// Record the kernel dispatch. Returns `false` (recording nothing) if
    /// the pass has not been bound yet.
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        grid: DispatchGrid,
    ) -> bool {
        let Some(bind_group) = &self.bind_group else {
            return false;
        };
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Ray Tracing Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(grid.x, grid.y, 1);
        true
    }
}

fn or_placeholder<'b>(
    buffer: Option<&'b wgpu::Buffer>,
    placeholder: &'b wgpu::Buffer,
) -> wgpu::BindingResource<'b> {
    buffer.unwrap_or(placeholder).as_entire_binding()
}
