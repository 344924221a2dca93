//! Structured storage buffers mirrored from CPU-side scene arrays.
//!
//! Every buffer is sized exactly `len * stride` bytes. A buffer is destroyed
//! and recreated when the element count or stride changes, overwritten in
//! place when the shape is unchanged, and released when its data becomes
//! empty. Allocation goes through [`BufferAllocator`] so the policy can be
//! exercised without a GPU.

use bytemuck::Pod;

use crate::error::LumenError;
use crate::renderer::layout::{MeshInstance, Sphere, Vertex};
use crate::scene::FlattenedScene;

/// Backend that creates, fills, and destroys storage buffers.
pub trait BufferAllocator {
    /// Handle to an allocated buffer.
    type Buffer;

    /// Allocate a storage buffer of exactly `size` bytes.
    ///
    /// Fails only on resource exhaustion, which callers treat as fatal.
    fn allocate(
        &mut self,
        label: &str,
        size: u64,
    ) -> Result<Self::Buffer, LumenError>;

    /// Overwrite the buffer contents starting at offset zero.
    fn upload(&mut self, buffer: &Self::Buffer, bytes: &[u8]);

    /// Destroy the buffer.
    fn release(&mut self, buffer: Self::Buffer);
}

/// [`BufferAllocator`] backed by a wgpu device and queue.
pub struct WgpuAllocator<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl<'a> WgpuAllocator<'a> {
    /// Wrap a device/queue pair.
    #[must_use]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl BufferAllocator for WgpuAllocator<'_> {
    type Buffer = wgpu::Buffer;

    fn allocate(
        &mut self,
        label: &str,
        size: u64,
    ) -> Result<wgpu::Buffer, LumenError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope())
        {
            log::error!("allocating {label} ({size} bytes) failed: {error}");
            buffer.destroy();
            return Err(LumenError::OutOfMemory {
                label: label.to_owned(),
                bytes: size,
            });
        }
        log::debug!("allocated {label}: {size} bytes");
        Ok(buffer)
    }

    fn upload(&mut self, buffer: &wgpu::Buffer, bytes: &[u8]) {
        self.queue.write_buffer(buffer, 0, bytes);
    }

    fn release(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}

/// What a reconcile call did to the underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// No buffer before, none after (empty data).
    Unchanged,
    /// Same shape: contents overwritten, no allocation.
    Updated,
    /// A new buffer was allocated (first upload or shape change).
    Reallocated,
    /// Data became empty and the buffer was released.
    Released,
}

impl Reconciled {
    /// Whether bind groups referencing the slot must be rebuilt.
    #[must_use]
    pub fn binding_changed(self) -> bool {
        matches!(self, Self::Reallocated | Self::Released)
    }
}

/// A single storage buffer slot whose shape tracks a CPU-side array.
pub struct StructuredBuffer<B> {
    label: &'static str,
    slot: Option<B>,
    count: usize,
    stride: usize,
}

impl<B> StructuredBuffer<B> {
    /// Empty slot; nothing is allocated until data arrives.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slot: None,
            count: 0,
            stride: 0,
        }
    }

    /// Reconcile the slot against a typed slice. The stride is the element
    /// size of `T`.
    pub fn reconcile<T, A>(
        &mut self,
        allocator: &mut A,
        data: &[T],
    ) -> Result<Reconciled, LumenError>
    where
        T: Pod,
        A: BufferAllocator<Buffer = B>,
    {
        self.reconcile_bytes(
            allocator,
            bytemuck::cast_slice(data),
            data.len(),
            size_of::<T>(),
        )
    }

    /// Reconcile the slot against raw bytes holding `count` elements of
    /// `stride` bytes each.
    pub fn reconcile_bytes<A>(
        &mut self,
        allocator: &mut A,
        bytes: &[u8],
        count: usize,
        stride: usize,
    ) -> Result<Reconciled, LumenError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        debug_assert_eq!(bytes.len(), count * stride);

        let shape_changed = self.count != count || self.stride != stride;
        if count == 0 || shape_changed {
            if let Some(old) = self.slot.take() {
                allocator.release(old);
                self.count = 0;
                if count == 0 {
                    return Ok(Reconciled::Released);
                }
            }
        }
        if count == 0 {
            return Ok(Reconciled::Unchanged);
        }

        let outcome = if self.slot.is_none() {
            let size = (count * stride) as u64;
            self.slot = Some(allocator.allocate(self.label, size)?);
            self.count = count;
            self.stride = stride;
            Reconciled::Reallocated
        } else {
            Reconciled::Updated
        };

        if let Some(buffer) = &self.slot {
            allocator.upload(buffer, bytes);
        }
        Ok(outcome)
    }

    /// Release the buffer, if any.
    pub fn release<A>(&mut self, allocator: &mut A)
    where
        A: BufferAllocator<Buffer = B>,
    {
        if let Some(old) = self.slot.take() {
            allocator.release(old);
        }
        self.count = 0;
    }

    /// The live buffer, or `None` when the data is empty.
    pub fn buffer(&self) -> Option<&B> {
        self.slot.as_ref()
    }

    /// Number of elements currently stored.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Element stride in bytes of the live buffer.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Size of the live buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.count * self.stride
    }

    /// Whether no buffer is allocated.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

/// Element counts of the scene buffers, as consumed by the kernel uniforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneCounts {
    /// Spheres in the sphere buffer.
    pub spheres: u32,
    /// Mesh instances in the mesh-object buffer.
    pub mesh_objects: u32,
    /// Vertices in the vertex buffer.
    pub vertices: u32,
    /// Indices in the index buffer.
    pub indices: u32,
}

/// The four storage buffers read by the ray-tracing kernel.
pub struct SceneBuffers<B> {
    /// Packed [`Sphere`] records.
    pub spheres: StructuredBuffer<B>,
    /// Packed [`MeshInstance`] records.
    pub mesh_objects: StructuredBuffer<B>,
    /// Packed [`Vertex`] positions.
    pub vertices: StructuredBuffer<B>,
    /// Global `u32` triangle-list indices.
    pub indices: StructuredBuffer<B>,
}

impl<B> Default for SceneBuffers<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> SceneBuffers<B> {
    /// All slots empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spheres: StructuredBuffer::new("Sphere Buffer"),
            mesh_objects: StructuredBuffer::new("Mesh Object Buffer"),
            vertices: StructuredBuffer::new("Vertex Buffer"),
            indices: StructuredBuffer::new("Index Buffer"),
        }
    }

    /// Upload the sphere set. Returns `true` if the binding changed.
    pub fn upload_spheres<A>(
        &mut self,
        allocator: &mut A,
        spheres: &[Sphere],
    ) -> Result<bool, LumenError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        Ok(self.spheres.reconcile(allocator, spheres)?.binding_changed())
    }

    /// Upload freshly flattened mesh geometry. Returns `true` if any of the
    /// three bindings changed.
    pub fn upload_geometry<A>(
        &mut self,
        allocator: &mut A,
        geometry: &FlattenedScene,
    ) -> Result<bool, LumenError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        let objects = self
            .mesh_objects
            .reconcile::<MeshInstance, _>(allocator, &geometry.mesh_objects)?;
        let vertices = self
            .vertices
            .reconcile::<Vertex, _>(allocator, &geometry.vertices)?;
        let indices = self
            .indices
            .reconcile::<u32, _>(allocator, &geometry.indices)?;
        log::debug!(
            "scene buffers: objects {objects:?}, vertices {vertices:?}, \
             indices {indices:?}"
        );
        Ok(objects.binding_changed()
            || vertices.binding_changed()
            || indices.binding_changed())
    }

    /// Element counts for the kernel uniforms.
    pub fn counts(&self) -> SceneCounts {
        SceneCounts {
            spheres: self.spheres.count() as u32,
            mesh_objects: self.mesh_objects.count() as u32,
            vertices: self.vertices.count() as u32,
            indices: self.indices.count() as u32,
        }
    }

    /// Release every buffer.
    pub fn release_all<A>(&mut self, allocator: &mut A)
    where
        A: BufferAllocator<Buffer = B>,
    {
        self.spheres.release(allocator);
        self.mesh_objects.release(allocator);
        self.vertices.release(allocator);
        self.indices.release(allocator);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{BufferAllocator, LumenError};

    /// Fake GPU buffer: an id plus its byte size.
    #[derive(Debug, PartialEq, Eq)]
    pub(crate) struct FakeBuffer {
        pub id: u32,
        pub size: u64,
    }

    /// Counts allocator traffic; refuses allocations above `limit` bytes.
    #[derive(Default)]
    pub(crate) struct CountingAllocator {
        pub allocations: u32,
        pub releases: u32,
        pub uploads: u32,
        pub live_bytes: u64,
        pub limit: Option<u64>,
        next_id: u32,
    }

    impl CountingAllocator {
        /// Allocator that fails once more than `limit` bytes would be live.
        pub fn with_limit(limit: u64) -> Self {
            Self {
                limit: Some(limit),
                ..Self::default()
            }
        }
    }

    impl BufferAllocator for CountingAllocator {
        type Buffer = FakeBuffer;

        fn allocate(
            &mut self,
            label: &str,
            size: u64,
        ) -> Result<FakeBuffer, LumenError> {
            if self.limit.is_some_and(|limit| self.live_bytes + size > limit) {
                return Err(LumenError::OutOfMemory {
                    label: label.to_owned(),
                    bytes: size,
                });
            }
            self.allocations += 1;
            self.next_id += 1;
            self.live_bytes += size;
            Ok(FakeBuffer {
                id: self.next_id,
                size,
            })
        }

        fn upload(&mut self, buffer: &FakeBuffer, bytes: &[u8]) {
            assert_eq!(buffer.size, bytes.len() as u64);
            self.uploads += 1;
        }

        fn release(&mut self, buffer: FakeBuffer) {
            self.releases += 1;
            self.live_bytes -= buffer.size;
        }
    }
}
