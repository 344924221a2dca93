//! Framework-agnostic render-target and storage texture abstractions.

/// Format of every radiance texture: the raw kernel output, the two
/// accumulation buffers and the pass-through backdrop.
pub const RADIANCE_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba32Float;

/// A render-target texture and its default view.
///
/// Created with `RENDER_ATTACHMENT | TEXTURE_BINDING | COPY_SRC` usage, so it
/// can be cleared or drawn into and then read by a later pass.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    /// Create a new render-target texture with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Clear the whole target to `color`.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, color: wgpu::Color) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
    }
}

/// A compute-writable float texture that later passes read with
/// `textureLoad`.
pub struct StorageTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view, bindable as storage or sampled texture.
    pub view: wgpu::TextureView,
}

impl StorageTexture {
    /// Create a [`RADIANCE_FORMAT`] storage texture.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, (width, height): (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: RADIANCE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Ping-pong pair holding the running average.
///
/// Each frame reads the previous average from one texture and writes the
/// new average into the other, then [`swap`](Self::swap)s.
pub struct AccumulationTextures {
    textures: [StorageTexture; 2],
    current: usize,
}

impl AccumulationTextures {
    /// Allocate both textures at the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, size: (u32, u32)) -> Self {
        Self {
            textures: [
                StorageTexture::new(device, "Accumulation Texture A", size),
                StorageTexture::new(device, "Accumulation Texture B", size),
            ],
            current: 0,
        }
    }

    /// Texture holding the latest average.
    pub fn current(&self) -> &StorageTexture {
        &self.textures[self.current]
    }

    /// Index (0 or 1) of the texture holding the latest average.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Both textures, in index order.
    pub fn pair(&self) -> [&StorageTexture; 2] {
        [&self.textures[0], &self.textures[1]]
    }

    /// Make the texture just written the current one.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}
