//! Lifecycle, camera, light and options accessors for [`RayTracingEngine`].

use super::{RayTracingEngine, ViewportTextures};
use crate::camera::FlyCamera;
use crate::error::LumenError;
use crate::gpu::buffer_registry::WgpuAllocator;
use crate::light::DirectionalLight;
use crate::options::{Options, SphereOptions};

// ── Lifecycle ──

impl RayTracingEngine {
    /// Apply pending and held camera actions.
    ///
    /// Call once per frame before [`render_frame`](Self::render_frame):
    /// ```ignore
    /// engine.update(dt);
    /// engine.render_frame()?;
    /// ```
    pub fn update(&mut self, dt: f32) {
        if let Some(camera) = &mut self.camera {
            camera.update(dt);
        }
    }

    /// Resize the surface, the viewport textures and the camera aspect.
    /// Ignores zero-sized dimensions. Accumulation restarts.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.textures = ViewportTextures::new(&self.context.device, (width, height));
        self.rebind_textures();
        if let Some(camera) = &mut self.camera {
            camera.camera.set_aspect(width, height);
        }
        self.dispatcher.reset_accumulation();
        log::debug!("resized to {width}x{height}");
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }

    /// Samples in the running average.
    pub fn samples(&self) -> u32 {
        self.dispatcher.samples()
    }

    /// Throw away the running average; the next frame starts over.
    pub fn reset_accumulation(&mut self) {
        self.dispatcher.reset_accumulation();
    }
}

// ── Camera & light ──

impl RayTracingEngine {
    /// The fly controller, if a camera is attached.
    pub fn camera(&self) -> Option<&FlyCamera> {
        self.camera.as_ref()
    }

    /// Mutable fly controller. Moves are picked up by change detection on
    /// the next frame.
    pub fn camera_mut(&mut self) -> Option<&mut FlyCamera> {
        self.camera.as_mut()
    }

    /// Attach or detach the camera. Without one, frames pass through.
    pub fn set_camera(&mut self, camera: Option<FlyCamera>) {
        self.camera = camera;
    }

    /// The scene light.
    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    /// Replace the scene light.
    pub fn set_light(&mut self, light: DirectionalLight) {
        self.light = light;
    }
}

// ── Options ──

impl RayTracingEngine {
    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Apply new options.
    ///
    /// Lighting and key bindings take effect immediately. The sphere field is
    /// regenerated only when its options changed; the camera is left where
    /// the user flew it.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError::OutOfMemory`] if the new sphere field cannot be
    /// uploaded.
    pub fn set_options(&mut self, options: Options) -> Result<(), LumenError> {
        if options.spheres != self.options.spheres {
            self.regenerate_spheres(&options.spheres)?;
        }
        self.light = options.lighting.to_light();
        self.input.set_key_bindings(options.keybindings.clone());
        if let Some(camera) = &mut self.camera {
            camera.move_speed = options.camera.move_speed;
            camera.rotation_speed = options.camera.rotation_speed;
            camera.zoom_speed = options.camera.zoom_speed;
        }
        self.options = options;
        Ok(())
    }

    fn regenerate_spheres(
        &mut self,
        sphere_options: &SphereOptions,
    ) -> Result<(), LumenError> {
        let spheres = sphere_options.generate();
        log::info!("regenerated {} spheres", spheres.len());
        let uploaded = {
            let mut allocator =
                WgpuAllocator::new(&self.context.device, &self.context.queue);
            self.dispatcher
                .upload_spheres(&mut self.buffers, &mut allocator, spheres)
        };
        if !matches!(uploaded, Ok(false)) {
            self.rebind_kernel();
        }
        uploaded.map(|_| ())
    }
}
