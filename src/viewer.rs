//! Standalone window backed by winit.
//!
//! ```no_run
//! # use lumen::{Options, Viewer};
//! Viewer::builder()
//!     .with_options(Options::default())
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    error::LumenError, options::Options, InputEvent, MouseButton,
    RayTracingEngine,
};

/// Scroll amount per wheel notch.
const LINE_SCROLL_SCALE: f32 = 0.1;
/// Scroll amount per pixel of touchpad scroll.
const PIXEL_SCROLL_SCALE: f32 = 0.001;
/// How often the title bar statistics refresh.
const TITLE_REFRESH: Duration = Duration::from_millis(250);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with sensible defaults (title "Lumen", default
    /// options).
    fn new() -> Self {
        Self {
            options: None,
            title: "Lumen".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the progressively refined image.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError::Viewer`] if the event loop cannot be created or
    /// exits abnormally.
    pub fn run(self) -> Result<(), LumenError> {
        let event_loop =
            EventLoop::new().map_err(|e| LumenError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            last_frame_time: Instant::now(),
            last_title_update: Instant::now(),
            options: Some(self.options),
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| LumenError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<RayTracingEngine>,
    last_frame_time: Instant,
    last_title_update: Instant,
    /// Consumed when the engine is created.
    options: Option<Options>,
    title: String,
}

/// Compute the wgpu surface size: always the full window dimensions.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        engine.update(dt);
        match engine.render_frame() {
            Ok(_) => {}
            Err(LumenError::Surface(
                wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost,
            )) => {
                let (vp_w, vp_h) = viewport_size(window.inner_size());
                engine.resize(vp_w, vp_h);
            }
            Err(e @ LumenError::OutOfMemory { .. }) => {
                log::error!("out of GPU memory, stopping: {e}");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::error!("render error: {e}");
            }
        }

        if now.duration_since(self.last_title_update) >= TITLE_REFRESH {
            window.set_title(&format!(
                "{} | {} samples | {:.0} fps",
                self.title,
                engine.samples(),
                engine.fps()
            ));
            self.last_title_update = now;
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = viewport_size(window.inner_size());
        let options = self.options.take().unwrap_or_default();
        let engine = match pollster::block_on(RayTracingEngine::new(
            window.clone(),
            size,
            options,
        )) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        // Guard: both window and engine must be initialised.
        let Some(engine) = &mut self.engine else {
            return;
        };

        match event {
            WindowEvent::Resized(event_size) => {
                let (vp_w, vp_h) = viewport_size(event_size);
                engine.resize(vp_w, vp_h);
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::Focused(false) => engine.release_input(),

            WindowEvent::MouseInput { button, state, .. } => {
                engine.handle_input(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                engine.handle_input(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * LINE_SCROLL_SCALE,
                    MouseScrollDelta::PixelDelta(pos) => {
                        pos.y as f32 * PIXEL_SCROLL_SCALE
                    }
                };
                engine.handle_input(InputEvent::Scroll {
                    delta: scroll_delta,
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                let _ = engine.handle_key(&format!("{code:?}"), pressed);
            }

            _ => (),
        }
    }
}
