//! Input forwarding for [`RayTracingEngine`].

use super::RayTracingEngine;
use crate::input::{InputEvent, InputProcessor};

impl RayTracingEngine {
    /// Process a platform-agnostic input event.
    ///
    /// Right-drag rotates, left-drag slides across the ground plane and the
    /// wheel zooms. Ignored while no camera is attached.
    ///
    /// # Example
    ///
    /// ```ignore
    /// engine.handle_input(InputEvent::CursorMoved { x, y });
    /// engine.handle_input(InputEvent::Scroll { delta: 1.0 });
    /// ```
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(camera) = &mut self.camera {
            self.input.handle_event(event, camera);
        }
    }

    /// Process a key press or release (`winit::keyboard::KeyCode` debug
    /// format, e.g. `"KeyW"`). Returns `true` if the key is bound.
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> bool {
        self.camera
            .as_mut()
            .is_some_and(|camera| self.input.handle_key(key, pressed, camera))
    }

    /// Release every held key and button, e.g. on focus loss.
    pub fn release_input(&mut self) {
        if let Some(camera) = &mut self.camera {
            self.input.release_all(camera);
        }
    }

    /// The input processor.
    pub fn input(&self) -> &InputProcessor {
        &self.input
    }
}
