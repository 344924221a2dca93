//! Converts raw platform events into fly-camera actions.
//!
//! The `InputProcessor` owns all transient input state (cursor tracking and
//! which buttons are held) and the key-binding map. It is the only thing
//! that sits between raw window events and the [`FlyCamera`].

use glam::Vec2;

use super::event::{InputEvent, MouseButton};
use crate::camera::{FlyAction, FlyCamera};
use crate::options::KeybindingOptions;

/// Converts raw window events into [`FlyAction`]s on a [`FlyCamera`].
///
/// Right-button drags rotate, left-button drags slide across the ground
/// plane and the wheel zooms. Bound keys hold translation actions for as
/// long as they are pressed.
///
/// # Usage
///
/// ```ignore
/// // In the event loop:
/// input_processor.handle_event(event, &mut fly_camera);
/// input_processor.handle_key("KeyW", true, &mut fly_camera);
/// ```
pub struct InputProcessor {
    /// Last cursor position, `None` until the first move.
    cursor: Option<Vec2>,
    left_pressed: bool,
    right_pressed: bool,
    /// Key string → action mapping.
    key_bindings: KeybindingOptions,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_bindings(KeybindingOptions::default())
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeybindingOptions) -> Self {
        Self {
            cursor: None,
            left_pressed: false,
            right_pressed: false,
            key_bindings,
        }
    }

    /// Last known cursor position in physical pixels.
    #[must_use]
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Whether a drag or rotate gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.left_pressed || self.right_pressed
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub fn key_bindings(&self) -> &KeybindingOptions {
        &self.key_bindings
    }

    /// Replace the key bindings, e.g. after reloading options.
    pub fn set_key_bindings(&mut self, key_bindings: KeybindingOptions) {
        self.key_bindings = key_bindings;
    }

    /// Forget held buttons, e.g. when the window loses focus.
    pub fn release_all(&mut self, camera: &mut FlyCamera) {
        self.left_pressed = false;
        self.right_pressed = false;
        for action in FlyAction::ALL {
            if !action.is_one_shot() {
                camera.set_action(action, 0.0);
            }
        }
    }

    /// Process a key press or release. Returns `true` if the key is bound.
    pub fn handle_key(
        &mut self,
        key: &str,
        pressed: bool,
        camera: &mut FlyCamera,
    ) -> bool {
        let Some(action) = self.key_bindings.lookup(key) else {
            return false;
        };
        camera.set_action(action, if pressed { 1.0 } else { 0.0 });
        true
    }

    /// Process a raw input event, queueing actions on `camera`.
    pub fn handle_event(&mut self, event: InputEvent, camera: &mut FlyCamera) {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.handle_cursor_moved(Vec2::new(x, y), camera);
            }
            InputEvent::MouseButton { button, pressed } => match button {
                MouseButton::Left => self.left_pressed = pressed,
                MouseButton::Right => self.right_pressed = pressed,
                MouseButton::Middle => {}
            },
            InputEvent::Scroll { delta } => camera.zoom_by_wheel(delta),
        }
    }

    fn handle_cursor_moved(&mut self, position: Vec2, camera: &mut FlyCamera) {
        let previous = self.cursor.replace(position);
        let Some(previous) = previous else {
            return;
        };
        let delta = position - previous;
        if delta == Vec2::ZERO {
            return;
        }
        // Rotation wins when both buttons are held.
        if self.right_pressed {
            camera.rotate_by_mouse(delta);
        } else if self.left_pressed {
            camera.drag_by_mouse(delta);
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::camera::{Camera, Projection};

    fn fly_camera() -> FlyCamera {
        let projection = Projection::Perspective {
            fovy: 60.0,
            aspect: 1.0,
            znear: 0.3,
            zfar: 1000.0,
        };
        FlyCamera::new(Camera::look_at(
            Vec3::new(0.0, 10.0, 50.0),
            Vec3::ZERO,
            projection,
        ))
    }

    fn press(processor: &mut InputProcessor, button: MouseButton, cam: &mut FlyCamera) {
        processor.handle_event(
            InputEvent::MouseButton {
                button,
                pressed: true,
            },
            cam,
        );
    }

    fn move_to(processor: &mut InputProcessor, x: f32, y: f32, cam: &mut FlyCamera) {
        processor.handle_event(InputEvent::CursorMoved { x, y }, cam);
    }

    #[test]
    fn bare_cursor_motion_queues_nothing() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        move_to(&mut processor, 10.0, 10.0, &mut cam);
        move_to(&mut processor, 40.0, 10.0, &mut cam);
        assert!(!cam.is_active());
    }

    #[test]
    fn right_drag_rotates() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        move_to(&mut processor, 10.0, 10.0, &mut cam);
        press(&mut processor, MouseButton::Right, &mut cam);
        move_to(&mut processor, 30.0, 0.0, &mut cam);
        assert!((cam.action(FlyAction::Right) - 2.0).abs() < 1e-6);
        assert!((cam.action(FlyAction::Up) - 1.0).abs() < 1e-6);
        assert_eq!(cam.action(FlyAction::Drag), 0.0);
    }

    #[test]
    fn left_drag_slides() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        move_to(&mut processor, 0.0, 0.0, &mut cam);
        press(&mut processor, MouseButton::Left, &mut cam);
        move_to(&mut processor, 3.0, 4.0, &mut cam);
        assert!((cam.action(FlyAction::Drag) - 1.0).abs() < 1e-6);
        assert_eq!(cam.action(FlyAction::Right), 0.0);
    }

    #[test]
    fn first_move_after_press_has_no_delta() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        press(&mut processor, MouseButton::Right, &mut cam);
        move_to(&mut processor, 500.0, 500.0, &mut cam);
        assert!(!cam.is_active());
    }

    #[test]
    fn scroll_zooms() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        processor.handle_event(InputEvent::Scroll { delta: 2.0 }, &mut cam);
        assert_eq!(cam.action(FlyAction::ZoomIn), 2.0);
        processor.handle_event(InputEvent::Scroll { delta: -1.0 }, &mut cam);
        assert_eq!(cam.action(FlyAction::ZoomOut), 1.0);
    }

    #[test]
    fn bound_keys_hold_actions() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        assert!(processor.handle_key("KeyW", true, &mut cam));
        assert_eq!(cam.action(FlyAction::Forward), 1.0);
        assert!(processor.handle_key("KeyW", false, &mut cam));
        assert_eq!(cam.action(FlyAction::Forward), 0.0);
        assert!(!processor.handle_key("KeyZ", true, &mut cam));
    }

    #[test]
    fn release_all_clears_held_translations() {
        let mut cam = fly_camera();
        let mut processor = InputProcessor::new();
        let _ = processor.handle_key("KeyE", true, &mut cam);
        press(&mut processor, MouseButton::Left, &mut cam);
        processor.release_all(&mut cam);
        assert!(!processor.is_dragging());
        assert_eq!(cam.action(FlyAction::Rise), 0.0);
    }
}
