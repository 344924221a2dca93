//! Fly-style camera controller.
//!
//! Input is expressed as [`FlyAction`] values. Rotations, drags and zooms are
//! one-shot: applied on the next [`FlyCamera::update`] and then cleared.
//! Translations are held: they keep moving the camera every frame until the
//! action is set back to zero.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::core::{orientation_from_forward, Camera, Projection, WORLD_UP};

/// Longest frame time honoured by held translations, in seconds.
pub const MAX_EFFECTIVE_TPF: f32 = 1.0;

/// Largest |sin(elevation)| the view direction may reach.
const PITCH_LIMIT: f32 = 0.99;
/// Mouse-drag distance to drag-action scale.
const DRAG_SCALE: f32 = 0.2;
/// Perspective zoom step as a fraction of the far plane.
const ZOOM_FAR_FRACTION: f32 = 0.1;
const JOYSTICK_MOVE_SCALE: f32 = 0.04;
const JOYSTICK_ROTATE_SCALE: f32 = 0.5;
/// Pitching down through the joystick is not halved.
const JOYSTICK_PITCH_DOWN_SCALE: f32 = 1.0;

/// A navigation action with an analog magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlyAction {
    /// Turn left (degrees × rotation speed).
    Left,
    /// Turn right.
    Right,
    /// Pitch up.
    Up,
    /// Pitch down.
    Down,
    /// Slide across the ground plane along the last drag direction.
    Drag,
    /// Move along the view direction.
    Forward,
    /// Move against the view direction.
    Backward,
    /// Strafe left.
    Leftward,
    /// Strafe right.
    Rightward,
    /// Move up along world up.
    Rise,
    /// Move down along world up.
    Lower,
    /// Move closer (perspective) or shrink the view volume (orthographic).
    ZoomIn,
    /// The opposite of [`ZoomIn`](Self::ZoomIn).
    ZoomOut,
}

impl FlyAction {
    /// Every action, in status-table order.
    pub const ALL: [Self; 13] = [
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::Drag,
        Self::Forward,
        Self::Backward,
        Self::Leftward,
        Self::Rightward,
        Self::Rise,
        Self::Lower,
        Self::ZoomIn,
        Self::ZoomOut,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Whether the action is cleared after being applied once.
    pub fn is_one_shot(self) -> bool {
        !matches!(
            self,
            Self::Forward
                | Self::Backward
                | Self::Leftward
                | Self::Rightward
                | Self::Rise
                | Self::Lower
        )
    }
}

/// A [`Camera`] driven by [`FlyAction`]s.
pub struct FlyCamera {
    /// The controlled camera.
    pub camera: Camera,
    /// World units per second for held translations.
    pub move_speed: f32,
    /// Degrees per unit of rotation action.
    pub rotation_speed: f32,
    /// Scale applied to zoom actions.
    pub zoom_speed: f32,
    status: [f32; FlyAction::ALL.len()],
    drag_direction: Vec3,
}

impl FlyCamera {
    /// Controller with the default speeds (15 / 1 / 1).
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            move_speed: 15.0,
            rotation_speed: 1.0,
            zoom_speed: 1.0,
            status: [0.0; FlyAction::ALL.len()],
            drag_direction: Vec3::ZERO,
        }
    }

    /// Set an action's magnitude. Zero releases a held action.
    pub fn set_action(&mut self, action: FlyAction, value: f32) {
        self.status[action.index()] = value;
    }

    /// Current magnitude of an action.
    pub fn action(&self, action: FlyAction) -> f32 {
        self.status[action.index()]
    }

    /// Whether any action is pending or held.
    pub fn is_active(&self) -> bool {
        self.status.iter().any(|&v| v != 0.0)
    }

    /// Queue a rotation from a mouse movement in screen pixels (y down).
    pub fn rotate_by_mouse(&mut self, offset: Vec2) {
        if offset.x > 0.0 {
            self.set_action(FlyAction::Right, offset.x / 10.0);
        } else if offset.x < 0.0 {
            self.set_action(FlyAction::Left, -offset.x / 10.0);
        }
        if offset.y < 0.0 {
            self.set_action(FlyAction::Up, -offset.y / 10.0);
        } else if offset.y > 0.0 {
            self.set_action(FlyAction::Down, offset.y / 10.0);
        }
    }

    /// Queue a ground-plane slide from a mouse movement in screen pixels
    /// (y down). The camera moves against the drag, so the world follows the
    /// cursor.
    pub fn drag_by_mouse(&mut self, offset: Vec2) {
        let length = offset.length();
        if length == 0.0 {
            return;
        }
        let heading = horizontal(self.camera.forward());
        let side = heading.cross(WORLD_UP);
        let screen = offset / length;
        self.drag_direction =
            (side * -screen.x + heading * screen.y).normalize_or_zero();
        self.set_action(FlyAction::Drag, length * DRAG_SCALE);
    }

    /// Queue a zoom from a scroll amount (positive = towards the scene).
    pub fn zoom_by_wheel(&mut self, amount: f32) {
        if amount > 0.0 {
            self.set_action(FlyAction::ZoomIn, amount);
        } else if amount < 0.0 {
            self.set_action(FlyAction::ZoomOut, -amount);
        }
    }

    /// Apply pending and held actions for a frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let tpf = dt.clamp(0.0, MAX_EFFECTIVE_TPF);

        let turn = self.take(FlyAction::Right) - self.take(FlyAction::Left);
        if turn != 0.0 {
            self.yaw(-turn * self.rotation_speed);
        }
        let pitch = self.take(FlyAction::Up) - self.take(FlyAction::Down);
        if pitch != 0.0 {
            self.pitch(pitch * self.rotation_speed);
        }

        let drag = self.take(FlyAction::Drag);
        if drag != 0.0 {
            self.translate(self.drag_direction, drag * self.move_speed * tpf);
        }

        let step = self.move_speed * tpf;
        let forward = self.camera.forward();
        let right = self.camera.right();
        let axes = [
            (FlyAction::Forward, forward, 1.0),
            (FlyAction::Backward, forward, -1.0),
            (FlyAction::Rightward, right, 1.0),
            (FlyAction::Leftward, right, -1.0),
            (FlyAction::Rise, WORLD_UP, 1.0),
            (FlyAction::Lower, WORLD_UP, -1.0),
        ];
        for (action, axis, sign) in axes {
            let value = self.action(action);
            if value != 0.0 {
                self.translate(axis, sign * value * step);
            }
        }

        let zoom = self.take(FlyAction::ZoomOut) - self.take(FlyAction::ZoomIn);
        if zoom != 0.0 {
            self.zoom(zoom * self.zoom_speed);
        }
    }

    /// On-screen joystick translation: x strafes, y moves along the view.
    pub fn joystick_move(&mut self, direction: Vec2) {
        let scale = self.move_speed * JOYSTICK_MOVE_SCALE;
        self.translate(self.camera.right(), direction.x * scale);
        self.translate(self.camera.forward(), direction.y * scale);
    }

    /// On-screen joystick rotation: x turns, y pitches (positive = up).
    pub fn joystick_rotate(&mut self, direction: Vec2) {
        let scale = self.rotation_speed * JOYSTICK_ROTATE_SCALE;
        self.yaw(-direction.x * scale);
        let pitch_scale = if direction.y > 0.0 {
            JOYSTICK_ROTATE_SCALE
        } else {
            JOYSTICK_PITCH_DOWN_SCALE
        };
        self.pitch(direction.y * self.rotation_speed * pitch_scale);
    }

    fn take(&mut self, action: FlyAction) -> f32 {
        std::mem::take(&mut self.status[action.index()])
    }

    /// Rotate about world up; positive turns left.
    fn yaw(&mut self, degrees: f32) {
        self.rotate(Quat::from_axis_angle(WORLD_UP, degrees.to_radians()));
    }

    /// Rotate about the camera's right axis; positive looks up. The view
    /// direction never comes closer to vertical than the pitch limit.
    fn pitch(&mut self, degrees: f32) {
        let forward = self.camera.forward();
        let Some(axis) = forward.cross(WORLD_UP).try_normalize() else {
            return;
        };
        let pitched = Quat::from_axis_angle(axis, degrees.to_radians()) * forward;
        let clamped = clamp_pitch(pitched, horizontal(forward));
        self.camera.rotation = orientation_from_forward(clamped);
    }

    fn rotate(&mut self, delta: Quat) {
        let forward = delta * self.camera.forward();
        self.camera.rotation = orientation_from_forward(forward);
    }

    fn translate(&mut self, axis: Vec3, amount: f32) {
        self.camera.position += axis * amount;
    }

    /// Positive values zoom out.
    fn zoom(&mut self, value: f32) {
        let forward = self.camera.forward();
        match &mut self.camera.projection {
            Projection::Orthographic { size, .. } => {
                *size *= (1.0 + value / 5.0).max(0.05);
            }
            Projection::Perspective { zfar, .. } => {
                let distance = value * *zfar * ZOOM_FAR_FRACTION;
                self.camera.position -= forward * distance;
            }
        }
    }
}

/// Pull `forward` back inside the pitch limit, keeping `heading` so a step
/// past vertical cannot flip the camera around.
fn clamp_pitch(forward: Vec3, heading: Vec3) -> Vec3 {
    if forward.y.abs() <= PITCH_LIMIT {
        return forward;
    }
    let elevation = PITCH_LIMIT.copysign(forward.y);
    heading * (1.0 - elevation * elevation).sqrt()
        + WORLD_UP * elevation
}

fn horizontal(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z)
        .try_normalize()
        .unwrap_or(Vec3::NEG_Z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fly() -> FlyCamera {
        FlyCamera::new(Camera::look_at(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.0, 10.0, -1.0),
            Projection::Perspective {
                fovy: 60.0,
                aspect: 1.0,
                znear: 0.3,
                zfar: 1000.0,
            },
        ))
    }

    #[test]
    fn held_forward_moves_every_frame() {
        let mut cam = fly();
        cam.set_action(FlyAction::Forward, 1.0);
        cam.update(0.5);
        cam.update(0.5);
        assert!(cam.camera.position.abs_diff_eq(Vec3::new(0.0, 10.0, -15.0), 1e-4));
        assert_eq!(cam.action(FlyAction::Forward), 1.0);
    }

    #[test]
    fn frame_time_is_clamped() {
        let mut cam = fly();
        cam.set_action(FlyAction::Rise, 1.0);
        cam.update(10.0);
        assert!((cam.camera.position.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn rotations_are_one_shot() {
        let mut cam = fly();
        cam.set_action(FlyAction::Right, 90.0);
        cam.update(0.016);
        assert!(cam.camera.forward().abs_diff_eq(Vec3::X, 1e-4));
        assert_eq!(cam.action(FlyAction::Right), 0.0);
        cam.update(0.016);
        assert!(cam.camera.forward().abs_diff_eq(Vec3::X, 1e-4));
        assert!(!cam.is_active());
    }

    #[test]
    fn pitch_stops_near_vertical_without_roll() {
        let mut cam = fly();
        for _ in 0..20 {
            cam.set_action(FlyAction::Up, 10.0);
            cam.update(0.016);
        }
        let forward = cam.camera.forward();
        assert!(forward.y < 1.0);
        assert!(forward.y > 0.9);
        assert!(cam.camera.right().y.abs() < 1e-4);
    }

    #[test]
    fn mouse_up_pitches_up() {
        let mut cam = fly();
        cam.rotate_by_mouse(Vec2::new(0.0, -50.0));
        assert_eq!(cam.action(FlyAction::Up), 5.0);
        cam.update(0.016);
        assert!(cam.camera.forward().y > 0.0);
    }

    #[test]
    fn perspective_zoom_moves_along_view() {
        let mut cam = fly();
        cam.zoom_by_wheel(0.1);
        cam.update(0.016);
        // 0.1 * far * 0.1 = 10 units forward.
        assert!(cam.camera.position.abs_diff_eq(Vec3::new(0.0, 10.0, -10.0), 1e-3));
    }

    #[test]
    fn orthographic_zoom_scales_size() {
        let mut cam = fly();
        cam.camera.projection = Projection::Orthographic {
            size: 10.0,
            aspect: 1.0,
            znear: 0.3,
            zfar: 1000.0,
        };
        cam.set_action(FlyAction::ZoomOut, 1.0);
        cam.update(0.016);
        assert!(matches!(
            cam.camera.projection,
            Projection::Orthographic { size, .. } if (size - 12.0).abs() < 1e-4
        ));
    }

    #[test]
    fn drag_moves_against_the_cursor_on_the_ground_plane() {
        let mut cam = fly();
        // Cursor moves right: camera slides left (-X when facing -Z).
        cam.drag_by_mouse(Vec2::new(10.0, 0.0));
        assert_eq!(cam.action(FlyAction::Drag), 2.0);
        cam.update(0.1);
        let p = cam.camera.position;
        assert!(p.x < 0.0);
        assert!((p.y - 10.0).abs() < 1e-5);
        assert_eq!(cam.action(FlyAction::Drag), 0.0);
    }

    #[test]
    fn joystick_moves_scaled_by_move_speed() {
        let mut cam = fly();
        cam.joystick_move(Vec2::new(1.0, 0.0));
        assert!(cam.camera.position.abs_diff_eq(Vec3::new(0.6, 10.0, 0.0), 1e-4));
    }

    #[test]
    fn joystick_pitches_down_twice_as_fast_as_up() {
        let elevation = |cam: &FlyCamera| cam.camera.forward().y.asin().to_degrees();

        let mut up = fly();
        up.rotation_speed = 10.0;
        up.joystick_rotate(Vec2::new(0.0, 1.0));
        let mut down = fly();
        down.rotation_speed = 10.0;
        down.joystick_rotate(Vec2::new(0.0, -1.0));

        assert!((elevation(&up) - 5.0).abs() < 1e-3);
        assert!((elevation(&down) + 10.0).abs() < 1e-3);
    }

    #[test]
    fn only_translations_are_held() {
        let held: Vec<FlyAction> = FlyAction::ALL
            .into_iter()
            .filter(|a| !a.is_one_shot())
            .collect();
        assert_eq!(held.len(), 6);
        assert!(FlyAction::Drag.is_one_shot());
    }
}
