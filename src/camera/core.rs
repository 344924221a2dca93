//! Camera pose and projection, plus the matrices the kernel consumes.

use glam::{Mat3, Mat4, Quat, Vec3};

/// World up axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pinhole camera.
    Perspective {
        /// Vertical field of view in degrees.
        fovy: f32,
        /// Viewport aspect ratio (width / height).
        aspect: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Update the aspect ratio.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        match self {
            Self::Perspective { aspect, .. }
            | Self::Orthographic { aspect, .. } => *aspect = new_aspect,
        }
    }
}

/// A positioned, oriented camera. Looks down its local -Z axis with +Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Orientation (local-to-world rotation).
    pub rotation: Quat,
    /// Projection parameters.
    pub projection: Projection,
}

impl Camera {
    /// Perspective camera at `eye` looking at `target`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, projection: Projection) -> Self {
        Self {
            position: eye,
            rotation: orientation_from_forward(target - eye),
            projection,
        }
    }

    /// View direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Camera-local right.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Camera-to-world transform.
    pub fn camera_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-to-camera (view) transform.
    pub fn view(&self) -> Mat4 {
        self.camera_to_world().inverse()
    }

    /// Inverse of the projection matrix.
    pub fn inverse_projection(&self) -> Mat4 {
        self.projection.matrix().inverse()
    }

    /// Update the aspect ratio after a viewport resize.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.projection
            .set_aspect(width.max(1) as f32 / height.max(1) as f32);
    }
}

/// Roll-free orientation looking along `forward`.
///
/// Keeps the camera's right axis horizontal. Falls back to the identity
/// heading when `forward` is vertical or degenerate.
pub fn orientation_from_forward(forward: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = forward.cross(WORLD_UP).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective() -> Projection {
        Projection::Perspective {
            fovy: 60.0,
            aspect: 1.5,
            znear: 0.3,
            zfar: 1000.0,
        }
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let camera = Camera::look_at(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::ZERO,
            perspective(),
        );
        let expected = Vec3::new(0.0, -5.0, -10.0).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
        assert!(camera.right().y.abs() < 1e-5);
    }

    #[test]
    fn camera_to_world_maps_origin_to_eye() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let camera = Camera::look_at(eye, Vec3::ZERO, perspective());
        let origin = camera.camera_to_world().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(eye, 1e-5));
        let round_trip = camera.view() * camera.camera_to_world();
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn vertical_forward_does_not_produce_nan() {
        let q = orientation_from_forward(Vec3::NEG_Y);
        assert!(q.is_finite());
        assert!((q * Vec3::NEG_Z).abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn set_aspect_updates_projection() {
        let mut camera = Camera::look_at(Vec3::Z, Vec3::ZERO, perspective());
        camera.set_aspect(800, 400);
        assert!(matches!(
            camera.projection,
            Projection::Perspective { aspect, .. } if aspect == 2.0
        ));
    }
}
