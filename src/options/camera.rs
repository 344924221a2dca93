use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, FlyCamera, Projection};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Initial camera placement, projection and fly-control speeds.
pub struct CameraOptions {
    /// Eye position.
    pub position: [f32; 3],
    /// Point the camera initially looks at.
    pub target: [f32; 3],
    /// Use a parallel projection instead of a perspective one.
    pub orthographic: bool,
    /// Vertical field of view in degrees (perspective).
    pub fovy: f32,
    /// Half the vertical view extent (orthographic).
    pub ortho_size: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// World units per second for held translations.
    pub move_speed: f32,
    /// Degrees per unit of rotation input.
    pub rotation_speed: f32,
    /// Zoom sensitivity multiplier.
    pub zoom_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            position: [0.0, 60.0, 160.0],
            target: [0.0, 0.0, 0.0],
            orthographic: false,
            fovy: 60.0,
            ortho_size: 60.0,
            znear: 0.3,
            zfar: 1000.0,
            move_speed: 15.0,
            rotation_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

impl CameraOptions {
    /// Camera described by these options for a viewport of `size`.
    #[must_use]
    pub fn build_camera(&self, (width, height): (u32, u32)) -> Camera {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let projection = if self.orthographic {
            Projection::Orthographic {
                size: self.ortho_size,
                aspect,
                znear: self.znear,
                zfar: self.zfar,
            }
        } else {
            Projection::Perspective {
                fovy: self.fovy,
                aspect,
                znear: self.znear,
                zfar: self.zfar,
            }
        };
        Camera::look_at(
            Vec3::from_array(self.position),
            Vec3::from_array(self.target),
            projection,
        )
    }

    /// Fly controller with these options' camera and speeds.
    #[must_use]
    pub fn build_fly_camera(&self, size: (u32, u32)) -> FlyCamera {
        let mut fly = FlyCamera::new(self.build_camera(size));
        fly.move_speed = self.move_speed;
        fly.rotation_speed = self.rotation_speed;
        fly.zoom_speed = self.zoom_speed;
        fly
    }
}
