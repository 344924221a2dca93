//! Sample counting for the running average, and change detection for the
//! inputs that invalidate it.

use glam::{Mat4, Vec4};

use crate::camera::Camera;
use crate::light::DirectionalLight;

/// Whether the running average is starting over or improving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationState {
    /// No samples yet; the next frame replaces the image outright.
    Reset,
    /// At least one sample accumulated.
    Converging,
}

/// Counts frames blended into the current average.
///
/// The counter is zero right after any camera, light or geometry change and
/// otherwise grows by exactly one per rendered frame. It is the weight of
/// the existing average in `new = (avg * n + raw) / (n + 1)`.
#[derive(Debug, Default)]
pub struct AccumulationController {
    sample: u32,
}

impl AccumulationController {
    /// Controller in the [`AccumulationState::Reset`] state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart accumulation if the camera or the light changed.
    pub fn on_frame_start(&mut self, camera_changed: bool, light_changed: bool) {
        if camera_changed || light_changed {
            self.reset();
        }
    }

    /// Count the frame just blended.
    pub fn on_frame_rendered(&mut self) {
        self.sample = self.sample.saturating_add(1);
    }

    /// Weight of the existing average for this frame's blend.
    pub fn current_weight(&self) -> u32 {
        self.sample
    }

    /// Drop all accumulated samples.
    pub fn reset(&mut self) {
        if self.sample > 0 {
            log::debug!("accumulation reset after {} samples", self.sample);
        }
        self.sample = 0;
    }

    /// Current state.
    pub fn state(&self) -> AccumulationState {
        if self.sample == 0 {
            AccumulationState::Reset
        } else {
            AccumulationState::Converging
        }
    }
}

/// What changed since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewChanges {
    /// Camera transform or projection.
    pub camera: bool,
    /// Light direction or intensity.
    pub light: bool,
    /// Output size.
    pub viewport: bool,
}

impl ViewChanges {
    /// Whether anything changed.
    pub fn any(self) -> bool {
        self.camera || self.light || self.viewport
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewSnapshot {
    camera_to_world: Mat4,
    projection: Mat4,
    light: Vec4,
    viewport: (u32, u32),
}

/// Snapshot-and-compare detection of camera, light and viewport changes.
///
/// Nothing is recorded before the first frame, so the first observation
/// reports everything as changed.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    last: Option<ViewSnapshot>,
}

impl ChangeTracker {
    /// Tracker with no recorded state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the previous frame and record the current state.
    pub fn observe(
        &mut self,
        camera: &Camera,
        light: &DirectionalLight,
        viewport: (u32, u32),
    ) -> ViewChanges {
        let current = ViewSnapshot {
            camera_to_world: camera.camera_to_world(),
            projection: camera.projection.matrix(),
            light: light.to_vec4(),
            viewport,
        };
        let changes = self.last.map_or(
            ViewChanges {
                camera: true,
                light: true,
                viewport: true,
            },
            |last| ViewChanges {
                camera: last.camera_to_world != current.camera_to_world
                    || last.projection != current.projection,
                light: last.light != current.light,
                viewport: last.viewport != current.viewport,
            },
        );
        self.last = Some(current);
        changes
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::camera::Projection;

    fn camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::ZERO,
            Projection::Perspective {
                fovy: 60.0,
                aspect: 1.0,
                znear: 0.3,
                zfar: 1000.0,
            },
        )
    }

    #[test]
    fn counts_rendered_frames() {
        let mut acc = AccumulationController::new();
        assert_eq!(acc.state(), AccumulationState::Reset);
        for _ in 0..5 {
            acc.on_frame_start(false, false);
            acc.on_frame_rendered();
        }
        assert_eq!(acc.current_weight(), 5);
        assert_eq!(acc.state(), AccumulationState::Converging);
    }

    #[test]
    fn camera_or_light_change_resets() {
        let mut acc = AccumulationController::new();
        acc.on_frame_rendered();
        acc.on_frame_rendered();
        acc.on_frame_start(true, false);
        assert_eq!(acc.current_weight(), 0);

        acc.on_frame_rendered();
        acc.on_frame_start(false, true);
        assert_eq!(acc.state(), AccumulationState::Reset);
    }

    #[test]
    fn first_observation_reports_change() {
        let mut tracker = ChangeTracker::new();
        let changes = tracker.observe(&camera(), &DirectionalLight::default(), (64, 64));
        assert!(changes.camera && changes.light && changes.viewport);

        let changes = tracker.observe(&camera(), &DirectionalLight::default(), (64, 64));
        assert!(!changes.any());
    }

    #[test]
    fn detects_each_input_separately() {
        let mut tracker = ChangeTracker::new();
        let light = DirectionalLight::default();
        let mut cam = camera();
        let _ = tracker.observe(&cam, &light, (64, 64));

        cam.position.x += 1.0;
        let changes = tracker.observe(&cam, &light, (64, 64));
        assert_eq!(
            changes,
            ViewChanges {
                camera: true,
                light: false,
                viewport: false,
            }
        );

        let dimmer = DirectionalLight {
            intensity: 0.5,
            ..light
        };
        assert!(tracker.observe(&cam, &dimmer, (64, 64)).light);
        assert!(tracker.observe(&cam, &dimmer, (32, 64)).viewport);

        cam.set_aspect(64, 32);
        assert!(tracker.observe(&cam, &dimmer, (32, 64)).camera);
    }
}
