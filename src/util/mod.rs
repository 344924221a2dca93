//! Shared utilities: color conversion and frame timing.

/// HSV to RGB conversion.
pub mod color;
/// Frame pacing and FPS tracking.
pub mod frame_timing;
