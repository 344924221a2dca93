//! Camera system for 3D scene viewing.
//!
//! Provides a free-flying camera with perspective or orthographic
//! projection and an action-driven controller for keyboard, mouse and
//! joystick navigation.

/// Core camera struct and projection types.
pub mod core;
/// Fly-style camera controller.
pub mod fly;

pub use self::core::{Camera, Projection};
pub use fly::{FlyAction, FlyCamera};
