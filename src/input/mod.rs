//! Input handling: platform-agnostic event types and the processor that
//! turns them into fly-camera actions.

/// Platform-agnostic input events.
pub mod event;
/// Converts raw events into [`FlyAction`](crate::camera::FlyAction)s.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use processor::InputProcessor;
