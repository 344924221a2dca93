// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// GPU / graphics allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

//! Progressive GPU ray tracer built on wgpu.
//!
//! Lumen traces one noisy sample per pixel each frame in a compute kernel and
//! averages successive frames into a converged image. The running average
//! restarts whenever the camera, the directional light, the viewport or the
//! scene geometry changes.
//!
//! # Key entry points
//!
//! - [`engine::RayTracingEngine`] - GPU resources and per-frame rendering
//! - [`renderer::FrameDispatcher`] - CPU half of a frame: change detection,
//!   deferred scene rebuild, dispatch grid and kernel uniforms
//! - [`scene::Scene`] - registered triangle-mesh objects with dirty tracking
//! - [`scene::generate_spheres`] - seeded procedural sphere field
//! - [`gpu::buffer_registry::SceneBuffers`] - lifetime of the structured
//!   storage buffers read by the kernel
//! - [`options::Options`] - TOML-backed configuration
//!
//! # Frame flow
//!
//! Scene builder → buffer registry (only when dirty) → ray-trace kernel →
//! accumulation blend → blit to the presentation target.

pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod light;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use camera::{Camera, FlyAction, FlyCamera, Projection};
pub use engine::RayTracingEngine;
pub use error::LumenError;
pub use input::{InputEvent, InputProcessor, MouseButton};
pub use light::DirectionalLight;
pub use options::Options;
pub use renderer::{FrameDispatcher, FrameOutcome};
pub use scene::{Mesh, ObjectId, RayTracingObject, Scene};
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
