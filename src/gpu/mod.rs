//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, structured storage buffer
//! lifetime management, accumulation textures, and shader composition.

/// Structured storage buffers reconciled against CPU-side scene arrays.
pub mod buffer_registry;
/// Shared wgpu boilerplate helpers for compute and screen-space pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Framework-agnostic render-target and storage texture abstractions.
pub mod texture;
