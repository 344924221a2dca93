//! Progressive ray-tracing renderer.
//!
//! The CPU half ([`FrameDispatcher`]) decides what a frame needs; the GPU
//! passes (kernel, accumulation blend, blit) record it.

/// Running-average bookkeeping and change detection.
pub mod accumulation;
/// Blend of the raw kernel output into the running average.
pub mod accumulate_pass;
/// Fullscreen copy to the output target.
pub mod blit_pass;
/// Per-frame protocol and dispatch sizing.
pub mod frame;
/// GPU data layouts shared with the WGSL kernel.
pub mod layout;
/// The ray-tracing kernel pass.
pub mod raytrace_pass;

pub use accumulation::{AccumulationController, AccumulationState};
pub use frame::{DispatchGrid, FrameDispatcher, FrameOutcome, FramePlan};
