//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the lumen crate.
#[derive(Debug)]
pub enum LumenError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// The GPU allocator ran out of memory while creating a buffer.
    OutOfMemory {
        /// Label of the buffer being allocated.
        label: String,
        /// Requested size in bytes.
        bytes: u64,
    },
    /// Shader composition failed.
    Shader(String),
    /// The presentation surface could not provide a frame.
    Surface(wgpu::SurfaceError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for LumenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::OutOfMemory { label, bytes } => {
                write!(f, "out of GPU memory allocating '{label}' ({bytes} bytes)")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Surface(e) => write!(f, "surface error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for LumenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Surface(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for LumenError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<wgpu::SurfaceError> for LumenError {
    fn from(e: wgpu::SurfaceError) -> Self {
        Self::Surface(e)
    }
}

impl From<std::io::Error> for LumenError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_names_the_buffer() {
        let err = LumenError::OutOfMemory {
            label: "Sphere Buffer".into(),
            bytes: 5600,
        };
        let msg = err.to_string();
        assert!(msg.contains("Sphere Buffer"));
        assert!(msg.contains("5600"));
    }
}
