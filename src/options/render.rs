use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Frame-level rendering parameters.
pub struct RenderOptions {
    /// Linear RGB of the backdrop shown while tracing is unavailable.
    pub background: [f32; 3],
    /// Seed of the per-frame jitter and kernel seed sequence.
    pub frame_seed: u64,
    /// Upper bound on accumulated samples; 0 means unbounded. Once reached
    /// the converged image is presented without tracing further frames.
    pub max_samples: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: [0.1, 0.1, 0.12],
            frame_seed: 0,
            max_samples: 0,
        }
    }
}

impl RenderOptions {
    /// Background as a wgpu clear color.
    pub fn background_color(&self) -> wgpu::Color {
        let [r, g, b] = self.background;
        wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        }
    }

    /// Whether `samples` has reached the configured cap.
    pub fn is_converged(&self, samples: u32) -> bool {
        self.max_samples > 0 && samples >= self.max_samples
    }
}
