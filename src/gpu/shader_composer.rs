use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::LumenError;

/// Shaders built into the crate, as `(source, file_path)` pairs.
pub mod sources {
    /// Ray-tracing kernel: one jittered sample per pixel.
    pub const RAYTRACE: (&str, &str) = (
        include_str!("../../assets/shaders/compute/raytrace.wgsl"),
        "compute/raytrace.wgsl",
    );
    /// Running-average blend between ping-pong textures.
    pub const ACCUMULATE: (&str, &str) = (
        include_str!("../../assets/shaders/compute/accumulate.wgsl"),
        "compute/accumulate.wgsl",
    );
    /// Fullscreen copy of a float texture to the output target.
    pub const BLIT: (&str, &str) = (
        include_str!("../../assets/shaders/screen/blit.wgsl"),
        "screen/blit.wgsl",
    );
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered at construction time; consuming shaders
/// pull them in with `#import lumen::module_name::{...}`. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    pub fn new() -> Result<Self, LumenError> {
        let mut composer = Composer::default();

        // Dependency order: modules with no imports first.
        let modules: &[ModuleDef] = &[
            ModuleDef {
                source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
                file_path: "modules/fullscreen.wgsl",
            },
            ModuleDef {
                source: include_str!("../../assets/shaders/modules/random.wgsl"),
                file_path: "modules/random.wgsl",
            },
        ];

        for m in modules {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    LumenError::Shader(format!(
                        "failed to register shader module '{}': {e:?}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose a shader source string (which may contain `#import` directives)
    /// into a `wgpu::ShaderModule` ready for pipeline creation.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        (source, file_path): (&str, &str),
    ) -> Result<wgpu::ShaderModule, LumenError> {
        let naga_module = self.compose_naga(source, file_path).map_err(|e| {
            LumenError::Shader(format!("failed to compose '{file_path}': {e}"))
        })?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader source into a `naga::Module` without creating a wgpu
    /// shader module. Useful for testing shader composition without a GPU
    /// device.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<naga_oil::compose::ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }
}
