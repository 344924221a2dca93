//! Centralized configuration with TOML file support.
//!
//! Sphere field, camera, lighting, frame and keybinding settings live here.
//! Every section uses `#[serde(default)]`, so a partial file (e.g. only
//! overriding `[spheres]`) works.

mod camera;
mod keybindings;
mod lighting;
mod render;
mod spheres;

use std::path::Path;

pub use camera::CameraOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::LightingOptions;
pub use render::RenderOptions;
use serde::{Deserialize, Serialize};
pub use spheres::SphereOptions;

use crate::error::LumenError;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Procedural sphere field.
    pub spheres: SphereOptions,
    /// Initial camera and fly-control speeds.
    pub camera: CameraOptions,
    /// Directional light.
    pub lighting: LightingOptions,
    /// Frame-level rendering parameters.
    pub render: RenderOptions,
    /// Keyboard binding options.
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, LumenError> {
        let content = std::fs::read_to_string(path).map_err(LumenError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, LumenError> {
        let mut options: Self = toml::from_str(content)
            .map_err(|e| LumenError::OptionsParse(e.to_string()))?;
        options.keybindings.rebuild_reverse_map();
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), LumenError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LumenError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(LumenError::Io)?;
        }
        std::fs::write(path, content).map_err(LumenError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FlyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[spheres]
seed = 42
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.spheres.seed, 42);
        // Everything else should be default
        assert_eq!(opts.spheres.max_count, 100);
        assert_eq!(opts.spheres.radius_range, [3.0, 8.0]);
        assert_eq!(opts.camera, CameraOptions::default());
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(opts.keybindings.lookup("KeyW"), Some(FlyAction::Forward));
        assert_eq!(opts.keybindings.lookup("KeyE"), Some(FlyAction::Rise));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn loaded_keybindings_are_searchable() {
        let toml_str = r#"
[keybindings.bindings]
Forward = "ArrowUp"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("ArrowUp"), Some(FlyAction::Forward));
        assert_eq!(opts.keybindings.lookup("KeyW"), None);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[spheres]\nseed = \"x\"").unwrap_err();
        assert!(matches!(err, LumenError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("lumen-options-test-{}", std::process::id()));
        let path = dir.join("options.toml");
        let mut opts = Options::default();
        opts.lighting.intensity = 2.5;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded.lighting.intensity, 2.5);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sphere_options_generate_the_configured_field() {
        let spheres = SphereOptions::default().generate();
        assert!(!spheres.is_empty());
        assert!(spheres.len() <= 100);
    }
}
