use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::FlyAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Configurable keyboard bindings mapping held fly actions to key codes.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format (`"KeyW"`,
/// `"Space"`, ...).
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `Forward` → `"KeyW"`).
    pub bindings: HashMap<FlyAction, String>,
    /// Reverse lookup cache (key string → action). Rebuilt on load.
    #[serde(skip)]
    key_to_action: HashMap<String, FlyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = HashMap::from([
            (FlyAction::Forward, "KeyW".into()),
            (FlyAction::Backward, "KeyS".into()),
            (FlyAction::Leftward, "KeyA".into()),
            (FlyAction::Rightward, "KeyD".into()),
            (FlyAction::Lower, "KeyQ".into()),
            (FlyAction::Rise, "KeyE".into()),
        ]);

        let mut opts = Self {
            bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl KeybindingOptions {
    /// Rebuild the reverse lookup map (key string → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<FlyAction> {
        self.key_to_action.get(key).copied()
    }
}
