use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::StoreConfig;
use super::family::{DEFAULT_FAMILY, ModeFamily};
use super::feature::CustomFeature;
use super::mode::{Mode, STANDALONE_FAMILY};

/// Instructions shared by every mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub for_all_modes: String,
}

/// Application state persisted in `store.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeStore {
    #[serde(default)]
    pub modes: Vec<Mode>,
    #[serde(default)]
    pub families: Vec<ModeFamily>,
    #[serde(default = "default_selection")]
    pub selected_families: Vec<String>,
    #[serde(default)]
    pub custom_features: Vec<CustomFeature>,
    #[serde(default)]
    pub global_config: GlobalConfig,
}

fn default_selection() -> Vec<String> {
    vec![DEFAULT_FAMILY.to_string(), STANDALONE_FAMILY.to_string()]
}

impl Default for ModeStore {
    fn default() -> Self {
        ModeStore {
            modes: Vec::new(),
            families: vec![
                ModeFamily::builtin_default(),
                ModeFamily::builtin_standalone(),
            ],
            selected_families: default_selection(),
            custom_features: Vec::new(),
            global_config: GlobalConfig::default(),
        }
    }
}

impl ModeStore {
    /// Re-add the built-in families if a stored state lost them.
    pub fn ensure_builtin_families(&mut self) {
        if !self.families.iter().any(|f| f.id == DEFAULT_FAMILY) {
            self.families.insert(0, ModeFamily::builtin_default());
        }
        if !self.families.iter().any(|f| f.id == STANDALONE_FAMILY) {
            self.families.push(ModeFamily::builtin_standalone());
        }
    }

    pub fn family(&self, id: &str) -> Option<&ModeFamily> {
        self.families.iter().find(|f| f.id == id)
    }
}

/// A loaded store directory
#[derive(Debug)]
pub struct Store {
    /// Directory containing `modekit/`
    pub root: PathBuf,
    /// Path to the `modekit/` directory
    pub store_dir: PathBuf,
    /// Parsed config.toml
    pub config: StoreConfig,
    /// Parsed store.json
    pub state: ModeStore,
}
