use serde::{Deserialize, Serialize};

use super::mode::FormatType;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreInfo,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreInfo {
    #[serde(default)]
    pub name: String,
}

/// Defaults for `mk analyze`. Values below 1 are clamped when used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Default: see src/templates/config.toml
    #[serde(default = "default_min_word_length")]
    pub min_word_length: i64,
    /// Default: see src/templates/config.toml
    #[serde(default = "default_min_frequency")]
    pub min_frequency: i64,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Extra words to ignore on top of the built-in stop-words
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            min_word_length: default_min_word_length(),
            min_frequency: default_min_frequency(),
            case_sensitive: false,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: FormatType,
    /// Tool groups written into every exported mode
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: FormatType::default(),
            groups: default_groups(),
        }
    }
}

/// Default: see src/templates/config.toml
fn default_min_word_length() -> i64 {
    4
}

/// Default: see src/templates/config.toml
fn default_min_frequency() -> i64 {
    2
}

pub fn default_groups() -> Vec<String> {
    ["read", "edit", "browser", "command", "mcp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
