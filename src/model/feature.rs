use serde::{Deserialize, Serialize};

/// A group of related prompt features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCategory {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A built-in text block that can be appended to a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Mode slugs for which this feature is on by default
    #[serde(default)]
    pub enabled_for: Vec<String>,
}

/// A user-created feature, stored with the modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFeature {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

/// The embedded feature catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCatalog {
    #[serde(default)]
    pub categories: Vec<FeatureCategory>,
    #[serde(default)]
    pub features: Vec<FeatureDefinition>,
}

impl FeatureCatalog {
    pub fn feature(&self, id: &str) -> Option<&FeatureDefinition> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&FeatureCategory> {
        self.categories.iter().find(|c| c.id == id)
    }
}
