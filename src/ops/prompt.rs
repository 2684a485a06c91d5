use std::collections::{HashMap, HashSet};

use crate::model::feature::{CustomFeature, FeatureCatalog};
use crate::model::store::ModeStore;
use crate::ops::conflict::generate_unique_slug;
use crate::ops::family_ops::family_id_from_name;

const FEATURE_CATALOG: &str = include_str!("../data/features.toml");

/// Prefix of every custom feature id.
const CUSTOM_PREFIX: &str = "custom-";

/// Error type for prompt-builder operations
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("feature not found: {0}")]
    NotFound(String),
    #[error("invalid position {index} (there are {len} custom features)")]
    InvalidPosition { index: usize, len: usize },
    #[error("feature name cannot be empty")]
    EmptyName,
    #[error("built-in feature catalog is malformed: {0}")]
    Catalog(#[from] toml::de::Error),
}

/// Parse the embedded catalog of built-in features.
pub fn builtin_catalog() -> Result<FeatureCatalog, FeatureError> {
    Ok(toml::from_str(FEATURE_CATALOG)?)
}

/// Which built-in features are on by default for a mode.
pub fn default_features_for_mode(catalog: &FeatureCatalog, slug: &str) -> HashMap<String, bool> {
    catalog
        .features
        .iter()
        .map(|f| (f.id.clone(), f.enabled_for.iter().any(|s| s == slug)))
        .collect()
}

// ---------------------------------------------------------------------------
// Custom features
// ---------------------------------------------------------------------------

/// Partial update applied by `update_custom_feature`
#[derive(Debug, Clone, Default)]
pub struct FeatureUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Add a custom feature; its id is `custom-<name>`, suffixed when taken.
pub fn add_custom_feature(
    store: &mut ModeStore,
    name: &str,
    description: &str,
    category: &str,
) -> Result<String, FeatureError> {
    let base = family_id_from_name(name);
    if base.is_empty() {
        return Err(FeatureError::EmptyName);
    }
    let base = format!("{}{}", CUSTOM_PREFIX, base);
    let used: HashSet<String> = store.custom_features.iter().map(|f| f.id.clone()).collect();
    let id = if used.contains(&base) {
        generate_unique_slug(&base, &used)
    } else {
        base
    };
    store.custom_features.push(CustomFeature {
        id: id.clone(),
        name: name.trim().to_string(),
        description: description.to_string(),
        category: category.to_string(),
    });
    Ok(id)
}

pub fn update_custom_feature(
    store: &mut ModeStore,
    id: &str,
    update: FeatureUpdate,
) -> Result<(), FeatureError> {
    let feature = store
        .custom_features
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or_else(|| FeatureError::NotFound(id.to_string()))?;
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(FeatureError::EmptyName);
        }
        feature.name = name;
    }
    if let Some(description) = update.description {
        feature.description = description;
    }
    if let Some(category) = update.category {
        feature.category = category;
    }
    Ok(())
}

pub fn delete_custom_feature(store: &mut ModeStore, id: &str) -> Result<CustomFeature, FeatureError> {
    let idx = store
        .custom_features
        .iter()
        .position(|f| f.id == id)
        .ok_or_else(|| FeatureError::NotFound(id.to_string()))?;
    Ok(store.custom_features.remove(idx))
}

/// Move a custom feature to `index` (0-based) in the stored order.
pub fn move_custom_feature(store: &mut ModeStore, id: &str, index: usize) -> Result<(), FeatureError> {
    let len = store.custom_features.len();
    let from = store
        .custom_features
        .iter()
        .position(|f| f.id == id)
        .ok_or_else(|| FeatureError::NotFound(id.to_string()))?;
    if index >= len {
        return Err(FeatureError::InvalidPosition { index, len });
    }
    let feature = store.custom_features.remove(from);
    store.custom_features.insert(index, feature);
    Ok(())
}

// ---------------------------------------------------------------------------
// Prompt generation
// ---------------------------------------------------------------------------

/// A feature block to append to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFeature {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Which features to turn on for a prompt
#[derive(Debug, Clone, Default)]
pub struct FeatureSelection {
    /// Start from the mode's default built-in features
    pub use_defaults: bool,
    /// Feature ids (built-in or custom) to turn on
    pub enable: Vec<String>,
    /// Feature ids to turn off, applied after `enable`
    pub disable: Vec<String>,
}

/// Resolve a selection into feature blocks: built-in features in catalog
/// order, then custom features in stored order.
pub fn resolve_features(
    catalog: &FeatureCatalog,
    custom: &[CustomFeature],
    mode_slug: &str,
    selection: &FeatureSelection,
) -> Result<Vec<PromptFeature>, FeatureError> {
    for id in selection.enable.iter().chain(&selection.disable) {
        if catalog.feature(id).is_none() && !custom.iter().any(|f| &f.id == id) {
            return Err(FeatureError::NotFound(id.clone()));
        }
    }

    let mut on: HashSet<&str> = HashSet::new();
    if selection.use_defaults {
        for (id, enabled) in default_features_for_mode(catalog, mode_slug) {
            if enabled && let Some(f) = catalog.feature(&id) {
                on.insert(f.id.as_str());
            }
        }
    }
    on.extend(selection.enable.iter().map(String::as_str));
    for id in &selection.disable {
        on.remove(id.as_str());
    }

    let builtin = catalog
        .features
        .iter()
        .filter(|f| on.contains(f.id.as_str()))
        .map(|f| PromptFeature {
            id: f.id.clone(),
            name: f.name.clone(),
            description: f.description.clone(),
        });
    let custom = custom
        .iter()
        .filter(|f| on.contains(f.id.as_str()))
        .map(|f| PromptFeature {
            id: f.id.clone(),
            name: f.name.clone(),
            description: f.description.clone(),
        });
    Ok(builtin.chain(custom).collect())
}

/// Concatenate a base prompt, feature blocks and extra instructions.
pub fn generate_prompt(base: &str, features: &[PromptFeature], custom_instructions: &str) -> String {
    let mut prompt = base.to_string();
    if !features.is_empty() {
        prompt.push_str("\n\n--- Feature Enhancements ---\n");
        for feature in features {
            prompt.push_str(&format!("\n## {}\n{}\n", feature.name, feature.description));
        }
    }
    if !custom_instructions.trim().is_empty() {
        prompt.push_str("\n\nAdditional Instructions: ");
        prompt.push_str(custom_instructions);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feature(id: &str, name: &str, description: &str) -> PromptFeature {
        PromptFeature {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.categories.len(), 4);
        assert_eq!(catalog.features.len(), 10);
        for f in &catalog.features {
            assert!(catalog.category(&f.category).is_some(), "{} has no category", f.id);
        }
    }

    #[test]
    fn test_default_features_for_mode() {
        let catalog = builtin_catalog().unwrap();
        let defaults = default_features_for_mode(&catalog, "cherished-debug");
        assert_eq!(defaults.len(), 10);
        assert_eq!(defaults["clever-jokes"], true);
        assert_eq!(defaults["perplexity-mcp"], false);

        let unknown = default_features_for_mode(&catalog, "my-mode");
        assert!(unknown.values().all(|on| !on));
    }

    #[test]
    fn test_generate_prompt_base_only() {
        assert_eq!(generate_prompt("Base.", &[], "   "), "Base.");
    }

    #[test]
    fn test_generate_prompt_with_features_and_instructions() {
        let features = vec![
            feature("a", "Numbered Steps", "Work in steps."),
            feature("b", "Diagrams", "Draw diagrams."),
        ];
        let out = generate_prompt("You plan things.", &features, "Be brief.");
        insta::assert_snapshot!(out, @r"
        You plan things.

        --- Feature Enhancements ---

        ## Numbered Steps
        Work in steps.

        ## Diagrams
        Draw diagrams.


        Additional Instructions: Be brief.
        ");
    }

    #[test]
    fn test_generate_prompt_instructions_only() {
        let out = generate_prompt("Base.", &[], "Extra");
        assert_eq!(out, "Base.\n\nAdditional Instructions: Extra");
    }

    #[test]
    fn test_resolve_features_orders_builtin_then_custom() {
        let catalog = builtin_catalog().unwrap();
        let mut store = ModeStore::default();
        let custom_id = add_custom_feature(&mut store, "Terse Output", "Keep it short.", "communication-style")
            .unwrap();

        let selection = FeatureSelection {
            use_defaults: false,
            enable: vec![custom_id.clone(), "mermaid-diagrams".into(), "holistic-view".into()],
            disable: Vec::new(),
        };
        let features =
            resolve_features(&catalog, &store.custom_features, "any", &selection).unwrap();
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["holistic-view", "mermaid-diagrams", "custom-terse-output"]);
    }

    #[test]
    fn test_resolve_features_defaults_and_disable() {
        let catalog = builtin_catalog().unwrap();
        let selection = FeatureSelection {
            use_defaults: true,
            enable: Vec::new(),
            disable: vec!["clever-jokes".into()],
        };
        let features = resolve_features(&catalog, &[], "cherished-ask", &selection).unwrap();
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "empathy-friendly-tone",
                "holistic-view",
                "best-practices",
                "dev-workflows",
                "user-education",
                "mermaid-diagrams",
            ]
        );
    }

    #[test]
    fn test_resolve_features_unknown_id() {
        let catalog = builtin_catalog().unwrap();
        let selection = FeatureSelection {
            enable: vec!["nope".into()],
            ..Default::default()
        };
        assert!(matches!(
            resolve_features(&catalog, &[], "x", &selection),
            Err(FeatureError::NotFound(_))
        ));
    }

    #[test]
    fn test_custom_feature_ids_are_unique() {
        let mut store = ModeStore::default();
        let a = add_custom_feature(&mut store, "Tone", "", "c").unwrap();
        let b = add_custom_feature(&mut store, "Tone", "", "c").unwrap();
        assert_eq!(a, "custom-tone");
        assert_eq!(b, "custom-tone-2");
        assert!(add_custom_feature(&mut store, "  ", "", "c").is_err());
    }

    #[test]
    fn test_update_and_delete_custom_feature() {
        let mut store = ModeStore::default();
        let id = add_custom_feature(&mut store, "Tone", "old", "c").unwrap();
        let update = FeatureUpdate {
            description: Some("new".into()),
            ..Default::default()
        };
        update_custom_feature(&mut store, &id, update).unwrap();
        assert_eq!(store.custom_features[0].description, "new");

        let removed = delete_custom_feature(&mut store, &id).unwrap();
        assert_eq!(removed.name, "Tone");
        assert!(store.custom_features.is_empty());
        assert!(delete_custom_feature(&mut store, &id).is_err());
    }

    #[test]
    fn test_move_custom_feature() {
        let mut store = ModeStore::default();
        for name in ["One", "Two", "Three"] {
            add_custom_feature(&mut store, name, "", "c").unwrap();
        }
        move_custom_feature(&mut store, "custom-three", 0).unwrap();
        let ids: Vec<&str> = store.custom_features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["custom-three", "custom-one", "custom-two"]);

        move_custom_feature(&mut store, "custom-three", 2).unwrap();
        let ids: Vec<&str> = store.custom_features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["custom-one", "custom-two", "custom-three"]);

        assert!(matches!(
            move_custom_feature(&mut store, "custom-one", 3),
            Err(FeatureError::InvalidPosition { index: 3, len: 3 })
        ));
    }
}
