use serde::{Deserialize, Serialize};

use super::mode::{ExportMode, Mode, STANDALONE_FAMILY};

/// Id of the built-in family that ships with the store.
pub const DEFAULT_FAMILY: &str = "default";

/// Colour given to families created by an import.
pub const IMPORTED_FAMILY_COLOR: &str = "#3B82F6";

/// A named group of modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeFamily {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Hex colour, e.g. `#3B82F6`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    /// Modes embedded in newer family files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_modes: Option<Vec<ExportMode>>,
}

impl ModeFamily {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        ModeFamily {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: None,
            is_default: None,
            custom_modes: None,
        }
    }

    /// The family every fresh store starts with.
    pub fn builtin_default() -> Self {
        ModeFamily {
            color: Some("#6366F1".to_string()),
            is_default: Some(true),
            ..ModeFamily::new(DEFAULT_FAMILY, "Default", "Built-in modes")
        }
    }

    /// Home for modes that belong to no other family.
    pub fn builtin_standalone() -> Self {
        ModeFamily {
            color: Some("#10B981".to_string()),
            ..ModeFamily::new(
                STANDALONE_FAMILY,
                "Standalone",
                "Modes that do not belong to a family",
            )
        }
    }

    /// Built-in families cannot be deleted.
    pub fn is_protected(id: &str) -> bool {
        id == DEFAULT_FAMILY || id == STANDALONE_FAMILY
    }
}

/// A family together with its modes, as written by `family export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyBundle {
    pub family: ModeFamily,
    #[serde(default)]
    pub modes: Vec<Mode>,
}
