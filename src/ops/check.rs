use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::store::ModeStore;
use crate::ops::mode_ops::{ModeError, validate_mode, validate_slug};

/// Structured result from `mk check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same slug is used by more than one mode
    #[serde(rename = "duplicate_slug")]
    DuplicateSlug { slug: String, count: usize },
    /// Slug contains characters other than lowercase letters, digits, hyphens
    #[serde(rename = "invalid_slug")]
    InvalidSlug { slug: String },
    /// A required text field is blank
    #[serde(rename = "missing_field")]
    MissingField { slug: String, field: String },
    /// A mode refers to a family that does not exist
    #[serde(rename = "unknown_family")]
    UnknownFamily { slug: String, family: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// The selection names a family that does not exist
    #[serde(rename = "unknown_selected_family")]
    UnknownSelectedFamily { family: String },
    /// The same family id appears twice
    #[serde(rename = "duplicate_family")]
    DuplicateFamily { family: String },
    /// A family has no modes
    #[serde(rename = "empty_family")]
    EmptyFamily { family: String },
}

/// Validate a store and return structured results.
///
/// Read-only. Checks performed:
/// 1. No duplicate slugs
/// 2. Every slug is well-formed
/// 3. Every required field is non-empty
/// 4. Every mode's family exists
/// 5. Warnings for stale selections, duplicate and empty families
pub fn check_store(store: &ModeStore) -> CheckResult {
    let mut result = CheckResult::default();

    let mut slug_counts: IndexMap<&str, usize> = IndexMap::new();
    for mode in &store.modes {
        *slug_counts.entry(mode.slug.as_str()).or_insert(0) += 1;
    }
    for (slug, count) in slug_counts {
        if count > 1 {
            result.errors.push(CheckError::DuplicateSlug {
                slug: slug.to_string(),
                count,
            });
        }
    }

    let family_ids: HashSet<&str> = store.families.iter().map(|f| f.id.as_str()).collect();
    for mode in &store.modes {
        if validate_slug(&mode.slug).is_err() && !mode.slug.is_empty() {
            result.errors.push(CheckError::InvalidSlug {
                slug: mode.slug.clone(),
            });
        }
        if let Err(ModeError::MissingField { field, .. }) = validate_mode(mode) {
            result.errors.push(CheckError::MissingField {
                slug: mode.slug.clone(),
                field: field.to_string(),
            });
        }
        if !family_ids.contains(mode.family_id()) {
            result.errors.push(CheckError::UnknownFamily {
                slug: mode.slug.clone(),
                family: mode.family_id().to_string(),
            });
        }
    }

    for id in &store.selected_families {
        if !family_ids.contains(id.as_str()) {
            result.warnings.push(CheckWarning::UnknownSelectedFamily { family: id.clone() });
        }
    }

    let mut seen = HashSet::new();
    for family in &store.families {
        if !seen.insert(family.id.as_str()) {
            result.warnings.push(CheckWarning::DuplicateFamily {
                family: family.id.clone(),
            });
        } else if !store.modes.iter().any(|m| m.family_id() == family.id) {
            result.warnings.push(CheckWarning::EmptyFamily {
                family: family.id.clone(),
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}
