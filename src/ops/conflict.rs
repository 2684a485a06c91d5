use std::collections::HashSet;

use serde::Serialize;

use crate::model::mode::Mode;

/// A slug that was changed while merging incoming modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugRename {
    pub original: String,
    pub renamed: String,
}

/// Result of merging incoming modes into an existing collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictResolution {
    /// Incoming modes in their original order, renamed where needed
    pub resolved: Vec<Mode>,
    /// Renames in the order they were made
    pub renames: Vec<SlugRename>,
}

/// Incoming modes whose slug is already taken by an existing mode.
pub fn detect_slug_conflicts<'a>(existing: &[Mode], incoming: &'a [Mode]) -> Vec<&'a Mode> {
    let existing_slugs: HashSet<&str> = existing.iter().map(|m| m.slug.as_str()).collect();
    incoming
        .iter()
        .filter(|m| existing_slugs.contains(m.slug.as_str()))
        .collect()
}

/// First `{base}-N` (N ≥ 2) that is not in `used`.
pub fn generate_unique_slug(base: &str, used: &HashSet<String>) -> String {
    let mut counter: u64 = 2;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Rename incoming modes so that no slug collides with `existing` or with
/// another incoming mode. Modes without a collision pass through untouched.
pub fn resolve_conflicts(incoming: Vec<Mode>, existing: &[Mode]) -> ConflictResolution {
    let mut used: HashSet<String> = existing.iter().map(|m| m.slug.clone()).collect();
    let mut resolved = Vec::with_capacity(incoming.len());
    let mut renames = Vec::new();

    for mut mode in incoming {
        if used.contains(&mode.slug) {
            let renamed = generate_unique_slug(&mode.slug, &used);
            let original = std::mem::replace(&mut mode.slug, renamed.clone());
            renames.push(SlugRename {
                original,
                renamed: renamed.clone(),
            });
            used.insert(renamed);
        } else {
            used.insert(mode.slug.clone());
        }
        resolved.push(mode);
    }

    ConflictResolution { resolved, renames }
}
