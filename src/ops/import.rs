use crate::model::family::{FamilyBundle, IMPORTED_FAMILY_COLOR, ModeFamily};
use crate::model::mode::Mode;
use crate::model::store::ModeStore;
use crate::ops::conflict::{SlugRename, resolve_conflicts};
use crate::ops::family_ops::{ensure_family, family_id_from_name};
use crate::ops::mode_ops::{ModeError, validate_mode};

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("no modes found in import file")]
    NoModes,
    #[error("invalid mode format: {0}")]
    InvalidMode(#[from] ModeError),
    #[error("cannot derive a family id from \"{0}\"")]
    InvalidFamilyName(String),
}

/// How imported modes are merged into the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStrategy {
    /// Discard the current modes
    Replace,
    /// Append, renaming colliding slugs
    Add,
    /// Append into a (possibly new) family with this display name
    Family(String),
}

/// Result of an import
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Slugs of the imported modes, after renames
    pub imported: Vec<String>,
    pub renames: Vec<SlugRename>,
    /// Modes dropped by a replace import
    pub replaced: Vec<Mode>,
    /// Id of the family created for the import, if any
    pub created_family: Option<String>,
}

/// Merge `modes` into the store using `strategy`.
///
/// Every incoming record is validated first; nothing changes if any of
/// them is malformed.
pub fn import_modes(
    store: &mut ModeStore,
    mut modes: Vec<Mode>,
    strategy: ImportStrategy,
) -> Result<ImportOutcome, ImportError> {
    if modes.is_empty() {
        return Err(ImportError::NoModes);
    }
    for mode in &modes {
        validate_mode(mode)?;
    }

    let mut outcome = ImportOutcome::default();
    match strategy {
        ImportStrategy::Replace => {
            let resolution = resolve_conflicts(modes, &[]);
            outcome.replaced = std::mem::take(&mut store.modes);
            outcome.imported = slugs(&resolution.resolved);
            outcome.renames = resolution.renames;
            store.modes = resolution.resolved;
        }
        ImportStrategy::Add => {
            let resolution = resolve_conflicts(modes, &store.modes);
            outcome.imported = slugs(&resolution.resolved);
            outcome.renames = resolution.renames;
            store.modes.extend(resolution.resolved);
        }
        ImportStrategy::Family(name) => {
            let family_id = family_id_from_name(&name);
            if family_id.is_empty() {
                return Err(ImportError::InvalidFamilyName(name));
            }
            let family = ModeFamily {
                color: Some(IMPORTED_FAMILY_COLOR.to_string()),
                ..ModeFamily::new(&family_id, name.trim(), &format!("Imported family: {}", name.trim()))
            };
            if ensure_family(store, family) {
                outcome.created_family = Some(family_id.clone());
            }
            for mode in modes.iter_mut() {
                mode.family = Some(family_id.clone());
            }
            let resolution = resolve_conflicts(modes, &store.modes);
            outcome.imported = slugs(&resolution.resolved);
            outcome.renames = resolution.renames;
            store.modes.extend(resolution.resolved);
        }
    }
    Ok(outcome)
}

/// Import a family bundle written by `family export`, optionally under a new
/// display name (the id is then re-derived from it).
pub fn import_family_bundle(
    store: &mut ModeStore,
    bundle: FamilyBundle,
    new_name: Option<&str>,
) -> Result<ImportOutcome, ImportError> {
    let mut family = bundle.family;
    if let Some(name) = new_name.map(str::trim).filter(|n| !n.is_empty()) {
        let id = family_id_from_name(name);
        if id.is_empty() {
            return Err(ImportError::InvalidFamilyName(name.to_string()));
        }
        family.id = id;
        family.name = name.to_string();
    }
    family.is_default = None;
    let family_id = family.id.clone();

    // Older bundles embed their modes in the family record
    let mut modes = bundle.modes;
    if modes.is_empty() {
        modes = crate::format::modes_from_family(&family);
    }
    family.custom_modes = None;

    for mode in &modes {
        validate_mode(mode)?;
    }

    let mut outcome = ImportOutcome::default();
    if ensure_family(store, family) {
        outcome.created_family = Some(family_id.clone());
    }
    for mode in modes.iter_mut() {
        mode.family = Some(family_id.clone());
    }
    let resolution = resolve_conflicts(modes, &store.modes);
    outcome.imported = slugs(&resolution.resolved);
    outcome.renames = resolution.renames;
    store.modes.extend(resolution.resolved);
    Ok(outcome)
}

fn slugs(modes: &[Mode]) -> Vec<String> {
    modes.iter().map(|m| m.slug.clone()).collect()
}
