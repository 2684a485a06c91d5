use crate::model::family::ModeFamily;
use crate::model::mode::STANDALONE_FAMILY;
use crate::model::store::ModeStore;

/// Error type for family operations
#[derive(Debug, thiserror::Error)]
pub enum FamilyError {
    #[error("family not found: {0}")]
    NotFound(String),
    #[error("family \"{0}\" already exists")]
    Duplicate(String),
    #[error("family \"{0}\" is built in and cannot be deleted")]
    Protected(String),
    #[error("cannot derive a family id from \"{0}\"")]
    InvalidName(String),
}

/// Partial update applied by `update_family`
#[derive(Debug, Clone, Default)]
pub struct FamilyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Derive a family id from a display name: lowercase, whitespace runs
/// become `-`, anything outside `[a-z0-9-]` is dropped.
pub fn family_id_from_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let mut id = String::with_capacity(lower.len());
    let mut in_space = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_space {
                id.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            id.push(c);
        }
    }
    id
}

pub fn add_family(store: &mut ModeStore, family: ModeFamily) -> Result<(), FamilyError> {
    if family.id.is_empty() {
        return Err(FamilyError::InvalidName(family.name));
    }
    if store.family(&family.id).is_some() {
        return Err(FamilyError::Duplicate(family.id));
    }
    store.families.push(family);
    Ok(())
}

/// Create a family from a display name, deriving its id.
pub fn create_family(
    store: &mut ModeStore,
    name: &str,
    description: &str,
    color: Option<String>,
) -> Result<String, FamilyError> {
    let id = family_id_from_name(name);
    if id.is_empty() {
        return Err(FamilyError::InvalidName(name.to_string()));
    }
    let family = ModeFamily {
        color,
        ..ModeFamily::new(&id, name.trim(), description)
    };
    add_family(store, family)?;
    Ok(id)
}

/// Add the family unless one with the same id is already present.
pub fn ensure_family(store: &mut ModeStore, family: ModeFamily) -> bool {
    if store.family(&family.id).is_some() {
        return false;
    }
    store.families.push(family);
    true
}

pub fn update_family(
    store: &mut ModeStore,
    id: &str,
    update: FamilyUpdate,
) -> Result<(), FamilyError> {
    let family = store
        .families
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or_else(|| FamilyError::NotFound(id.to_string()))?;
    if let Some(name) = update.name {
        family.name = name;
    }
    if let Some(description) = update.description {
        family.description = description;
    }
    if let Some(color) = update.color {
        family.color = Some(color);
    }
    Ok(())
}

/// Delete a family. Its modes move to the standalone family and the id is
/// dropped from the selection. Returns the number of modes moved.
pub fn delete_family(store: &mut ModeStore, id: &str) -> Result<usize, FamilyError> {
    if ModeFamily::is_protected(id) {
        return Err(FamilyError::Protected(id.to_string()));
    }
    let idx = store
        .families
        .iter()
        .position(|f| f.id == id)
        .ok_or_else(|| FamilyError::NotFound(id.to_string()))?;
    store.families.remove(idx);
    store.selected_families.retain(|f| f != id);

    let mut moved = 0;
    for mode in store.modes.iter_mut() {
        if mode.family.as_deref() == Some(id) {
            mode.family = Some(STANDALONE_FAMILY.to_string());
            moved += 1;
        }
    }
    Ok(moved)
}

/// Replace the set of selected families. Unknown ids are rejected and
/// duplicates collapsed, keeping the given order.
pub fn select_families(store: &mut ModeStore, ids: &[String]) -> Result<(), FamilyError> {
    let mut selected: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if store.family(id).is_none() {
            return Err(FamilyError::NotFound(id.clone()));
        }
        if !selected.contains(id) {
            selected.push(id.clone());
        }
    }
    store.selected_families = selected;
    Ok(())
}
