use crate::format::mode_to_export;
use crate::model::family::{DEFAULT_FAMILY, FamilyBundle};
use crate::model::mode::{ExportFormat, Mode};
use crate::model::store::ModeStore;
use crate::ops::mode_ops::modes_in_family;

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no modes selected for export")]
    NothingSelected,
    #[error("mode not found: {0}")]
    UnknownMode(String),
    #[error("family not found: {0}")]
    UnknownFamily(String),
}

fn to_export(modes: &[&Mode], groups: &[String]) -> ExportFormat {
    ExportFormat {
        custom_modes: modes.iter().map(|m| mode_to_export(m, groups)).collect(),
    }
}

/// Export the named modes, in stored order.
pub fn export_selected(
    store: &ModeStore,
    slugs: &[String],
    groups: &[String],
) -> Result<ExportFormat, ExportError> {
    if let Some(missing) = slugs
        .iter()
        .find(|s| !store.modes.iter().any(|m| &m.slug == *s))
    {
        return Err(ExportError::UnknownMode(missing.clone()));
    }
    let selected: Vec<&Mode> = store
        .modes
        .iter()
        .filter(|m| slugs.contains(&m.slug))
        .collect();
    if selected.is_empty() {
        return Err(ExportError::NothingSelected);
    }
    Ok(to_export(&selected, groups))
}

/// Export every mode outside the built-in default family.
pub fn export_custom(store: &ModeStore, groups: &[String]) -> Result<ExportFormat, ExportError> {
    let custom: Vec<&Mode> = store
        .modes
        .iter()
        .filter(|m| m.family_id() != DEFAULT_FAMILY)
        .collect();
    if custom.is_empty() {
        return Err(ExportError::NothingSelected);
    }
    Ok(to_export(&custom, groups))
}

/// A family and its modes, for `family export`.
pub fn export_family(store: &ModeStore, family_id: &str) -> Result<FamilyBundle, ExportError> {
    let family = store
        .family(family_id)
        .ok_or_else(|| ExportError::UnknownFamily(family_id.to_string()))?;
    Ok(FamilyBundle {
        family: family.clone(),
        modes: modes_in_family(store, family_id).into_iter().cloned().collect(),
    })
}

/// Default file name for an export in `ext` format.
pub fn export_file_name(ext: &str) -> String {
    format!("modes-export.{}", ext)
}
