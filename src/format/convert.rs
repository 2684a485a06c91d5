use crate::model::family::ModeFamily;
use crate::model::mode::{ExportMode, Mode, STANDALONE_FAMILY};

/// Convert a mode to its interchange shape.
pub fn mode_to_export(mode: &Mode, groups: &[String]) -> ExportMode {
    ExportMode {
        slug: mode.slug.clone(),
        name: mode.name.clone(),
        description: mode.description.clone(),
        role_definition: mode.prompt.clone(),
        when_to_use: mode.usage.clone(),
        groups: groups.to_vec(),
    }
}

/// Convert an exported mode back, assigning it to `family`
/// (standalone when `None`).
pub fn export_to_mode(export: &ExportMode, family: Option<&str>) -> Mode {
    Mode {
        slug: export.slug.clone(),
        name: export.name.clone(),
        description: export.description.clone(),
        usage: export.when_to_use.clone(),
        prompt: export.role_definition.clone(),
        family: Some(family.unwrap_or(STANDALONE_FAMILY).to_string()),
    }
}

/// Modes embedded in a family file, assigned to that family.
/// Older family files carry no modes.
pub fn modes_from_family(family: &ModeFamily) -> Vec<Mode> {
    family
        .custom_modes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|m| export_to_mode(m, Some(&family.id)))
        .collect()
}
