use crate::model::mode::Mode;
use crate::model::store::ModeStore;

/// Error type for mode operations
#[derive(Debug, thiserror::Error)]
pub enum ModeError {
    #[error("mode not found: {0}")]
    NotFound(String),
    #[error("a mode with slug \"{0}\" already exists")]
    DuplicateSlug(String),
    #[error("invalid slug \"{0}\": use lowercase letters, digits and hyphens (e.g. \"code-review\")")]
    InvalidSlug(String),
    #[error("mode \"{slug}\" is missing required field \"{field}\"")]
    MissingField { slug: String, field: &'static str },
    #[error("unknown family: {0}")]
    UnknownFamily(String),
}

/// Partial update applied by `update_mode`
#[derive(Debug, Clone, Default)]
pub struct ModeUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub prompt: Option<String>,
    pub family: Option<String>,
}

impl ModeUpdate {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.usage.is_none()
            && self.prompt.is_none()
            && self.family.is_none()
    }
}

/// A slug is non-empty lowercase ASCII letters, digits and hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ModeError> {
    if slug.is_empty()
        || !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ModeError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Every required string field must be non-empty.
pub fn validate_mode(mode: &Mode) -> Result<(), ModeError> {
    let fields: [(&'static str, &str); 5] = [
        ("slug", &mode.slug),
        ("name", &mode.name),
        ("description", &mode.description),
        ("usage", &mode.usage),
        ("prompt", &mode.prompt),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ModeError::MissingField {
                slug: mode.slug.clone(),
                field,
            });
        }
    }
    Ok(())
}

pub fn find_mode<'a>(store: &'a ModeStore, slug: &str) -> Option<&'a Mode> {
    store.modes.iter().find(|m| m.slug == slug)
}

fn check_family(store: &ModeStore, family: Option<&str>) -> Result<(), ModeError> {
    match family {
        Some(id) if store.family(id).is_none() => Err(ModeError::UnknownFamily(id.to_string())),
        _ => Ok(()),
    }
}

/// Append a new mode.
pub fn add_mode(store: &mut ModeStore, mode: Mode) -> Result<(), ModeError> {
    validate_slug(&mode.slug)?;
    validate_mode(&mode)?;
    check_family(store, mode.family.as_deref())?;
    if find_mode(store, &mode.slug).is_some() {
        return Err(ModeError::DuplicateSlug(mode.slug));
    }
    store.modes.push(mode);
    Ok(())
}

/// Apply a partial update. Returns the mode's slug after the update.
pub fn update_mode(
    store: &mut ModeStore,
    slug: &str,
    update: ModeUpdate,
) -> Result<String, ModeError> {
    if let Some(ref new_slug) = update.slug
        && new_slug != slug
    {
        validate_slug(new_slug)?;
        if find_mode(store, new_slug).is_some() {
            return Err(ModeError::DuplicateSlug(new_slug.clone()));
        }
    }
    check_family(store, update.family.as_deref())?;

    let idx = store
        .modes
        .iter()
        .position(|m| m.slug == slug)
        .ok_or_else(|| ModeError::NotFound(slug.to_string()))?;

    let mut updated = store.modes[idx].clone();
    if let Some(v) = update.slug {
        updated.slug = v;
    }
    if let Some(v) = update.name {
        updated.name = v;
    }
    if let Some(v) = update.description {
        updated.description = v;
    }
    if let Some(v) = update.usage {
        updated.usage = v;
    }
    if let Some(v) = update.prompt {
        updated.prompt = v;
    }
    if let Some(v) = update.family {
        updated.family = Some(v);
    }
    validate_mode(&updated)?;

    let new_slug = updated.slug.clone();
    store.modes[idx] = updated;
    Ok(new_slug)
}

/// Remove a mode, returning it.
pub fn delete_mode(store: &mut ModeStore, slug: &str) -> Result<Mode, ModeError> {
    let idx = store
        .modes
        .iter()
        .position(|m| m.slug == slug)
        .ok_or_else(|| ModeError::NotFound(slug.to_string()))?;
    Ok(store.modes.remove(idx))
}

/// Modes whose family is currently selected, in stored order.
pub fn visible_modes(store: &ModeStore) -> Vec<&Mode> {
    store
        .modes
        .iter()
        .filter(|m| store.selected_families.iter().any(|f| f == m.family_id()))
        .collect()
}

/// Modes belonging to one family.
pub fn modes_in_family<'a>(store: &'a ModeStore, family_id: &str) -> Vec<&'a Mode> {
    store
        .modes
        .iter()
        .filter(|m| m.family_id() == family_id)
        .collect()
}
