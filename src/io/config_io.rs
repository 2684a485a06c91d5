use std::path::Path;

use crate::io::recovery::atomic_write;
use crate::io::store_io::StoreError;
use crate::model::config::StoreConfig;
use crate::model::mode::FormatType;

/// Keys accepted by `mk config set`
pub const SETTABLE_KEYS: [&str; 6] = [
    "store.name",
    "analysis.min_word_length",
    "analysis.min_frequency",
    "analysis.case_sensitive",
    "export.format",
    "export.groups",
];

/// Error type for config edits
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown config key \"{0}\" (expected one of: {keys})", keys = SETTABLE_KEYS.join(", "))]
    UnknownKey(String),
    #[error("invalid value \"{value}\" for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Read the store config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(store_dir: &Path) -> Result<(StoreConfig, toml_edit::DocumentMut), StoreError> {
    let config_path = store_dir.join("config.toml");
    let config_text = std::fs::read_to_string(&config_path).map_err(|e| StoreError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: StoreConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(store_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), StoreError> {
    let config_path = store_dir.join("config.toml");
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| StoreError::WriteError {
        path: config_path,
        source: e,
    })
}

fn ensure_table<'a>(doc: &'a mut toml_edit::DocumentMut, name: &str) -> &'a mut toml_edit::Item {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    &mut doc[name]
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Set a dotted config key from its command-line string form.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), ConfigError> {
    let (table, field) = key
        .split_once('.')
        .filter(|_| SETTABLE_KEYS.contains(&key))
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let item = match key {
        "store.name" => toml_edit::value(value),
        "analysis.min_word_length" | "analysis.min_frequency" => {
            let n: i64 = value
                .trim()
                .parse()
                .map_err(|_| invalid(key, value, "an integer"))?;
            toml_edit::value(n)
        }
        "analysis.case_sensitive" => match value.trim() {
            "true" => toml_edit::value(true),
            "false" => toml_edit::value(false),
            _ => return Err(invalid(key, value, "true or false")),
        },
        "export.format" => {
            let format =
                FormatType::parse_format(value.trim()).ok_or_else(|| invalid(key, value, "json or yaml"))?;
            toml_edit::value(format.extension())
        }
        _ => {
            let groups: toml_edit::Array = value
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .collect();
            toml_edit::value(groups)
        }
    };

    ensure_table(doc, table)[field] = item;
    Ok(())
}

fn exclude_array(doc: &mut toml_edit::DocumentMut) -> Option<&mut toml_edit::Array> {
    let analysis = ensure_table(doc, "analysis");
    if analysis.get("exclude").and_then(|v| v.as_array()).is_none() {
        analysis["exclude"] = toml_edit::value(toml_edit::Array::new());
    }
    analysis["exclude"].as_array_mut()
}

/// Add a word to `analysis.exclude`. Returns false if it was already listed.
pub fn add_exclude(doc: &mut toml_edit::DocumentMut, word: &str) -> bool {
    let Some(array) = exclude_array(doc) else {
        return false;
    };
    if array.iter().any(|v| v.as_str() == Some(word)) {
        return false;
    }
    array.push(word);
    true
}

/// Remove a word from `analysis.exclude`. Returns false if it was not listed.
pub fn remove_exclude(doc: &mut toml_edit::DocumentMut, word: &str) -> bool {
    let Some(array) = exclude_array(doc) else {
        return false;
    };
    let before = array.len();
    array.retain(|v| v.as_str() != Some(word));
    array.len() != before
}
