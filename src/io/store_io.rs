use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::config::StoreConfig;
use crate::model::store::{ModeStore, Store};

/// Name of the directory holding a store.
pub const STORE_DIR: &str = "modekit";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "store.json";

const CONFIG_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Error type for store I/O operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a modekit store: no modekit/ directory found (run `mk init`)")]
    NotAStore,
    #[error("modekit store already exists in {0}/ (use --force to rewrite config.toml)")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not parse store.json: {0}")]
    StateParseError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover a store by walking up from the given directory, looking for
/// a `modekit/` subdirectory with a config.toml.
pub fn discover_store(start: &Path) -> Result<PathBuf, StoreError> {
    let mut current = start.to_path_buf();
    loop {
        let store_dir = current.join(STORE_DIR);
        if store_dir.is_dir() && store_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(StoreError::NotAStore);
        }
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a store from the given root directory.
///
/// A missing store.json yields the default state. Built-in families are
/// restored if the saved state lost them.
pub fn load_store(root: &Path) -> Result<Store, StoreError> {
    let store_dir = root.join(STORE_DIR);
    if !store_dir.is_dir() {
        return Err(StoreError::NotAStore);
    }

    let config: StoreConfig = toml::from_str(&read_file(&store_dir.join(CONFIG_FILE))?)?;

    let state_path = store_dir.join(STATE_FILE);
    let mut state = if state_path.exists() {
        serde_json::from_str::<ModeStore>(&read_file(&state_path)?)?
    } else {
        ModeStore::default()
    };
    state.ensure_builtin_families();

    Ok(Store {
        root: root.to_path_buf(),
        store_dir,
        config,
        state,
    })
}

/// Save the state back to store.json. On failure the serialized state is
/// kept in the recovery log.
pub fn save_store(store_dir: &Path, state: &ModeStore) -> Result<(), StoreError> {
    let path = store_dir.join(STATE_FILE);
    let content = serde_json::to_string_pretty(state)?;
    if let Err(e) = atomic_write(&path, content.as_bytes()) {
        log_recovery(
            store_dir,
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Write,
                description: "store write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), STATE_FILE.to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(StoreError::WriteError { path, source: e });
    }
    Ok(())
}

/// Render config.toml for a new store.
pub fn render_config(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    CONFIG_TEMPLATE.replace("{name}", &escaped)
}

/// Create `modekit/` under `root` with a config and the default state.
/// With `force`, config.toml is rewritten but an existing store.json is kept.
/// Returns the store directory.
pub fn init_store(root: &Path, name: &str, force: bool) -> Result<PathBuf, StoreError> {
    let store_dir = root.join(STORE_DIR);
    if store_dir.join(CONFIG_FILE).exists() && !force {
        return Err(StoreError::AlreadyExists(store_dir));
    }
    fs::create_dir_all(&store_dir)?;
    atomic_write(&store_dir.join(CONFIG_FILE), render_config(name).as_bytes()).map_err(|e| {
        StoreError::WriteError {
            path: store_dir.join(CONFIG_FILE),
            source: e,
        }
    })?;
    if !store_dir.join(STATE_FILE).exists() {
        save_store(&store_dir, &ModeStore::default())?;
    }
    Ok(store_dir)
}
