use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::store_io;

/// Infer a store name from a directory name: hyphens and underscores become
/// spaces, each word title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(
    args: InitArgs,
    store_dir: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = match store_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            fs::canonicalize(dir)?
        }
        None => std::env::current_dir()?,
    };

    // Check for parent store and warn
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = store_io::discover_store(parent)
    {
        let parent_store = parent_root.join(store_io::STORE_DIR);
        eprintln!("note: parent store found at {}/", parent_store.display());
        eprintln!("creating new store in ./{}/", store_io::STORE_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let created = store_io::init_store(&root, &name, args.force)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "name": name,
                "path": created.display().to_string(),
            }))?
        );
    } else {
        println!("Initialized modekit store: {}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("my-prompt-modes"), "My Prompt Modes");
        assert_eq!(infer_name("modes"), "Modes");
        assert_eq!(infer_name("team_modes"), "Team Modes");
        assert_eq!(infer_name("--odd--"), "Odd");
    }
}
