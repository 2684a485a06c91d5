use std::path::Path;

use serde_json::Value;

use crate::format::convert::export_to_mode;
use crate::model::family::FamilyBundle;
use crate::model::mode::{ExportFormat, FormatType, Mode};

/// Error type for reading and writing interchange files
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unsupported file format: {0} (use .json, .yaml or .yml)")]
    UnsupportedFormat(String),
    #[error("failed to parse {format} content: {message}")]
    Parse { format: FormatType, message: String },
    #[error("failed to serialize {format} content: {message}")]
    Serialize { format: FormatType, message: String },
    #[error("invalid file structure: {0}")]
    InvalidStructure(String),
}

const EXPORT_FIELDS: &[&str] = &["slug", "name", "description", "roleDefinition", "whenToUse"];
const MODE_FIELDS: &[&str] = &["slug", "name", "description", "usage", "prompt"];

/// Detect the format from a file name's extension.
pub fn detect_file_format(path: &Path) -> Option<FormatType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(FormatType::Json),
        "yaml" | "yml" => Some(FormatType::Yaml),
        _ => None,
    }
}

/// Parse text into an untyped value tree.
fn parse_value(text: &str, format: FormatType) -> Result<Value, FormatError> {
    let parsed = match format {
        FormatType::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        FormatType::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| FormatError::Parse { format, message })
}

/// Check that every entry is an object whose `fields` are strings.
fn validate_entries(entries: &[Value], fields: &[&str]) -> Result<(), FormatError> {
    for (i, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            return Err(FormatError::InvalidStructure(format!(
                "entry {} is not an object",
                i + 1
            )));
        };
        for field in fields {
            if !obj.get(*field).is_some_and(Value::is_string) {
                return Err(FormatError::InvalidStructure(format!(
                    "entry {} is missing string field \"{}\"",
                    i + 1,
                    field
                )));
            }
        }
    }
    Ok(())
}

fn validate_export(value: &Value) -> Result<(), FormatError> {
    let Some(modes) = value.get("customModes").and_then(Value::as_array) else {
        return Err(FormatError::InvalidStructure(
            "expected { customModes: [...] }".to_string(),
        ));
    };
    validate_entries(modes, EXPORT_FIELDS)?;
    for (i, mode) in modes.iter().enumerate() {
        if !mode.get("groups").is_some_and(Value::is_array) {
            return Err(FormatError::InvalidStructure(format!(
                "entry {} is missing array field \"groups\"",
                i + 1
            )));
        }
    }
    Ok(())
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, FormatError> {
    serde_json::from_value(value).map_err(|e| FormatError::InvalidStructure(e.to_string()))
}

/// Parse an export file (`{ customModes: [...] }`).
pub fn parse_export(text: &str, format: FormatType) -> Result<ExportFormat, FormatError> {
    let value = parse_value(text, format)?;
    validate_export(&value)?;
    from_value(value)
}

/// Parse anything `mk import` accepts: an export file, or a bare array of
/// stored mode records. Export entries land in the standalone family.
pub fn parse_import(text: &str, format: FormatType) -> Result<Vec<Mode>, FormatError> {
    let value = parse_value(text, format)?;
    if let Some(entries) = value.as_array() {
        validate_entries(entries, MODE_FIELDS)?;
        return from_value(value);
    }
    validate_export(&value)?;
    let export: ExportFormat = from_value(value)?;
    Ok(export
        .custom_modes
        .iter()
        .map(|m| export_to_mode(m, None))
        .collect())
}

/// Serialize an export file: pretty JSON with two-space indent, or YAML.
pub fn serialize_export(data: &ExportFormat, format: FormatType) -> Result<String, FormatError> {
    let out = match format {
        FormatType::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        FormatType::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
    };
    out.map_err(|message| FormatError::Serialize { format, message })
}

pub fn parse_family_bundle(text: &str) -> Result<FamilyBundle, FormatError> {
    let value = parse_value(text, FormatType::Json)?;
    let Some(family) = value.get("family").and_then(Value::as_object) else {
        return Err(FormatError::InvalidStructure(
            "expected { family: {...}, modes: [...] }".to_string(),
        ));
    };
    for field in ["id", "name"] {
        if !family
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
        {
            return Err(FormatError::InvalidStructure(format!(
                "family is missing \"{}\"",
                field
            )));
        }
    }
    if let Some(modes) = value.get("modes") {
        let entries = modes.as_array().ok_or_else(|| {
            FormatError::InvalidStructure("\"modes\" must be an array".to_string())
        })?;
        validate_entries(entries, &["slug", "name"])?;
    }
    from_value(value)
}

pub fn serialize_family_bundle(bundle: &FamilyBundle) -> Result<String, FormatError> {
    serde_json::to_string_pretty(bundle).map_err(|e| FormatError::Serialize {
        format: FormatType::Json,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPORT_JSON: &str = r#"{
  "customModes": [
    {
      "slug": "reviewer",
      "name": "Reviewer",
      "description": "Reviews code",
      "roleDefinition": "You review code.",
      "whenToUse": "After changes",
      "groups": ["read"]
    }
  ]
}"#;

    #[test]
    fn test_detect_file_format() {
        assert_eq!(detect_file_format(Path::new("a.json")), Some(FormatType::Json));
        assert_eq!(detect_file_format(Path::new("a.YAML")), Some(FormatType::Yaml));
        assert_eq!(detect_file_format(Path::new("dir/a.yml")), Some(FormatType::Yaml));
        assert_eq!(detect_file_format(Path::new("a.txt")), None);
        assert_eq!(detect_file_format(Path::new("noext")), None);
    }

    #[test]
    fn test_parse_export_json() {
        let data = parse_export(EXPORT_JSON, FormatType::Json).unwrap();
        assert_eq!(data.custom_modes.len(), 1);
        assert_eq!(data.custom_modes[0].role_definition, "You review code.");
    }

    #[test]
    fn test_parse_export_yaml() {
        let yaml = "\
customModes:
  - slug: reviewer
    name: Reviewer
    description: Reviews code
    roleDefinition: |
      You review code.
    whenToUse: After changes
    groups:
      - read
      - edit
";
        let data = parse_export(yaml, FormatType::Yaml).unwrap();
        assert_eq!(data.custom_modes[0].role_definition, "You review code.\n");
        assert_eq!(data.custom_modes[0].groups, vec!["read", "edit"]);
    }

    #[test]
    fn test_parse_export_rejects_missing_container() {
        let err = parse_export(r#"{"modes": []}"#, FormatType::Json).unwrap_err();
        assert!(matches!(err, FormatError::InvalidStructure(_)));
    }

    #[test]
    fn test_parse_export_rejects_missing_field() {
        let text = r#"{"customModes": [{"slug": "a", "name": "A", "description": "d",
            "roleDefinition": "r", "groups": []}]}"#;
        let err = parse_export(text, FormatType::Json).unwrap_err();
        assert!(err.to_string().contains("whenToUse"));
    }

    #[test]
    fn test_parse_export_rejects_missing_groups() {
        let text = r#"{"customModes": [{"slug": "a", "name": "A", "description": "d",
            "roleDefinition": "r", "whenToUse": "w"}]}"#;
        let err = parse_export(text, FormatType::Json).unwrap_err();
        assert!(err.to_string().contains("groups"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_export("{ not json", FormatType::Json).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Parse {
                format: FormatType::Json,
                ..
            }
        ));
        assert!(err.to_string().starts_with("failed to parse JSON content"));
    }

    #[test]
    fn test_parse_import_accepts_bare_array() {
        let text = r#"[{"slug": "a", "name": "A", "description": "d", "usage": "u",
            "prompt": "p", "family": "team"}]"#;
        let modes = parse_import(text, FormatType::Json).unwrap();
        assert_eq!(modes[0].family.as_deref(), Some("team"));
        assert_eq!(modes[0].prompt, "p");
    }

    #[test]
    fn test_parse_import_export_shape_goes_standalone() {
        let modes = parse_import(EXPORT_JSON, FormatType::Json).unwrap();
        assert_eq!(modes[0].slug, "reviewer");
        assert_eq!(modes[0].usage, "After changes");
        assert_eq!(modes[0].family.as_deref(), Some("standalone"));
    }

    #[test]
    fn test_parse_import_bare_array_missing_prompt() {
        let text = r#"[{"slug": "a", "name": "A", "description": "d", "usage": "u"}]"#;
        assert!(parse_import(text, FormatType::Json).is_err());
    }

    #[test]
    fn test_serialize_json_uses_camel_case() {
        let data = parse_export(EXPORT_JSON, FormatType::Json).unwrap();
        let out = serialize_export(&data, FormatType::Json).unwrap();
        assert!(out.contains("\"roleDefinition\": \"You review code.\""));
        assert!(out.starts_with("{\n  \"customModes\""));
        assert_eq!(parse_export(&out, FormatType::Json).unwrap(), data);
    }

    #[test]
    fn test_serialize_yaml_reads_back() {
        let data = parse_export(EXPORT_JSON, FormatType::Json).unwrap();
        let out = serialize_export(&data, FormatType::Yaml).unwrap();
        assert!(out.contains("whenToUse: After changes"));
        assert_eq!(parse_export(&out, FormatType::Yaml).unwrap(), data);
    }

    #[test]
    fn test_family_bundle() {
        let text = r##"{"family": {"id": "team", "name": "Team", "description": "d",
            "color": "#123456"}, "modes": [{"slug": "a", "name": "A", "description": "d",
            "usage": "u", "prompt": "p"}]}"##;
        let bundle = parse_family_bundle(text).unwrap();
        assert_eq!(bundle.family.id, "team");
        assert_eq!(bundle.family.color.as_deref(), Some("#123456"));
        assert_eq!(bundle.modes.len(), 1);

        let out = serialize_family_bundle(&bundle).unwrap();
        assert_eq!(parse_family_bundle(&out).unwrap(), bundle);
    }

    #[test]
    fn test_family_bundle_requires_id() {
        let text = r#"{"family": {"id": "", "name": "Team", "description": "d"}, "modes": []}"#;
        assert!(parse_family_bundle(text).is_err());
    }
}
