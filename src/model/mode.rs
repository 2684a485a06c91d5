use std::fmt;

use serde::{Deserialize, Serialize};

/// Family a mode falls into when it has none of its own.
pub const STANDALONE_FAMILY: &str = "standalone";

/// A single mode definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Unique key within a collection (lowercase letters, digits, hyphens)
    pub slug: String,
    /// Display name, often prefixed with an emoji
    pub name: String,
    pub description: String,
    /// How and when to use this mode
    pub usage: String,
    /// The prompt text that defines the mode's behavior
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl Mode {
    /// The family used for grouping and filtering. Modes without one
    /// are treated as standalone.
    pub fn family_id(&self) -> &str {
        self.family.as_deref().unwrap_or(STANDALONE_FAMILY)
    }

    /// Text of the given field, for analysis and search.
    pub fn field(&self, field: ModeField) -> &str {
        match field {
            ModeField::Name => &self.name,
            ModeField::Description => &self.description,
            ModeField::Usage => &self.usage,
            ModeField::Prompt => &self.prompt,
        }
    }
}

/// Text fields of a mode that can be analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeField {
    Name,
    Description,
    Usage,
    #[default]
    Prompt,
}

impl ModeField {
    pub fn parse_field(s: &str) -> Option<Self> {
        match s {
            "name" => Some(ModeField::Name),
            "description" => Some(ModeField::Description),
            "usage" => Some(ModeField::Usage),
            "prompt" => Some(ModeField::Prompt),
            _ => None,
        }
    }
}

impl fmt::Display for ModeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeField::Name => write!(f, "name"),
            ModeField::Description => write!(f, "description"),
            ModeField::Usage => write!(f, "usage"),
            ModeField::Prompt => write!(f, "prompt"),
        }
    }
}

/// Interchange shape of a mode in exported JSON/YAML files.
///
/// `role_definition` carries the prompt and `when_to_use` the usage text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMode {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub role_definition: String,
    pub when_to_use: String,
    pub groups: Vec<String>,
}

/// Container written to and read from export files
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormat {
    pub custom_modes: Vec<ExportMode>,
}

/// Supported file formats for import and export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Json,
    #[default]
    Yaml,
}

impl FormatType {
    pub fn parse_format(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(FormatType::Json),
            "yaml" | "yml" => Some(FormatType::Yaml),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Json => "json",
            FormatType::Yaml => "yaml",
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatType::Json => write!(f, "JSON"),
            FormatType::Yaml => write!(f, "YAML"),
        }
    }
}
