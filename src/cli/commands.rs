use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mk", about = concat!("modekit v", env!("CARGO_PKG_VERSION"), " - custom modes as plain files"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different store directory
    #[arg(short = 'C', long = "store-dir", global = true)]
    pub store_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new mode store in the current directory
    Init(InitArgs),
    /// List modes in the selected families
    List(ListArgs),
    /// Show a mode in full
    Show(ShowArgs),
    /// Create a mode
    New(NewArgs),
    /// Change fields of a mode
    Edit(EditArgs),
    /// Delete modes (kept in the recovery log)
    Delete(DeleteArgs),
    /// Import modes from a JSON or YAML file
    Import(ImportArgs),
    /// Export modes to JSON or YAML
    Export(ExportArgs),
    /// Family management
    Family(FamilyCmd),
    /// Find words repeated across modes
    Analyze(AnalyzeArgs),
    /// Search mode text by regex
    Search(SearchArgs),
    /// Build a prompt from a mode and features
    Prompt(PromptArgs),
    /// Custom prompt features
    Feature(FeatureCmd),
    /// Instructions shared by all modes
    Global(GlobalCmd),
    /// Show or edit config.toml
    Config(ConfigCmd),
    /// Validate store integrity
    Check,
    /// Restore the default state (modes are kept in the recovery log)
    Reset(ResetArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Store name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if modekit/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Mode args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Only modes in this family
    #[arg(long)]
    pub family: Option<String>,
    /// Include families that are not selected
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Mode slug
    pub slug: String,
}

#[derive(Args)]
pub struct NewArgs {
    /// Mode slug (lowercase letters, digits, hyphens)
    pub slug: String,
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Short description
    #[arg(long)]
    pub description: String,
    /// When to use this mode
    #[arg(long)]
    pub usage: String,
    /// Prompt text
    #[arg(long, conflicts_with = "prompt_file", required_unless_present = "prompt_file")]
    pub prompt: Option<String>,
    /// Read the prompt from a file
    #[arg(long)]
    pub prompt_file: Option<String>,
    /// Family id (default: standalone)
    #[arg(long)]
    pub family: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Mode slug
    pub slug: String,
    /// New slug
    #[arg(long = "slug")]
    pub new_slug: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub usage: Option<String>,
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,
    /// Read the new prompt from a file
    #[arg(long)]
    pub prompt_file: Option<String>,
    /// Move to this family
    #[arg(long)]
    pub family: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Mode slugs
    #[arg(required = true)]
    pub slugs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Import / export args
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    /// Replace every stored mode
    Replace,
    /// Add, renaming colliding slugs
    Add,
    /// Add into a family named by --family-name
    Family,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to import (.json, .yaml or .yml)
    pub file: String,
    #[arg(long, value_enum, default_value = "add")]
    pub strategy: StrategyArg,
    /// Family name for --strategy family
    #[arg(long, required_if_eq("strategy", "family"))]
    pub family_name: Option<String>,
    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Mode slugs to export (default: every mode outside the default family)
    pub slugs: Vec<String>,
    /// Export every mode
    #[arg(long, conflicts_with = "slugs")]
    pub all: bool,
    /// json or yaml (default: from config.toml)
    #[arg(long)]
    pub format: Option<String>,
    /// Output file, or a directory to write modes-export.<ext> into (default: stdout)
    #[arg(long, short)]
    pub out: Option<String>,
}

// ---------------------------------------------------------------------------
// Family args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FamilyCmd {
    #[command(subcommand)]
    pub action: FamilyAction,
}

#[derive(Subcommand)]
pub enum FamilyAction {
    /// List families
    List,
    /// Create a family
    New {
        /// Display name (the id is derived from it)
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Hex colour, e.g. #8B5CF6
        #[arg(long)]
        color: Option<String>,
    },
    /// Change a family's name, description or colour
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a family (its modes become standalone)
    Delete { id: String },
    /// Set which families `list` and `analyze` show
    Select {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Write a family and its modes as JSON
    Export {
        id: String,
        #[arg(long, short)]
        out: Option<String>,
    },
    /// Import a family written by `family export`
    Import {
        file: String,
        /// Import under a different name
        #[arg(long)]
        name: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Analysis args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Modes to analyze (default: all modes in selected families)
    pub slugs: Vec<String>,
    /// Analyze one family
    #[arg(long, conflicts_with = "slugs")]
    pub family: Option<String>,
    /// Field to analyze: name, description, usage, prompt
    #[arg(long, default_value = "prompt")]
    pub field: String,
    /// Minimum word length (default: from config.toml)
    #[arg(long, allow_negative_numbers = true)]
    pub min_length: Option<i64>,
    /// Minimum total occurrences (default: from config.toml)
    #[arg(long, allow_negative_numbers = true)]
    pub min_frequency: Option<i64>,
    /// Treat words differing only in case as distinct
    #[arg(long, conflicts_with = "case_insensitive")]
    pub case_sensitive: bool,
    /// Fold case even when config.toml sets case_sensitive
    #[arg(long)]
    pub case_insensitive: bool,
    /// Extra words to ignore (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
    /// Print each mode's text with repeated words coloured
    #[arg(long)]
    pub highlight: bool,
    /// Highlight only this word
    #[arg(long, requires = "highlight")]
    pub only: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
    /// Limit search to one family
    #[arg(long)]
    pub family: Option<String>,
}

// ---------------------------------------------------------------------------
// Prompt builder args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PromptArgs {
    /// Mode whose prompt is the base
    pub slug: String,
    /// Enable a feature by id (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,
    /// Disable a feature by id (repeatable)
    #[arg(long = "disable")]
    pub disabled: Vec<String>,
    /// Start with no features instead of the mode's defaults
    #[arg(long)]
    pub no_defaults: bool,
    /// Additional instructions appended at the end
    #[arg(long)]
    pub custom: Option<String>,
}

#[derive(Args)]
pub struct FeatureCmd {
    #[command(subcommand)]
    pub action: FeatureAction,
}

#[derive(Subcommand)]
pub enum FeatureAction {
    /// List built-in and custom features
    List {
        /// Mark the defaults for this mode
        #[arg(long)]
        mode: Option<String>,
    },
    /// Add a custom feature
    New {
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "custom")]
        category: String,
    },
    /// Change a custom feature
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a custom feature
    Delete { id: String },
    /// Move a custom feature to a position (0-based)
    Move { id: String, index: usize },
}

// ---------------------------------------------------------------------------
// Global config / config.toml args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GlobalCmd {
    #[command(subcommand)]
    pub action: GlobalAction,
}

#[derive(Subcommand)]
pub enum GlobalAction {
    /// Print the shared instructions
    Show,
    /// Replace the shared instructions
    Set { text: String },
    /// Remove the shared instructions
    Clear,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a key, e.g. `analysis.min_word_length 5`
    Set { key: String, value: String },
    /// Edit the analysis exclusion list
    Exclude {
        #[command(subcommand)]
        action: ExcludeAction,
    },
}

#[derive(Subcommand)]
pub enum ExcludeAction {
    /// Add a word
    Add { word: String },
    /// Remove a word
    Rm { word: String },
}

// ---------------------------------------------------------------------------
// Maintenance args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm the reset
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_family_strategy() {
        let cli = Cli::try_parse_from([
            "mk",
            "import",
            "modes.yaml",
            "--strategy",
            "family",
            "--family-name",
            "Team",
        ])
        .unwrap();
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.strategy, StrategyArg::Family);
                assert_eq!(args.family_name.as_deref(), Some("Team"));
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_family_strategy_requires_name() {
        assert!(Cli::try_parse_from(["mk", "import", "m.json", "--strategy", "family"]).is_err());
    }

    #[test]
    fn test_analyze_negative_thresholds() {
        let cli = Cli::try_parse_from(["mk", "analyze", "--min-length", "-1"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => assert_eq!(args.min_length, Some(-1)),
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mk", "list", "--json", "-C", "/tmp/x"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.store_dir.as_deref(), Some("/tmp/x"));
    }
}
