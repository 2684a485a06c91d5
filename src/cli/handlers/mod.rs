mod init;
pub use init::cmd_init;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

/// Global override for the store directory (set by -C flag)
static STORE_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::format::{self, FormatError};
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::recovery;
use crate::io::store_io::{self, StoreError};
use crate::model::config::StoreConfig;
use crate::model::mode::{FormatType, Mode, ModeField};
use crate::model::store::{ModeStore, Store};
use crate::ops::family_ops::{self, FamilyError, FamilyUpdate};
use crate::ops::import::{self, ImportStrategy};
use crate::ops::mode_ops::{self, ModeError, ModeUpdate};
use crate::ops::prompt::{self, FeatureSelection, FeatureUpdate};
use crate::ops::redundancy::{self, RedundancyConfig, TextBlock};
use crate::ops::tokens::{estimate_tokens, format_token_count};
use crate::ops::{check, export, search};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Init creates the -C directory itself, so it runs before resolving it
    if let Commands::Init(args) = cli.command {
        return cmd_init(args, cli.store_dir.as_deref(), json);
    }

    // Store -C override for load_store_cwd()
    if let Some(ref dir) = cli.store_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = STORE_DIR_OVERRIDE.set(abs);
    }

    match cli.command {
        Commands::Init(_) => Ok(()),

        // Read commands
        Commands::List(args) => cmd_list(args, json),
        Commands::Show(args) => cmd_show(args, json),
        Commands::Search(args) => cmd_search(args, json),
        Commands::Analyze(args) => cmd_analyze(args, json),
        Commands::Prompt(args) => cmd_prompt(args, json),
        Commands::Export(args) => cmd_export(args),
        Commands::Check => cmd_check(json),

        // Write commands
        Commands::New(args) => cmd_new(args),
        Commands::Edit(args) => cmd_edit(args),
        Commands::Delete(args) => cmd_delete(args),
        Commands::Import(args) => cmd_import(args, json),

        // Families, features, shared instructions
        Commands::Family(args) => cmd_family(args, json),
        Commands::Feature(args) => cmd_feature(args, json),
        Commands::Global(args) => cmd_global(args, json),

        // Maintenance
        Commands::Config(args) => cmd_config(args, json),
        Commands::Reset(args) => cmd_reset(args),
        Commands::Recovery(args) => cmd_recovery(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start_dir() -> Result<PathBuf, StoreError> {
    match STORE_DIR_OVERRIDE.get() {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Path to the `modekit/` directory of the store containing the start dir.
fn store_dir_cwd() -> Result<PathBuf, StoreError> {
    let root = store_io::discover_store(&start_dir()?)?;
    Ok(root.join(store_io::STORE_DIR))
}

fn load_store_cwd() -> Result<Store, StoreError> {
    let root = store_io::discover_store(&start_dir()?)?;
    store_io::load_store(&root)
}

/// Lock the store, then load it. The state is read under the lock so a
/// concurrent writer cannot be overwritten; the lock lives as long as the
/// returned guard.
fn load_store_locked() -> Result<(Store, FileLock), Box<dyn std::error::Error>> {
    let root = store_io::discover_store(&start_dir()?)?;
    let lock = FileLock::acquire_default(&root.join(store_io::STORE_DIR))?;
    let store = store_io::load_store(&root)?;
    Ok((store, lock))
}

fn save(store: &Store) -> Result<(), StoreError> {
    store_io::save_store(&store.store_dir, &store.state)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_text_file(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|e| format!("could not read {}: {}", path, e).into())
}

fn find_mode<'a>(state: &'a ModeStore, slug: &str) -> Result<&'a Mode, ModeError> {
    mode_ops::find_mode(state, slug).ok_or_else(|| ModeError::NotFound(slug.to_string()))
}

fn require_family(state: &ModeStore, id: &str) -> Result<(), FamilyError> {
    match state.family(id) {
        Some(_) => Ok(()),
        None => Err(FamilyError::NotFound(id.to_string())),
    }
}

/// Prompt text from `--prompt` or `--prompt-file`.
fn prompt_arg(
    prompt: Option<String>,
    prompt_file: Option<String>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match (prompt, prompt_file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => Ok(Some(read_text_file(&path)?)),
        (None, None) => Ok(None),
    }
}

/// Write `content` to stdout, to a file, or into a directory under
/// `default_name`.
fn write_output(
    out: Option<&str>,
    content: &str,
    default_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(out) = out else {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
        return Ok(());
    };
    let mut path = PathBuf::from(out);
    if path.is_dir() {
        path = path.join(default_name);
    }
    recovery::atomic_write(&path, content.as_bytes())
        .map_err(|e| format!("could not write {}: {}", path.display(), e))?;
    println!("wrote {}", path.display());
    Ok(())
}

/// Parse an ISO-8601 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}' (expected ISO-8601, e.g. 2024-05-01)", s).into())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let state = &store.state;

    let modes: Vec<&Mode> = if let Some(ref family) = args.family {
        require_family(state, family)?;
        mode_ops::modes_in_family(state, family)
    } else if args.all {
        state.modes.iter().collect()
    } else {
        mode_ops::visible_modes(state)
    };

    if json {
        let out: Vec<ModeSummaryJson> = modes.iter().map(|m| mode_to_summary(m)).collect();
        return print_json(&out);
    }
    for mode in modes {
        println!("{}", format_mode_line(mode));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let mode = find_mode(&store.state, &args.slug)?;

    if json {
        return print_json(mode);
    }
    for line in format_mode_detail(mode) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let re = Regex::new(&args.pattern).map_err(|e| format!("invalid pattern: {}", e))?;
    if let Some(ref family) = args.family {
        require_family(&store.state, family)?;
    }

    let hits = search::search_modes(&store.state, &re, args.family.as_deref());

    if json {
        let out: Vec<SearchHitJson> = hits.iter().map(search_hit_to_json).collect();
        return print_json(&out);
    }
    for hit in &hits {
        if let Some(mode) = mode_ops::find_mode(&store.state, &hit.slug) {
            println!("{}", format_search_hit(hit, mode));
        }
    }
    Ok(())
}

fn cmd_analyze(args: AnalyzeArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let state = &store.state;

    let field = ModeField::parse_field(&args.field).ok_or_else(|| {
        format!(
            "unknown field '{}' (expected: name, description, usage, prompt)",
            args.field
        )
    })?;

    let modes: Vec<&Mode> = if !args.slugs.is_empty() {
        args.slugs
            .iter()
            .map(|slug| find_mode(state, slug))
            .collect::<Result<_, _>>()?
    } else if let Some(ref family) = args.family {
        require_family(state, family)?;
        mode_ops::modes_in_family(state, family)
    } else {
        mode_ops::visible_modes(state)
    };

    // Command-line flags override config.toml
    let defaults = &store.config.analysis;
    let case_sensitive = match (args.case_sensitive, args.case_insensitive) {
        (true, _) => true,
        (_, true) => false,
        _ => defaults.case_sensitive,
    };
    let config = RedundancyConfig::clamped(
        args.min_length.unwrap_or(defaults.min_word_length),
        args.min_frequency.unwrap_or(defaults.min_frequency),
        case_sensitive,
        defaults.exclude.iter().chain(&args.exclude).cloned(),
    );

    let blocks: Vec<TextBlock> = modes
        .iter()
        .map(|m| TextBlock::new(m.slug.as_str(), m.field(field)))
        .collect();
    let analysis = redundancy::analyze(&blocks, &config);

    if json {
        return print_json(&analysis_to_json(&analysis));
    }
    for line in format_analysis(&analysis) {
        println!("{}", line);
    }

    if args.highlight {
        let color = std::io::stdout().is_terminal();
        let only = args.only.as_deref();
        for block in &blocks {
            let spans: Vec<_> = redundancy::highlight_spans(&block.content, &analysis, &config)
                .into_iter()
                .filter(|span| match only {
                    Some(word) if config.case_sensitive => span.word == word,
                    Some(word) => span.word.to_lowercase() == word.to_lowercase(),
                    None => true,
                })
                .collect();
            println!();
            println!("== {} ==", block.id);
            println!("{}", render_highlighted(&block.content, &spans, color));
        }
    }
    Ok(())
}

fn cmd_prompt(args: PromptArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let mode = find_mode(&store.state, &args.slug)?;
    let catalog = prompt::builtin_catalog()?;

    let selection = FeatureSelection {
        use_defaults: !args.no_defaults,
        enable: args.features,
        disable: args.disabled,
    };
    let features =
        prompt::resolve_features(&catalog, &store.state.custom_features, &mode.slug, &selection)?;
    let text = prompt::generate_prompt(&mode.prompt, &features, args.custom.as_deref().unwrap_or(""));
    let tokens = estimate_tokens(&text);

    if json {
        return print_json(&PromptJson {
            mode: mode.slug.clone(),
            features: features.iter().map(|f| f.id.clone()).collect(),
            prompt: text,
            tokens,
        });
    }
    println!("{}", text);
    // Keep stdout pipeable
    eprintln!("{}", format_token_count(tokens));
    Ok(())
}

fn cmd_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let state = &store.state;

    let format = match args.format {
        Some(ref f) => {
            FormatType::parse_format(f).ok_or_else(|| FormatError::UnsupportedFormat(f.clone()))?
        }
        None => args
            .out
            .as_deref()
            .and_then(|out| format::detect_file_format(Path::new(out)))
            .unwrap_or(store.config.export.format),
    };
    let groups = &store.config.export.groups;

    let data = if args.all {
        let slugs: Vec<String> = state.modes.iter().map(|m| m.slug.clone()).collect();
        export::export_selected(state, &slugs, groups)?
    } else if args.slugs.is_empty() {
        export::export_custom(state, groups)?
    } else {
        export::export_selected(state, &args.slugs, groups)?
    };

    let text = format::serialize_export(&data, format)?;
    write_output(
        args.out.as_deref(),
        &text,
        &export::export_file_name(format.extension()),
    )
}

fn cmd_check(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let result = check::check_store(&store.state);

    if json {
        print_json(&result)?;
    } else {
        for line in format_check(&result) {
            println!("{}", line);
        }
    }
    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mode write handlers
// ---------------------------------------------------------------------------

fn cmd_new(args: NewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let prompt = prompt_arg(args.prompt, args.prompt_file)?
        .ok_or("a prompt is required (--prompt or --prompt-file)")?;
    let (mut store, _lock) = load_store_locked()?;

    let mode = Mode {
        slug: args.slug.clone(),
        name: args.name,
        description: args.description,
        usage: args.usage,
        prompt,
        family: args.family,
    };
    mode_ops::add_mode(&mut store.state, mode)?;
    save(&store)?;

    println!("{}", args.slug);
    Ok(())
}

fn cmd_edit(args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let update = ModeUpdate {
        slug: args.new_slug,
        name: args.name,
        description: args.description,
        usage: args.usage,
        prompt: prompt_arg(args.prompt, args.prompt_file)?,
        family: args.family,
    };
    if update.is_empty() {
        return Err("nothing to change (pass --slug, --name, --description, --usage, --prompt or --family)".into());
    }

    let (mut store, _lock) = load_store_locked()?;
    let slug = mode_ops::update_mode(&mut store.state, &args.slug, update)?;
    save(&store)?;

    println!("{}", slug);
    Ok(())
}

fn cmd_delete(args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut store, _lock) = load_store_locked()?;

    let mut deleted = Vec::with_capacity(args.slugs.len());
    for slug in &args.slugs {
        deleted.push(mode_ops::delete_mode(&mut store.state, slug)?);
    }
    save(&store)?;

    for mode in &deleted {
        recovery::log_mode_deletion(&store.store_dir, mode);
        println!("deleted {}", mode.slug);
    }
    Ok(())
}

fn cmd_import(args: ImportArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let format = format::detect_file_format(Path::new(&args.file))
        .ok_or_else(|| FormatError::UnsupportedFormat(args.file.clone()))?;
    let text = read_text_file(&args.file)?;
    let modes = format::parse_import(&text, format)?;

    let strategy = match args.strategy {
        StrategyArg::Replace => ImportStrategy::Replace,
        StrategyArg::Add => ImportStrategy::Add,
        StrategyArg::Family => ImportStrategy::Family(args.family_name.unwrap_or_default()),
    };

    let (mut store, _lock) = load_store_locked()?;
    let outcome = import::import_modes(&mut store.state, modes, strategy)?;

    if !args.dry_run {
        save(&store)?;
        recovery::log_replaced_modes(&store.store_dir, "import", &outcome.replaced);
        recovery::log_import_renames(&store.store_dir, &args.file, &outcome.renames);
    }

    if json {
        return print_json(&import_to_json(&outcome));
    }
    if args.dry_run {
        println!("dry run, nothing written");
    }
    for line in format_import_summary(&outcome) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Family handlers
// ---------------------------------------------------------------------------

fn cmd_family(args: FamilyCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        FamilyAction::List => cmd_family_list(json),
        FamilyAction::New {
            name,
            description,
            color,
        } => {
            let (mut store, _lock) = load_store_locked()?;
            let id = family_ops::create_family(&mut store.state, &name, &description, color)?;
            save(&store)?;
            println!("{}", id);
            Ok(())
        }
        FamilyAction::Edit {
            id,
            name,
            description,
            color,
        } => {
            if name.is_none() && description.is_none() && color.is_none() {
                return Err("nothing to change (pass --name, --description or --color)".into());
            }
            let (mut store, _lock) = load_store_locked()?;
            let update = FamilyUpdate {
                name,
                description,
                color,
            };
            family_ops::update_family(&mut store.state, &id, update)?;
            save(&store)?;
            println!("{}", id);
            Ok(())
        }
        FamilyAction::Delete { id } => {
            let (mut store, _lock) = load_store_locked()?;
            let moved = family_ops::delete_family(&mut store.state, &id)?;
            save(&store)?;
            println!("deleted family {} ({} modes moved to standalone)", id, moved);
            Ok(())
        }
        FamilyAction::Select { ids } => {
            let (mut store, _lock) = load_store_locked()?;
            family_ops::select_families(&mut store.state, &ids)?;
            save(&store)?;
            println!("selected: {}", store.state.selected_families.join(", "));
            Ok(())
        }
        FamilyAction::Export { id, out } => {
            let store = load_store_cwd()?;
            let bundle = export::export_family(&store.state, &id)?;
            let text = format::serialize_family_bundle(&bundle)?;
            write_output(out.as_deref(), &text, &format!("{}-family.json", id))
        }
        FamilyAction::Import { file, name } => {
            let text = read_text_file(&file)?;
            let bundle = format::parse_family_bundle(&text)?;
            let (mut store, _lock) = load_store_locked()?;
            let outcome = import::import_family_bundle(&mut store.state, bundle, name.as_deref())?;
            save(&store)?;
            recovery::log_import_renames(&store.store_dir, &file, &outcome.renames);

            if json {
                return print_json(&import_to_json(&outcome));
            }
            for line in format_import_summary(&outcome) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn cmd_family_list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let state = &store.state;

    let rows: Vec<_> = state
        .families
        .iter()
        .map(|family| {
            let selected = state.selected_families.contains(&family.id);
            let modes = mode_ops::modes_in_family(state, &family.id).len();
            (family, selected, modes)
        })
        .collect();

    if json {
        let out: Vec<FamilyJson> = rows
            .iter()
            .map(|(family, selected, modes)| family_to_json(family, *selected, *modes))
            .collect();
        return print_json(&out);
    }
    for (family, selected, modes) in rows {
        println!("{}", format_family_line(family, selected, modes));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Feature handlers
// ---------------------------------------------------------------------------

fn cmd_feature(args: FeatureCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        FeatureAction::List { mode } => cmd_feature_list(mode, json),
        FeatureAction::New {
            name,
            description,
            category,
        } => {
            let (mut store, _lock) = load_store_locked()?;
            let id = prompt::add_custom_feature(&mut store.state, &name, &description, &category)?;
            save(&store)?;
            println!("{}", id);
            Ok(())
        }
        FeatureAction::Edit {
            id,
            name,
            description,
            category,
        } => {
            if name.is_none() && description.is_none() && category.is_none() {
                return Err("nothing to change (pass --name, --description or --category)".into());
            }
            let (mut store, _lock) = load_store_locked()?;
            let update = FeatureUpdate {
                name,
                description,
                category,
            };
            prompt::update_custom_feature(&mut store.state, &id, update)?;
            save(&store)?;
            println!("{}", id);
            Ok(())
        }
        FeatureAction::Delete { id } => {
            let (mut store, _lock) = load_store_locked()?;
            let removed = prompt::delete_custom_feature(&mut store.state, &id)?;
            save(&store)?;
            println!("deleted feature {}", removed.id);
            Ok(())
        }
        FeatureAction::Move { id, index } => {
            let (mut store, _lock) = load_store_locked()?;
            prompt::move_custom_feature(&mut store.state, &id, index)?;
            save(&store)?;
            println!("{}", id);
            Ok(())
        }
    }
}

fn cmd_feature_list(mode: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_cwd()?;
    let catalog = prompt::builtin_catalog()?;
    let defaults = match mode {
        Some(ref slug) => {
            find_mode(&store.state, slug)?;
            Some(prompt::default_features_for_mode(&catalog, slug))
        }
        None => None,
    };
    let is_default = |id: &str| {
        defaults
            .as_ref()
            .map(|d| d.get(id).copied().unwrap_or(false))
    };

    if json {
        let mut out: Vec<FeatureJson> = catalog
            .features
            .iter()
            .map(|f| builtin_feature_to_json(f, is_default(&f.id)))
            .collect();
        out.extend(store.state.custom_features.iter().map(custom_feature_to_json));
        return print_json(&out);
    }

    for category in &catalog.categories {
        println!("{}:", category.name);
        for feature in catalog.features.iter().filter(|f| f.category == category.id) {
            let mark = if is_default(&feature.id) == Some(true) { "*" } else { " " };
            println!("  {} {}  {}", mark, pad_to_id_width(&feature.id), feature.name);
        }
    }
    if !store.state.custom_features.is_empty() {
        println!("Custom:");
        for feature in &store.state.custom_features {
            println!(
                "    {}  {} [{}]",
                pad_to_id_width(&feature.id),
                feature.name,
                feature.category
            );
        }
    }
    Ok(())
}

fn pad_to_id_width(id: &str) -> String {
    crate::util::unicode::pad_to_width(id, 24)
}

// ---------------------------------------------------------------------------
// Shared instructions and config.toml
// ---------------------------------------------------------------------------

fn cmd_global(args: GlobalCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        GlobalAction::Show => {
            let store = load_store_cwd()?;
            if json {
                return print_json(&store.state.global_config);
            }
            if !store.state.global_config.for_all_modes.is_empty() {
                println!("{}", store.state.global_config.for_all_modes);
            }
            Ok(())
        }
        GlobalAction::Set { text } => {
            let (mut store, _lock) = load_store_locked()?;
            store.state.global_config.for_all_modes = text;
            save(&store)?;
            Ok(())
        }
        GlobalAction::Clear => {
            let (mut store, _lock) = load_store_locked()?;
            store.state.global_config.for_all_modes.clear();
            save(&store)?;
            Ok(())
        }
    }
}

fn cmd_config(args: ConfigCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store_dir = store_dir_cwd()?;

    match args.action {
        ConfigAction::Show => {
            let (config, _) = config_io::read_config(&store_dir)?;
            if json {
                return print_json(&config);
            }
            print!("{}", toml::to_string(&config)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let _lock = FileLock::acquire_default(&store_dir)?;
            let (_, mut doc) = config_io::read_config(&store_dir)?;
            config_io::set_value(&mut doc, &key, &value)?;
            // Refuse to write a document that no longer parses
            toml::from_str::<StoreConfig>(&doc.to_string())?;
            config_io::write_config(&store_dir, &doc)?;
            println!("{} = {}", key, value);
            Ok(())
        }
        ConfigAction::Exclude { action } => {
            let _lock = FileLock::acquire_default(&store_dir)?;
            let (_, mut doc) = config_io::read_config(&store_dir)?;
            let (changed, message) = match action {
                ExcludeAction::Add { ref word } => (
                    config_io::add_exclude(&mut doc, word),
                    format!("excluding \"{}\"", word),
                ),
                ExcludeAction::Rm { ref word } => (
                    config_io::remove_exclude(&mut doc, word),
                    format!("no longer excluding \"{}\"", word),
                ),
            };
            if changed {
                config_io::write_config(&store_dir, &doc)?;
                println!("{}", message);
            } else {
                println!("unchanged");
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Maintenance handlers
// ---------------------------------------------------------------------------

fn cmd_reset(args: ResetArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.yes {
        return Err("reset discards every mode, family and feature; pass --yes to confirm".into());
    }
    let (mut store, _lock) = load_store_locked()?;
    let previous = std::mem::take(&mut store.state);
    save(&store)?;

    recovery::log_replaced_modes(&store.store_dir, "reset", &previous.modes);
    println!(
        "reset store ({} modes kept in the recovery log)",
        previous.modes.len()
    );
    Ok(())
}

fn cmd_recovery(args: RecoveryCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store_dir = store_dir_cwd()?;

    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(&store_dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = prune.before.as_deref().map(parse_timestamp).transpose()?;
            let removed = recovery::prune_recovery(&store_dir, before, prune.all)?;
            println!("pruned {} entries", removed);
            Ok(())
        }
        None => {
            let since = args.since.as_deref().map(parse_timestamp).transpose()?;
            let entries =
                recovery::read_recovery_entries(&store_dir, Some(args.limit.unwrap_or(10)), since);
            if json {
                let out: Vec<_> = entries.iter().map(|e| e.to_json()).collect();
                return print_json(&out);
            }
            if entries.is_empty() {
                println!("recovery log is empty");
            }
            for entry in &entries {
                print!("{}", entry.to_display_markdown());
            }
            Ok(())
        }
    }
}
