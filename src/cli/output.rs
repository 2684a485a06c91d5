use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};
use serde::Serialize;

use crate::model::family::ModeFamily;
use crate::model::feature::{CustomFeature, FeatureDefinition};
use crate::model::mode::Mode;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::conflict::SlugRename;
use crate::ops::import::ImportOutcome;
use crate::ops::redundancy::{HighlightSpan, RedundancyAnalysis};
use crate::ops::search::SearchHit;
use crate::ops::tokens::{estimate_tokens, format_token_count};
use crate::util::unicode::{first_line, pad_to_width};

const NAME_WIDTH: usize = 28;
const SLUG_WIDTH: usize = 22;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ModeSummaryJson {
    pub slug: String,
    pub name: String,
    pub family: String,
    pub description: String,
    pub prompt_tokens: usize,
}

#[derive(Serialize)]
pub struct FamilyJson {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub builtin: bool,
    pub selected: bool,
    pub modes: usize,
}

#[derive(Serialize)]
pub struct ImportJson {
    pub imported: Vec<String>,
    pub renames: Vec<SlugRename>,
    pub replaced: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_family: Option<String>,
}

#[derive(Serialize)]
pub struct AnalysisJson<'a> {
    pub blocks: usize,
    pub stats: &'a crate::ops::redundancy::RedundancyStats,
    pub words: Vec<&'a crate::ops::redundancy::WordOccurrence>,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub slug: String,
    pub family: String,
    pub field: String,
    /// Byte ranges as `[start, end]`
    pub spans: Vec<[usize; 2]>,
}

#[derive(Serialize)]
pub struct FeatureJson {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

#[derive(Serialize)]
pub struct PromptJson {
    pub mode: String,
    pub features: Vec<String>,
    pub prompt: String,
    pub tokens: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn mode_to_summary(mode: &Mode) -> ModeSummaryJson {
    ModeSummaryJson {
        slug: mode.slug.clone(),
        name: mode.name.clone(),
        family: mode.family_id().to_string(),
        description: mode.description.clone(),
        prompt_tokens: estimate_tokens(&mode.prompt),
    }
}

pub fn family_to_json(family: &ModeFamily, selected: bool, modes: usize) -> FamilyJson {
    FamilyJson {
        id: family.id.clone(),
        name: family.name.clone(),
        description: family.description.clone(),
        color: family.color.clone(),
        builtin: ModeFamily::is_protected(&family.id),
        selected,
        modes,
    }
}

pub fn import_to_json(outcome: &ImportOutcome) -> ImportJson {
    ImportJson {
        imported: outcome.imported.clone(),
        renames: outcome.renames.clone(),
        replaced: outcome.replaced.len(),
        created_family: outcome.created_family.clone(),
    }
}

pub fn analysis_to_json(analysis: &RedundancyAnalysis) -> AnalysisJson<'_> {
    AnalysisJson {
        blocks: analysis.block_count,
        stats: &analysis.stats,
        words: analysis.occurrences.values().collect(),
    }
}

pub fn search_hit_to_json(hit: &SearchHit) -> SearchHitJson {
    SearchHitJson {
        slug: hit.slug.clone(),
        family: hit.family.clone(),
        field: hit.field.to_string(),
        spans: hit.spans.iter().map(|r| [r.start, r.end]).collect(),
    }
}

pub fn builtin_feature_to_json(feature: &FeatureDefinition, default: Option<bool>) -> FeatureJson {
    FeatureJson {
        id: feature.id.clone(),
        name: feature.name.clone(),
        description: feature.description.clone(),
        category: feature.category.clone(),
        custom: false,
        default,
    }
}

pub fn custom_feature_to_json(feature: &CustomFeature) -> FeatureJson {
    FeatureJson {
        id: feature.id.clone(),
        name: feature.name.clone(),
        description: feature.description.clone(),
        category: feature.category.clone(),
        custom: true,
        default: None,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One-line summary used by `mk list`
pub fn format_mode_line(mode: &Mode) -> String {
    format!(
        "{} {} [{}] {}",
        pad_to_width(&mode.slug, SLUG_WIDTH),
        pad_to_width(&mode.name, NAME_WIDTH),
        mode.family_id(),
        format_token_count(estimate_tokens(&mode.prompt)),
    )
}

fn push_block(lines: &mut Vec<String>, label: &str, text: &str) {
    lines.push(format!("{}:", label));
    for line in text.lines() {
        lines.push(format!("  {}", line));
    }
}

/// Detailed view used by `mk show`
pub fn format_mode_detail(mode: &Mode) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", mode.name, mode.slug),
        format!("family: {}", mode.family_id()),
        format!("description: {}", mode.description),
    ];
    push_block(&mut lines, "usage", &mode.usage);
    push_block(
        &mut lines,
        &format!("prompt ({})", format_token_count(estimate_tokens(&mode.prompt))),
        &mode.prompt,
    );
    lines
}

pub fn format_family_line(family: &ModeFamily, selected: bool, modes: usize) -> String {
    let mark = if selected { '*' } else { ' ' };
    let builtin = if ModeFamily::is_protected(&family.id) {
        " (built-in)"
    } else {
        ""
    };
    let mut line = format!(
        "{} {} {} {} modes{}",
        mark,
        pad_to_width(&family.id, SLUG_WIDTH),
        pad_to_width(&family.name, NAME_WIDTH),
        modes,
        builtin
    );
    if !family.description.is_empty() {
        let _ = write!(line, "  {}", first_line(&family.description));
    }
    line
}

pub fn format_import_summary(outcome: &ImportOutcome) -> Vec<String> {
    let mut lines = vec![format!("imported {} modes", outcome.imported.len())];
    if let Some(family) = &outcome.created_family {
        lines.push(format!("created family \"{}\"", family));
    }
    if !outcome.replaced.is_empty() {
        lines.push(format!(
            "replaced {} existing modes (see `mk recovery`)",
            outcome.replaced.len()
        ));
    }
    for rename in &outcome.renames {
        lines.push(format!("  renamed {} -> {}", rename.original, rename.renamed));
    }
    lines
}

/// Word table and summary used by `mk analyze`
pub fn format_analysis(analysis: &RedundancyAnalysis) -> Vec<String> {
    let stats = &analysis.stats;
    let mut lines = vec![format!(
        "{} blocks, {} repeated words, {} occurrences ({:.1}% redundancy)",
        analysis.block_count, stats.redundant_words, stats.total_words, stats.redundancy_percentage
    )];
    if stats.most_frequent.is_empty() {
        return lines;
    }
    lines.push(String::new());
    lines.push(format!("{} {:>5} {:>6}  in", pad_to_width("word", SLUG_WIDTH), "count", "blocks"));
    for top in &stats.most_frequent {
        if let Some(occ) = analysis.occurrences.get(&top.word) {
            let blocks: Vec<&str> = occ.blocks.iter().map(String::as_str).collect();
            lines.push(format!(
                "{} {:>5} {:>6}  {}",
                pad_to_width(&occ.word, SLUG_WIDTH),
                occ.frequency,
                occ.blocks.len(),
                blocks.join(", ")
            ));
        }
    }
    lines
}

pub fn format_search_hit(hit: &SearchHit, mode: &Mode) -> String {
    let text = mode.field(hit.field);
    let snippet = hit
        .spans
        .first()
        .map(|span| snippet_around(text, span.start, span.end))
        .unwrap_or_default();
    format!("[{}] {} ({}): {}", hit.family, hit.slug, hit.field, snippet)
}

/// The line of `text` containing `start..end`.
fn snippet_around(text: &str, start: usize, end: usize) -> String {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    text[line_start..line_end].trim().to_string()
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            lines.push(match err {
                CheckError::DuplicateSlug { slug, count } => {
                    format!("  slug \"{}\" is used by {} modes", slug, count)
                }
                CheckError::InvalidSlug { slug } => format!("  invalid slug \"{}\"", slug),
                CheckError::MissingField { slug, field } => {
                    format!("  {} has an empty {}", slug, field)
                }
                CheckError::UnknownFamily { slug, family } => {
                    format!("  {} refers to unknown family \"{}\"", slug, family)
                }
            });
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warn in &result.warnings {
            lines.push(match warn {
                CheckWarning::UnknownSelectedFamily { family } => {
                    format!("  selected family \"{}\" does not exist", family)
                }
                CheckWarning::DuplicateFamily { family } => {
                    format!("  family \"{}\" is defined more than once", family)
                }
                CheckWarning::EmptyFamily { family } => {
                    format!("  family \"{}\" has no modes", family)
                }
            });
        }
    }
    lines.push(if result.valid {
        "✓ store is valid".to_string()
    } else {
        "✗ store has errors".to_string()
    });
    lines
}

// ---------------------------------------------------------------------------
// Highlighting
// ---------------------------------------------------------------------------

/// Background ramp for highlighted words, weakest first.
const HIGHLIGHT_RAMP: [(u8, u8, u8); 5] = [
    (254, 249, 195),
    (254, 240, 138),
    (253, 224, 71),
    (250, 204, 21),
    (234, 179, 8),
];

/// Ramp step for a strength in [0, 1]: `floor(intensity * 400) + 100`
/// bucketed by hundreds.
pub fn highlight_level(intensity: f64) -> usize {
    let level = (intensity.clamp(0.0, 1.0) * 400.0).floor() as usize + 100;
    (level / 100 - 1).min(HIGHLIGHT_RAMP.len() - 1)
}

/// Render `text` with every span on a coloured background. With `color`
/// off, spans are wrapped in `[[ ]]` instead.
pub fn render_highlighted(text: &str, spans: &[HighlightSpan], color: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.range.start]);
        let word = &text[span.range.clone()];
        if color {
            let (r, g, b) = HIGHLIGHT_RAMP[highlight_level(span.intensity)];
            let _ = write!(out, "{}", word.on(Color::Rgb { r, g, b }).with(Color::Black));
        } else {
            let _ = write!(out, "[[{}]]", word);
        }
        last = span.range.end;
    }
    out.push_str(&text[last..]);
    out
}
