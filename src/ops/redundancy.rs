//! Cross-block word frequency analysis.
//!
//! Surfaces words that recur across several text blocks (usually the prompts
//! of a set of modes) so duplicated phrasing is easy to spot.

use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::config::AnalysisConfig;

/// Common English function words that are never reported.
pub const COMMON_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can",
    "this", "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him",
    "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "what", "which", "who", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "as", "if", "then", "else", "while", "because", "although", "though", "after", "before",
    "once", "since", "until", "whether",
    "about", "above", "across", "against", "along", "among", "around", "behind", "below",
    "beneath", "beside", "between", "beyond", "down", "during", "except", "from", "inside",
    "into", "like", "near", "off", "onto", "out", "outside", "over", "past", "through", "under",
    "up", "upon", "within", "without",
];

/// Number of entries in `RedundancyStats::most_frequent`.
const TOP_WORDS: usize = 10;

/// Tuning knobs for an analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedundancyConfig {
    /// Shortest token considered, in characters (≥ 1)
    pub min_word_length: usize,
    /// Fewest total occurrences for a word to be reported (≥ 1)
    pub min_frequency: usize,
    pub case_sensitive: bool,
    /// Words ignored on top of `COMMON_WORDS`
    pub exclude_words: HashSet<String>,
}

impl Default for RedundancyConfig {
    fn default() -> Self {
        RedundancyConfig {
            min_word_length: 4,
            min_frequency: 2,
            case_sensitive: false,
            exclude_words: HashSet::new(),
        }
    }
}

impl RedundancyConfig {
    /// Build a config from possibly out-of-range values, clamping both
    /// minimums to at least 1.
    pub fn clamped(
        min_word_length: i64,
        min_frequency: i64,
        case_sensitive: bool,
        exclude_words: impl IntoIterator<Item = String>,
    ) -> Self {
        RedundancyConfig {
            min_word_length: clamp_minimum(min_word_length),
            min_frequency: clamp_minimum(min_frequency),
            case_sensitive,
            exclude_words: exclude_words.into_iter().collect(),
        }
    }

    fn normalize<'a>(&self, token: &'a str) -> Cow<'a, str> {
        if self.case_sensitive {
            Cow::Borrowed(token)
        } else {
            Cow::Owned(token.to_lowercase())
        }
    }
}

impl From<&AnalysisConfig> for RedundancyConfig {
    fn from(config: &AnalysisConfig) -> Self {
        RedundancyConfig::clamped(
            config.min_word_length,
            config.min_frequency,
            config.case_sensitive,
            config.exclude.iter().cloned(),
        )
    }
}

fn clamp_minimum(value: i64) -> usize {
    usize::try_from(value.max(1)).unwrap_or(usize::MAX)
}

/// One named unit of text to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub id: String,
    pub content: String,
}

impl TextBlock {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        TextBlock {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// A reported word
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordOccurrence {
    pub word: String,
    /// Total occurrences across all blocks
    pub frequency: usize,
    /// Ids of the blocks containing the word, in first-seen order
    pub blocks: IndexSet<String>,
    /// Share of all blocks that contain the word, in [0, 1]
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub frequency: usize,
}

/// Summary of an analysis run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RedundancyStats {
    /// Sum of the frequencies of all reported words
    pub total_words: usize,
    /// Number of distinct reported words
    pub redundant_words: usize,
    /// `redundant_words / total_words * 100`, or 0 when nothing was reported
    pub redundancy_percentage: f64,
    pub most_frequent: Vec<WordCount>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RedundancyAnalysis {
    /// Reported words in first-encountered order
    pub occurrences: IndexMap<String, WordOccurrence>,
    pub stats: RedundancyStats,
    /// Number of blocks that were analyzed
    pub block_count: usize,
}

/// Byte ranges of the maximal runs of alphanumeric or `_` characters.
pub fn tokenize(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        let is_word = c.is_alphanumeric() || c == '_';
        match (is_word, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}

struct WordFilter<'a> {
    config: &'a RedundancyConfig,
    stop_words: HashSet<&'static str>,
    exclude: HashSet<String>,
}

impl<'a> WordFilter<'a> {
    fn new(config: &'a RedundancyConfig) -> Self {
        let exclude = config
            .exclude_words
            .iter()
            .map(|w| config.normalize(w).into_owned())
            .collect();
        WordFilter {
            config,
            stop_words: COMMON_WORDS.iter().copied().collect(),
            exclude,
        }
    }

    /// The normalized word if it passes every filter.
    fn accept(&self, token: &str) -> Option<String> {
        let word = self.config.normalize(token);
        if word.chars().count() < self.config.min_word_length.max(1) {
            return None;
        }
        let lower = if self.config.case_sensitive {
            word.to_lowercase()
        } else {
            word.to_string()
        };
        if self.stop_words.contains(lower.as_str()) || self.exclude.contains(word.as_ref()) {
            return None;
        }
        Some(word.into_owned())
    }
}

/// Count words across `blocks` and report those occurring at least
/// `min_frequency` times in total.
pub fn analyze(blocks: &[TextBlock], config: &RedundancyConfig) -> RedundancyAnalysis {
    let filter = WordFilter::new(config);
    let mut counts: IndexMap<String, WordOccurrence> = IndexMap::new();

    for block in blocks {
        for span in tokenize(&block.content) {
            let Some(word) = filter.accept(&block.content[span]) else {
                continue;
            };
            let entry = counts.entry(word).or_insert_with_key(|w| WordOccurrence {
                word: w.clone(),
                frequency: 0,
                blocks: IndexSet::new(),
                intensity: 0.0,
            });
            entry.frequency += 1;
            if !entry.blocks.contains(&block.id) {
                entry.blocks.insert(block.id.clone());
            }
        }
    }

    let min_frequency = config.min_frequency.max(1);
    let total_blocks = blocks.len();
    let occurrences: IndexMap<String, WordOccurrence> = counts
        .into_iter()
        .filter(|(_, occ)| occ.frequency >= min_frequency)
        .map(|(word, mut occ)| {
            occ.intensity = occ.blocks.len() as f64 / total_blocks as f64;
            (word, occ)
        })
        .collect();

    let stats = compute_stats(&occurrences);
    RedundancyAnalysis {
        occurrences,
        stats,
        block_count: total_blocks,
    }
}

fn compute_stats(occurrences: &IndexMap<String, WordOccurrence>) -> RedundancyStats {
    let total_words: usize = occurrences.values().map(|o| o.frequency).sum();
    let redundant_words = occurrences.len();
    let redundancy_percentage = if total_words == 0 {
        0.0
    } else {
        redundant_words as f64 / total_words as f64 * 100.0
    };

    // Stable sort keeps first-encountered order among equal frequencies
    let mut ranked: Vec<&WordOccurrence> = occurrences.values().collect();
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    let most_frequent = ranked
        .into_iter()
        .take(TOP_WORDS)
        .map(|o| WordCount {
            word: o.word.clone(),
            frequency: o.frequency,
        })
        .collect();

    RedundancyStats {
        total_words,
        redundant_words,
        redundancy_percentage,
        most_frequent,
    }
}

/// A reported word located in a piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub word: String,
    /// Display strength in [0, 1]
    pub intensity: f64,
}

/// Locate reported words in `text`, e.g. one of the analyzed blocks.
///
/// Strength weighs total frequency (70%) against block spread (30%), both
/// relative to the number of analyzed blocks, capped at 1.
pub fn highlight_spans(
    text: &str,
    analysis: &RedundancyAnalysis,
    config: &RedundancyConfig,
) -> Vec<HighlightSpan> {
    if analysis.block_count == 0 || analysis.occurrences.is_empty() {
        return Vec::new();
    }
    let total = analysis.block_count as f64;
    tokenize(text)
        .into_iter()
        .filter_map(|range| {
            let word = config.normalize(&text[range.clone()]);
            let occ = analysis.occurrences.get(word.as_ref())?;
            let intensity =
                (occ.frequency as f64 / total * 0.7 + occ.blocks.len() as f64 / total * 0.3).min(1.0);
            Some(HighlightSpan {
                range,
                word: occ.word.clone(),
                intensity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks(items: &[(&str, &str)]) -> Vec<TextBlock> {
        items.iter().map(|(id, c)| TextBlock::new(*id, *c)).collect()
    }

    fn config(min_len: usize, min_freq: usize) -> RedundancyConfig {
        RedundancyConfig {
            min_word_length: min_len,
            min_frequency: min_freq,
            ..Default::default()
        }
    }

    #[test]
    fn test_alpha_beta_gamma() {
        let input = blocks(&[("1", "alpha beta alpha"), ("2", "beta gamma")]);
        let result = analyze(&input, &config(4, 2));

        let beta = &result.occurrences["beta"];
        assert_eq!(beta.frequency, 2);
        assert_eq!(beta.blocks.iter().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(beta.intensity, 1.0);

        let alpha = &result.occurrences["alpha"];
        assert_eq!(alpha.frequency, 2);
        assert_eq!(alpha.blocks.iter().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(alpha.intensity, 0.5);

        assert!(!result.occurrences.contains_key("gamma"));
        assert_eq!(result.stats.total_words, 4);
        assert_eq!(result.stats.redundant_words, 2);
        assert_eq!(result.stats.redundancy_percentage, 50.0);
    }

    #[test]
    fn test_empty_blocks() {
        let result = analyze(&[], &RedundancyConfig::default());
        assert!(result.occurrences.is_empty());
        assert_eq!(result.stats.total_words, 0);
        assert_eq!(result.stats.redundant_words, 0);
        assert_eq!(result.stats.redundancy_percentage, 0.0);
        assert!(result.stats.most_frequent.is_empty());
    }

    #[test]
    fn test_nothing_survives_gives_zero_percentage() {
        let input = blocks(&[("1", "unique words only here")]);
        let result = analyze(&input, &RedundancyConfig::default());
        assert!(result.occurrences.is_empty());
        assert_eq!(result.stats.redundancy_percentage, 0.0);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let input = blocks(&[("1", "Test things"), ("2", "test stuff")]);
        let result = analyze(&input, &RedundancyConfig::default());
        let test = &result.occurrences["test"];
        assert_eq!(test.frequency, 2);
        assert_eq!(test.blocks.len(), 2);
    }

    #[test]
    fn test_case_sensitive_keeps_variants_apart() {
        let input = blocks(&[("1", "Test test Test"), ("2", "test")]);
        let cfg = RedundancyConfig {
            case_sensitive: true,
            ..Default::default()
        };
        let result = analyze(&input, &cfg);
        assert_eq!(result.occurrences["Test"].frequency, 2);
        assert_eq!(result.occurrences["test"].frequency, 2);
    }

    #[test]
    fn test_length_measured_after_lowercasing() {
        // 'İ' lowercases to 'i' plus a combining dot, doubling the length
        let input = blocks(&[("1", "İİ İİ")]);
        let result = analyze(&input, &RedundancyConfig::default());
        let word = "İİ".to_lowercase();
        assert_eq!(word.chars().count(), 4);
        assert_eq!(result.occurrences[word.as_str()].frequency, 2);

        let sensitive = RedundancyConfig {
            case_sensitive: true,
            ..Default::default()
        };
        assert!(analyze(&input, &sensitive).occurrences.is_empty());
    }

    #[test]
    fn test_stop_words_never_reported() {
        let input = blocks(&[
            ("1", "with with with the the and and about about"),
            ("2", "With WITH about between between"),
        ]);
        let cfg = config(1, 1);
        let result = analyze(&input, &cfg);
        for word in ["the", "and", "with", "about", "between"] {
            assert!(!result.occurrences.contains_key(word), "{} reported", word);
        }

        let sensitive = RedundancyConfig {
            case_sensitive: true,
            ..cfg
        };
        let result = analyze(&input, &sensitive);
        assert!(!result.occurrences.contains_key("With"));
        assert!(!result.occurrences.contains_key("WITH"));
    }

    #[test]
    fn test_exclude_words() {
        let input = blocks(&[("1", "project Project code"), ("2", "project code")]);
        let cfg = RedundancyConfig {
            exclude_words: ["PROJECT".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let result = analyze(&input, &cfg);
        assert!(!result.occurrences.contains_key("project"));
        assert!(result.occurrences.contains_key("code"));
    }

    #[test]
    fn test_min_word_length_filters() {
        let input = blocks(&[("1", "cat cat mouse mouse"), ("2", "cat mouse")]);
        let result = analyze(&input, &config(4, 2));
        assert!(!result.occurrences.contains_key("cat"));
        assert_eq!(result.occurrences["mouse"].frequency, 3);

        let result = analyze(&input, &config(3, 2));
        assert_eq!(result.occurrences["cat"].frequency, 3);
    }

    #[test]
    fn test_tokenizer_splits_on_punctuation() {
        let text = "don't stop_words, re-use; naïve(x)";
        let words: Vec<&str> = tokenize(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(words, vec!["don", "t", "stop_words", "re", "use", "naïve", "x"]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // "éèà" is six bytes but three characters
        let input = blocks(&[("1", "éèà éèà")]);
        let result = analyze(&input, &config(4, 2));
        assert!(result.occurrences.is_empty());
        let result = analyze(&input, &config(3, 2));
        assert_eq!(result.occurrences["éèà"].frequency, 2);
    }

    #[test]
    fn test_clamped_config() {
        let cfg = RedundancyConfig::clamped(-3, 0, false, Vec::new());
        assert_eq!(cfg.min_word_length, 1);
        assert_eq!(cfg.min_frequency, 1);

        let input = blocks(&[("1", "x yy x")]);
        let result = analyze(&input, &cfg);
        assert_eq!(result.occurrences["x"].frequency, 2);
        assert_eq!(result.occurrences["yy"].frequency, 1);
    }

    #[test]
    fn test_zero_minimums_behave_as_one() {
        let input = blocks(&[("1", "x")]);
        let result = analyze(&input, &config(0, 0));
        assert_eq!(result.occurrences["x"].frequency, 1);
    }

    #[test]
    fn test_top_words_ranked_with_stable_ties() {
        let input = blocks(&[
            ("1", "delta delta charlie charlie bravo bravo bravo"),
            ("2", "alpha alpha echo echo"),
        ]);
        let result = analyze(&input, &config(4, 2));
        let top: Vec<&str> = result
            .stats
            .most_frequent
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(top, vec!["bravo", "delta", "charlie", "alpha", "echo"]);
    }

    #[test]
    fn test_top_words_capped_at_ten() {
        let text: String = (0..15)
            .map(|i| format!("word{i} word{i} "))
            .collect();
        let input = blocks(&[("1", &text)]);
        let result = analyze(&input, &config(4, 2));
        assert_eq!(result.stats.redundant_words, 15);
        assert_eq!(result.stats.most_frequent.len(), 10);
        assert_eq!(result.stats.most_frequent[0].word, "word0");
    }

    #[test]
    fn test_invariants_hold() {
        let input = blocks(&[
            ("a", "Review the architecture before writing code. Review twice."),
            ("b", "Write code, then review code and tests."),
            ("c", "Tests document behaviour; architecture documents intent."),
        ]);
        let cfg = config(5, 2);
        let result = analyze(&input, &cfg);
        assert!(!result.occurrences.is_empty());
        for occ in result.occurrences.values() {
            assert!(occ.word.chars().count() >= 5);
            assert!(occ.frequency >= 2);
            assert!(occ.blocks.len() <= input.len());
            assert!((0.0..=1.0).contains(&occ.intensity));
        }
    }

    #[test]
    fn test_duplicate_block_ids_keep_intensity_bounded() {
        let input = blocks(&[("same", "shared"), ("same", "shared")]);
        let result = analyze(&input, &RedundancyConfig::default());
        let occ = &result.occurrences["shared"];
        assert_eq!(occ.blocks.len(), 1);
        assert_eq!(occ.intensity, 0.5);
    }

    #[test]
    fn test_highlight_spans() {
        let input = blocks(&[("1", "Review code. review!"), ("2", "code review")]);
        let cfg = RedundancyConfig::default();
        let result = analyze(&input, &cfg);
        let text = &input[0].content;
        let spans = highlight_spans(text, &result, &cfg);
        let words: Vec<&str> = spans.iter().map(|s| &text[s.range.clone()]).collect();
        assert_eq!(words, vec!["Review", "code", "review"]);
        // review: 3 occurrences over 2 blocks, present in both
        assert_eq!(spans[0].word, "review");
        assert_eq!(spans[0].intensity, 1.0);
        // code: 2 occurrences, both blocks → 0.7 + 0.3
        assert!((spans[1].intensity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_highlight_spans_empty_analysis() {
        let cfg = RedundancyConfig::default();
        let result = analyze(&[], &cfg);
        assert!(highlight_spans("anything here", &result, &cfg).is_empty());
    }

    #[test]
    fn test_from_analysis_config() {
        let ac = AnalysisConfig {
            min_word_length: -1,
            min_frequency: 3,
            case_sensitive: true,
            exclude: vec!["mode".into()],
        };
        let cfg = RedundancyConfig::from(&ac);
        assert_eq!(cfg.min_word_length, 1);
        assert_eq!(cfg.min_frequency, 3);
        assert!(cfg.case_sensitive);
        assert!(cfg.exclude_words.contains("mode"));
    }
}
