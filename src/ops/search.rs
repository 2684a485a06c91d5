use std::ops::Range;

use regex::Regex;

use crate::model::mode::{Mode, ModeField};
use crate::model::store::ModeStore;

/// A search hit for one field of one mode
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub slug: String,
    pub family: String,
    pub field: ModeField,
    pub spans: Vec<Range<usize>>,
}

const SEARCHED_FIELDS: [ModeField; 4] = [
    ModeField::Name,
    ModeField::Description,
    ModeField::Usage,
    ModeField::Prompt,
];

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search every mode's text fields.
///
/// If `family_filter` is `Some`, only modes in that family are searched.
/// Hits come back in store order, then field order (name, description,
/// usage, prompt).
pub fn search_modes(store: &ModeStore, re: &Regex, family_filter: Option<&str>) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for mode in &store.modes {
        if let Some(filter) = family_filter
            && mode.family_id() != filter
        {
            continue;
        }
        search_mode(re, mode, &mut hits);
    }
    hits
}

fn search_mode(re: &Regex, mode: &Mode, hits: &mut Vec<SearchHit>) {
    for field in SEARCHED_FIELDS {
        let spans = find_matches(re, mode.field(field));
        if !spans.is_empty() {
            hits.push(SearchHit {
                slug: mode.slug.clone(),
                family: mode.family_id().to_string(),
                field,
                spans,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::mode_ops::tests::make_mode;

    fn sample_store() -> ModeStore {
        let mut code = make_mode("code", Some("default"));
        code.name = "Code".into();
        code.prompt = "Write code. Review code carefully.".into();
        let mut review = make_mode("review", Some("team"));
        review.description = "Careful code review".into();
        ModeStore {
            modes: vec![code, review],
            ..Default::default()
        }
    }

    #[test]
    fn test_search_finds_all_fields() {
        let store = sample_store();
        let re = Regex::new("(?i)code").unwrap();
        let hits = search_modes(&store, &re, None);
        let summary: Vec<(&str, ModeField, usize)> = hits
            .iter()
            .map(|h| (h.slug.as_str(), h.field, h.spans.len()))
            .collect();
        assert!(summary.contains(&("code", ModeField::Name, 1)));
        assert!(summary.contains(&("code", ModeField::Prompt, 2)));
        assert!(summary.contains(&("review", ModeField::Description, 1)));
    }

    #[test]
    fn test_search_spans_are_byte_ranges() {
        let store = sample_store();
        let re = Regex::new("Review").unwrap();
        let hits = search_modes(&store, &re, None);
        let prompt_hit = hits
            .iter()
            .find(|h| h.slug == "code" && h.field == ModeField::Prompt)
            .unwrap();
        let text = &store.modes[0].prompt;
        assert_eq!(&text[prompt_hit.spans[0].clone()], "Review");
    }

    #[test]
    fn test_search_family_filter() {
        let store = sample_store();
        let re = Regex::new("(?i)code").unwrap();
        let hits = search_modes(&store, &re, Some("team"));
        assert!(hits.iter().all(|h| h.slug == "review"));
        assert!(!hits.is_empty());
    }

    #[test]
    fn test_search_no_hits() {
        let store = sample_store();
        let re = Regex::new("zebra").unwrap();
        assert!(search_modes(&store, &re, None).is_empty());
    }
}
