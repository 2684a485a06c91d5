/// Characters per token assumed by the estimate.
const CHARS_PER_TOKEN: usize = 4;

/// Rough token count for English text: one token per four characters of
/// the trimmed text, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// `0 tokens`, `950 tokens`, `1.2k tokens`
pub fn format_token_count(count: usize) -> String {
    match count {
        0 => "0 tokens".to_string(),
        1..=999 => format!("{} tokens", count),
        _ => format!("{:.1}k tokens", count as f64 / 1000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("   \n\t"), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("  abcd  "), 1);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }

    #[test]
    fn test_format_token_count() {
        assert_eq!(format_token_count(0), "0 tokens");
        assert_eq!(format_token_count(1), "1 tokens");
        assert_eq!(format_token_count(999), "999 tokens");
        assert_eq!(format_token_count(1000), "1.0k tokens");
        assert_eq!(format_token_count(1240), "1.2k tokens");
        assert_eq!(format_token_count(15_400), "15.4k tokens");
    }
}
