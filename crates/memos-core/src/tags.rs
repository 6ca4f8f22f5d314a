//! Hashtag extraction from memo content.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([^\s#]+)").expect("valid tag regex"));

/// Minimum tag length, in characters.
pub const MIN_TAG_CHARS: usize = 2;

/// Extract `#tag` names from `content`.
///
/// Tags shorter than [`MIN_TAG_CHARS`] or made only of digits are dropped.
/// Each name appears once, in order of first occurrence.
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for caps in TAG_RE.captures_iter(content) {
        let tag = &caps[1];
        if tag.chars().count() < MIN_TAG_CHARS || tag.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_first_occurrence_order() {
        assert_eq!(
            extract_tags("#work notes #todo and #work again"),
            vec!["work", "todo"]
        );
    }

    #[test]
    fn test_filters_short_and_numeric() {
        assert_eq!(extract_tags("#a #12 #2024 #ok #x1"), vec!["ok", "x1"]);
    }

    #[test]
    fn test_headings_are_not_tags() {
        assert!(extract_tags("# Heading\n## Sub").is_empty());
    }

    #[test]
    fn test_adjacent_hashes_and_unicode() {
        assert_eq!(extract_tags("##nested #读书 #rust#async"), vec!["nested", "读书", "rust", "async"]);
    }
}
