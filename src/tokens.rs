//! Lexical constants used by the signature table and the line rules:
//! null-equivalent values, aggregation phrases, footnote markers and a small
//! English stopword list. Mirrors `pat_utilities`'s module-level constants in
//! the original implementation, re-expressed as `static` slices.

/// Values that normalise away to "no evidence" (spec.md section 3,
/// `is_null_equivalent`).
pub const NULL_EQUIVALENT_VALUES: &[&str] = &[
    "", "nan", "none", "null", "-", "n/a", "na", "#n/a", "nil", "unknown", "?",
];

pub fn is_null_equivalent(value: &str) -> bool {
    NULL_EQUIVALENT_VALUES.contains(&value.to_lowercase().as_str())
}

/// `(phrase, function name)` pairs used to detect aggregation rows
/// (spec.md glossary: "Aggregation row").
pub const AGGREGATION_PHRASES: &[(&str, &str)] = &[
    ("total", "sum"),
    ("subtotal", "sum"),
    ("sum", "sum"),
    ("average", "mean"),
    ("avg", "mean"),
    ("mean", "mean"),
    ("grand total", "sum"),
    ("overall", "sum"),
    ("aggregate", "sum"),
    ("combined", "sum"),
    ("all ridings", "sum"),
];

/// Returns the first aggregation phrase found in `value`'s lowercase form,
/// along with the byte offset it starts at, matching the original's
/// `first_value.lower().find(phrase)` linear scan (first match in
/// declaration order wins, not the longest match).
pub fn find_aggregation_phrase(value: &str) -> Option<(&'static str, &'static str, usize)> {
    let lower = value.to_lowercase();
    AGGREGATION_PHRASES
        .iter()
        .find_map(|(phrase, function)| lower.find(phrase).map(|idx| (*phrase, *function, idx)))
}

pub fn is_aggregate_token(token: &str) -> bool {
    AGGREGATION_PHRASES
        .iter()
        .any(|(phrase, _)| phrase.split_whitespace().any(|part| part == token))
}

/// Leading markers that identify a footnote line (spec.md section 4.4).
pub const FOOTNOTE_KEYWORDS: &[&str] = &["note", "notes", "source", "sources", "*"];

pub fn starts_with_footnote_keyword(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    FOOTNOTE_KEYWORDS.iter().any(|kw| lower.starts_with(kw))
}

/// Recognises the enumerated-marker shapes from the original top-down walk:
/// a leading "1.", "a)", "(1)", "(a)" etc, requiring at least a few trailing
/// characters of payload so short numeric cells are not misflagged.
pub fn looks_like_enumerated_footnote(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    let bytes = lower.as_bytes();

    if lower.len() <= 5 {
        return false;
    }

    if bytes.len() >= 2 {
        let first = bytes[0];
        let second = bytes[1];
        if (first == b'1' || first == b'a')
            && matches!(second, b' ' | b'.' | b'/' | b')' | b']' | b':')
        {
            return true;
        }
    }

    if bytes.len() >= 3 && bytes[0] == b'(' && (bytes[1].is_ascii_digit() || bytes[1] == b'a') && bytes[2] == b')' {
        return true;
    }

    false
}

/// A small, fixed English stopword list used when building cell token bags
/// (spec.md section 3, `tokens`).
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "or", "this",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_aggregation_phrase_case_insensitively() {
        assert_eq!(
            find_aggregation_phrase("Total"),
            Some(("total", "sum", 0))
        );
        assert_eq!(find_aggregation_phrase("France"), None);
    }

    #[test]
    fn footnote_markers() {
        assert!(starts_with_footnote_keyword("Source: Elections Canada"));
        assert!(looks_like_enumerated_footnote("(1) margin of error"));
        assert!(looks_like_enumerated_footnote("1. margin of error"));
        assert!(!looks_like_enumerated_footnote("12345"));
    }

    #[test]
    fn null_equivalents() {
        assert!(is_null_equivalent("N/A"));
        assert!(is_null_equivalent(""));
        assert!(!is_null_equivalent("paris"));
    }
}
