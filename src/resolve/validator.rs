//! Performer-name validation and normalization.
//!
//! Scraped candidate strings are noisy: they carry site furniture ("一覧",
//! "動画"), release vocabulary, or several names packed into one field.
//! Every candidate passes the hard checks first (length, disallowed terms,
//! character classes); only then is it decomposed on the delimiter set and
//! each piece re-checked. A split that leaves nothing valid falls back to
//! the original string so an aggressive delimiter never loses a real name.

use regex::Regex;
use std::sync::OnceLock;

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 30;

/// Vocabulary that marks a candidate as site/release noise rather than a
/// person's name. Matched case-insensitively as substrings.
const DISALLOWED_TERMS: &[&str] = &[
    "素人",
    "女優",
    "動画",
    "無料",
    "サンプル",
    "まとめ",
    "一覧",
    "情報",
    "詳細",
    "画像",
    "作品",
    "出演",
    "配信",
    "限定",
    "デビュー",
    "レーベル",
    "メーカー",
    "wiki",
    "dvd",
];

/// Characters the splitter treats as packing delimiters. The interpunct is
/// deliberately both an allowed in-name mark and a delimiter: splitting is
/// attempted after whole-string validation, with a fallback when every piece
/// is rejected.
const SPLIT_DELIMITERS: &[char] = &[',', '、', '，', '/', '／', '・', '･'];

// The class admits the packing delimiters so a multi-name field survives the
// whole-string check long enough to reach the splitter.
fn allowed_chars_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[\p{Han}\p{Hiragana}\p{Katakana}A-Za-zー・･,、，/／\s]+$")
            .expect("static regex")
    })
}

pub(crate) fn contains_disallowed_term(s: &str) -> bool {
    let lowered = s.to_lowercase();
    DISALLOWED_TERMS.iter().any(|t| lowered.contains(t))
}

fn is_split_delimiter(c: char) -> bool {
    SPLIT_DELIMITERS.contains(&c) || c.is_whitespace()
}

/// Run the hard rejection steps on a single candidate. Returns the trimmed
/// name on success.
fn validate_one(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < MIN_NAME_CHARS || len > MAX_NAME_CHARS {
        return None;
    }
    if contains_disallowed_term(trimmed) {
        return None;
    }
    if !allowed_chars_pattern().is_match(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Validate a raw candidate and decompose packed multi-name fields.
///
/// Output is de-duplicated and order-preserving; an invalid candidate yields
/// an empty list.
pub fn validate_and_split(raw: &str) -> Vec<String> {
    let Some(whole) = validate_one(raw) else {
        return Vec::new();
    };

    let mut pieces: Vec<String> = whole
        .split(is_split_delimiter)
        .filter(|p| !p.is_empty())
        .filter_map(validate_one)
        .collect();

    // Splitting heuristics misfired if nothing survived; keep the field we
    // already know is valid rather than dropping it.
    if pieces.is_empty() {
        pieces.push(whole);
    }

    let mut out: Vec<String> = Vec::with_capacity(pieces.len());
    for p in pieces {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_bounds() {
        assert!(validate_and_split("").is_empty());
        assert!(validate_and_split("あ").is_empty());
        let long = "あ".repeat(31);
        assert!(validate_and_split(&long).is_empty());
        let max = "あ".repeat(30);
        assert_eq!(validate_and_split(&max), vec![max]);
    }

    #[test]
    fn rejects_disallowed_terms() {
        assert!(validate_and_split("素人娘").is_empty());
        assert!(validate_and_split("女優まとめ").is_empty());
        assert!(validate_and_split("ABC Wiki").is_empty());
    }

    #[test]
    fn rejects_foreign_character_classes() {
        assert!(validate_and_split("ABC-123").is_empty());
        assert!(validate_and_split("<a href>").is_empty());
        assert!(validate_and_split("name@example.com").is_empty());
    }

    #[test]
    fn splits_packed_names_across_delimiter_sets() {
        let a = validate_and_split("杏花,美月　凛音");
        let b = validate_and_split("杏花、美月,凛音");
        assert_eq!(a, vec!["杏花", "美月", "凛音"]);
        assert_eq!(a, b);
    }

    #[test]
    fn splits_on_whitespace() {
        let names = validate_and_split("横山夢 皆野みらい");
        assert_eq!(names, vec!["横山夢", "皆野みらい"]);
    }

    #[test]
    fn falls_back_to_unsplit_string_when_pieces_all_fail() {
        // Each interpunct-separated piece is a single character, so the
        // split output is invalid; the whole field must survive.
        assert_eq!(validate_and_split("夢・愛"), vec!["夢・愛"]);
    }

    #[test]
    fn deduplicates_preserving_order() {
        assert_eq!(validate_and_split("美月/美月/杏花"), vec!["美月", "杏花"]);
    }

    #[test]
    fn whitespace_splits_latin_names_too() {
        assert_eq!(validate_and_split("June Lovejoy"), vec!["June", "Lovejoy"]);
    }
}
