//! Code variant derivation.
//!
//! Catalog identifiers circulate in several spellings: `ABC-123`, `ABC123`,
//! lowercase, or buried inside a composite string such as
//! `studioname-abc123-hd`. External indexes are inconsistent about which
//! spelling they file an item under, so every lookup tries a small ordered
//! set of candidate variants derived here. Pure function; regenerated on
//! every resolution attempt and never persisted.

use regex::Regex;
use std::sync::OnceLock;

/// Anchored "letters + digits" identifier shape, e.g. `ABC-123` or `abc123`.
fn exact_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]{2,8})[-_ ]?(\d{2,5})$").expect("static regex"))
}

/// Unanchored variant used to pull code-shaped substrings out of composite
/// normalized codes (studio prefix + code + quality suffix).
fn embedded_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Za-z]{2,8})[-_ ]?(\d{2,5})").expect("static regex"))
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !out.contains(&candidate) {
        out.push(candidate);
    }
}

fn push_forms(out: &mut Vec<String>, letters: &str, digits: &str) {
    let letters = letters.to_ascii_uppercase();
    push_unique(out, format!("{letters}-{digits}"));
    push_unique(out, format!("{letters}{digits}"));
}

/// Derive the ordered, de-duplicated list of code variants for one item.
///
/// The original code, when it matches the standard identifier shape, yields
/// the leading (most accurate) variants; afterwards every code-shaped
/// substring of the normalized code contributes its own pair of forms.
pub fn generate_variants(normalized_code: &str, original_code: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    if let Some(orig) = original_code {
        if let Some(caps) = exact_code_pattern().captures(orig.trim()) {
            push_forms(&mut out, &caps[1], &caps[2]);
        }
    }

    for caps in embedded_code_pattern().captures_iter(normalized_code) {
        push_forms(&mut out, &caps[1], &caps[2]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_code_yields_both_forms_first() {
        let v = generate_variants("abc00123", Some("ABC-123"));
        assert_eq!(v[0], "ABC-123");
        assert_eq!(v[1], "ABC123");
    }

    #[test]
    fn unhyphenated_code_gains_hyphenated_form() {
        let v = generate_variants("xyz999", None);
        assert!(v.contains(&"XYZ-999".to_string()));
        assert!(v.contains(&"XYZ999".to_string()));
    }

    #[test]
    fn composite_normalized_code_is_mined_for_substrings() {
        let v = generate_variants("prestige-abp123-4k", None);
        assert!(v.contains(&"ABP-123".to_string()));
        assert!(v.contains(&"ABP123".to_string()));
    }

    #[test]
    fn duplicates_are_collapsed() {
        let v = generate_variants("abc-123", Some("ABC-123"));
        assert_eq!(v, vec!["ABC-123".to_string(), "ABC123".to_string()]);
    }

    #[test]
    fn no_code_shape_yields_nothing() {
        assert!(generate_variants("のタイトルだけ", None).is_empty());
    }
}
