//! Title entity-extraction adapter.
//!
//! Listing titles conventionally end with the performer's name, often after
//! the descriptive copy and any bracketed release tags. This adapter needs
//! no network at all: it walks the title's trailing tokens and keeps the
//! CJK name-shaped ones. Confidence is lower than page-sourced data, so the
//! orchestrator never writes these results to the lookup cache.

use async_trait::async_trait;
use tracing::debug;

use super::NameSource;
use crate::resolve::validator::contains_disallowed_term;
use crate::util::env::env_flag;

const MAX_TRAILING_NAMES: usize = 3;
const MAX_NAME_CHARS: usize = 10;
const MIN_NAME_CHARS: usize = 2;

pub struct TitleNlpSource {
    enabled: bool,
}

impl TitleNlpSource {
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("TITLE_EXTRACT_ENABLED", true),
        }
    }

}

fn is_cjk_name_char(c: char) -> bool {
    matches!(c,
        '\u{3041}'..='\u{309F}'   // hiragana
        | '\u{30A0}'..='\u{30FA}' // katakana
        | '\u{30FC}'              // long vowel mark
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
    )
}

fn name_shaped(token: &str) -> bool {
    let len = token.chars().count();
    (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len)
        && token.chars().all(is_cjk_name_char)
        && !contains_disallowed_term(token)
}

/// Scan the title from the end and collect trailing name-shaped tokens,
/// stopping at the first token that is not one. Tokens are separated by
/// whitespace and bracket/punctuation characters.
pub(crate) fn extract_trailing_names(title: &str) -> Vec<String> {
    let tokens: Vec<&str> = title
        .split(|c: char| {
            c.is_whitespace()
                || matches!(
                    c,
                    '【' | '】' | '（' | '）' | '(' | ')' | '「' | '」' | '／' | '/' | '、' | ','
                )
        })
        .filter(|t| !t.is_empty())
        .collect();

    let mut names: Vec<String> = Vec::new();
    for token in tokens.iter().rev() {
        if name_shaped(token) {
            names.push(token.to_string());
            if names.len() == MAX_TRAILING_NAMES {
                break;
            }
        } else {
            break;
        }
    }
    names.reverse();
    names
}

#[async_trait]
impl NameSource for TitleNlpSource {
    fn name(&self) -> &'static str {
        "nlp-title"
    }

    async fn attempt(&self, title: &str) -> Vec<String> {
        if !self.enabled {
            debug!("title extraction disabled; skipping");
            return Vec::new();
        }
        extract_trailing_names(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_trailing_name() {
        let names = extract_trailing_names("新人デビュー作品第一弾 横山夢");
        assert_eq!(names, vec!["横山夢"]);
    }

    #[test]
    fn takes_multiple_trailing_names() {
        let names = extract_trailing_names("W出演スペシャル 横山夢 皆野みらい");
        assert_eq!(names, vec!["横山夢", "皆野みらい"]);
    }

    #[test]
    fn stops_at_the_first_non_name_token() {
        // The code token interrupts the scan; nothing after the copy counts.
        let names = extract_trailing_names("横山夢 ABC-123");
        assert!(names.is_empty());
    }

    #[test]
    fn bracketed_tails_are_tokenized() {
        let names = extract_trailing_names("限定版（横山夢）");
        assert_eq!(names, vec!["横山夢"]);
    }

    #[tokio::test]
    async fn disabled_adapter_answers_empty() {
        let src = TitleNlpSource { enabled: false };
        assert!(src.attempt("何でも 横山夢").await.is_empty());
    }
}
