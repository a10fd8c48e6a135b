//! Pluggable lookup sources.
//!
//! Every source satisfies the same contract: given a candidate string it
//! returns raw performer-name candidates, and it never propagates a failure.
//! Network errors, bad statuses, and parse failures are logged inside the
//! adapter and surface as an empty list, so no single source can abort a
//! resolution. Candidates returned here are only pre-filtered permissively;
//! the central validator has the final say.

pub mod av_wiki;
pub mod search_api;
pub mod seesaa_wiki;
pub mod sougou_wiki;
pub mod title_nlp;

use async_trait::async_trait;

pub use av_wiki::AvWikiSource;
pub use search_api::SearchApiSource;
pub use seesaa_wiki::SeesaaWikiSource;
pub use sougou_wiki::SougouWikiSource;
pub use title_nlp::TitleNlpSource;

/// Browser-like identity sent on scrape requests; the public indexes serve
/// reduced or blocked pages to obvious bot agents.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// Language preference matching the content the indexes serve.
pub(crate) const ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.8,en;q=0.6";

/// Common strategy interface. One implementation per external source.
#[async_trait]
pub trait NameSource: Send + Sync {
    /// Stable source tag, used for cache writes and the trust-rank table.
    fn name(&self) -> &'static str;

    /// Look up raw performer-name candidates for one query string.
    /// Must never fail: adapters catch their own errors and return empty.
    async fn attempt(&self, query: &str) -> Vec<String>;
}

/// Permissive pre-filter applied inside adapters before returning candidates.
/// Looser than the central validator on purpose; it only drops obvious
/// non-name debris (markup fragments, urls, bare codes).
pub(crate) fn plausible_name(s: &str) -> bool {
    let trimmed = s.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > 40 {
        return false;
    }
    if trimmed.contains(['<', '>', '{', '}', '=', '#', '%']) {
        return false;
    }
    if trimmed.contains("http") {
        return false;
    }
    // A name carries at least one letter; pure digit/punctuation strings
    // are never names.
    trimmed.chars().any(|c| c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefilter_drops_markup_and_urls() {
        assert!(!plausible_name("<a href"));
        assert!(!plausible_name("https://example.com/x"));
        assert!(!plausible_name("12345"));
        assert!(!plausible_name(""));
    }

    #[test]
    fn prefilter_keeps_name_shaped_strings() {
        assert!(plausible_name("横山夢"));
        assert!(plausible_name("June Lovejoy"));
        // Looser than the validator: short or oddly long strings survive
        // here and are judged centrally.
        assert!(plausible_name("夢"));
    }
}
