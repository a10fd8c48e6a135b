//! seesaa-wiki scrape adapter.
//!
//! Result snippets on this index carry a labeled metadata line
//! (`出演者：…`) instead of structured links, so the heuristic is textual:
//! walk the result blocks of the document tree and capture the label value
//! from their text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

use super::{plausible_name, NameSource, ACCEPT_LANGUAGE, BROWSER_USER_AGENT};
use crate::util::env::{env_opt, env_parse};

const DEFAULT_BASE_URL: &str = "https://seesaawiki.jp";

pub struct SeesaaWikiSource {
    http: Client,
    base_url: String,
}

impl SeesaaWikiSource {
    pub fn from_env() -> Result<Self> {
        let timeout: u64 = env_parse("SCRAPE_TIMEOUT_SECS", 20u64);
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("failed to build seesaa-wiki client")?;
        Ok(Self {
            http,
            base_url: env_opt("SEESAA_WIKI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/search?keywords={}",
            self.base_url,
            urlencoding::encode(query)
        );
        let resp = self
            .http
            .get(&url)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("seesaa-wiki returned {}", resp.status());
        }
        let body = resp.text().await?;
        Ok(parse_performer_field(&body))
    }
}

fn performer_label_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"出演者?[:：]\s*([^。|【】\n]+)").expect("static regex"))
}

/// Capture the value of the performer label inside each result block.
pub(crate) fn parse_performer_field(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(blocks) = Selector::parse("div, p, li, dd") else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for block in doc.select(&blocks) {
        let text = block.text().collect::<String>();
        for caps in performer_label_pattern().captures_iter(&text) {
            let Some(value) = caps.get(1) else { continue };
            let value = value.as_str().trim().to_string();
            if plausible_name(&value) && !out.contains(&value) {
                out.push(value);
            }
        }
    }
    out
}

#[async_trait]
impl NameSource for SeesaaWikiSource {
    fn name(&self) -> &'static str {
        "seesaa-wiki"
    }

    async fn attempt(&self, query: &str) -> Vec<String> {
        match self.fetch(query).await {
            Ok(names) => names,
            Err(e) => {
                warn!(query = %query, error = %e, "seesaa-wiki scrape failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_the_labeled_performer_field() {
        let html = r#"
            <div class="result">
              <p>ABC-123 作品ページ</p>
              <p>出演者：横山夢、皆野みらい</p>
            </div>"#;
        assert_eq!(parse_performer_field(html), vec!["横山夢、皆野みらい"]);
    }

    #[test]
    fn handles_ascii_colon_and_short_label() {
        let html = "<li>出演: 杏花</li>";
        assert_eq!(parse_performer_field(html), vec!["杏花"]);
    }

    #[test]
    fn unlabeled_text_yields_nothing() {
        let html = "<p>検索結果はありません</p>";
        assert!(parse_performer_field(html).is_empty());
    }
}
