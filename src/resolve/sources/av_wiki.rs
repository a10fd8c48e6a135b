//! av-wiki scrape adapter.
//!
//! Entry pages on this index tag each work with a link list pointing at the
//! performers' own pages, so the heuristic is structural: fetch the site
//! search for the code and collect the anchor texts whose hrefs live under
//! the actress section.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::warn;

use super::{plausible_name, NameSource, ACCEPT_LANGUAGE, BROWSER_USER_AGENT};
use crate::util::env::{env_opt, env_parse};

const DEFAULT_BASE_URL: &str = "https://av-wiki.net";

pub struct AvWikiSource {
    http: Client,
    base_url: String,
}

impl AvWikiSource {
    pub fn from_env() -> Result<Self> {
        let timeout: u64 = env_parse("SCRAPE_TIMEOUT_SECS", 20u64);
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("failed to build av-wiki client")?;
        Ok(Self {
            http,
            base_url: env_opt("AV_WIKI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/?s={}", self.base_url, urlencoding::encode(query));
        let resp = self
            .http
            .get(&url)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("av-wiki returned {}", resp.status());
        }
        let body = resp.text().await?;
        Ok(parse_actress_links(&body))
    }
}

/// Collect anchor texts that point into the actress section of the site.
pub(crate) fn parse_actress_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for a in doc.select(&anchors) {
        let href = a.value().attr("href").unwrap_or_default();
        if !href.contains("/av-actress/") && !href.contains("/actress/") {
            continue;
        }
        let text = a.text().collect::<String>().trim().to_string();
        if plausible_name(&text) && !out.contains(&text) {
            out.push(text);
        }
    }
    out
}

#[async_trait]
impl NameSource for AvWikiSource {
    fn name(&self) -> &'static str {
        "av-wiki"
    }

    async fn attempt(&self, query: &str) -> Vec<String> {
        match self.fetch(query).await {
            Ok(names) => names,
            Err(e) => {
                warn!(query = %query, error = %e, "av-wiki scrape failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_names_out_of_the_actress_link_list() {
        let html = r#"
            <article class="entry">
              <h2><a href="/abc-123/">ABC-123</a></h2>
              <ul class="actress-list">
                <li><a href="/av-actress/yokoyama-yume/">横山夢</a></li>
                <li><a href="/av-actress/minano-mirai/">皆野みらい</a></li>
              </ul>
              <a href="/category/label/">レーベル一覧</a>
            </article>"#;
        assert_eq!(parse_actress_links(html), vec!["横山夢", "皆野みらい"]);
    }

    #[test]
    fn ignores_pages_without_actress_links() {
        let html = r#"<p>no results <a href="/about/">about</a></p>"#;
        assert!(parse_actress_links(html).is_empty());
    }

    #[test]
    fn deduplicates_repeated_links() {
        let html = r#"
            <a href="/av-actress/x/">横山夢</a>
            <a href="/av-actress/x/">横山夢</a>"#;
        assert_eq!(parse_actress_links(html), vec!["横山夢"]);
    }
}
