//! sougou-wiki scrape adapter.
//!
//! This index files works under titles like `ABC-123 【横山夢】`: the name
//! is the bracketed highlight next to the code. The heuristic scans result
//! links whose text mentions the queried code and pulls the bracket
//! contents out.

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

const DEFAULT_BASE_URL: &str = "https://sougouwiki.com";

pub struct SougouWikiSource {
    http: Client,
    base_url: String,
}

impl SougouWikiSource {
    pub fn from_env() -> Result<Self> {
        let timeout: u64 = env_parse("SCRAPE_TIMEOUT_SECS", 20u64);
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("failed to build sougou-wiki client")?;
        Ok(Self {
            http,
            base_url: env_opt("SOUGOU_WIKI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
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
            anyhow::bail!("sougou-wiki returned {}", resp.status());
        }
        let body = resp.text().await?;
        Ok(parse_bracketed_highlights(&body, query))
    }
}

fn bracket_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"【([^】]{1,60})】").expect("static regex"))
}

/// Extract bracketed segments from result-link texts that mention the code.
/// Tying the bracket to the code keeps unrelated page furniture out.
pub(crate) fn parse_bracketed_highlights(html: &str, code: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a") else {
        return Vec::new();
    };
    let code_upper = code.to_uppercase();
    let mut out: Vec<String> = Vec::new();
    for a in doc.select(&anchors) {
        let text = a.text().collect::<String>();
        if !text.to_uppercase().contains(&code_upper) {
            continue;
        }
        for caps in bracket_pattern().captures_iter(&text) {
            let Some(inner) = caps.get(1) else { continue };
            let inner = inner.as_str().trim().to_string();
            if plausible_name(&inner) && !out.contains(&inner) {
                out.push(inner);
            }
        }
    }
    out
}

#[async_trait]
impl NameSource for SougouWikiSource {
    fn name(&self) -> &'static str {
        "sougou-wiki"
    }

    async fn attempt(&self, query: &str) -> Vec<String> {
        match self.fetch(query).await {
            Ok(names) => names,
            Err(e) => {
                warn!(query = %query, error = %e, "sougou-wiki scrape failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bracketed_name_next_to_the_code() {
        let html = r#"
            <div class="result-list">
              <h3><a href="/d/abc123">ABC-123 【横山夢】</a></h3>
              <h3><a href="/d/other">XYZ-999 【別の人】</a></h3>
            </div>"#;
        assert_eq!(parse_bracketed_highlights(html, "ABC-123"), vec!["横山夢"]);
    }

    #[test]
    fn matches_code_case_insensitively() {
        let html = r#"<a href="/d/x">abc-123 【横山夢】</a>"#;
        assert_eq!(parse_bracketed_highlights(html, "ABC-123"), vec!["横山夢"]);
    }

    #[test]
    fn links_without_the_code_are_ignored() {
        let html = r#"<a href="/d/x">【お知らせ】メンテナンスのご案内</a>"#;
        assert!(parse_bracketed_highlights(html, "ABC-123").is_empty());
    }
}
