//! Structured search adapter.
//!
//! Uses a programmable web-search JSON API (key + engine id) rather than
//! scraping, so it is exempt from the shared scrape throttle. Candidates are
//! pulled from cast-labeled segments in result titles and snippets.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

use super::{plausible_name, NameSource};
use crate::util::env::{env_opt, env_parse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    snippet: Option<String>,
}

pub struct SearchApiSource {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    engine_id: Option<String>,
}

impl SearchApiSource {
    pub fn from_env() -> Result<Self> {
        let timeout: u64 = env_parse("SEARCH_API_TIMEOUT_SECS", 15u64);
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("failed to build search api client")?;
        Ok(Self {
            http,
            base_url: env_opt("SEARCH_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            api_key: env_opt("SEARCH_API_KEY"),
            engine_id: env_opt("SEARCH_ENGINE_ID"),
        })
    }

    #[cfg(test)]
    pub fn unconfigured() -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            engine_id: None,
        }
    }

    /// The service is optional; without credentials the adapter answers
    /// empty immediately and never touches the network.
    fn is_available(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<String>> {
        let q = format!("{query} 出演");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_deref().unwrap_or_default()),
                ("cx", self.engine_id.as_deref().unwrap_or_default()),
                ("q", q.as_str()),
                ("num", "10"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("search api returned {}", resp.status());
        }
        let body: SearchResponse = resp.json().await?;
        let mut out = Vec::new();
        for item in body.items.unwrap_or_default() {
            for text in [item.title.as_deref(), item.snippet.as_deref()]
                .into_iter()
                .flatten()
            {
                for candidate in extract_cast_labeled(text) {
                    if !out.contains(&candidate) {
                        out.push(candidate);
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Pull the value of a cast label (`出演: …` / `出演者：…`) out of free text.
/// The captured field may pack several names; decomposition happens in the
/// central validator.
fn cast_label_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"出演者?[:：]\s*([^。|【】\n]+)").expect("static regex")
    })
}

fn extract_cast_labeled(text: &str) -> Vec<String> {
    cast_label_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| plausible_name(s))
        .collect()
}

#[async_trait]
impl NameSource for SearchApiSource {
    fn name(&self) -> &'static str {
        "search-api"
    }

    async fn attempt(&self, query: &str) -> Vec<String> {
        if !self.is_available() {
            debug!("search api not configured; skipping");
            return Vec::new();
        }
        match self.fetch(query).await {
            Ok(names) => names,
            Err(e) => {
                warn!(query = %query, error = %e, "search api lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_cast_labeled_field() {
        let text = "ABC-123 新作情報。出演: 横山夢 ほか配信中";
        assert_eq!(extract_cast_labeled(text), vec!["横山夢 ほか配信中"]);
    }

    #[test]
    fn extracts_sha_variant_and_fullwidth_colon() {
        let text = "出演者：杏花、美月【公式】";
        assert_eq!(extract_cast_labeled(text), vec!["杏花、美月"]);
    }

    #[test]
    fn no_label_yields_nothing() {
        assert!(extract_cast_labeled("ABC-123 の検索結果").is_empty());
    }

    #[tokio::test]
    async fn unconfigured_adapter_returns_empty_without_network() {
        let src = SearchApiSource::unconfigured();
        assert!(src.attempt("ABC-123").await.is_empty());
    }
}
