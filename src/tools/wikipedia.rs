//! Wikipedia lookup tool using the MediaWiki API.

use super::Tool;
use crate::config::WikipediaSettings;
use crate::error::{MathmateError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

pub const NAME: &str = "Wikipedia";

const DESCRIPTION: &str =
    "A tool for searching the Internet to find various information on the topics mentioned";

/// Longest search phrase sent to the API.
const MAX_QUERY_CHARS: usize = 300;

const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// Searches Wikipedia and returns page summaries.
pub struct WikipediaTool {
    client: reqwest::Client,
    endpoint: Url,
    top_k_results: usize,
    max_chars: usize,
}

impl WikipediaTool {
    /// Create the tool from settings.
    pub fn new(settings: &WikipediaSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint())
            .map_err(|e| MathmateError::Config(format!("Invalid Wikipedia endpoint: {}", e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("mathmate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            top_k_results: settings.top_k_results.max(1),
            max_chars: settings.max_chars,
        })
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("list", "search")
            .append_pair("srsearch", query)
            .append_pair("srlimit", &self.top_k_results.to_string())
            .append_pair("format", "json")
            .append_pair("utf8", "1");
        url
    }

    fn extract_url(&self, title: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("prop", "extracts")
            .append_pair("exintro", "1")
            .append_pair("explaintext", "1")
            .append_pair("redirects", "1")
            .append_pair("titles", title)
            .append_pair("format", "json")
            .append_pair("utf8", "1");
        url
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    #[instrument(skip(self))]
    async fn invoke(&self, input: &str) -> Result<String> {
        let query: String = input.trim().chars().take(MAX_QUERY_CHARS).collect();
        if query.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let titles = parse_search_titles(&self.get_json(self.search_url(&query)).await?);
        debug!("Wikipedia search '{}' matched {} page(s)", query, titles.len());

        let mut pages = Vec::new();
        for title in titles.iter().take(self.top_k_results) {
            let body = self.get_json(self.extract_url(title)).await?;
            if let Some(page) = parse_extract(&body) {
                pages.push(page);
            }
        }

        if pages.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(format_pages(&pages, self.max_chars))
    }
}

/// Titles from a `list=search` response, in rank order.
fn parse_search_titles(body: &Value) -> Vec<String> {
    body["query"]["search"]
        .as_array()
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// The first page with a non-empty intro extract from a `prop=extracts` response.
fn parse_extract(body: &Value) -> Option<(String, String)> {
    body["query"]["pages"].as_object()?.values().find_map(|page| {
        let title = page["title"].as_str()?;
        let extract = page["extract"].as_str()?.trim();
        if extract.is_empty() {
            None
        } else {
            Some((title.to_string(), extract.to_string()))
        }
    })
}

/// Render summaries as `Page:`/`Summary:` blocks, cut to `max_chars` characters.
fn format_pages(pages: &[(String, String)], max_chars: usize) -> String {
    let text = pages
        .iter()
        .map(|(title, extract)| format!("Page: {}\nSummary: {}", title, extract))
        .collect::<Vec<_>>()
        .join("\n\n");
    text.chars().take(max_chars).collect()
}
