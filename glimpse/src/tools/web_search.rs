//! Web search tool for supplementing media analysis with web context.

use std::fmt::Write as _;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::tool::{Tool, ToolError};

static LINK_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]*href="([^"]+)"[^>]*class=['"]result-link['"][^>]*>([^<]+)</a>"#).ok()
});

static SNIPPET_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"class=['"]result-snippet['"][^>]*>([^<]+)"#).ok());

/// `DuckDuckGo` web search tool.
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    /// Maximum number of results to return.
    pub max_results: usize,
    endpoint: String,
    client: reqwest::Client,
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self {
            max_results: 10,
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
            client: reqwest::Client::new(),
        }
    }
}

/// Arguments for web search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchArgs {
    /// The search query to perform.
    pub query: String,
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the result.
    pub title: String,
    /// URL of the result.
    pub link: String,
    /// Description/snippet of the result.
    pub description: String,
}

impl WebSearchTool {
    /// `DuckDuckGo` lite HTML endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://lite.duckduckgo.com/lite/";

    const USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    /// Create a new web search tool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum results.
    #[must_use]
    pub const fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Override the search endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Parse results into markdown format.
    fn format_results(results: &[SearchResult]) -> String {
        if results.is_empty() {
            return "No results found.".to_owned();
        }

        let mut output = String::from("## Search Results\n\n");
        for result in results {
            let _ = write!(
                output,
                "[{}]({})\n{}\n\n",
                result.title, result.link, result.description
            );
        }
        output
    }

    /// Perform `DuckDuckGo` search using the lite HTML interface.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolError> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        debug!(%query, "searching the web");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, Self::USER_AGENT)
            .send()
            .await
            .map_err(|e| ToolError::execution(format!("Request failed: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| ToolError::execution(format!("Failed to read response: {e}")))?;

        let mut results = Self::parse_html(&html);
        results.truncate(self.max_results);
        Ok(results)
    }

    /// Parse a `DuckDuckGo` lite HTML page.
    fn parse_html(html: &str) -> Vec<SearchResult> {
        let (Some(link_re), Some(snippet_re)) = (LINK_RE.as_ref(), SNIPPET_RE.as_ref()) else {
            return Vec::new();
        };

        let snippets: Vec<_> = snippet_re.captures_iter(html).collect();

        link_re
            .captures_iter(html)
            .enumerate()
            .filter_map(|(i, link_cap)| {
                let url = link_cap.get(1).map(|m| m.as_str()).unwrap_or_default();
                let title = link_cap.get(2).map(|m| m.as_str()).unwrap_or_default();
                let description = snippets
                    .get(i)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str())
                    .unwrap_or_default();

                (!url.is_empty() && !title.trim().is_empty()).then(|| SearchResult {
                    title: title.trim().to_owned(),
                    link: url.to_owned(),
                    description: description.trim().to_owned(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    const NAME: &'static str = "web_search";
    type Args = WebSearchArgs;
    type Output = String;
    type Error = ToolError;

    fn description(&self) -> String {
        "Performs a web search for a query and returns the top search results formatted as markdown.".to_owned()
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to perform"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        if args.query.trim().is_empty() {
            return Err(ToolError::invalid_args("query must not be empty"));
        }

        let results = self.search(&args.query).await?;
        if results.is_empty() {
            return Err(ToolError::execution(
                "No results found! Try a less restrictive/shorter query.",
            ));
        }

        Ok(Self::format_results(&results))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <tr><td><a rel="nofollow" href="https://www.rust-lang.org/" class='result-link'>Rust Programming Language</a></td></tr>
        <tr><td class='result-snippet'>A language empowering everyone.</td></tr>
        <tr><td><a rel="nofollow" href="https://doc.rust-lang.org/book/" class='result-link'>The Rust Book</a></td></tr>
        <tr><td class='result-snippet'>Learn Rust.</td></tr>
    "#;

    #[test]
    fn parses_links_and_snippets() {
        let results = WebSearchTool::parse_html(SAMPLE);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].link, "https://www.rust-lang.org/");
        assert_eq!(results[1].description, "Learn Rust.");
    }

    #[test]
    fn parse_empty_page() {
        assert!(WebSearchTool::parse_html("<html></html>").is_empty());
    }

    #[test]
    fn formats_markdown() {
        let results = WebSearchTool::parse_html(SAMPLE);
        let md = WebSearchTool::format_results(&results);
        assert!(md.starts_with("## Search Results"));
        assert!(md.contains("[The Rust Book](https://doc.rust-lang.org/book/)"));
        assert_eq!(WebSearchTool::format_results(&[]), "No results found.");
    }

    #[test]
    fn definition_uses_tool_name() {
        let def = Tool::definition(&WebSearchTool::new().with_max_results(3));
        assert_eq!(def.name, "web_search");
        assert_eq!(def.parameters["required"][0], "query");
    }

    #[tokio::test]
    async fn rejects_blank_query_without_network() {
        let tool = WebSearchTool::new().with_endpoint("http://127.0.0.1:9/");
        let err = tool
            .call(WebSearchArgs {
                query: "   ".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
