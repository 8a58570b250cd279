use chrono::DateTime;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::Result;

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Results requested per search page (the API maximum).
pub const PER_PAGE: u32 = 100;

/// One issue search result, reduced to what the aggregation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// API URL of the repository, e.g. `https://api.github.com/repos/owner/name`
    pub repository_url: String,
    /// Merge time in seconds since the epoch
    pub merged_at: Option<i64>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    /// Page to request next, `None` on the last page
    pub next_page: Option<u32>,
}

/// Paginated issue search.
#[allow(async_fn_in_trait)]
pub trait SearchService {
    /// Fetch page `page` (1-based) of the results for `query`.
    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage>;
}

#[derive(Debug, Deserialize)]
struct IssueSearchResponse {
    #[serde(default)]
    items: Vec<IssueItem>,
}

#[derive(Debug, Deserialize)]
struct IssueItem {
    #[serde(default)]
    repository_url: Option<String>,
    #[serde(default)]
    pull_request: Option<PullRequestLinks>,
}

#[derive(Debug, Deserialize)]
struct PullRequestLinks {
    #[serde(default)]
    merged_at: Option<String>,
}

/// Searches issues through the GitHub REST API.
pub struct GitHubSearcher {
    client: Client,
    api_url: String,
    token: Option<String>,
    progress: ProgressBar,
}

impl GitHubSearcher {
    /// Create a searcher against `api_url`, authenticating with `token` when given.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("prlist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        GitHubSearcher::with_client(client, api_url, token)
    }

    pub(crate) fn with_client(
        client: Client,
        api_url: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")?
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        progress.enable_steady_tick(Duration::from_millis(80));

        Ok(GitHubSearcher {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            progress,
        })
    }

    /// Stop the spinner and leave `msg` in its place.
    pub fn finish(&self, msg: String) {
        self.progress.finish_with_message(msg);
    }

    fn log_rate_limit(headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok())
        };
        if let (Some(remaining), Some(limit)) =
            (header("X-RateLimit-Remaining"), header("X-RateLimit-Limit"))
        {
            debug!("Rate limit: {}/{}", remaining, limit);
        }
    }
}

impl SearchService for GitHubSearcher {
    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage> {
        self.progress
            .set_message(format!("Searching '{}' - page {}", query, page));

        let url = format!("{}/search/issues", self.api_url);
        let per_page = PER_PAGE.to_string();
        let page_param = page.to_string();

        debug!("Requesting {} page {}", url, page);
        let mut request = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("sort", "updated"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
                ("page", page_param.as_str()),
            ])
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        GitHubSearcher::log_rate_limit(response.headers());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Search failed with {} on page {}: {}", status, page, body);
            return Err(format!("API error: {} on page {} of '{}'", status, page, query).into());
        }

        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_from_link);

        let body = response.text().await?;
        let hits = hits_from_response(&body)?;

        info!("Fetched {} results from page {}", hits.len(), page);
        Ok(SearchPage { hits, next_page })
    }
}

/// Decode an issue search response body into search hits.
pub fn hits_from_response(body: &str) -> Result<Vec<SearchHit>> {
    let response: IssueSearchResponse = serde_json::from_str(body)?;

    response
        .items
        .into_iter()
        .map(|item| -> Result<SearchHit> {
            let merged_at = match item.pull_request.and_then(|pr| pr.merged_at) {
                Some(ts) => Some(
                    DateTime::parse_from_rfc3339(&ts)
                        .map_err(|e| format!("invalid merged_at '{}': {}", ts, e))?
                        .timestamp(),
                ),
                None => None,
            };
            Ok(SearchHit {
                repository_url: item.repository_url.unwrap_or_default(),
                merged_at,
            })
        })
        .collect()
}

/// Extract the `page` parameter of the `rel="next"` entry in a `Link` header.
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        if !parts.any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let url = Url::parse(target.trim_start_matches('<').trim_end_matches('>')).ok()?;
        let page = url
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok());
        page
    })
}
