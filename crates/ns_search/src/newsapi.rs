use async_trait::async_trait;
use chrono::NaiveDate;
use ns_core::{Article, Error, Result, SearchService};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const EVERYTHING_PATH: &str = "v2/everything";
const API_KEY_HEADER: &str = "X-Api-Key";

/// Lower bound on publication date used when none is configured.
pub fn default_from_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 6).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "publishedat" | "published-at" | "recent" => Ok(SortBy::PublishedAt),
            "relevancy" | "relevance" => Ok(SortBy::Relevancy),
            "popularity" | "popular" => Ok(SortBy::Popularity),
            _ => Err(format!(
                "Invalid sort order: {} (expected publishedAt, relevancy or popularity)",
                s
            )),
        }
    }
}

#[derive(Clone)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub from: NaiveDate,
    pub sort_by: SortBy,
    pub page_size: Option<u32>,
    pub language: Option<String>,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("sort_by", &self.sort_by)
            .field("page_size", &self.page_size)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            from: default_from_date(),
            sort_by: SortBy::default(),
            page_size: None,
            language: None,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
    articles: Option<Vec<serde_json::Value>>,
    total_results: Option<u64>,
}

/// Client for the `everything` article search endpoint.
pub struct NewsApiClient {
    client: reqwest::Client,
    endpoint: Url,
    config: NewsApiConfig,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("config", &self.config)
            .finish()
    }
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("News API key is required".to_string()));
        }

        let mut base = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(EVERYTHING_PATH)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("ns/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("from", self.config.from.format("%Y-%m-%d").to_string()),
            ("sortBy", self.config.sort_by.as_str().to_string()),
        ];
        if let Some(page_size) = self.config.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(language) = &self.config.language {
            params.push(("language", language.clone()));
        }
        params
    }
}

fn api_error(status: u16, body: &SearchResponse) -> Error {
    Error::Api {
        status,
        code: body.code.clone().unwrap_or_else(|| "unknown".to_string()),
        message: body
            .message
            .clone()
            .unwrap_or_else(|| "no message in response".to_string()),
    }
}

fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<Vec<Article>> {
    let parsed = serde_json::from_str::<SearchResponse>(body);

    if !status.is_success() {
        return Err(match parsed {
            Ok(body) => api_error(status.as_u16(), &body),
            Err(_) => Error::Api {
                status: status.as_u16(),
                code: "httpError".to_string(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            },
        });
    }

    let parsed = parsed.map_err(|e| {
        Error::MalformedResponse(format!(
            "{} (body starts with {:?})",
            e,
            body.chars().take(120).collect::<String>()
        ))
    })?;

    if let Some(state) = parsed.status.as_deref() {
        if state != "ok" {
            return Err(api_error(status.as_u16(), &parsed));
        }
    }

    let Some(raw_articles) = parsed.articles else {
        return Err(Error::MalformedResponse(
            "response has no articles collection".to_string(),
        ));
    };

    let received = raw_articles.len();
    let articles: Vec<Article> = raw_articles
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| match serde_json::from_value::<Article>(raw) {
            Ok(article) => Some(article),
            Err(e) => {
                warn!("⚠️ Skipping unreadable article #{}: {}", i + 1, e);
                None
            }
        })
        .collect();
    debug!(
        "Response carried {} usable articles of {} received, {:?} total",
        articles.len(),
        received,
        parsed.total_results
    );
    Ok(articles)
}

#[async_trait]
impl SearchService for NewsApiClient {
    fn name(&self) -> &str {
        "News API"
    }

    async fn search(&self, query: &str) -> Result<Vec<Article>> {
        debug!("🔍 GET {} q={:?}", self.endpoint, query);
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let articles = parse_response(status, &body)?;
        info!("📰 {} articles for {:?}", articles.len(), query);
        Ok(articles)
    }
}
