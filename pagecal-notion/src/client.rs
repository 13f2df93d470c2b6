use crate::directory::{ChildEntry, ChildKind, ChildrenPage, PageDirectory};
use crate::error::{NotionError, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct BlockListResponse {
    results: Vec<BlockResponse>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    child_page: Option<ChildPageBody>,
}

#[derive(Debug, Deserialize)]
struct ChildPageBody {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Handle to the Notion REST API. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_timeout(token, 30)
    }

    pub fn with_timeout(token: &str, timeout_secs: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| NotionError::Unauthorized("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("notion-version", HeaderValue::from_static(NOTION_VERSION));

        let client = Client::builder()
            .user_agent(concat!("pagecal/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs / 2))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| NotionError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(response: Response, page_id: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body: ErrorBody = response.json().await.unwrap_or_default();

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NotionError::Unauthorized(body.message),
            StatusCode::NOT_FOUND => NotionError::NotFound(page_id.to_string()),
            StatusCode::TOO_MANY_REQUESTS => NotionError::RateLimited { retry_after },
            _ => NotionError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            },
        })
    }
}

/// Concatenated plain text of the page's `title` property, if it has any.
fn title_from_properties(properties: &serde_json::Map<String, Value>) -> Option<String> {
    let rich_text = properties
        .values()
        .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))?
        .get("title")?
        .as_array()?;

    let text: String = rich_text
        .iter()
        .filter_map(|t| t.get("plain_text").and_then(Value::as_str))
        .collect();

    if text.is_empty() { None } else { Some(text) }
}

impl PageDirectory for NotionClient {
    async fn retrieve_title(&self, page_id: &str) -> Result<String> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        debug!("Retrieving page {}", page_id);

        let response = self.client.get(&url).send().await?;
        let page: PageResponse = Self::check(response, page_id).await?.json().await?;

        title_from_properties(&page.properties).ok_or_else(|| NotionError::MissingTitle(page_id.to_string()))
    }

    async fn list_children(&self, page_id: &str, cursor: Option<&str>) -> Result<ChildrenPage> {
        let url = format!("{}/blocks/{}/children", self.base_url, page_id);
        debug!("Listing children of {} (cursor: {:?})", page_id, cursor);

        let mut request = self.client.get(&url).query(&[("page_size", PAGE_SIZE)]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        let response = request.send().await?;
        let listing: BlockListResponse = Self::check(response, page_id).await?.json().await?;

        let entries = listing
            .results
            .into_iter()
            .map(|block| match block.kind.as_str() {
                "child_page" => ChildEntry {
                    id: block.id,
                    kind: ChildKind::Page,
                    title: block.child_page.map(|p| p.title),
                },
                _ => ChildEntry {
                    id: block.id,
                    kind: ChildKind::Other(block.kind),
                    title: None,
                },
            })
            .collect();

        let next_cursor = if listing.has_more {
            listing.next_cursor.filter(|c| !c.is_empty())
        } else {
            None
        };

        Ok(ChildrenPage { entries, next_cursor })
    }
}
