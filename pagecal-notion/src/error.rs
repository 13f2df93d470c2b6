use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid page id: {0}")]
    InvalidPageId(String),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("Notion API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Page {0} has no title text")]
    MissingTitle(String),

    #[error("Listing of {page_id} repeated cursor {cursor}")]
    StalledCursor { page_id: String, cursor: String },
}

pub type Result<T> = std::result::Result<T, NotionError>;
