//! Typed errors for fetching pages, extracting reviews and running a crawl.

use thiserror::Error;

/// A page could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Non-success HTTP status.
    #[error("request to {url} failed with status: {status}")]
    Status { url: String, status: u16 },

    /// Amazon answered 503.
    #[error("rate limited by Amazon at {url}. Try increasing --delay or using a proxy.")]
    RateLimited { url: String },

    /// The response body could not be read.
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    /// The response is a CAPTCHA page instead of the listing.
    #[error("CAPTCHA detected at {url}. Amazon is blocking requests.")]
    Blocked { url: String },
}

impl FetchError {
    /// Returns the URL that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::RateLimited { url }
            | FetchError::Body { url, .. }
            | FetchError::Blocked { url } => url,
        }
    }
}

/// Why a review block could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionReason {
    #[error("missing reviewer name")]
    MissingName,

    #[error("missing rating")]
    MissingRating,

    #[error("unparsable rating: {0:?}")]
    UnparsableRating(String),

    #[error("missing review body")]
    MissingBody,
}

/// A single review block did not match the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("review {fragment_index}: {reason}")]
pub struct ExtractionError {
    /// Position of the block within its page.
    pub fragment_index: usize,
    pub reason: ExtractionReason,
}

impl ExtractionError {
    pub fn new(fragment_index: usize, reason: ExtractionReason) -> Self {
        Self { fragment_index, reason }
    }
}

/// A crawl ended without producing a report.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The starting page was unreachable, so nothing was collected.
    #[error("could not fetch the first review page {url}: {source}")]
    FirstPage {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A later page failed and the policy says to abort.
    #[error("fetching review page {page} failed: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    /// A review block failed and the policy says to abort.
    #[error("extracting reviews from page {page} failed: {source}")]
    Extraction {
        page: u32,
        #[source]
        source: ExtractionError,
    },
}
