//! Page-by-page review collection.

use crate::config::Config;
use crate::reviews::client::ReviewFetch;
use crate::reviews::error::CrawlError;
use crate::reviews::models::{CrawlReport, ReviewCollection, ReviewRecord, Termination};
use crate::reviews::parser::Parser;
use crate::reviews::policy::{ErrorPolicy, ExtractionAction, FetchAction};
use tracing::{debug, info, warn};

/// Walks a review listing from its first page until pagination ends.
#[derive(Debug, Clone)]
pub struct Crawler {
    parser: Parser,
    page_param: String,
    max_pages: u32,
    policy: ErrorPolicy,
}

impl Crawler {
    /// Creates a crawler from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_settings(config.page_param.clone(), config.max_pages, config.policy)
    }

    /// Creates a crawler with explicit settings. A page cap of 0 is treated as 1.
    pub fn with_settings(page_param: impl Into<String>, max_pages: u32, policy: ErrorPolicy) -> Self {
        Self { parser: Parser::new(), page_param: page_param.into(), max_pages: max_pages.max(1), policy }
    }

    /// Returns the URL of the given page of the listing.
    pub fn page_url(&self, start_url: &str, page: u32) -> String {
        page_url(start_url, page, &self.page_param)
    }

    /// Collects every review reachable from `start_url`.
    ///
    /// Fails only when the first page cannot be fetched, or when the error policy
    /// says to abort. Otherwise the report carries whatever was collected and
    /// the reason the crawl stopped.
    pub async fn run(
        &self,
        fetcher: &impl ReviewFetch,
        start_url: &str,
    ) -> Result<CrawlReport, CrawlError> {
        let mut reviews = ReviewCollection::new();
        let mut skipped_fragments = 0;
        let mut page = 1;

        let termination = loop {
            let url = self.page_url(start_url, page);
            debug!("Fetching page {}: {}", page, url);

            let html = match fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(source) if page == 1 => return Err(CrawlError::FirstPage { url, source }),
                Err(source) => match self.policy.on_fetch_error {
                    FetchAction::Abort => return Err(CrawlError::Fetch { page, source }),
                    FetchAction::Stop => {
                        warn!("Stopping at page {}: {}", page, source);
                        break Termination::FetchFailed { page, error: source };
                    }
                },
            };

            let result = self.parser.parse_page(&html);

            let mut page_reviews: Vec<ReviewRecord> = Vec::with_capacity(result.fragments.len());
            for (index, fragment) in result.fragments.iter().enumerate() {
                match self.parser.parse_fragment(fragment, index) {
                    Ok(review) => page_reviews.push(review),
                    Err(source) => match self.policy.on_extraction_error {
                        ExtractionAction::Abort => {
                            return Err(CrawlError::Extraction { page, source });
                        }
                        ExtractionAction::Skip => {
                            warn!("Skipping malformed review on page {}: {}", page, source);
                            skipped_fragments += 1;
                        }
                    },
                }
            }

            debug!(
                "Page {} returned {} reviews from {} blocks",
                page,
                page_reviews.len(),
                result.fragments.len()
            );
            reviews.extend(page_reviews);

            if !result.has_next_page {
                debug!("No more pages available");
                break Termination::LastPage { page };
            }

            if page >= self.max_pages {
                warn!("Reached page limit ({}), more pages were available", self.max_pages);
                break Termination::PageLimit { limit: self.max_pages };
            }

            page += 1;
        };

        let pages_fetched = match termination {
            Termination::FetchFailed { page, .. } => page - 1,
            _ => page,
        };

        info!(
            "Collected {} reviews from {} pages ({} skipped)",
            reviews.len(),
            pages_fetched,
            skipped_fragments
        );

        Ok(CrawlReport { reviews, pages_fetched, skipped_fragments, termination })
    }
}

/// Builds the URL of `page`: the start URL itself for page 1, otherwise the
/// start URL with `param` set to the page number.
pub fn page_url(start_url: &str, page: u32, param: &str) -> String {
    if page <= 1 {
        return start_url.to_string();
    }

    let (base, fragment) = match start_url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (start_url, None),
    };
    let (path, query) = base.split_once('?').unwrap_or((base, ""));

    let key = urlencoding::encode(param);
    let page_pair = format!("{}={}", key, page);

    // Drop any page number already present in the start URL
    let mut pairs: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split_once('=').map_or(*pair, |(name, _)| name);
            name != param && name != key.as_ref()
        })
        .collect();
    pairs.push(&page_pair);

    let mut url = format!("{}?{}", path, pairs.join("&"));
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}
