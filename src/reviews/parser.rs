//! HTML parser for Amazon review listing pages.

use crate::reviews::error::{ExtractionError, ExtractionReason};
use crate::reviews::models::{PageResult, ReviewRecord};
use crate::reviews::selectors::{errors, pagination, review};
use scraper::{Html, Selector};
use tracing::{debug, trace};

/// Parser for review listing pages and individual review blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Splits a listing page into review blocks and reads the pagination control.
    pub fn parse_page(&self, html: &str) -> PageResult {
        let document = Html::parse_document(html);

        let fragments: Vec<String> =
            document.select(&review::FRAGMENT).map(|element| element.html()).collect();

        let has_next_page = self.has_next_page(&document);

        debug!("Found {} review blocks (has_next_page: {})", fragments.len(), has_next_page);

        PageResult { fragments, has_next_page }
    }

    /// Extracts one review from the markup of a single review block.
    pub fn parse_fragment(&self, fragment: &str, index: usize) -> Result<ReviewRecord, ExtractionError> {
        let html = Html::parse_fragment(fragment);
        let fail = |reason| ExtractionError::new(index, reason);

        let name = first_text(&html, &review::NAME).ok_or_else(|| fail(ExtractionReason::MissingName))?;

        let rating_text =
            first_text(&html, &review::RATING).ok_or_else(|| fail(ExtractionReason::MissingRating))?;
        let rating = parse_rating(&rating_text)
            .ok_or_else(|| fail(ExtractionReason::UnparsableRating(rating_text.clone())))?;

        let message = first_text(&html, &review::BODY).ok_or_else(|| fail(ExtractionReason::MissingBody))?;

        trace!("Parsed review {}: {} ({})", index, name, rating);

        Ok(ReviewRecord::new(name, rating, message))
    }

    /// Returns true if the response is a CAPTCHA page.
    pub fn is_blocked(&self, html: &str) -> bool {
        Html::parse_document(html).select(&errors::CAPTCHA).next().is_some()
    }

    /// Disabled "next" wins over the enabled form; no control at all means no next page.
    fn has_next_page(&self, document: &Html) -> bool {
        if document.select(&pagination::DISABLED_LAST).next().is_some() {
            return false;
        }
        document.select(&pagination::NEXT).next().is_some()
    }
}

/// Trimmed text of the first match, or None if absent or blank.
fn first_text(html: &Html, selector: &Selector) -> Option<String> {
    let text = html.select(selector).next()?.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Extracts the score from text like "4.0 out of 5 stars".
pub fn parse_rating(text: &str) -> Option<f64> {
    let score = text.split(review::RATING_SEPARATOR).next()?.trim();
    if score.is_empty() {
        return None;
    }

    // Handle "4,0" format
    score.replace(',', ".").parse::<f64>().ok().filter(|value| value.is_finite())
}
