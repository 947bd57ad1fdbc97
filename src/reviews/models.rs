//! Data models for review records and crawl results.

use crate::reviews::error::FetchError;
use serde::{Deserialize, Serialize};

/// One customer review extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    name: String,
    rating: f64,
    message: String,
}

impl ReviewRecord {
    /// Creates a record, trimming the text fields.
    pub fn new(name: impl AsRef<str>, rating: f64, message: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            rating,
            message: message.as_ref().trim().to_string(),
        }
    }

    /// Reviewer display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Star rating (observed 1.0 - 5.0).
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Review body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Review blocks and pagination state of one fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Outer HTML of each review block, in document order.
    pub fragments: Vec<String>,
    /// Whether the pagination control offers a next page.
    pub has_next_page: bool,
}

/// Reviews in page order, then in order within each page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewCollection {
    reviews: Vec<ReviewRecord>,
}

impl ReviewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record.
    pub fn push(&mut self, review: ReviewRecord) {
        self.reviews.push(review);
    }

    /// Appends records, keeping their order.
    pub fn extend(&mut self, reviews: impl IntoIterator<Item = ReviewRecord>) {
        self.reviews.extend(reviews);
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewRecord> {
        self.reviews.iter()
    }

    pub fn as_slice(&self) -> &[ReviewRecord] {
        &self.reviews
    }

    /// Returns every rating in collection order.
    pub fn ratings(&self) -> Vec<f64> {
        self.reviews.iter().map(ReviewRecord::rating).collect()
    }

    /// Arithmetic mean of all ratings, or None when empty.
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: f64 = self.reviews.iter().map(ReviewRecord::rating).sum();
        Some(total / self.reviews.len() as f64)
    }
}

impl<'a> IntoIterator for &'a ReviewCollection {
    type Item = &'a ReviewRecord;
    type IntoIter = std::slice::Iter<'a, ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.iter()
    }
}

impl FromIterator<ReviewRecord> for ReviewCollection {
    fn from_iter<I: IntoIterator<Item = ReviewRecord>>(iter: I) -> Self {
        Self { reviews: iter.into_iter().collect() }
    }
}

/// Why a crawl stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The pagination control showed no further page.
    LastPage { page: u32 },
    /// The configured page cap was reached while more pages were offered.
    PageLimit { limit: u32 },
    /// A page after the first could not be fetched.
    FetchFailed { page: u32, error: FetchError },
}

impl Termination {
    /// Returns true if the crawl stopped early on an error.
    pub fn is_partial(&self) -> bool {
        matches!(self, Termination::FetchFailed { .. })
    }
}

/// Result of one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub reviews: ReviewCollection,
    pub pages_fetched: u32,
    /// Review blocks dropped because they could not be extracted.
    pub skipped_fragments: usize,
    pub termination: Termination,
}
