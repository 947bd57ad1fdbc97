//! amz-reviews - Collect and summarize Amazon product reviews
//!
//! Walks a product's review listing page by page, extracts each review,
//! and summarizes the ratings. Uses TLS fingerprint emulation for
//! reliable scraping without detection.

pub mod commands;
pub mod config;
pub mod format;
pub mod reviews;
pub mod summary;

pub use config::Config;
pub use reviews::{CrawlReport, Crawler, ReviewCollection, ReviewRecord};
pub use summary::{RatingDistribution, ReviewSummary, Sentiment};
