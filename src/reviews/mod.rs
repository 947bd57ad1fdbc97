//! Review collection: fetching listing pages, parsing them, and walking pagination.

pub mod client;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod policy;
pub mod selectors;

pub use client::{ReviewClient, ReviewFetch};
pub use crawler::{page_url, Crawler};
pub use error::{CrawlError, ExtractionError, ExtractionReason, FetchError};
pub use models::{CrawlReport, PageResult, ReviewCollection, ReviewRecord, Termination};
pub use parser::Parser;
pub use policy::{ErrorPolicy, ExtractionAction, FetchAction};
