//! Continue-or-abort decisions for errors met during a crawl.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a page after the first cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchAction {
    /// End the crawl and keep what was collected.
    #[default]
    Stop,
    /// Fail the whole crawl.
    Abort,
}

/// What to do when a review block cannot be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionAction {
    /// Log it and move on to the next block.
    #[default]
    Skip,
    /// Fail the whole crawl.
    Abort,
}

/// Error policy for a crawl. The default is best effort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPolicy {
    #[serde(default)]
    pub on_fetch_error: FetchAction,

    #[serde(default)]
    pub on_extraction_error: ExtractionAction,
}

impl ErrorPolicy {
    /// Keeps partial results and skips malformed reviews.
    pub fn best_effort() -> Self {
        Self::default()
    }

    /// Fails on the first error of any kind.
    pub fn strict() -> Self {
        Self { on_fetch_error: FetchAction::Abort, on_extraction_error: ExtractionAction::Abort }
    }
}

impl FromStr for FetchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stop" => Ok(FetchAction::Stop),
            "abort" => Ok(FetchAction::Abort),
            _ => Err(format!("Unknown fetch action: {}. Use: stop, abort", s)),
        }
    }
}

impl fmt::Display for FetchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchAction::Stop => write!(f, "stop"),
            FetchAction::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for ExtractionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ExtractionAction::Skip),
            "abort" => Ok(ExtractionAction::Abort),
            _ => Err(format!("Unknown extraction action: {}. Use: skip, abort", s)),
        }
    }
}

impl fmt::Display for ExtractionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionAction::Skip => write!(f, "skip"),
            ExtractionAction::Abort => write!(f, "abort"),
        }
    }
}
