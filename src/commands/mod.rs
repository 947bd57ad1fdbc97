//! CLI command implementations.

pub mod reviews;

pub use reviews::ReviewsCommand;
