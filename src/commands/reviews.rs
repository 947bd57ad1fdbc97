//! Review collection command implementation.

use crate::config::{Config, OutputFormat};
use crate::format::Formatter;
use crate::reviews::{CrawlReport, Crawler, ReviewClient, ReviewFetch, Termination};
use crate::summary::ReviewSummary;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Collects reviews from a listing, exports them and summarizes the ratings.
pub struct ReviewsCommand {
    config: Config,
}

impl ReviewsCommand {
    /// Creates a new reviews command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the crawl and returns formatted output.
    pub async fn execute(&self, url: &str) -> Result<String> {
        let client = ReviewClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, url).await
    }

    /// Runs the crawl with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl ReviewFetch, url: &str) -> Result<String> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("Invalid review page URL: '{}'. Expected an http(s) URL.", url);
        }

        info!("Collecting reviews from: {}", url);

        let crawler = Crawler::new(&self.config);
        let report = crawler.run(client, url).await?;

        if let Some(path) = &self.config.output {
            write_export(&report, path)?;
            info!("Wrote {} reviews to {}", report.reviews.len(), path.display());
        }

        let summary = ReviewSummary::from_reviews(&report.reviews, &self.config.image_dir);
        Ok(self.render(&report, &summary))
    }

    fn render(&self, report: &CrawlReport, summary: &ReviewSummary) -> String {
        let formatter = Formatter::new(self.config.format);
        let mut sections = vec![formatter.format_reviews(&report.reviews)];

        let summary_text = formatter.format_summary(summary);
        if !summary_text.is_empty() {
            sections.push(summary_text);
        }

        if let Some(note) = status_note(report) {
            warn!("{}", note);
            if matches!(self.config.format, OutputFormat::Table | OutputFormat::Markdown) {
                sections.push(note);
            }
        }

        sections.join("\n\n")
    }
}

/// Describes an incomplete crawl, if it was one.
fn status_note(report: &CrawlReport) -> Option<String> {
    let mut notes = Vec::new();

    match &report.termination {
        Termination::FetchFailed { page, error } => {
            notes.push(format!("Stopped early at page {}: {}", page, error));
        }
        Termination::PageLimit { limit } => {
            notes.push(format!("Stopped at the page limit ({}); more pages were available", limit));
        }
        Termination::LastPage { .. } => {}
    }

    if report.skipped_fragments > 0 {
        notes.push(format!("Skipped {} malformed reviews", report.skipped_fragments));
    }

    if notes.is_empty() {
        None
    } else {
        Some(notes.join("\n"))
    }
}

fn write_export(report: &CrawlReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut csv = Formatter::csv_export(&report.reviews);
    csv.push('\n');

    std::fs::write(path, csv).with_context(|| format!("Failed to write export file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::{CrawlError, FetchError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Mock review client for testing.
    struct MockReviewClient {
        responses: Vec<Result<String, FetchError>>,
        call_count: Arc<AtomicU32>,
    }

    impl MockReviewClient {
        fn new(pages: Vec<String>) -> Self {
            Self::with_responses(pages.into_iter().map(Ok).collect())
        }

        fn with_responses(responses: Vec<Result<String, FetchError>>) -> Self {
            Self { responses, call_count: Arc::new(AtomicU32::new(0)) }
        }

        fn call_count(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReviewFetch for MockReviewClient {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst) as usize;
            match self.responses.get(idx) {
                Some(response) => response.clone(),
                None => Ok("<html></html>".to_string()),
            }
        }
    }

    fn make_test_config() -> Config {
        Config { delay_ms: 0, delay_jitter_ms: 0, ..Config::default() }
    }

    fn make_reviews_html(reviews: &[(&str, &str, &str)], has_next: bool) -> String {
        let mut html = String::from("<html><body>");
        for (name, rating, body) in reviews {
            html.push_str(&format!(
                r#"<div class="a-section review aok-relative">
                    <span class="a-profile-name">{}</span>
                    <span class="a-icon-alt">{}</span>
                    <span class="a-size-base review-text review-text-content">{}</span>
                </div>"#,
                name, rating, body
            ));
        }
        if has_next {
            html.push_str(r#"<ul class="a-pagination"><li class="a-last"><a>Next</a></li></ul>"#);
        } else {
            html.push_str(r#"<ul class="a-pagination"><li class="a-disabled a-last">Next</li></ul>"#);
        }
        html.push_str("</body></html>");
        html
    }

    const URL: &str = "https://www.amazon.com/product-reviews/B08N5WRWNW?ie=UTF8";

    #[tokio::test]
    async fn test_reviews_command_basic() {
        let html = make_reviews_html(
            &[
                ("Jane", "5.0 out of 5 stars", "Love it"),
                ("Sam", "4.0 out of 5 stars", "Pretty good"),
            ],
            false,
        );

        let client = MockReviewClient::new(vec![html]);
        let cmd = ReviewsCommand::new(make_test_config());

        let output = cmd.execute_with_client(&client, URL).await.unwrap();
        assert!(output.contains("Jane"));
        assert!(output.contains("Pretty good"));
        assert!(output.contains("Total: 2 reviews"));
        assert!(output.contains("Average: 4.50/5 (2 reviews)"));
        assert!(output.contains("smiley_smile.jpg"));
        assert!(!output.contains("Stopped"));
    }

    #[tokio::test]
    async fn test_reviews_command_pagination() {
        let page1 = make_reviews_html(
            &[("A", "5.0 out of 5 stars", "one"), ("B", "3.0 out of 5 stars", "two")],
            true,
        );
        let page2 = make_reviews_html(&[("C", "1.0 out of 5 stars", "three")], false);

        let client = MockReviewClient::new(vec![page1, page2]);
        let mut config = make_test_config();
        config.format = OutputFormat::Json;

        let cmd = ReviewsCommand::new(config);
        let output = cmd.execute_with_client(&client, URL).await.unwrap();

        assert_eq!(client.call_count(), 2);
        assert!(output.starts_with('['));
        let a = output.find("\"A\"").unwrap();
        let b = output.find("\"B\"").unwrap();
        let c = output.find("\"C\"").unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn test_reviews_command_writes_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("reviews.csv");

        let html = make_reviews_html(&[("Jane", "4.0 out of 5 stars", "Nice, sturdy")], false);
        let client = MockReviewClient::new(vec![html]);

        let mut config = make_test_config();
        config.output = Some(path.clone());

        let cmd = ReviewsCommand::new(config);
        cmd.execute_with_client(&client, URL).await.unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv, "Name,Rating,Message,n_rating\nJane,4.0,\"Nice, sturdy\",4\n");
    }

    #[tokio::test]
    async fn test_reviews_command_first_page_failure() {
        let client = MockReviewClient::with_responses(vec![Err(FetchError::Status {
            url: URL.to_string(),
            status: 404,
        })]);
        let cmd = ReviewsCommand::new(make_test_config());

        let err = cmd.execute_with_client(&client, URL).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<CrawlError>(), Some(CrawlError::FirstPage { .. })));
    }

    #[tokio::test]
    async fn test_reviews_command_partial_results_note() {
        let page1 = make_reviews_html(&[("Jane", "2.0 out of 5 stars", "Meh")], true);
        let client = MockReviewClient::with_responses(vec![
            Ok(page1),
            Err(FetchError::RateLimited { url: URL.to_string() }),
        ]);
        let cmd = ReviewsCommand::new(make_test_config());

        let output = cmd.execute_with_client(&client, URL).await.unwrap();
        assert!(output.contains("Jane"));
        assert!(output.contains("Stopped early at page 2"));
        assert!(output.contains("sad_smiley.jpg"));
    }

    #[tokio::test]
    async fn test_reviews_command_skipped_note() {
        let html = make_reviews_html(
            &[("Jane", "4.0 out of 5 stars", "Fine"), ("Bad", "no stars", "x")],
            false,
        );
        let client = MockReviewClient::new(vec![html]);
        let cmd = ReviewsCommand::new(make_test_config());

        let output = cmd.execute_with_client(&client, URL).await.unwrap();
        assert!(output.contains("Total: 1 reviews"));
        assert!(output.contains("Skipped 1 malformed reviews"));
    }

    #[tokio::test]
    async fn test_reviews_command_csv_has_no_notes() {
        let html = make_reviews_html(&[("Bad", "no stars", "x")], false);
        let client = MockReviewClient::new(vec![html]);
        let mut config = make_test_config();
        config.format = OutputFormat::Csv;

        let cmd = ReviewsCommand::new(config);
        let output = cmd.execute_with_client(&client, URL).await.unwrap();
        assert_eq!(output, "Name,Rating,Message,n_rating");
    }

    #[tokio::test]
    async fn test_reviews_command_invalid_url() {
        let client = MockReviewClient::new(vec![]);
        let cmd = ReviewsCommand::new(make_test_config());

        let err = cmd.execute_with_client(&client, "not a url").await.unwrap_err();
        assert!(err.to_string().contains("Invalid review page URL"));
        assert_eq!(client.call_count(), 0);
    }
}
