//! Output formatting for reviews and summaries (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::reviews::{ReviewCollection, ReviewRecord};
use crate::summary::{RatingDistribution, ReviewSummary};

const BAR_WIDTH: usize = 30;

/// Formats reviews for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a collection of reviews.
    pub fn format_reviews(&self, reviews: &ReviewCollection) -> String {
        if reviews.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header().to_string(),
                _ => "No reviews found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_reviews(reviews),
            OutputFormat::Table => self.table_reviews(reviews.as_slice()),
            OutputFormat::Markdown => self.markdown_reviews(reviews.as_slice()),
            OutputFormat::Csv => Self::csv_export(reviews),
        }
    }

    /// Formats the rating summary. CSV output has no summary section.
    pub fn format_summary(&self, summary: &ReviewSummary) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_summary(summary),
            OutputFormat::Markdown => self.markdown_summary(summary),
            OutputFormat::Csv => String::new(),
        }
    }

    // JSON formatting

    fn json_reviews(&self, reviews: &ReviewCollection) -> String {
        serde_json::to_string_pretty(reviews).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_reviews(&self, reviews: &[ReviewRecord]) -> String {
        let name_width = 20;
        let rating_width = 6;
        let message_width = 60;

        let mut lines = Vec::new();

        lines.push(format!("{:<name_width$}  {:>rating_width$}  {}", "Name", "Rating", "Review"));
        lines.push(format!(
            "{:-<name_width$}  {:-<rating_width$}  {:-<message_width$}",
            "", "", ""
        ));

        for review in reviews {
            lines.push(format!(
                "{:<name_width$}  {:>rating_width$.1}  {}",
                truncate(review.name(), name_width),
                review.rating(),
                truncate(&single_line(review.message()), message_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} reviews", reviews.len()));

        lines.join("\n")
    }

    fn table_summary(&self, summary: &ReviewSummary) -> String {
        let mut lines = Vec::new();

        lines.push("Rating distribution:".to_string());
        if summary.distribution.is_empty() {
            lines.push("  (no ratings)".to_string());
        }
        lines.extend(bars(&summary.distribution));

        lines.push(String::new());
        match summary.average {
            Some(average) => {
                lines.push(format!("Average: {:.2}/5 ({} reviews)", average, summary.count))
            }
            None => lines.push("Average: N/A".to_string()),
        }

        if let (Some(sentiment), Some(image)) = (&summary.sentiment, &summary.image) {
            lines.push(format!("Sentiment: {} ({})", sentiment, image.display()));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_reviews(&self, reviews: &[ReviewRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| Name | Rating | Review |".to_string());
        lines.push("|------|--------|--------|".to_string());

        for review in reviews {
            lines.push(format!(
                "| {} | {:.1} | {} |",
                markdown_escape(review.name()),
                review.rating(),
                markdown_escape(&truncate(&single_line(review.message()), 80))
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} reviews found*", reviews.len()));

        lines.join("\n")
    }

    fn markdown_summary(&self, summary: &ReviewSummary) -> String {
        let mut lines = Vec::new();

        lines.push("## Rating distribution".to_string());
        lines.push(String::new());
        lines.push("| Rating | Count |".to_string());
        lines.push("|--------|-------|".to_string());
        for (label, count) in summary.distribution.buckets() {
            lines.push(format!("| {} | {} |", label, count));
        }

        lines.push(String::new());
        if let Some(average) = summary.average {
            lines.push(format!("- **Average:** {:.2}/5 ({} reviews)", average, summary.count));
        }
        if let (Some(sentiment), Some(image)) = (&summary.sentiment, &summary.image) {
            lines.push(format!("- **Sentiment:** {} ![{}]({})", sentiment, sentiment, image.display()));
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header() -> &'static str {
        "Name,Rating,Message,n_rating"
    }

    /// Spreadsheet export: header row, then one row per review in collection order.
    pub fn csv_export(reviews: &ReviewCollection) -> String {
        let mut lines = Vec::new();
        lines.push(Self::csv_header().to_string());

        for review in reviews {
            lines.push(format!(
                "{},{:.1},{},{}",
                Self::csv_escape(review.name()),
                review.rating(),
                Self::csv_escape(review.message()),
                review.rating()
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// One bar line per non-empty bucket, scaled to the largest bucket.
fn bars(distribution: &RatingDistribution) -> Vec<String> {
    let max = distribution.buckets().iter().map(|(_, count)| *count).max().unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }

    distribution
        .buckets()
        .iter()
        .map(|(label, count)| {
            let width = (count * BAR_WIDTH).div_ceil(max);
            format!("  {:<7} {} {}", label, "█".repeat(width), count)
        })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn markdown_escape(s: &str) -> String {
    s.replace('|', "\\|")
}
