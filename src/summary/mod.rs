//! Aggregates over collected reviews: star distribution, average and sentiment.

use crate::reviews::ReviewCollection;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Whole-star bucket for a rating, rounding half up and clamping to 1-5.
pub fn star_bucket(rating: f64) -> Option<u8> {
    if !rating.is_finite() {
        return None;
    }
    Some((rating + 0.5).floor().clamp(1.0, 5.0) as u8)
}

/// Count of reviews per star bucket, highest first, empty buckets omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    buckets: Vec<(String, usize)>,
}

impl RatingDistribution {
    /// Counts ratings into the five star buckets.
    pub fn from_ratings(ratings: &[f64]) -> Self {
        let mut counts = [0usize; 5];
        for stars in ratings.iter().filter_map(|r| star_bucket(*r)) {
            counts[usize::from(stars) - 1] += 1;
        }

        let buckets = (1..=5u8)
            .rev()
            .map(|stars| (stars, counts[usize::from(stars) - 1]))
            .filter(|(_, count)| *count > 0)
            .map(|(stars, count)| (format!("{} Star", stars), count))
            .collect();

        Self { buckets }
    }

    pub fn from_reviews(reviews: &ReviewCollection) -> Self {
        Self::from_ratings(&reviews.ratings())
    }

    /// (label, count) pairs, e.g. ("5 Star", 2).
    pub fn buckets(&self) -> &[(String, usize)] {
        &self.buckets
    }

    /// Count for a label, or None if that bucket is empty.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.buckets.iter().find(|(l, _)| l == label).map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Overall mood of the reviews, picked from the average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Delighted,
    Pleased,
    Neutral,
    Unhappy,
}

impl Sentiment {
    /// Range buckets: [4.5, 5] delighted, [3.5, 4.5) pleased, [2.5, 3.5) neutral, below unhappy.
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            Sentiment::Delighted
        } else if average >= 3.5 {
            Sentiment::Pleased
        } else if average >= 2.5 {
            Sentiment::Neutral
        } else {
            Sentiment::Unhappy
        }
    }

    /// Image file shown for this sentiment.
    pub fn image_file(&self) -> &'static str {
        match self {
            Sentiment::Delighted => "smiley_smile.jpg",
            Sentiment::Pleased => "slight_smile.jpg",
            Sentiment::Neutral => "neutral_smiley.jpg",
            Sentiment::Unhappy => "sad_smiley.jpg",
        }
    }

    pub fn image_path(&self, image_dir: &Path) -> PathBuf {
        image_dir.join(self.image_file())
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Delighted => write!(f, "delighted"),
            Sentiment::Pleased => write!(f, "pleased"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Unhappy => write!(f, "unhappy"),
        }
    }
}

/// Everything the summary views need.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub count: usize,
    pub average: Option<f64>,
    pub distribution: RatingDistribution,
    pub sentiment: Option<Sentiment>,
    pub image: Option<PathBuf>,
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &ReviewCollection, image_dir: &Path) -> Self {
        let average = reviews.average_rating();
        let sentiment = average.map(Sentiment::from_average);

        Self {
            count: reviews.len(),
            average,
            distribution: RatingDistribution::from_reviews(reviews),
            sentiment,
            image: sentiment.map(|s| s.image_path(image_dir)),
        }
    }
}
