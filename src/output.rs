//! Data structures for representing the output.

use crate::conclusions::ConclusionMode;
use crate::filter::Criteria;
use crate::sampling::Sampling;
use crate::sentiment::Sentiment;
use serde::{Deserialize, Serialize};

/// The four headline numbers. Averages and percentages are undefined for an empty view.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Metrics {
    pub count: usize,
    pub mean_rating: Option<f64>,
    pub positive_pct: Option<f64>,
    pub negative_pct: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct RatingCount {
    pub rating: f64,
    pub count: u64,
}

/// Five-number summary for a box plot.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SentimentRatings {
    pub sentiment: Sentiment,
    pub ratings: Vec<f64>,
    pub stats: BoxStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ranked {
    pub name: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Examples {
    Available(Vec<String>),
    NoneAvailable,
}

impl Examples {
    pub fn texts(&self) -> &[String] {
        match self {
            Examples::Available(texts) => texts,
            Examples::NoneAvailable => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RatingSummary {
    pub rating: u8,
    pub dominant_words: Vec<String>,
    pub conclusion: String,
    pub example: Option<String>,
}

/// The filtered view as a downloadable table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Export {
    pub filename: String,
    pub csv: String,
}

impl Export {
    pub fn bytes(&self) -> &[u8] {
        self.csv.as_bytes()
    }
}

/// Everything there is to show for one set of criteria.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Summary {
    pub criteria: Criteria,
    pub mode: ConclusionMode,
    pub sampling: Sampling,
    pub metrics: Metrics,
    pub rating_histogram: Vec<RatingCount>,
    pub ratings_by_sentiment: Vec<SentimentRatings>,
    pub word_cloud: Vec<WordCount>,
    pub top_reviewers: Vec<Ranked>,
    pub top_restaurants: Vec<Ranked>,
    pub positive_examples: Examples,
    pub negative_examples: Examples,
    pub ratings: Vec<RatingSummary>,
    pub export: Export,
}

#[derive(Serialize)]
pub struct OError {
    pub error: String,
}

/// A number with two decimals, or a dash if undefined.
pub fn pretty_number(x: Option<f64>) -> String {
    match x {
        Some(x) => format!("{x:.2}"),
        None => "–".to_owned(),
    }
}

pub fn pretty_pct(x: Option<f64>) -> String {
    match x {
        Some(x) => format!("{x:.1}%"),
        None => "–".to_owned(),
    }
}

/// Ratings are written like `4.0` or `4.5`.
pub fn pretty_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.1}")
    } else {
        format!("{rating}")
    }
}
