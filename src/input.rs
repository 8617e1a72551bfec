//! Review records.

use crate::sentiment::{Labeler, Scorer, Sentiment};
use chrono::NaiveDateTime;

/// One review, with its sentiment label fixed at construction time.
#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    reviewer: Option<String>,
    restaurant: Option<String>,
    rating: f64,
    time: NaiveDateTime,
    text: String,
    sentiment: Sentiment,
    extra: Vec<String>,
}

impl Review {
    pub fn new<S: Scorer>(
        labeler: &mut Labeler<S>,
        reviewer: Option<String>,
        restaurant: Option<String>,
        rating: f64,
        time: NaiveDateTime,
        text: String,
    ) -> Review {
        let sentiment = labeler.label(&text);
        Review {
            reviewer,
            restaurant,
            rating,
            time,
            text,
            sentiment,
            extra: vec![],
        }
    }

    /// Attach the values of additional input columns, kept for exporting.
    pub fn with_extra(mut self, extra: Vec<String>) -> Review {
        self.extra = extra;
        self
    }

    pub fn reviewer(&self) -> Option<&str> {
        self.reviewer.as_deref()
    }

    pub fn restaurant(&self) -> Option<&str> {
        self.restaurant.as_deref()
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    pub fn extra(&self) -> &[String] {
        &self.extra
    }
}
