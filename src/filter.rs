//! Narrowing a dataset down by rating, date and restaurant.

use crate::dataset::Dataset;
use crate::errors::{self, Result};
use crate::input::Review;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Inclusive range of ratings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RatingRange(pub u8, pub u8);

impl RatingRange {
    pub fn contains(&self, rating: f64) -> bool {
        f64::from(self.0) <= rating && rating <= f64::from(self.1)
    }

    pub fn values(&self) -> impl Iterator<Item = u8> {
        self.0..=self.1
    }
}

impl Default for RatingRange {
    fn default() -> Self {
        RatingRange(MIN_RATING, MAX_RATING)
    }
}

/// Inclusive range of review times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateRange(pub NaiveDateTime, pub NaiveDateTime);

impl DateRange {
    /// From the start of `start` to the last instant of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> DateRange {
        let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .expect("valid time of day");
        DateRange(start.and_time(NaiveTime::MIN), end.and_time(last))
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.0 <= time && time <= self.1
    }
}

/// Which restaurants to keep.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum RestaurantChoice {
    #[default]
    All,
    Only(String),
}

impl RestaurantChoice {
    /// `all` (in any case) selects every restaurant.
    pub fn parse(s: &str) -> RestaurantChoice {
        if s.trim().eq_ignore_ascii_case("all") {
            RestaurantChoice::All
        } else {
            RestaurantChoice::Only(s.to_owned())
        }
    }

    pub fn matches(&self, restaurant: Option<&str>) -> bool {
        match self {
            RestaurantChoice::All => true,
            RestaurantChoice::Only(name) => restaurant == Some(name.as_str()),
        }
    }
}

impl fmt::Display for RestaurantChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RestaurantChoice::All => write!(f, "all restaurants"),
            RestaurantChoice::Only(name) => write!(f, "{name}"),
        }
    }
}

/// Filter criteria; all parts must match.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Criteria {
    pub ratings: RatingRange,
    pub dates: DateRange,
    pub restaurant: RestaurantChoice,
}

impl Criteria {
    /// Criteria that keep every review of the dataset.
    pub fn everything(dataset: &Dataset) -> Criteria {
        let dates = match dataset.time_span() {
            Some((lo, hi)) => DateRange::from_dates(lo.date(), hi.date()),
            None => DateRange(NaiveDateTime::MIN, NaiveDateTime::MAX),
        };
        Criteria {
            ratings: RatingRange::default(),
            dates,
            restaurant: RestaurantChoice::All,
        }
    }

    /// Criteria with the given parts; missing dates default to the dataset's time span.
    pub fn build(
        dataset: &Dataset,
        ratings: RatingRange,
        restaurant: RestaurantChoice,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Criteria {
        let DateRange(lo, hi) = Criteria::everything(dataset).dates;
        Criteria {
            ratings,
            dates: DateRange::from_dates(start.unwrap_or(lo.date()), end.unwrap_or(hi.date())),
            restaurant,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let RatingRange(lo, hi) = self.ratings;
        if lo < MIN_RATING || hi > MAX_RATING {
            return Err(errors::invalid_setting(format!(
                "ratings should be between {MIN_RATING} and {MAX_RATING}, got {lo}-{hi}"
            )));
        }
        if lo > hi {
            return Err(errors::invalid_setting(format!(
                "minimum rating {lo} is above maximum rating {hi}"
            )));
        }
        if self.dates.0 > self.dates.1 {
            return Err(errors::invalid_setting(format!(
                "start {} is after end {}",
                self.dates.0, self.dates.1
            )));
        }
        Ok(())
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.ratings.contains(review.rating())
            && self.dates.contains(review.time())
            && self.restaurant.matches(review.restaurant())
    }

    pub fn pretty(&self) -> String {
        format!(
            "rating {}-{}, {} to {}, {}",
            self.ratings.0,
            self.ratings.1,
            self.dates.0.date(),
            self.dates.1.date(),
            self.restaurant
        )
    }
}

/// Reviews that matched the criteria, in dataset order.
#[derive(Clone, Debug, Default)]
pub struct View<'a> {
    pub reviews: Vec<&'a Review>,
}

impl<'a> View<'a> {
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Review> + '_ {
        self.reviews.iter().copied()
    }
}

/// Select the reviews that match.
///
/// Works on a whole dataset as well as on an earlier view.
pub fn apply<'a, I>(criteria: &Criteria, reviews: I) -> View<'a>
where
    I: IntoIterator<Item = &'a Review>,
{
    View {
        reviews: reviews
            .into_iter()
            .filter(|r| criteria.matches(r))
            .collect_vec(),
    }
}
