//! Main entry point for summarizing a filtered view.

use crate::conclusions::{ConclusionMode, ConclusionTable};
use crate::dataset::{Dataset, Layout};
use crate::errors::{self, Result};
use crate::export;
use crate::filter::{self, Criteria, View};
use crate::information;
use crate::output::{
    BoxStats, Examples, Metrics, Ranked, RatingCount, RatingSummary, SentimentRatings, Summary,
    WordCount,
};
use crate::sampling::Sampling;
use crate::sentiment::Sentiment;
use crate::words;
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;
use std::ops::RangeInclusive;

pub const DEFAULT_TOP: usize = 5;
pub const DEFAULT_EXAMPLES: usize = 3;
pub const DEFAULT_DOMINANT_WORDS: usize = 10;
pub const DEFAULT_CLOUD_WORDS: usize = 200;

/// Allowed number of dominant words per rating.
pub const DOMINANT_WORDS_RANGE: RangeInclusive<usize> = 8..=10;

/// Allowed length of the reviewer and restaurant rankings.
pub const TOP_RANGE: RangeInclusive<usize> = 1..=5;

/// Allowed number of positive and negative example reviews.
pub const EXAMPLES_RANGE: RangeInclusive<usize> = 1..=3;

/// How to summarize?
pub struct SummaryArgs {
    /// Where per-rating words and conclusions come from.
    pub mode: ConclusionMode,

    /// Whether example reviews are picked reproducibly.
    pub sampling: Sampling,

    /// Conclusions used in [ConclusionMode::Static].
    pub table: ConclusionTable,

    /// Length of the reviewer and restaurant rankings.
    pub top: usize,

    /// Number of positive and negative example reviews.
    pub examples: usize,

    /// Number of dominant words per rating in [ConclusionMode::Live].
    pub dominant_words: usize,

    /// Number of words for the word cloud.
    pub cloud_words: usize,
}

impl Default for SummaryArgs {
    fn default() -> Self {
        SummaryArgs {
            mode: ConclusionMode::default(),
            sampling: Sampling::default(),
            table: ConclusionTable::builtin(),
            top: DEFAULT_TOP,
            examples: DEFAULT_EXAMPLES,
            dominant_words: DEFAULT_DOMINANT_WORDS,
            cloud_words: DEFAULT_CLOUD_WORDS,
        }
    }
}

/// Filter the dataset and summarize what is left.
///
/// This is the main entry point for the library.
pub fn calc(args: &SummaryArgs, criteria: &Criteria, dataset: &Dataset) -> Result<Summary> {
    criteria.validate()?;
    let view = filter::apply(criteria, dataset.reviews());
    information::post_statistics(criteria, &view);
    summarize(args, criteria, dataset.layout(), &view)
}

fn check_range(what: &str, value: usize, range: RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(errors::invalid_setting(format!(
            "number of {what} should be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

impl SummaryArgs {
    pub fn validate(&self) -> Result<()> {
        check_range("dominant words", self.dominant_words, DOMINANT_WORDS_RANGE)?;
        check_range("top entries", self.top, TOP_RANGE)?;
        check_range("example reviews", self.examples, EXAMPLES_RANGE)?;
        Ok(())
    }
}

/// Summarize a view that has already been filtered with `criteria`.
///
/// `layout` gives the column order of the export.
pub fn summarize(
    args: &SummaryArgs,
    criteria: &Criteria,
    layout: &Layout,
    view: &View,
) -> Result<Summary> {
    args.validate()?;
    let summary = Summary {
        criteria: criteria.clone(),
        mode: args.mode,
        sampling: args.sampling,
        metrics: metrics(view),
        rating_histogram: rating_histogram(view),
        ratings_by_sentiment: ratings_by_sentiment(view),
        word_cloud: word_cloud(view, args.cloud_words),
        top_reviewers: top(view.iter().map(|r| r.reviewer()), args.top),
        top_restaurants: top(view.iter().map(|r| r.restaurant()), args.top),
        positive_examples: examples(args, view, Sentiment::Positive),
        negative_examples: examples(args, view, Sentiment::Negative),
        ratings: rating_summaries(args, criteria, view)?,
        export: export::export(layout, view)?,
    };
    debug!(
        target: "revsent",
        "{}: {} reviews, {} rating summaries",
        criteria.pretty(),
        summary.metrics.count,
        summary.ratings.len()
    );
    Ok(summary)
}

fn percentage(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64 * 100.0)
    }
}

pub fn metrics(view: &View) -> Metrics {
    let count = view.len();
    let with = |s: Sentiment| view.iter().filter(|r| r.sentiment() == s).count();
    let mean_rating = if count == 0 {
        None
    } else {
        Some(view.iter().map(|r| r.rating()).sum::<f64>() / count as f64)
    };
    Metrics {
        count,
        mean_rating,
        positive_pct: percentage(with(Sentiment::Positive), count),
        negative_pct: percentage(with(Sentiment::Negative), count),
    }
}

pub fn rating_histogram(view: &View) -> Vec<RatingCount> {
    view.iter()
        .map(|r| r.rating())
        .sorted_by(f64::total_cmp)
        .dedup_with_count()
        .map(|(count, rating)| RatingCount {
            rating,
            count: count as u64,
        })
        .collect_vec()
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Box plot statistics, with quartiles interpolated linearly.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    Some(BoxStats {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Ratings grouped by sentiment, groups in order of first appearance.
pub fn ratings_by_sentiment(view: &View) -> Vec<SentimentRatings> {
    let order = view.iter().map(|r| r.sentiment()).unique().collect_vec();
    order
        .into_iter()
        .filter_map(|sentiment| {
            let ratings = view
                .iter()
                .filter(|r| r.sentiment() == sentiment)
                .map(|r| r.rating())
                .collect_vec();
            let stats = box_stats(&ratings)?;
            Some(SentimentRatings {
                sentiment,
                ratings,
                stats,
            })
        })
        .collect_vec()
}

pub fn word_cloud(view: &View, n: usize) -> Vec<WordCount> {
    words::frequencies(view.iter().map(|r| r.text()), n)
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect_vec()
}

/// The `n` most common names; equal counts keep their first-seen order.
pub fn top<'a, I>(names: I, n: usize) -> Vec<Ranked>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u64)> = vec![];
    for name in names.flatten() {
        match index.get(name) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(name, counts.len());
                counts.push((name, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(name, count)| Ranked {
            name: name.to_owned(),
            count,
        })
        .collect_vec()
}

pub fn examples(args: &SummaryArgs, view: &View, sentiment: Sentiment) -> Examples {
    let texts = view
        .iter()
        .filter(|r| r.sentiment() == sentiment)
        .map(|r| r.text())
        .collect_vec();
    if texts.is_empty() {
        return Examples::NoneAvailable;
    }
    let picked = args.sampling.sample(&texts, args.examples);
    Examples::Available(picked.into_iter().map(str::to_owned).collect_vec())
}

/// One summary per rating in the criteria that has at least one review.
pub fn rating_summaries(
    args: &SummaryArgs,
    criteria: &Criteria,
    view: &View,
) -> Result<Vec<RatingSummary>> {
    let mut summaries = vec![];
    for rating in criteria.ratings.values() {
        let texts = view
            .iter()
            .filter(|r| r.rating() == f64::from(rating))
            .map(|r| r.text())
            .collect_vec();
        if texts.is_empty() {
            continue;
        }
        let (dominant_words, conclusion) = match args.mode {
            ConclusionMode::Static => {
                let c = args.table.get(rating).ok_or_else(|| {
                    errors::bad_data(format!("no conclusion for rating {rating}"))
                })?;
                (c.words.clone(), c.conclusion.clone())
            }
            ConclusionMode::Live => {
                let w = words::dominant_words(texts.iter().copied(), args.dominant_words);
                let conclusion = words::reasons_sentence(&w);
                (w, conclusion)
            }
        };
        summaries.push(RatingSummary {
            rating,
            dominant_words,
            conclusion,
            example: args.sampling.pick(&texts).map(str::to_owned),
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::filter::{DateRange, RatingRange, RestaurantChoice};
    use crate::input::Review;
    use crate::sentiment::Labeler;
    use chrono::NaiveDate;

    fn dataset(rows: &[(&str, &str, f64, &str)]) -> Dataset {
        let mut l = Labeler::builtin();
        let t = NaiveDate::from_ymd_opt(2019, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let reviews = rows
            .iter()
            .map(|&(reviewer, restaurant, rating, text)| {
                Review::new(
                    &mut l,
                    Some(reviewer.to_owned()),
                    Some(restaurant.to_owned()),
                    rating,
                    t,
                    text.to_owned(),
                )
            })
            .collect_vec();
        Dataset::from_reviews(vec![], reviews)
    }

    fn sample() -> Dataset {
        dataset(&[
            ("ann", "A", 5.0, "great chicken"),
            ("bob", "A", 4.0, "good cake, good chocolate"),
            ("ann", "B", 1.0, "bad burger"),
            ("cid", "B", 3.0, "the biryani"),
            ("dan", "A", 5.0, "best chicken and great service"),
            ("bob", "B", 2.0, "cold food"),
            ("eve", "A", 4.5, "nice place"),
        ])
    }

    fn view(dataset: &Dataset) -> View {
        filter::apply(&Criteria::everything(dataset), dataset.reviews())
    }

    #[test]
    fn metrics_basic() {
        let d = sample();
        let m = metrics(&view(&d));
        assert_eq!(m.count, 7);
        assert!((m.mean_rating.unwrap() - 24.5 / 7.0).abs() < 1e-12);
        assert!((m.positive_pct.unwrap() - 4.0 / 7.0 * 100.0).abs() < 1e-9);
        assert!((m.negative_pct.unwrap() - 2.0 / 7.0 * 100.0).abs() < 1e-9);
        let sum = m.positive_pct.unwrap() + m.negative_pct.unwrap();
        assert!((0.0..=100.0).contains(&sum));
    }

    #[test]
    fn metrics_empty() {
        let m = metrics(&View::default());
        assert_eq!(m.count, 0);
        assert_eq!(m.mean_rating, None);
        assert_eq!(m.positive_pct, None);
        assert_eq!(m.negative_pct, None);
    }

    #[test]
    fn histogram_ascending() {
        let d = sample();
        let h = rating_histogram(&view(&d));
        let pairs = h.iter().map(|x| (x.rating, x.count)).collect_vec();
        assert_eq!(
            pairs,
            [(1.0, 1), (2.0, 1), (3.0, 1), (4.0, 1), (4.5, 1), (5.0, 2)]
        );
    }

    #[test]
    fn box_stats_interpolate() {
        let s = box_stats(&[5.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.5);
        assert_eq!(s.max, 5.0);
        assert_eq!(box_stats(&[4.0]).unwrap().q1, 4.0);
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn grouped_by_sentiment() {
        let d = sample();
        let g = ratings_by_sentiment(&view(&d));
        let order = g.iter().map(|x| x.sentiment).collect_vec();
        assert_eq!(
            order,
            [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
        );
        assert_eq!(g[0].ratings, [5.0, 4.0, 5.0, 4.5]);
        assert_eq!(g[1].ratings, [1.0, 2.0]);
        assert_eq!(g[2].ratings, [3.0]);
    }

    #[test]
    fn top_ties_keep_first_seen_order() {
        let names = ["x", "y", "z", "y", "x", "w", "v", "u", "t"];
        let t = top(names.iter().map(|&n| Some(n)), 5);
        let t = t.iter().map(|r| (r.name.as_str(), r.count)).collect_vec();
        assert_eq!(t, [("x", 2), ("y", 2), ("z", 1), ("w", 1), ("v", 1)]);
        assert!(top([None, Some("a"), None].into_iter(), 5).len() == 1);
        assert!(top(std::iter::empty(), 5).is_empty());
    }

    #[test]
    fn examples_counts() {
        let d = sample();
        let v = view(&d);
        let args = SummaryArgs::default();
        let pos = examples(&args, &v, Sentiment::Positive);
        assert_eq!(pos.texts().len(), 3);
        let neg = examples(&args, &v, Sentiment::Negative);
        assert_eq!(neg.texts(), ["bad burger", "cold food"]);
        let none = examples(&args, &View::default(), Sentiment::Positive);
        assert_eq!(none, Examples::NoneAvailable);
    }

    #[test]
    fn seeded_examples_are_reproducible() {
        let d = sample();
        let v = view(&d);
        let args = SummaryArgs {
            sampling: Sampling::Seeded(5),
            ..SummaryArgs::default()
        };
        assert_eq!(
            examples(&args, &v, Sentiment::Positive),
            examples(&args, &v, Sentiment::Positive)
        );
    }

    #[test]
    fn static_rating_summaries() {
        let d = sample();
        let v = view(&d);
        let args = SummaryArgs::default();
        let criteria = Criteria::everything(&d);
        let s = rating_summaries(&args, &criteria, &v).unwrap();
        assert_eq!(s.iter().map(|x| x.rating).collect_vec(), [1, 2, 3, 4, 5]);
        assert_eq!(s[3].dominant_words, args.table.get(4).unwrap().words);
        assert_eq!(s[3].example.as_deref(), Some("good cake, good chocolate"));
        assert_eq!(s[0].example.as_deref(), Some("bad burger"));
    }

    #[test]
    fn live_rating_summaries() {
        let d = sample();
        let v = view(&d);
        let args = SummaryArgs {
            mode: ConclusionMode::Live,
            ..SummaryArgs::default()
        };
        let criteria = Criteria {
            ratings: RatingRange(4, 5),
            ..Criteria::everything(&d)
        };
        let s = rating_summaries(&args, &criteria, &v).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].dominant_words, ["good", "cake", "chocolate"]);
        assert_eq!(
            s[1].dominant_words,
            ["great", "chicken", "best", "service"]
        );
        assert_eq!(
            s[1].conclusion,
            "Reviewers most often mention great, chicken, best, service."
        );
    }

    #[test]
    fn summarize_empty_view() {
        let d = sample();
        let criteria = Criteria {
            ratings: RatingRange(1, 5),
            dates: DateRange::from_dates(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            ),
            restaurant: RestaurantChoice::All,
        };
        let s = calc(&SummaryArgs::default(), &criteria, &d).unwrap();
        assert_eq!(s.metrics.count, 0);
        assert_eq!(s.metrics.mean_rating, None);
        assert!(s.rating_histogram.is_empty());
        assert!(s.ratings_by_sentiment.is_empty());
        assert!(s.word_cloud.is_empty());
        assert!(s.top_reviewers.is_empty());
        assert!(s.top_restaurants.is_empty());
        assert_eq!(s.positive_examples, Examples::NoneAvailable);
        assert_eq!(s.negative_examples, Examples::NoneAvailable);
        assert!(s.ratings.is_empty());
        assert_eq!(s.export.csv, "Reviewer,Restaurant,Rating,Time,Review,Sentiment\n");
    }

    #[test]
    fn calc_rejects_bad_criteria() {
        let d = sample();
        let criteria = Criteria {
            ratings: RatingRange(5, 1),
            ..Criteria::everything(&d)
        };
        assert!(calc(&SummaryArgs::default(), &criteria, &d).is_err());
        let args = SummaryArgs {
            dominant_words: 3,
            ..SummaryArgs::default()
        };
        assert!(calc(&args, &Criteria::everything(&d), &d).is_err());
    }

    #[test]
    fn calc_rejects_bad_settings() {
        let d = sample();
        let criteria = Criteria::everything(&d);
        for examples in [0, 4, 7] {
            let args = SummaryArgs {
                examples,
                ..SummaryArgs::default()
            };
            let e = calc(&args, &criteria, &d).unwrap_err();
            assert!(errors::is_invalid_setting(&*e));
        }
        for top in [0, 6, 50] {
            let args = SummaryArgs {
                top,
                ..SummaryArgs::default()
            };
            let e = calc(&args, &criteria, &d).unwrap_err();
            assert!(errors::is_invalid_setting(&*e));
        }
        let args = SummaryArgs {
            examples: 1,
            top: 1,
            ..SummaryArgs::default()
        };
        let s = calc(&args, &criteria, &d).unwrap();
        assert_eq!(s.positive_examples.texts().len(), 1);
        assert_eq!(s.top_reviewers.len(), 1);
        assert_eq!(s.sampling, args.sampling);
    }

    #[test]
    fn top_restaurants_in_summary() {
        let d = sample();
        let s = calc(&SummaryArgs::default(), &Criteria::everything(&d), &d).unwrap();
        let r = s.top_restaurants.iter().map(|x| (x.name.as_str(), x.count)).collect_vec();
        assert_eq!(r, [("A", 4), ("B", 3)]);
        let r = s.top_reviewers.iter().map(|x| (x.name.as_str(), x.count)).collect_vec();
        assert_eq!(r, [("ann", 2), ("bob", 2), ("cid", 1), ("dan", 1), ("eve", 1)]);
        assert!(s.top_reviewers.is_sorted_by(|a, b| a.count >= b.count));
    }
}
