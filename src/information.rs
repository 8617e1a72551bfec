use crate::dataset::{Dataset, LoadStats};
use crate::filter::{Criteria, View};
use crate::input::Review;
use crate::sentiment::Sentiment;
use itertools::Itertools;
use log::{debug, info};

fn explain_sentiments<'a, I>(reviews: I) -> String
where
    I: Iterator<Item = &'a Review>,
{
    let counts = reviews.map(|r| r.sentiment()).counts();
    Sentiment::ALL
        .iter()
        .map(|s| format!("{} = {}", s, counts.get(s).copied().unwrap_or(0)))
        .join(", ")
}

pub fn statistics(stats: &LoadStats, dataset: &Dataset) {
    info!(target: "revsent", "rows: {}, kept: {}", stats.rows, stats.kept());
    debug!(
        target: "revsent",
        "dropped: {} malformed, {} without review text, {} with invalid rating, {} with invalid time",
        stats.malformed,
        stats.missing_text,
        stats.bad_rating,
        stats.bad_time
    );
    info!(target: "revsent", "restaurants: {}", dataset.restaurants().len());
    if let Some((lo, hi)) = dataset.time_span() {
        info!(target: "revsent", "time span: {} to {}", lo, hi);
    }
    info!(
        target: "revsent",
        "sentiments: {}",
        explain_sentiments(dataset.reviews().iter())
    );
}

pub fn post_statistics(criteria: &Criteria, view: &View) {
    info!(target: "revsent", "filter: {}", criteria.pretty());
    info!(target: "revsent", "after filtering: reviews: {}", view.len());
    debug!(
        target: "revsent",
        "after filtering: sentiments: {}",
        explain_sentiments(view.iter())
    );
}
