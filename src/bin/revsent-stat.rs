use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use itertools::Itertools;
use log::{error, info};
use revsent::dataset::{Dataset, Loader};
use revsent::errors::{self, Result};
use revsent::filter::{self, Criteria, RatingRange, RestaurantChoice};
use revsent::input::Review;
use revsent::output;
use revsent::sentiment::Sentiment;
use revsent::summary;
use std::collections::HashMap;
use std::process;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Input file (CSV)
    infile: String,
    /// Restaurant, or 'all'
    #[arg(long, default_value = "all")]
    restaurant: String,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

struct RawStat {
    reviews: u64,
    rating_sum: f64,
    sentiments: HashMap<Sentiment, u64>,
}

impl RawStat {
    fn new() -> Self {
        Self {
            reviews: 0,
            rating_sum: 0.0,
            sentiments: HashMap::new(),
        }
    }

    fn feed_review(&mut self, review: &Review) {
        self.reviews += 1;
        self.rating_sum += review.rating();
        *self.sentiments.entry(review.sentiment()).or_default() += 1;
    }

    fn print(&self, indent: &str) {
        let mean = if self.reviews == 0 {
            None
        } else {
            Some(self.rating_sum / self.reviews as f64)
        };
        println!("{indent}- reviews: {}", self.reviews);
        println!("{indent}- mean rating: {}", output::pretty_number(mean));
        for s in Sentiment::ALL {
            let n = self.sentiments.get(&s).copied().unwrap_or(0);
            println!("{indent}- {}: {n}", s.to_string().to_lowercase());
        }
    }
}

fn stat(args: &Args, dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(errors::bad_data("no reviews found"));
    }
    let restaurant = RestaurantChoice::parse(&args.restaurant);
    if let RestaurantChoice::Only(name) = &restaurant {
        if !dataset.restaurants().contains(&name.as_str()) {
            return Err(errors::invalid_setting(format!("unknown restaurant '{name}'")));
        }
    }
    let criteria = Criteria::build(dataset, RatingRange::default(), restaurant, None, None);
    let view = filter::apply(&criteria, dataset.reviews());

    let mut overall = RawStat::new();
    let mut by_restaurant: HashMap<&str, RawStat> = HashMap::new();
    let mut by_rating: HashMap<String, RawStat> = HashMap::new();
    for review in view.iter() {
        overall.feed_review(review);
        if let Some(name) = review.restaurant() {
            by_restaurant
                .entry(name)
                .or_insert_with(RawStat::new)
                .feed_review(review);
        }
        by_rating
            .entry(output::pretty_rating(review.rating()))
            .or_insert_with(RawStat::new)
            .feed_review(review);
    }

    println!("{}", criteria.pretty());
    overall.print("");
    println!("by restaurant:");
    for (name, s) in by_restaurant.iter().sorted_by_key(|(name, _)| *name) {
        println!("  {name}:");
        s.print("  ");
    }
    println!("by rating:");
    for (rating, s) in by_rating.iter().sorted_by_key(|(rating, _)| *rating) {
        println!("  {rating}:");
        s.print("  ");
    }
    println!("top reviewers:");
    for r in summary::top(view.iter().map(|r| r.reviewer()), summary::DEFAULT_TOP) {
        println!("  {}: {}", r.name, r.count);
    }
    Ok(())
}

fn process(args: &Args) -> Result<()> {
    let mut loader = Loader::builtin();
    let dataset = loader.load(&args.infile)?;
    stat(args, &dataset)
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(()) => info!(target: "revsent", "done"),
        Err(e) => {
            error!(target: "revsent", "{e}");
            process::exit(1);
        }
    }
}
