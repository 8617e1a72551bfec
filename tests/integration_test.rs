use chrono::NaiveDate;
use itertools::Itertools;
use revsent::conclusions::ConclusionMode;
use revsent::dataset::{self, Dataset, Loader};
use revsent::errors;
use revsent::filter::{Criteria, DateRange, RatingRange, RestaurantChoice};
use revsent::output::{Examples, Summary};
use revsent::sampling::Sampling;
use revsent::sentiment::{Labeler, Sentiment};
use revsent::session::Session;
use revsent::summary::{self, SummaryArgs};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn init() {
    let _ = pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

fn path(filename: &str) -> PathBuf {
    let dir = env!("CARGO_MANIFEST_DIR");
    let mut path = PathBuf::from(dir);
    path.push(filename);
    path
}

fn slurp(filename: &str) -> String {
    fs::read_to_string(path(filename)).unwrap()
}

fn load() -> Arc<Dataset> {
    Loader::builtin().load(path("sample-data/reviews.csv")).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 5, d).unwrap()
}

fn check_invariants(args: &SummaryArgs, summary: &Summary) {
    for ex in [&summary.positive_examples, &summary.negative_examples] {
        assert!(ex.texts().len() <= args.examples);
    }
    for list in [&summary.top_reviewers, &summary.top_restaurants] {
        assert!(list.len() <= args.top);
        assert!(list.is_sorted_by(|a, b| a.count >= b.count));
    }
    for pct in [summary.metrics.positive_pct, summary.metrics.negative_pct] {
        if let Some(pct) = pct {
            assert!((0.0..=100.0).contains(&pct));
        }
    }
    let total: u64 = summary.rating_histogram.iter().map(|rc| rc.count).sum();
    assert_eq!(total as usize, summary.metrics.count);
}

#[test]
fn test_load_stats() {
    init();
    let data = slurp("sample-data/reviews.csv");
    let mut labeler = Labeler::builtin();
    let (dataset, stats) = dataset::read(data.as_bytes(), &mut labeler).unwrap();
    assert_eq!(stats.rows, 19);
    assert_eq!(stats.malformed, 0);
    assert_eq!(stats.missing_text, 1);
    assert_eq!(stats.bad_rating, 1);
    assert_eq!(stats.bad_time, 1);
    assert_eq!(stats.kept(), 16);
    assert_eq!(dataset.len(), 16);
    assert_eq!(dataset.extra_headers(), ["Metadata", "Pictures"]);
    assert_eq!(dataset.restaurants(), ["Beyond Flavours", "Paradise"]);
    let (lo, hi) = dataset.time_span().unwrap();
    assert_eq!(lo, day(1).and_hms_opt(20, 0, 0).unwrap());
    assert_eq!(hi, day(30).and_hms_opt(15, 54, 0).unwrap());
    let mixed = dataset
        .reviews()
        .iter()
        .find(|r| r.text() == "great food, but bad service")
        .unwrap();
    assert_eq!(mixed.sentiment(), Sentiment::Positive);
}

#[test]
fn test_upper_ratings() {
    init();
    let dataset = load();
    let args = SummaryArgs::default();
    let criteria = Criteria::build(&dataset, RatingRange(3, 5), RestaurantChoice::All, None, None);
    assert_eq!(criteria.dates, DateRange::from_dates(day(1), day(30)));
    let summary = summary::calc(&args, &criteria, &dataset).unwrap();
    check_invariants(&args, &summary);

    let m = &summary.metrics;
    assert_eq!(m.count, 11);
    assert_eq!(m.mean_rating, Some(4.0));
    assert!((m.positive_pct.unwrap() - 700.0 / 11.0).abs() < 1e-9);
    assert!((m.negative_pct.unwrap() - 100.0 / 11.0).abs() < 1e-9);

    let histogram = summary
        .rating_histogram
        .iter()
        .map(|rc| (rc.rating, rc.count))
        .collect_vec();
    assert_eq!(histogram, [(3.0, 4), (4.0, 3), (5.0, 4)]);

    let ratings = summary.ratings.iter().map(|r| r.rating).collect_vec();
    assert_eq!(ratings, [3, 4, 5]);
    for r in &summary.ratings {
        assert!(r.example.is_some());
        assert!(!r.conclusion.is_empty());
    }

    assert_eq!(summary.top_restaurants[0].name, "Beyond Flavours");
    assert_eq!(summary.top_restaurants[0].count, 6);
    assert_eq!(summary.top_restaurants[1].count, 5);
    assert_eq!(summary.top_reviewers[0].count, 2);
    assert_eq!(summary.top_reviewers[1].count, 2);
    assert_eq!(summary.top_reviewers[2].count, 1);

    match &summary.negative_examples {
        Examples::Available(texts) => assert_eq!(texts.len(), 1),
        Examples::NoneAvailable => panic!("expected a negative example"),
    }
    assert_eq!(summary.positive_examples.texts().len(), 3);

    let mut reader = csv::Reader::from_reader(summary.export.bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect_vec(),
        ["Restaurant", "Reviewer", "Review", "Rating", "Metadata", "Time", "Pictures", "Sentiment"]
    );
    let rows = reader.records().map(|r| r.unwrap()).collect_vec();
    assert_eq!(rows.len(), 11);
    assert!(rows.iter().all(|r| r[3].parse::<f64>().unwrap() >= 3.0));
}

#[test]
fn test_one_restaurant_low_ratings() {
    init();
    let dataset = load();
    let args = SummaryArgs {
        mode: ConclusionMode::Live,
        ..SummaryArgs::default()
    };
    let criteria = Criteria::build(
        &dataset,
        RatingRange(1, 2),
        RestaurantChoice::parse("Paradise"),
        None,
        None,
    );
    let summary = summary::calc(&args, &criteria, &dataset).unwrap();
    check_invariants(&args, &summary);
    assert_eq!(summary.metrics.count, 3);
    assert_eq!(summary.metrics.negative_pct, Some(100.0));
    assert_eq!(summary.metrics.positive_pct, Some(0.0));
    assert_eq!(summary.positive_examples, Examples::NoneAvailable);
    assert_eq!(summary.top_restaurants.len(), 1);
    let ratings = summary.ratings.iter().map(|r| r.rating).collect_vec();
    assert_eq!(ratings, [1, 2]);
    let pizza = &summary.ratings[0];
    assert!(pizza.dominant_words.contains(&"pizza".to_owned()));
    assert!(pizza.dominant_words.len() <= args.dominant_words);
}

#[test]
fn test_empty_window() {
    init();
    let dataset = load();
    let args = SummaryArgs::default();
    let criteria = Criteria {
        ratings: RatingRange(1, 5),
        dates: DateRange::from_dates(
            NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 6, 30).unwrap(),
        ),
        restaurant: RestaurantChoice::All,
    };
    let summary = summary::calc(&args, &criteria, &dataset).unwrap();
    check_invariants(&args, &summary);
    assert_eq!(summary.metrics.count, 0);
    assert_eq!(summary.metrics.mean_rating, None);
    assert_eq!(summary.metrics.positive_pct, None);
    assert_eq!(summary.metrics.negative_pct, None);
    assert_eq!(summary.positive_examples, Examples::NoneAvailable);
    assert_eq!(summary.negative_examples, Examples::NoneAvailable);
    assert!(summary.ratings.is_empty());
    assert!(summary.rating_histogram.is_empty());
    assert!(summary.word_cloud.is_empty());
    assert!(summary.top_reviewers.is_empty());
    let csv = &summary.export.csv;
    assert_eq!(csv.lines().count(), 1);
    assert!(csv.starts_with("Restaurant,Reviewer,Review,Rating,"));
}

#[test]
fn test_seeded_examples_repeat() {
    init();
    let dataset = load();
    let criteria = Criteria::everything(&dataset);
    let args = SummaryArgs {
        sampling: Sampling::Seeded(42),
        ..SummaryArgs::default()
    };
    let a = summary::calc(&args, &criteria, &dataset).unwrap();
    let b = summary::calc(&args, &criteria, &dataset).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.sampling, Sampling::Seeded(42));
    let args = SummaryArgs {
        sampling: Sampling::Unseeded,
        ..SummaryArgs::default()
    };
    let c = summary::calc(&args, &criteria, &dataset).unwrap();
    check_invariants(&args, &c);
    assert_eq!(a.metrics, c.metrics);
}

#[test]
fn test_loader_cache() {
    init();
    let mut loader = Loader::builtin();
    let a = loader.load(path("sample-data/reviews.csv")).unwrap();
    let b = loader.load(path("sample-data/reviews.csv")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    let e = loader.load(path("sample-data/no-such-file.csv")).unwrap_err();
    assert!(errors::is_data_source_unavailable(&*e));
}

#[test]
fn test_sessions() {
    init();
    let dataset = load();
    let mut first = Session::new(Arc::clone(&dataset), SummaryArgs::default());
    let mut second = Session::new(dataset, SummaryArgs::default());
    first.refresh().unwrap();
    second.refresh().unwrap();
    let criteria = Criteria {
        restaurant: RestaurantChoice::parse("Beyond Flavours"),
        ..first.criteria().clone()
    };
    assert_eq!(first.update(criteria).unwrap().metrics.count, 8);
    assert_eq!(second.summary().unwrap().metrics.count, 16);
    let bad = Criteria {
        ratings: RatingRange(5, 1),
        ..second.criteria().clone()
    };
    let e = second.update(bad).unwrap_err();
    assert!(errors::is_invalid_setting(&*e));
    assert_eq!(second.summary().unwrap().metrics.count, 16);
    assert_eq!(second.criteria().ratings, RatingRange(1, 5));
}

#[test]
fn test_xlsx_export() {
    init();
    let dataset = load();
    let criteria = Criteria::everything(&dataset);
    let view = revsent::filter::apply(&criteria, dataset.reviews());
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("reviews.xlsx");
    revsent::export::write_xlsx(dataset.layout(), &view, &file).unwrap();
    let bytes = fs::read(&file).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_settings_out_of_range() {
    init();
    let dataset = load();
    let criteria = Criteria::everything(&dataset);
    let settings = [(0, 5), (7, 5), (3, 0), (3, 50)];
    for (examples, top) in settings {
        let args = SummaryArgs {
            examples,
            top,
            ..SummaryArgs::default()
        };
        let e = summary::calc(&args, &criteria, &dataset).unwrap_err();
        assert!(errors::is_invalid_setting(&*e));
    }
}
