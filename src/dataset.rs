//! Loading review datasets from CSV files.

use crate::errors::{self, Result};
use crate::information;
use crate::input::Review;
use crate::sentiment::{Labeler, Lexicon, Scorer};
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const COL_REVIEWER: &str = "Reviewer";
pub const COL_RESTAURANT: &str = "Restaurant";
pub const COL_RATING: &str = "Rating";
pub const COL_TIME: &str = "Time";
pub const COL_REVIEW: &str = "Review";

/// Trailing column produced by a broken export of the source data.
const ARTIFACT_COLUMN: &str = "7514";

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// One column of the input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Reviewer,
    Restaurant,
    Rating,
    Time,
    Review,
    /// Index into [Layout::extra_headers] and [Review::extra].
    Extra(usize),
}

/// The usable columns of the input file in their original order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<Field>,
    extra_headers: Vec<String>,
}

impl Layout {
    /// The five standard columns followed by the extra ones.
    pub fn standard(extra_headers: Vec<String>) -> Layout {
        let mut fields = vec![
            Field::Reviewer,
            Field::Restaurant,
            Field::Rating,
            Field::Time,
            Field::Review,
        ];
        fields.extend((0..extra_headers.len()).map(Field::Extra));
        Layout {
            fields,
            extra_headers,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn extra_headers(&self) -> &[String] {
        &self.extra_headers
    }

    pub fn name(&self, field: Field) -> &str {
        match field {
            Field::Reviewer => COL_REVIEWER,
            Field::Restaurant => COL_RESTAURANT,
            Field::Rating => COL_RATING,
            Field::Time => COL_TIME,
            Field::Review => COL_REVIEW,
            Field::Extra(i) => self.extra_headers[i].as_str(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::standard(vec![])
    }
}

/// All valid reviews of one input file.
#[derive(Debug, Default)]
pub struct Dataset {
    layout: Layout,
    reviews: Vec<Review>,
}

/// What happened to the rows of the input file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub malformed: usize,
    pub missing_text: usize,
    pub bad_rating: usize,
    pub bad_time: usize,
}

impl LoadStats {
    pub fn kept(&self) -> usize {
        self.rows - self.malformed - self.missing_text - self.bad_rating - self.bad_time
    }
}

impl Dataset {
    /// Build a dataset from reviews that are already in memory.
    pub fn from_reviews(extra_headers: Vec<String>, reviews: Vec<Review>) -> Dataset {
        Dataset {
            layout: Layout::standard(extra_headers),
            reviews,
        }
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Names of the preserved input columns beyond the five standard ones.
    pub fn extra_headers(&self) -> &[String] {
        self.layout.extra_headers()
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Distinct restaurant names, in the order they first appear.
    pub fn restaurants(&self) -> Vec<&str> {
        self.reviews
            .iter()
            .filter_map(|r| r.restaurant())
            .unique()
            .collect_vec()
    }

    /// Earliest and latest review time.
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.reviews
            .iter()
            .map(|r| r.time())
            .minmax()
            .into_option()
    }
}

pub fn parse_rating(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

pub fn parse_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(chrono::NaiveTime::MIN));
        }
    }
    None
}

fn is_artifact(header: &str) -> bool {
    let header = header.trim();
    header.is_empty() || header == ARTIFACT_COLUMN
}

fn nonempty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

struct Columns {
    reviewer: usize,
    restaurant: usize,
    rating: usize,
    time: usize,
    review: usize,
    extra: Vec<usize>,
}

impl Columns {
    /// Where each used column sits in the input, in input order.
    fn layout(&self, headers: &csv::StringRecord) -> Layout {
        let standard = [
            (self.reviewer, Field::Reviewer),
            (self.restaurant, Field::Restaurant),
            (self.rating, Field::Rating),
            (self.time, Field::Time),
            (self.review, Field::Review),
        ];
        let mut fields = vec![];
        for i in 0..headers.len() {
            if let Some(&(_, field)) = standard.iter().find(|(j, _)| *j == i) {
                fields.push(field);
            } else if let Some(k) = self.extra.iter().position(|&j| j == i) {
                fields.push(Field::Extra(k));
            }
        }
        let extra_headers = self
            .extra
            .iter()
            .map(|&i| headers[i].trim().to_owned())
            .collect_vec();
        Layout {
            fields,
            extra_headers,
        }
    }
}

fn find_columns(headers: &csv::StringRecord) -> Result<Columns> {
    let find = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| errors::bad_data(format!("missing column '{name}'")))
    };
    let standard = [COL_REVIEWER, COL_RESTAURANT, COL_RATING, COL_TIME, COL_REVIEW];
    let extra = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !standard.contains(&h.trim()) && !is_artifact(h))
        .map(|(i, _)| i)
        .collect_vec();
    Ok(Columns {
        reviewer: find(COL_REVIEWER)?,
        restaurant: find(COL_RESTAURANT)?,
        rating: find(COL_RATING)?,
        time: find(COL_TIME)?,
        review: find(COL_REVIEW)?,
        extra,
    })
}

/// Read a dataset in CSV format, skipping rows that cannot be used.
///
/// Rows without review text, with a rating that is not a number, or with a
/// time that cannot be parsed are dropped and counted in [LoadStats].
/// Only a missing header is an error.
pub fn read<R: io::Read, S: Scorer>(
    reader: R,
    labeler: &mut Labeler<S>,
) -> Result<(Dataset, LoadStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = find_columns(&headers)?;
    let layout = columns.layout(&headers);
    let mut stats = LoadStats::default();
    let mut reviews = vec![];
    for record in reader.records() {
        stats.rows += 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!(target: "revsent", "row {}: {e}", stats.rows);
                stats.malformed += 1;
                continue;
            }
        };
        let Some(text) = nonempty(record.get(columns.review)) else {
            stats.missing_text += 1;
            continue;
        };
        let Some(rating) = nonempty(record.get(columns.rating)).and_then(parse_rating) else {
            stats.bad_rating += 1;
            continue;
        };
        let Some(time) = nonempty(record.get(columns.time)).and_then(parse_time) else {
            stats.bad_time += 1;
            continue;
        };
        let owned = |i: usize| nonempty(record.get(i)).map(str::to_owned);
        let extra = columns
            .extra
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_owned())
            .collect_vec();
        let review = Review::new(
            labeler,
            owned(columns.reviewer),
            owned(columns.restaurant),
            rating,
            time,
            text.to_owned(),
        )
        .with_extra(extra);
        reviews.push(review);
    }
    let dataset = Dataset { layout, reviews };
    Ok((dataset, stats))
}

/// Loads datasets from files, remembering each path it has already read.
pub struct Loader<S = Lexicon> {
    labeler: Labeler<S>,
    cache: HashMap<PathBuf, Arc<Dataset>>,
}

impl Loader<Lexicon> {
    pub fn builtin() -> Loader<Lexicon> {
        Loader::new(Labeler::builtin())
    }
}

impl<S: Scorer> Loader<S> {
    pub fn new(labeler: Labeler<S>) -> Loader<S> {
        Loader {
            labeler,
            cache: HashMap::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        if let Some(dataset) = self.cache.get(path) {
            debug!(target: "revsent", "cached: {}", path.display());
            return Ok(Arc::clone(dataset));
        }
        info!(target: "revsent", "read: {}", path.display());
        let file = File::open(path).map_err(|e| {
            errors::data_source_unavailable(format!("{}: {e}", path.display()))
        })?;
        let (dataset, stats) = read(io::BufReader::new(file), &mut self.labeler).map_err(|e| {
            match e.downcast_ref::<csv::Error>() {
                Some(csv_error) if csv_error.is_io_error() => {
                    errors::data_source_unavailable(format!("{}: {e}", path.display()))
                }
                _ => e,
            }
        })?;
        information::statistics(&stats, &dataset);
        let dataset = Arc::new(dataset);
        self.cache.insert(path.to_owned(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn labeler(&self) -> &Labeler<S> {
        &self.labeler
    }
}
