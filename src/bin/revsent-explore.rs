use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use cliclack::log;
use itertools::Itertools;
use revsent::conclusions::ConclusionMode;
use revsent::dataset::Loader;
use revsent::export::{self, EXCEL_FILENAME, EXPORT_FILENAME};
use revsent::filter::{self, Criteria, MAX_RATING, MIN_RATING, RatingRange, RestaurantChoice};
use revsent::output::{self, Examples, Summary};
use revsent::sampling::{DEFAULT_SEED, Sampling};
use revsent::session::Session;
use revsent::summary::SummaryArgs;
use std::fs;

/// Explore restaurant reviews interactively
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input file (CSV)
    infile: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Overview,
    Charts,
    Words,
    Rankings,
    Examples,
    Ratings,
}

impl Section {
    const ALL: [Section; 6] = [
        Section::Overview,
        Section::Charts,
        Section::Words,
        Section::Rankings,
        Section::Examples,
        Section::Ratings,
    ];

    fn title(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Charts => "Ratings and sentiments",
            Section::Words => "Frequent words",
            Section::Rankings => "Top reviewers and restaurants",
            Section::Examples => "Example reviews",
            Section::Ratings => "Why users give each rating",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
enum Action {
    Show(Section),
    Ratings,
    Restaurant,
    Dates,
    Mode,
    Sampling,
    SaveCsv,
    SaveExcel,
    Quit,
}

fn wrap(s: &str) -> String {
    let options = textwrap::Options::new(70).subsequent_indent("  ");
    textwrap::fill(s, &options)
}

fn render_examples(label: &str, examples: &Examples) -> String {
    match examples {
        Examples::NoneAvailable => format!("{label}: no reviews for the current filter"),
        Examples::Available(texts) => {
            let mut lines = vec![format!("{label}:")];
            lines.extend(texts.iter().map(|t| wrap(&format!("- \"{t}\""))));
            lines.join("\n")
        }
    }
}

fn render(summary: &Summary, section: Section) -> String {
    match section {
        Section::Overview => {
            let m = &summary.metrics;
            [
                format!("reviews: {}", m.count),
                format!("mean rating: {}", output::pretty_number(m.mean_rating)),
                format!("positive: {}", output::pretty_pct(m.positive_pct)),
                format!("negative: {}", output::pretty_pct(m.negative_pct)),
            ]
            .join("\n")
        }
        Section::Charts => {
            let mut lines = vec!["rating distribution:".to_owned()];
            for rc in &summary.rating_histogram {
                lines.push(format!(
                    "  {:>4} {:>5} {}",
                    output::pretty_rating(rc.rating),
                    rc.count,
                    "#".repeat(rc.count.min(50) as usize)
                ));
            }
            lines.push("ratings by sentiment:".to_owned());
            for g in &summary.ratings_by_sentiment {
                let s = &g.stats;
                lines.push(format!(
                    "  {}: n = {}, min {}, q1 {:.2}, median {:.2}, q3 {:.2}, max {}",
                    g.sentiment,
                    g.ratings.len(),
                    output::pretty_rating(s.min),
                    s.q1,
                    s.median,
                    s.q3,
                    output::pretty_rating(s.max)
                ));
            }
            lines.join("\n")
        }
        Section::Words => {
            if summary.word_cloud.is_empty() {
                return "no words".to_owned();
            }
            let words = summary
                .word_cloud
                .iter()
                .take(40)
                .map(|w| format!("{} ({})", w.word, w.count))
                .join(", ");
            wrap(&words)
        }
        Section::Rankings => {
            let mut lines = vec!["top reviewers:".to_owned()];
            lines.extend(
                summary
                    .top_reviewers
                    .iter()
                    .map(|r| format!("  {}: {}", r.name, r.count)),
            );
            lines.push("most reviewed restaurants:".to_owned());
            lines.extend(
                summary
                    .top_restaurants
                    .iter()
                    .map(|r| format!("  {}: {}", r.name, r.count)),
            );
            lines.join("\n")
        }
        Section::Examples => [
            render_examples("positive", &summary.positive_examples),
            render_examples("negative", &summary.negative_examples),
        ]
        .join("\n"),
        Section::Ratings => {
            if summary.ratings.is_empty() {
                return "no reviews for the current filter".to_owned();
            }
            summary
                .ratings
                .iter()
                .map(|r| {
                    let example = match &r.example {
                        Some(text) => format!("\"{text}\""),
                        None => "no example".to_owned(),
                    };
                    [
                        format!("rating {}:", r.rating),
                        wrap(&format!("- dominant words: {}", r.dominant_words.join(", "))),
                        wrap(&format!("- conclusion: {}", r.conclusion)),
                        wrap(&format!("- example: {example}")),
                    ]
                    .join("\n")
                })
                .join("\n\n")
        }
    }
}

fn select_rating(prompt: &str, lo: u8, initial: u8) -> Result<u8> {
    let items = (lo..=MAX_RATING)
        .map(|r| (r, r.to_string(), ""))
        .collect_vec();
    Ok(cliclack::select(prompt)
        .items(&items)
        .initial_value(initial.max(lo))
        .interact()?)
}

fn select_restaurant(session: &Session) -> Result<RestaurantChoice> {
    let mut items = vec![(RestaurantChoice::All, "All restaurants".to_owned(), "")];
    for name in session.dataset().restaurants() {
        items.push((RestaurantChoice::Only(name.to_owned()), name.to_owned(), ""));
    }
    Ok(cliclack::select("Which restaurant?")
        .items(&items)
        .initial_value(session.criteria().restaurant.clone())
        .interact()?)
}

fn input_date(prompt: &str, default: NaiveDate) -> Result<NaiveDate> {
    let s: String = cliclack::input(prompt)
        .default_input(&default.to_string())
        .interact()?;
    s.trim()
        .parse::<NaiveDate>()
        .with_context(|| format!("'{s}' is not a date of the form YYYY-MM-DD"))
}

fn recompute(session: &mut Session, criteria: Criteria) -> Result<()> {
    if let Err(e) = session.update(criteria) {
        log::error(format!("{e}; keeping the previous filter"))?;
    }
    Ok(())
}

fn current(session: &Session) -> Result<&Summary> {
    session
        .summary()
        .ok_or_else(|| anyhow!("nothing has been computed yet"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    cliclack::intro("revsent-explore")?;
    log::info(format!("Reading {}...", args.infile))?;
    let mut loader = Loader::builtin();
    let dataset = loader
        .load(&args.infile)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("cannot read {}", args.infile))?;
    let mut session = Session::new(dataset, SummaryArgs::default());
    session
        .refresh()
        .map_err(|e| anyhow!("{e}"))
        .context("cannot summarize the reviews")?;
    let mut section = Section::Overview;
    loop {
        let summary = current(&session)?;
        cliclack::note(
            section.title(),
            format!(
                "{}\n\n{}",
                wrap(&session.criteria().pretty()),
                render(summary, section)
            ),
        )?;

        let mut items = vec![];
        for s in Section::ALL {
            if s != section {
                items.push((Action::Show(s), format!("Show: {}", s.title()), ""));
            }
        }
        items.push((Action::Ratings, "Change rating range".to_owned(), ""));
        items.push((Action::Restaurant, "Change restaurant".to_owned(), ""));
        items.push((Action::Dates, "Change date range".to_owned(), ""));
        let mode = match session.args().mode {
            ConclusionMode::Static => "Compute dominant words from the reviews",
            ConclusionMode::Live => "Use the hand-written conclusions",
        };
        items.push((Action::Mode, mode.to_owned(), ""));
        let sampling = match session.args().sampling {
            Sampling::Seeded(_) => "Pick new random examples every time",
            Sampling::Unseeded => "Pick reproducible examples",
        };
        items.push((Action::Sampling, sampling.to_owned(), ""));
        items.push((Action::SaveCsv, "Save filtered reviews as CSV".to_owned(), ""));
        items.push((Action::SaveExcel, "Save filtered reviews as Excel".to_owned(), ""));
        items.push((Action::Quit, "Quit".to_owned(), ""));
        let choice = cliclack::select("Action?").items(&items).interact()?;

        match choice {
            Action::Quit => break,
            Action::Show(s) => section = s,
            Action::Ratings => {
                let RatingRange(lo, hi) = session.criteria().ratings;
                let lo = select_rating("Lowest rating?", MIN_RATING, lo)?;
                let hi = select_rating("Highest rating?", lo, hi)?;
                let criteria = Criteria {
                    ratings: RatingRange(lo, hi),
                    ..session.criteria().clone()
                };
                recompute(&mut session, criteria)?;
            }
            Action::Restaurant => {
                let restaurant = select_restaurant(&session)?;
                let criteria = Criteria {
                    restaurant,
                    ..session.criteria().clone()
                };
                recompute(&mut session, criteria)?;
            }
            Action::Dates => {
                let dates = session.criteria().dates;
                let start = match input_date("First day", dates.0.date()) {
                    Ok(d) => d,
                    Err(e) => {
                        log::error(format!("{e:#}"))?;
                        continue;
                    }
                };
                let end = match input_date("Last day", dates.1.date()) {
                    Ok(d) => d,
                    Err(e) => {
                        log::error(format!("{e:#}"))?;
                        continue;
                    }
                };
                let criteria = Criteria {
                    dates: filter::DateRange::from_dates(start, end),
                    ..session.criteria().clone()
                };
                recompute(&mut session, criteria)?;
            }
            Action::Mode => {
                let mode = match session.args().mode {
                    ConclusionMode::Static => ConclusionMode::Live,
                    ConclusionMode::Live => ConclusionMode::Static,
                };
                session.args_mut().mode = mode;
                section = Section::Ratings;
                let criteria = session.criteria().clone();
                recompute(&mut session, criteria)?;
            }
            Action::Sampling => {
                let sampling = match session.args().sampling {
                    Sampling::Seeded(_) => Sampling::Unseeded,
                    Sampling::Unseeded => Sampling::Seeded(DEFAULT_SEED),
                };
                session.args_mut().sampling = sampling;
                section = Section::Examples;
                let criteria = session.criteria().clone();
                recompute(&mut session, criteria)?;
            }
            Action::SaveCsv => {
                let filename: String = cliclack::input("file name")
                    .default_input(EXPORT_FILENAME)
                    .interact()?;
                let export = &current(&session)?.export;
                fs::write(&filename, export.bytes())
                    .with_context(|| format!("cannot write {filename}"))?;
                log::info(format!("Wrote to {filename}"))?;
            }
            Action::SaveExcel => {
                let filename: String = cliclack::input("file name")
                    .default_input(EXCEL_FILENAME)
                    .interact()?;
                let dataset = session.dataset();
                let view = filter::apply(session.criteria(), dataset.reviews());
                export::write_xlsx(dataset.layout(), &view, &filename)
                    .map_err(|e| anyhow!("{e}"))
                    .with_context(|| format!("cannot write {filename}"))?;
                log::info(format!(
                    "Wrote {} reviews ({}) to {filename}",
                    view.len(),
                    export::pretty_header(dataset.layout())
                ))?;
            }
        }
    }
    cliclack::outro("Bye!")?;
    Ok(())
}
