use chrono::NaiveDate;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{error, info};
use revsent::conclusions::{ConclusionMode, ConclusionTable};
use revsent::dataset::Loader;
use revsent::errors::Result;
use revsent::export;
use revsent::filter::{self, Criteria, MAX_RATING, MIN_RATING, RatingRange, RestaurantChoice};
use revsent::output::OError;
use revsent::sampling::{DEFAULT_SEED, Sampling};
use revsent::summary::{self, DEFAULT_DOMINANT_WORDS, SummaryArgs};
use std::path::Path;
use std::{error, fs, io, process};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Input file (CSV)
    infile: String,
    /// Output file (JSON)
    outfile: String,
    /// Lowest rating
    #[arg(long, default_value_t = MIN_RATING)]
    min_rating: u8,
    /// Highest rating
    #[arg(long, default_value_t = MAX_RATING)]
    max_rating: u8,
    /// Restaurant, or 'all'
    #[arg(long, default_value = "all")]
    restaurant: String,
    /// First day (YYYY-MM-DD), defaults to the day of the earliest review
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), defaults to the day of the latest review
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Where per-rating words and conclusions come from
    #[arg(long, value_enum, default_value_t = ConclusionMode::Static)]
    mode: ConclusionMode,
    /// Conclusion table (JSON) to use instead of the built-in one
    #[arg(long)]
    conclusions: Option<String>,
    /// Number of dominant words per rating in live mode
    #[arg(long, default_value_t = DEFAULT_DOMINANT_WORDS)]
    dominant_words: usize,
    /// Seed for picking example reviews
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Pick different example reviews on every run
    #[arg(long, conflicts_with = "seed")]
    unseeded: bool,
    /// Directory where the filtered reviews are written as CSV
    #[arg(long)]
    export_dir: Option<String>,
    /// Write the filtered reviews also as an Excel file
    #[arg(long)]
    xlsx: Option<String>,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<String>,
    /// Produce compact JSON files
    #[arg(long)]
    compact: bool,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn summary_args(args: &Args) -> Result<SummaryArgs> {
    let table = match &args.conclusions {
        Some(filename) => ConclusionTable::from_file(filename)?,
        None => ConclusionTable::builtin(),
    };
    let sampling = if args.unseeded {
        Sampling::Unseeded
    } else {
        Sampling::Seeded(args.seed)
    };
    Ok(SummaryArgs {
        mode: args.mode,
        sampling,
        table,
        dominant_words: args.dominant_words,
        ..SummaryArgs::default()
    })
}

fn process(args: &Args) -> Result<()> {
    let summary_args = summary_args(args)?;
    let mut loader = Loader::builtin();
    let dataset = loader.load(&args.infile)?;
    let criteria = Criteria::build(
        &dataset,
        RatingRange(args.min_rating, args.max_rating),
        RestaurantChoice::parse(&args.restaurant),
        args.start,
        args.end,
    );
    let summary = summary::calc(&summary_args, &criteria, &dataset)?;

    info!(target: "revsent", "write: {}", args.outfile);
    let file = fs::File::create(&args.outfile)?;
    let writer = io::BufWriter::new(file);
    if args.compact {
        serde_json::to_writer(writer, &summary)?;
    } else {
        serde_json::to_writer_pretty(writer, &summary)?;
    }

    if let Some(dir) = &args.export_dir {
        let path = Path::new(dir).join(&summary.export.filename);
        info!(target: "revsent", "write: {}", path.display());
        fs::write(&path, summary.export.bytes())?;
    }
    if let Some(filename) = &args.xlsx {
        info!(target: "revsent", "write: {filename}");
        let view = filter::apply(&criteria, dataset.reviews());
        export::write_xlsx(dataset.layout(), &view, filename)?;
    }
    Ok(())
}

fn store_error(error_file: &str, e: &dyn error::Error) -> Result<()> {
    let error = OError {
        error: format!("{e}"),
    };
    let file = fs::File::create(error_file)?;
    let writer = io::BufWriter::new(file);
    serde_json::to_writer(writer, &error)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(()) => (),
        Err(e) => {
            match &args.error_file {
                Some(filename) => match store_error(filename, &*e) {
                    Ok(()) => {
                        info!(target: "revsent", "error reported: {e}");
                    }
                    Err(e2) => {
                        error!(target: "revsent", "{e}");
                        error!(target: "revsent", "{e2}");
                    }
                },
                None => error!(target: "revsent", "{e}"),
            }
            process::exit(1);
        }
    }
}
