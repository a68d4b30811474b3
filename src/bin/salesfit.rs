use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use salesfit::{
    analyze, display::ModelReport, predict, BudgetInput, Dataset, LoadReport, LoaderOptions,
    ModelEvaluation,
};
use tracing_subscriber::EnvFilter;

/// Fits sales against advertising spend and predicts sales for a budget
#[derive(Parser, Debug)]
#[command(name = "salesfit")]
#[command(version)]
#[command(about = "Fit sales against TV, radio and newspaper spend", long_about = None)]
struct Cli {
    /// CSV or JSON file with TV, Radio, Newspaper and Sales columns
    path: PathBuf,

    /// TV spend to predict sales for
    #[arg(long, default_value_t = 150.0)]
    tv: f64,

    /// Radio spend to predict sales for
    #[arg(long, default_value_t = 30.0)]
    radio: f64,

    /// Newspaper spend to predict sales for
    #[arg(long, default_value_t = 40.0)]
    newspaper: f64,

    /// Fraction of rows held out to evaluate the model (e.g. 0.2)
    #[arg(long = "test-size", value_name = "FRACTION")]
    test_size: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// CSV field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug tracing output (to stderr)
    #[arg(long)]
    debug: bool,
}

/// Everything printed by `--json`
#[derive(serde::Serialize)]
struct JsonReport<'a> {
    load: Option<&'a LoadReport>,
    analysis: &'a salesfit::Analysis,
    holdout: Option<&'a ModelEvaluation>,
    budget: &'a BudgetInput,
    prediction: &'a salesfit::PredictionResult,
    return_on_investment: Option<f64>,
}

/// Initialize tracing subscriber
///
/// `--debug` enables everything; otherwise `RUST_LOG` is honored if set.
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Reads a dataset, by extension. CSV loads come with a [`LoadReport`].
fn read_dataset(path: &Path, delimiter: char) -> Result<(Dataset, Option<LoadReport>)> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            let dataset = Dataset::from_json(&contents)
                .with_context(|| format!("Failed to parse JSON dataset: {}", path.display()))?;
            Ok((dataset, None))
        }

        _ => {
            let delimiter = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .with_context(|| format!("Delimiter must be a single ASCII character: {delimiter:?}"))?;
            let options = LoaderOptions { delimiter };

            let (dataset, report) = salesfit::load_with_report(&contents, &options)
                .with_context(|| format!("Failed to load CSV dataset: {}", path.display()))?;
            Ok((dataset, Some(report)))
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    if let Some(fraction) = args.test_size {
        if !(fraction > 0.0 && fraction < 1.0) {
            anyhow::bail!("Invalid value for --test-size: {fraction} (must be between 0 and 1)");
        }
    }

    let (dataset, load_report) = read_dataset(&args.path, args.delimiter)?;
    if let Some(report) = &load_report {
        if report.rows_skipped() > 0 || report.defaulted_fields > 0 {
            eprintln!(
                "Loaded {} of {} rows ({} skipped, {} fields defaulted to 0)",
                report.rows_used,
                report.rows_read,
                report.rows_skipped(),
                report.defaulted_fields
            );
        }
    }

    let (train, test) = match args.test_size {
        Some(fraction) => {
            let (train, test) = dataset
                .train_test_split(fraction, args.seed)
                .context("Failed to split dataset")?;
            (train, Some(test))
        }
        None => (dataset, None),
    };

    let analysis = analyze(&train).context("Failed to fit model")?;
    let holdout = test.as_ref().map(|test| analysis.coefficients.evaluate(test));

    let budget = BudgetInput::new(args.tv, args.radio, args.newspaper);
    let prediction = predict(&analysis.coefficients, &budget);

    if args.json {
        let report = JsonReport {
            load: load_report.as_ref(),
            analysis: &analysis,
            holdout: holdout.as_ref(),
            budget: &budget,
            prediction: &prediction,
            return_on_investment: prediction.return_on_investment(&budget),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut report = ModelReport::new(&analysis).with_prediction(&budget, &prediction);
        if let Some(holdout) = &holdout {
            report = report.with_holdout(holdout);
        }
        print!("{report}");
    }

    Ok(())
}
