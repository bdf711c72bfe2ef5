use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use unipick_cli::commands::prepare::{run_fit, run_prepare};
use unipick_cli::commands::recommend::{run_options, run_recommend, RecommendArgs};
use unipick_cli::util::load_config_or_default;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("UNIPICK_LOG", "error,unipick=info"))
        .init();

    let matches = Command::new("unipick")
        .version(clap::crate_version!())
        .about("\u{1F393} unipick - nearest-neighbour college recommendations")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("prepare")
                .about("Clean a raw college table into a numeric dataset")
                .arg(
                    Arg::new("raw")
                        .help("Path to the raw college table (*.csv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the cleaned dataset (*.csv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(config_arg())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Fail on malformed score text instead of dropping the row.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("fit")
                .about("Fit per-feature scaling parameters over a cleaned dataset")
                .arg(
                    Arg::new("dataset")
                        .help("Path to the cleaned dataset (*.csv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the scaling parameters (*.json)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("recommend")
                .about("Rank colleges matching a stream, state and rating floor")
                .arg(data_arg())
                .arg(
                    Arg::new("scaler")
                        .short('s')
                        .long("scaler")
                        .help("Path to the fitted scaling parameters (*.json)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("stream")
                        .long("stream")
                        .help("Stream the college must offer, matched exactly")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("state")
                        .long("state")
                        .help("State the college must be in, matched exactly")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("budget")
                        .long("budget")
                        .help("Target fee for both UG and PG fees [default: 150000]")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("min_rating")
                        .long("min-rating")
                        .help("Lowest acceptable overall rating [default: 7.0]")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("min_accommodation")
                        .long("min-accommodation")
                        .help("Target accommodation score; only shapes the ranking")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("min_placement")
                        .long("min-placement")
                        .help("Target placement score; only shapes the ranking")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("k")
                        .short('k')
                        .long("top")
                        .help("Number of colleges to return. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .help("Output format")
                        .value_parser(["tsv", "json"])
                        .value_hint(ValueHint::Other),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("options")
                .about("List the streams and states present in a cleaned dataset")
                .arg(data_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("prepare", sub_m)) => handle_prepare(sub_m),
        Some(("fit", sub_m)) => handle_fit(sub_m),
        Some(("recommend", sub_m)) => handle_recommend(sub_m),
        Some(("options", sub_m)) => handle_options(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Path to a unipick JSON configuration file")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn data_arg() -> Arg {
    Arg::new("data")
        .short('d')
        .long("data")
        .help("Path to the cleaned dataset (*.csv)")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn handle_prepare(matches: &ArgMatches) -> Result<()> {
    let raw = matches
        .get_one::<PathBuf>("raw")
        .context("missing required argument raw")?;
    let output = matches
        .get_one::<PathBuf>("output_file")
        .context("missing required argument output_file")?;
    eprintln!("[unipick::prepare] Normalizing raw table: {:?}", raw);

    let mut config = load_config_or_default(matches.get_one::<PathBuf>("config"))?.normalizer;
    if matches.get_flag("strict") {
        config.strict_scores = true;
    }

    match run_prepare(raw, output, &config) {
        Ok(report) => {
            eprintln!(
                "[unipick::prepare] Kept {} of {} rows; wrote {:?}",
                report.rows_kept, report.rows_read, output
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Preparation failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_fit(matches: &ArgMatches) -> Result<()> {
    let dataset = matches
        .get_one::<PathBuf>("dataset")
        .context("missing required argument dataset")?;
    let output = matches
        .get_one::<PathBuf>("output_file")
        .context("missing required argument output_file")?;
    eprintln!("[unipick::fit] Fitting scaler on: {:?}", dataset);

    match run_fit(dataset, output) {
        Ok(params) => {
            eprintln!(
                "[unipick::fit] Fitted {} features over {} colleges; wrote {:?}",
                params.features.len(),
                params.n_samples,
                output
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Fitting failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_recommend(matches: &ArgMatches) -> Result<()> {
    let args = match RecommendArgs::from_arguments(matches) {
        Ok(args) => args,
        Err(e) => {
            log::error!("Invalid recommend arguments: {:#}", e);
            std::process::exit(1)
        }
    };

    let stdout = std::io::stdout();
    match run_recommend(&args, stdout.lock()) {
        Ok(true) => Ok(()),
        Ok(false) => {
            eprintln!(
                "[unipick::recommend] Warning: fewer than {} colleges match stream '{}', state '{}' and rating >= {}",
                args.config.recommender.k, args.query.stream, args.query.state, args.query.min_rating
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Recommendation failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_options(matches: &ArgMatches) -> Result<()> {
    let data = matches
        .get_one::<PathBuf>("data")
        .context("missing required argument data")?;
    let stdout = std::io::stdout();
    if let Err(e) = run_options(data, stdout.lock()) {
        log::error!("Listing options failed: {:#}", e);
        std::process::exit(1)
    }
    Ok(())
}
