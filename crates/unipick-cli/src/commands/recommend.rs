//! `recommend` and `options`: query the prepared artifacts.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Serialize;
use unipick_engine::io::{load_context, read_dataset_csv};
use unipick_engine::{PreferenceQuery, RankedCollege, Recommendation, UnipickConfig};

use crate::util::{load_config_or_default, validate_csv_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}. Expected 'tsv' or 'json'", s)),
        }
    }
}

/// Everything the `recommend` subcommand needs.
#[derive(Debug, Clone)]
pub struct RecommendArgs {
    pub data: PathBuf,
    pub scaler: PathBuf,
    pub query: PreferenceQuery,
    pub format: OutputFormat,
    pub config: UnipickConfig,
}

impl RecommendArgs {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = load_config_or_default(matches.get_one::<PathBuf>("config"))?;

        let data = required_path(matches, "data")?;
        validate_csv_file(&data)?;
        let scaler = required_path(matches, "scaler")?;

        let stream = matches
            .get_one::<String>("stream")
            .context("--stream is required")?;
        let state = matches
            .get_one::<String>("state")
            .context("--state is required")?;

        let mut query = PreferenceQuery::new(stream.as_str(), state.as_str());
        if let Some(&budget) = matches.get_one::<f64>("budget") {
            query = query.with_budget(budget);
        }
        if let Some(&min_rating) = matches.get_one::<f64>("min_rating") {
            query = query.with_min_rating(min_rating);
        }
        if let Some(&value) = matches.get_one::<f64>("min_accommodation") {
            query = query.with_min_accommodation(value);
        }
        if let Some(&value) = matches.get_one::<f64>("min_placement") {
            query = query.with_min_placement(value);
        }

        if let Some(&k) = matches.get_one::<usize>("k") {
            config.recommender.k = k;
        }

        let format = match matches.get_one::<String>("format") {
            Some(value) => OutputFormat::from_str(value).map_err(anyhow::Error::msg)?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            data,
            scaler,
            query,
            format,
            config,
        })
    }
}

fn required_path(matches: &ArgMatches, id: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .cloned()
        .with_context(|| format!("--{} is required", id))
}

/// Run a recommendation and write it to `out`.
///
/// Returns `false` when too few colleges matched; that outcome is also
/// written (JSON) or logged (TSV) but is not an error.
pub fn run_recommend<W: Write>(args: &RecommendArgs, out: W) -> Result<bool> {
    let ctx = load_context(&args.data, &args.scaler, args.config.recommender.clone())?;
    let outcome = ctx
        .recommend(&args.query)
        .context("Recommendation failed")?;
    write_recommendation(&outcome, args.format, out)?;
    Ok(!outcome.is_insufficient())
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonOutcome<'a> {
    Ranked { colleges: &'a [RankedCollege<'a>] },
    InsufficientCandidates { found: usize, required: usize },
}

pub fn write_recommendation<W: Write>(
    outcome: &Recommendation<'_>,
    format: OutputFormat,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = match outcome {
                Recommendation::Ranked(result) => JsonOutcome::Ranked {
                    colleges: &result.ranked,
                },
                Recommendation::InsufficientCandidates { found, required } => {
                    JsonOutcome::InsufficientCandidates {
                        found: *found,
                        required: *required,
                    }
                }
            };
            serde_json::to_writer_pretty(&mut out, &json).context("Failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Tsv => {
            let Recommendation::Ranked(result) = outcome else {
                return Ok(());
            };
            let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
            writer.write_record(["College_Name", "State", "Stream", "Rating", "UG_fee", "distance"])?;
            for hit in result.iter() {
                let r = hit.record;
                writer.write_record([
                    r.name.clone(),
                    r.state.clone(),
                    r.stream.clone(),
                    r.rating.to_string(),
                    r.ug_fee.to_string(),
                    format!("{:.4}", hit.distance),
                ])?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// List the streams and states present in a cleaned dataset, one
/// `kind<TAB>value` pair per line.
pub fn run_options<W: Write>(data: &Path, mut out: W) -> Result<()> {
    validate_csv_file(data)?;
    let dataset = read_dataset_csv(data)?;
    for stream in dataset.streams() {
        writeln!(out, "stream\t{}", stream)?;
    }
    for state in dataset.states() {
        writeln!(out, "state\t{}", state)?;
    }
    Ok(())
}
