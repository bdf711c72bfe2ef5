//! Raw college table normalization.
//!
//! Reads a delimited table with loosely typed cells and produces a
//! [`Dataset`] in which every feature is present and finite:
//!
//! 1. missing markers (`--` and friends) become absent values;
//! 2. fee cells lose their thousands separators and are parsed as amounts;
//! 3. absent fees are imputed with the median of their column, computed once
//!    over all rows before any row is dropped;
//! 4. quality scores are coerced to numbers;
//! 5. rows that still lack a required value are dropped, as are repeated
//!    identifiers after the first.
//!
//! Surviving rows keep their source order.
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::config::NormalizerConfig;
use crate::error::NormalizationError;
use crate::record::{CollegeRecord, Dataset, Feature};
use crate::stats::median;

pub const NAME_COLUMN: &str = "College_Name";
pub const STREAM_COLUMN: &str = "Stream";
pub const STATE_COLUMN: &str = "State";
pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

/// Diagnostics gathered while normalizing. Row-level problems are counted
/// here rather than reported individually.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows with an unresolved missing value after fee imputation.
    pub dropped_rows: usize,
    /// Rows with a quality score that was neither numeric nor a missing marker.
    pub malformed_rows: usize,
    /// Rows whose identifier had already been seen.
    pub duplicate_rows: usize,
    pub imputed_ug_fee: usize,
    pub imputed_pg_fee: usize,
    pub ug_fee_median: Option<f64>,
    pub pg_fee_median: Option<f64>,
}

impl NormalizationReport {
    pub fn rows_removed(&self) -> usize {
        self.dropped_rows + self.malformed_rows + self.duplicate_rows
    }

    pub fn log_summary(&self) {
        log::info!("----- Normalization Summary -----");
        log::info!(
            "Kept {} of {} rows ({} unresolved, {} malformed, {} duplicate)",
            self.rows_kept,
            self.rows_read,
            self.dropped_rows,
            self.malformed_rows,
            self.duplicate_rows
        );
        log::info!(
            "Imputed {} UG_fee values (median {:?}) and {} PG_fee values (median {:?})",
            self.imputed_ug_fee,
            self.ug_fee_median,
            self.imputed_pg_fee,
            self.pg_fee_median
        );
    }
}

/// A normalized dataset together with the diagnostics of its load.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    pub dataset: Dataset,
    pub report: NormalizationReport,
}

/// Normalize a raw table read from any byte source.
pub fn normalize<R: Read>(
    source: R,
    config: &NormalizerConfig,
) -> Result<NormalizedDataset, NormalizationError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|source| NormalizationError::Csv { row: 0, source })?
        .clone();
    if headers.iter().all(str::is_empty) {
        return Err(NormalizationError::Empty);
    }
    let layout = ColumnLayout::resolve(&headers)?;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| NormalizationError::Csv {
            row: row_idx + 1,
            source,
        })?;
        rows.push(RawRow::parse(&record, &layout, config, row_idx + 1)?);
    }
    if rows.is_empty() {
        return Err(NormalizationError::Empty);
    }
    log::debug!("Read {} raw rows", rows.len());

    assemble(rows)
}

/// Normalize the raw table stored at `path`.
pub fn normalize_path<P: AsRef<Path>>(
    path: P,
    config: &NormalizerConfig,
) -> Result<NormalizedDataset, NormalizationError> {
    log::info!("Normalizing raw table {}", path.as_ref().display());
    let file = File::open(path)?;
    normalize(file, config)
}

/// Impute fees and build the dataset from parsed rows.
fn assemble(mut rows: Vec<RawRow>) -> Result<NormalizedDataset, NormalizationError> {
    let mut report = NormalizationReport {
        rows_read: rows.len(),
        ..Default::default()
    };

    // Medians come from every row, including those dropped further down.
    let ug_values: Vec<f64> = rows.iter().filter_map(|r| r.ug_fee).collect();
    let pg_values: Vec<f64> = rows.iter().filter_map(|r| r.pg_fee).collect();
    report.ug_fee_median = median(&ug_values);
    report.pg_fee_median = median(&pg_values);

    for row in rows.iter_mut() {
        if row.ug_fee.is_none() && report.ug_fee_median.is_some() {
            log::debug!("Imputing UG_fee for row {}", row.line);
            row.ug_fee = report.ug_fee_median;
            report.imputed_ug_fee += 1;
        }
        if row.pg_fee.is_none() && report.pg_fee_median.is_some() {
            log::debug!("Imputing PG_fee for row {}", row.line);
            row.pg_fee = report.pg_fee_median;
            report.imputed_pg_fee += 1;
        }
    }

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let line = row.line;
        if row.malformed {
            report.malformed_rows += 1;
            continue;
        }
        let Some(record) = row.into_record() else {
            log::debug!("Dropping row {}: unresolved missing value", line);
            report.dropped_rows += 1;
            continue;
        };
        if !seen.insert(record.name.clone()) {
            log::debug!("Dropping row {}: duplicate college '{}'", line, record.name);
            report.duplicate_rows += 1;
            continue;
        }
        records.push(record);
    }
    report.rows_kept = records.len();
    report.log_summary();

    if records.is_empty() {
        return Err(NormalizationError::NoUsableRows {
            dropped: report.rows_removed(),
        });
    }

    Ok(NormalizedDataset {
        dataset: Dataset::from_records(records)?,
        report,
    })
}

/// Column positions of every field the normalizer reads.
#[derive(Debug)]
struct ColumnLayout {
    name: usize,
    stream: usize,
    state: usize,
    features: [usize; Feature::COUNT],
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord) -> Result<Self, NormalizationError> {
        let require = |name: &str| {
            find_column(headers, name)
                .ok_or_else(|| NormalizationError::MissingColumn(name.to_string()))
        };

        let name = require(NAME_COLUMN)?;
        let stream = require(STREAM_COLUMN)?;
        let state = require(STATE_COLUMN)?;
        let mut features = [0usize; Feature::COUNT];
        for feature in Feature::ALL {
            features[feature.index()] = require(feature.column_name())?;
        }

        Ok(Self {
            name,
            stream,
            state,
            features,
            latitude: find_column(headers, LATITUDE_COLUMN),
            longitude: find_column(headers, LONGITUDE_COLUMN),
        })
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| header.trim() == name)
}

/// One source row after cell-level parsing, before imputation.
#[derive(Debug)]
struct RawRow {
    line: usize,
    name: Option<String>,
    stream: Option<String>,
    state: Option<String>,
    ug_fee: Option<f64>,
    pg_fee: Option<f64>,
    scores: [Option<f64>; 7],
    malformed: bool,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl RawRow {
    fn parse(
        record: &StringRecord,
        layout: &ColumnLayout,
        config: &NormalizerConfig,
        line: usize,
    ) -> Result<Self, NormalizationError> {
        let cell = |idx: usize| record.get(idx).unwrap_or_default();
        let text = |idx: usize| {
            let value = cell(idx).trim();
            (!config.is_missing(value)).then(|| value.to_string())
        };

        let mut scores = [None; 7];
        let mut malformed = false;
        for (slot, feature) in scores.iter_mut().zip(Feature::SCORES) {
            let value = cell(layout.features[feature.index()]);
            match parse_score(value, config) {
                ScoreCell::Present(v) => *slot = Some(v),
                ScoreCell::Missing => {}
                ScoreCell::Malformed if config.strict_scores => {
                    return Err(NormalizationError::InvalidScore {
                        row: line,
                        column: feature.column_name(),
                        value: value.to_string(),
                    });
                }
                ScoreCell::Malformed => {
                    log::warn!(
                        "Row {}: {} value '{}' is not numeric",
                        line,
                        feature.column_name(),
                        value
                    );
                    malformed = true;
                }
            }
        }

        Ok(Self {
            line,
            name: text(layout.name),
            stream: text(layout.stream),
            state: text(layout.state),
            ug_fee: parse_fee(cell(layout.features[Feature::UgFee.index()]), config),
            pg_fee: parse_fee(cell(layout.features[Feature::PgFee.index()]), config),
            scores,
            malformed,
            latitude: layout
                .latitude
                .and_then(|idx| parse_coordinate(cell(idx), config)),
            longitude: layout
                .longitude
                .and_then(|idx| parse_coordinate(cell(idx), config)),
        })
    }

    /// Build the final record, or `None` if any required value is absent.
    fn into_record(self) -> Option<CollegeRecord> {
        let [rating, academic, accommodation, faculty, infrastructure, placement, social_life] =
            self.scores;
        Some(CollegeRecord {
            name: self.name?,
            stream: self.stream?,
            state: self.state?,
            ug_fee: self.ug_fee?,
            pg_fee: self.pg_fee?,
            rating: rating?,
            academic: academic?,
            accommodation: accommodation?,
            faculty: faculty?,
            infrastructure: infrastructure?,
            placement: placement?,
            social_life: social_life?,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

#[derive(Debug, PartialEq)]
enum ScoreCell {
    Present(f64),
    Missing,
    Malformed,
}

fn parse_score(value: &str, config: &NormalizerConfig) -> ScoreCell {
    if config.is_missing(value) {
        return ScoreCell::Missing;
    }
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => ScoreCell::Present(v),
        Ok(_) => ScoreCell::Missing,
        Err(_) => ScoreCell::Malformed,
    }
}

/// Parse a currency amount such as `"1,25,000"` or `"98000.50"`.
///
/// Missing markers, unparsable text, negative and non-finite amounts all
/// yield `None` so the cell is imputed.
pub fn parse_fee(value: &str, config: &NormalizerConfig) -> Option<f64> {
    if config.is_missing(value) {
        return None;
    }
    let cleaned: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_coordinate(value: &str, config: &NormalizerConfig) -> Option<f64> {
    if config.is_missing(value) {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fee_strips_grouping_separators() {
        let config = NormalizerConfig::default();
        assert_eq!(parse_fee("1,25,000", &config), Some(125000.0));
        assert_eq!(parse_fee(" 98,000.50 ", &config), Some(98000.5));
    }

    #[test]
    fn parse_fee_rejects_markers_and_garbage() {
        let config = NormalizerConfig::default();
        assert_eq!(parse_fee("--", &config), None);
        assert_eq!(parse_fee("", &config), None);
        assert_eq!(parse_fee("about 2 lakh", &config), None);
        assert_eq!(parse_fee("-5000", &config), None);
    }

    #[test]
    fn parse_score_classifies_cells() {
        let config = NormalizerConfig::default();
        assert_eq!(parse_score("7.5", &config), ScoreCell::Present(7.5));
        assert_eq!(parse_score("--", &config), ScoreCell::Missing);
        assert_eq!(parse_score("N/A", &config), ScoreCell::Missing);
        assert_eq!(parse_score("good", &config), ScoreCell::Malformed);
    }
}
