use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use crate::{Error, Result};

pub const TIMESTAMP: &str = "Timestamp";
pub const OPTIMIZATION_SCORE: &str = "single_best_optimization_score";
pub const TEST_SCORE: &str = "single_best_test_score";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One row of a raw result table, with the timestamp already turned into elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub second: i64,
    pub optimization_score: Option<f64>,
    pub test_score: Option<f64>,
}

/// The samples of one split run, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRun {
    pub samples: Vec<Sample>,
}

/// Scores of one split run on the dense time axis `1..=budget`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub seconds: Vec<i64>,
    pub optimization_scores: Vec<f64>,
    pub test_scores: Vec<f64>,
}

impl RawRun {
    pub fn from_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        Self::from_frame(&df, path)
    }

    /// A string timestamp column holds wall-clock datetimes and is made relative to the
    /// first row. A numeric one already holds elapsed seconds.
    pub fn from_frame(df: &DataFrame, path: &Path) -> Result<Self> {
        if df.height() == 0 {
            return Err(Error::EmptyTable(path.to_path_buf()));
        }
        let timestamps = column(df, path, TIMESTAMP)?;
        let optimization_scores = scores(df, path, OPTIMIZATION_SCORE)?;
        let test_scores = scores(df, path, TEST_SCORE)?;

        let seconds = if timestamps.dtype().is_numeric() {
            timestamps
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|s| {
                    s.ok_or_else(|| Error::Timestamp {
                        path: path.to_path_buf(),
                        value: "null".to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            elapsed_seconds(timestamps, path)?
        };

        let samples = seconds
            .into_iter()
            .zip(optimization_scores)
            .zip(test_scores)
            .map(|((second, optimization_score), test_score)| Sample {
                second,
                optimization_score,
                test_score,
            })
            .collect();
        Ok(Self { samples })
    }

    /// Places the samples on the integer seconds `1..=budget`.
    ///
    /// Seconds are clipped to `[0, budget]`, the last sample of a second wins, and each
    /// score column is forward filled. Seconds before the first observation take the
    /// first observed value.
    pub fn align(&self, budget: u32) -> Result<Trajectory> {
        if budget == 0 {
            return Err(Error::ZeroBudget);
        }
        let slots = budget as usize + 1;
        let mut optimization_slots: Vec<Option<f64>> = vec![None; slots];
        let mut test_slots: Vec<Option<f64>> = vec![None; slots];

        let mut clipped = 0usize;
        for sample in &self.samples {
            let second = sample.second.clamp(0, budget as i64);
            if second != sample.second {
                clipped += 1;
            }
            let idx = second as usize;
            if sample.optimization_score.is_some() {
                optimization_slots[idx] = sample.optimization_score;
            }
            if sample.test_score.is_some() {
                test_slots[idx] = sample.test_score;
            }
        }
        if clipped > 0 {
            tracing::warn!("{clipped} samples clipped to [0, {budget}]");
        }

        Ok(Trajectory {
            seconds: (1..=budget as i64).collect(),
            optimization_scores: forward_fill(&optimization_slots)
                .ok_or(Error::NoObservations(OPTIMIZATION_SCORE))?,
            test_scores: forward_fill(&test_slots).ok_or(Error::NoObservations(TEST_SCORE))?,
        })
    }
}

impl From<&Trajectory> for RawRun {
    fn from(trajectory: &Trajectory) -> Self {
        let samples = trajectory
            .seconds
            .iter()
            .zip(&trajectory.optimization_scores)
            .zip(&trajectory.test_scores)
            .map(|((&second, &optimization_score), &test_score)| Sample {
                second,
                optimization_score: Some(optimization_score),
                test_score: Some(test_score),
            })
            .collect();
        Self { samples }
    }
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }
}

/// Fills slots `1..` from the nearest earlier observed slot. Returns `None` if nothing
/// was observed at all.
fn forward_fill(slots: &[Option<f64>]) -> Option<Vec<f64>> {
    let mut last = slots.iter().flatten().copied().next()?;
    let mut filled = Vec::with_capacity(slots.len().saturating_sub(1));
    for (idx, slot) in slots.iter().enumerate() {
        if let Some(value) = slot {
            last = *value;
        }
        if idx > 0 {
            filled.push(last);
        }
    }
    Some(filled)
}

fn column<'a>(df: &'a DataFrame, path: &Path, name: &'static str) -> Result<&'a Series> {
    df.column(name).map_err(|_| Error::MissingColumn {
        path: path.to_path_buf(),
        column: name,
    })
}

/// Null cells stay `None`. A present cell that isn't a number fails the file.
fn scores(df: &DataFrame, path: &Path, name: &'static str) -> Result<Vec<Option<f64>>> {
    let series = column(df, path, name)?;
    let cast = series.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
    if cast.null_count() == series.null_count() {
        return Ok(values);
    }

    let raw = series.cast(&DataType::String)?;
    let value = raw
        .str()?
        .into_iter()
        .zip(&values)
        .find_map(|(raw, parsed)| match (raw, parsed) {
            (Some(raw), None) => Some(raw.to_string()),
            _ => None,
        })
        .unwrap_or_default();
    Err(Error::Score {
        path: path.to_path_buf(),
        column: name,
        value,
    })
}

fn elapsed_seconds(timestamps: &Series, path: &Path) -> Result<Vec<i64>> {
    let timestamps = timestamps.cast(&DataType::String)?;
    let parsed = timestamps
        .str()?
        .into_iter()
        .map(|value| {
            value
                .and_then(parse_datetime)
                .ok_or_else(|| Error::Timestamp {
                    path: path.to_path_buf(),
                    value: value.unwrap_or("null").to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(start) = parsed.first().copied() else {
        return Ok(Vec::new());
    };
    Ok(parsed
        .into_iter()
        .map(|t| (t - start).num_seconds())
        .collect())
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
