use std::{fs::File, path::Path};

use polars::prelude::*;

use crate::{
    trajectory::{Trajectory, OPTIMIZATION_SCORE, TEST_SCORE, TIMESTAMP},
    Error, Result,
};

pub const OPTIMIZATION_SCORE_STD: &str = "single_best_optimization_score_std";
pub const TEST_SCORE_STD: &str = "single_best_test_score_std";

pub const AGGREGATE_CSV_COLUMNS: &[&str] = &[
    TIMESTAMP,
    OPTIMIZATION_SCORE,
    TEST_SCORE,
    OPTIMIZATION_SCORE_STD,
    TEST_SCORE_STD,
];

/// Per-second mean and standard deviation of both scores across the splits of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub seconds: Vec<i64>,
    pub optimization_mean: Vec<f64>,
    pub test_mean: Vec<f64>,
    pub optimization_std: Vec<f64>,
    pub test_std: Vec<f64>,
    pub num_runs: usize,
}

impl AggregateTable {
    /// Combines row-aligned trajectories. The standard deviation is the sample one
    /// (`ddof = 1`), and zero for a single run.
    pub fn from_runs(runs: &[Trajectory]) -> Result<Self> {
        let first = runs.first().ok_or(Error::EmptyGroup)?;
        let expected = first.len();
        for (index, run) in runs.iter().enumerate() {
            if run.len() != expected {
                return Err(Error::LengthMismatch {
                    index,
                    len: run.len(),
                    expected,
                });
            }
        }

        let (optimization_mean, optimization_std) =
            column_stats(runs, |run| &run.optimization_scores);
        let (test_mean, test_std) = column_stats(runs, |run| &run.test_scores);

        Ok(Self {
            seconds: first.seconds.clone(),
            optimization_mean,
            test_mean,
            optimization_std,
            test_std,
            num_runs: runs.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new(TIMESTAMP, &self.seconds),
            Series::new(OPTIMIZATION_SCORE, &self.optimization_mean),
            Series::new(TEST_SCORE, &self.test_mean),
            Series::new(OPTIMIZATION_SCORE_STD, &self.optimization_std),
            Series::new(TEST_SCORE_STD, &self.test_std),
        ])
    }

    /// Writes the table as CSV. An existing file is never replaced.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::OutputFileExists(path.to_path_buf()));
        }
        let mut df = self.to_frame()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).finish(&mut df)?;
        Ok(())
    }
}

fn column_stats<F>(runs: &[Trajectory], column: F) -> (Vec<f64>, Vec<f64>)
where
    F: Fn(&Trajectory) -> &Vec<f64>,
{
    let len = runs.first().map_or(0, Trajectory::len);
    let mut means = Vec::with_capacity(len);
    let mut stds = Vec::with_capacity(len);
    let mut row = Vec::with_capacity(runs.len());
    for idx in 0..len {
        row.clear();
        row.extend(runs.iter().map(|run| column(run)[idx]));
        // canonical order so that the result doesn't depend on the order of the runs
        row.sort_by(f64::total_cmp);
        let (mean, std) = mean_and_std(&row);
        means.push(mean);
        stds.push(std);
    }
    (means, stds)
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}
