use std::path::Path;

use serde::Serialize;

use crate::{aggregate::AggregateTable, combination::Combination, Error, Result};

pub const MANIFEST_FILE: &str = "manifest.csv";

pub const MANIFEST_CSV_COLUMNS: &[&str] = &[
    "dataset",
    "search_type",
    "validation_strategy",
    "validation_size",
    "num_splits",
    "output",
    "final_optimization_score",
    "final_test_score",
    "final_optimization_score_std",
    "final_test_score_std",
];

/// One written group, with the scores reached at the end of the budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestRecord {
    pub dataset: String,
    pub search_type: String,
    pub validation_strategy: String,
    pub validation_size: String,
    pub num_splits: usize,
    pub output: String,
    pub final_optimization_score: f64,
    pub final_test_score: f64,
    pub final_optimization_score_std: f64,
    pub final_test_score_std: f64,
}

impl ManifestRecord {
    pub fn new(
        dataset: &str,
        combination: &Combination,
        output: &str,
        table: &AggregateTable,
    ) -> Self {
        let last = |values: &[f64]| values.last().copied().unwrap_or(f64::NAN);
        Self {
            dataset: dataset.to_string(),
            search_type: combination.search_type.clone(),
            validation_strategy: combination.validation_strategy.clone(),
            validation_size: combination.validation_size.clone(),
            num_splits: table.num_runs,
            output: output.to_string(),
            final_optimization_score: last(&table.optimization_mean),
            final_test_score: last(&table.test_mean),
            final_optimization_score_std: last(&table.optimization_std),
            final_test_score_std: last(&table.test_std),
        }
    }
}

pub fn write_manifest(path: &Path, records: &[ManifestRecord]) -> Result<()> {
    if path.exists() {
        return Err(Error::OutputFileExists(path.to_path_buf()));
    }
    let mut wtr = csv::Writer::from_path(path)?;
    // serialize() only emits the header along with the first record
    if records.is_empty() {
        wtr.write_record(MANIFEST_CSV_COLUMNS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
