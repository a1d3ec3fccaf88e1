use std::path::Path;

use serde::Deserialize;

use crate::{settings::BudgetPolicy, Error, Result};

pub const METADATA_CSV_COLUMNS: &[&str] = &[
    "dataset_name",
    "search_type",
    "validation_strategy",
    "validation_size",
    "total_budget",
];

/// One experiment run as described in the metadata table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetadataRecord {
    pub dataset_name: String,
    pub search_type: String,
    pub validation_strategy: String,
    pub validation_size: String,
    pub total_budget: f64,
}

/// Distinct parameter values of all non-diagnostic runs, plus the common time budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub budget: u32,
    pub datasets: Vec<String>,
    pub search_types: Vec<String>,
    pub validation_strategies: Vec<String>,
    pub validation_sizes: Vec<String>,
}

impl Metadata {
    pub fn load(path: &Path, policy: &BudgetPolicy) -> Result<Self> {
        let metadata_error = |source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(metadata_error)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<MetadataRecord>, _>>()
            .map_err(metadata_error)?;
        Self::from_records(&records, policy)
    }

    pub fn from_records(records: &[MetadataRecord], policy: &BudgetPolicy) -> Result<Self> {
        let runs: Vec<&MetadataRecord> = records
            .iter()
            .filter(|r| r.total_budget != policy.individual_run_budget)
            .collect();

        let mut metadata = Metadata::default();
        for run in &runs {
            push_distinct(&mut metadata.datasets, &run.dataset_name);
            push_distinct(&mut metadata.search_types, &run.search_type);
            push_distinct(&mut metadata.validation_strategies, &run.validation_strategy);
            push_distinct(&mut metadata.validation_sizes, &run.validation_size);
        }

        if metadata
            .search_types
            .iter()
            .any(|s| *s == policy.baseline_search_type)
        {
            metadata.budget = policy.baseline_budget;
        } else if let Some(max) = runs.iter().map(|r| r.total_budget).reduce(f64::max) {
            if !(max >= 1.0 && max.fract() == 0.0 && max <= u32::MAX as f64) {
                return Err(Error::InvalidBudget(max));
            }
            metadata.budget = max as u32;
        }

        Ok(metadata)
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
