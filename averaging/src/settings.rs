use std::{fs::File, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

/// Rules for which metadata rows count and how long the common time axis is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BudgetPolicy {
    /// Rows with this `total_budget` are single-trial diagnostic runs and are ignored.
    pub individual_run_budget: f64,
    /// Search type of the no-search baseline.
    pub baseline_search_type: String,
    /// Time axis length used whenever the baseline is part of the search types.
    pub baseline_budget: u32,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            individual_run_budget: 60.0,
            baseline_search_type: "default".to_string(),
            baseline_budget: 3600,
        }
    }
}

impl BudgetPolicy {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let f = File::open(path)?;
        serde_json::from_reader(f).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }
}
