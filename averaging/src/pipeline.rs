use std::path::{Path, PathBuf};

use crate::{
    aggregate::AggregateTable,
    combination::Combination,
    discovery::find_split_files,
    manifest::{write_manifest, ManifestRecord, MANIFEST_FILE},
    metadata::Metadata,
    settings::BudgetPolicy,
    trajectory::{RawRun, Trajectory},
    Error, Result,
};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub output_dir: PathBuf,
    pub policy: BudgetPolicy,
    pub write_manifest: bool,
}

impl PipelineConfig {
    /// Metadata at `<input_dir>/metadata.csv`, output to `<input_dir>/averaged`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            metadata_path: input_dir.join("metadata.csv"),
            output_dir: input_dir.join("averaged"),
            input_dir,
            policy: BudgetPolicy::default(),
            write_manifest: false,
        }
    }
}

/// A (dataset, combination) group that produced an output file.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutput {
    pub dataset: String,
    pub combination: Combination,
    pub num_splits: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub written: Vec<GroupOutput>,
    pub skipped: Vec<(String, Combination)>,
}

/// Averages every (dataset, combination) group found in the input directory.
///
/// Fails before reading anything if the output directory already exists. The directory
/// is only created once the metadata has been loaded.
pub fn run(config: &PipelineConfig) -> Result<Report> {
    if config.output_dir.exists() {
        return Err(Error::OutputDirExists(config.output_dir.clone()));
    }
    let metadata = Metadata::load(&config.metadata_path, &config.policy)?;
    std::fs::create_dir_all(&config.output_dir)?;
    tracing::info!(
        "Budget:{}s, datasets:{:?}, search types:{:?}, strategies:{:?}, sizes:{:?}",
        metadata.budget,
        metadata.datasets,
        metadata.search_types,
        metadata.validation_strategies,
        metadata.validation_sizes
    );
    let combinations = Combination::all(&metadata);

    let mut report = Report::default();
    let mut manifest = Vec::new();
    for dataset in &metadata.datasets {
        for combination in &combinations {
            let Some(table) =
                average_group(&config.input_dir, dataset, combination, metadata.budget)?
            else {
                tracing::debug!("No files for {dataset}_{combination}, skipped");
                report.skipped.push((dataset.clone(), combination.clone()));
                continue;
            };

            let name = output_name(dataset, combination);
            let path = config.output_dir.join(&name);
            table.write_csv(&path)?;
            tracing::info!("Saved {} ({} splits)", path.display(), table.num_runs);

            if config.write_manifest {
                manifest.push(ManifestRecord::new(dataset, combination, &name, &table));
            }
            report.written.push(GroupOutput {
                dataset: dataset.clone(),
                combination: combination.clone(),
                num_splits: table.num_runs,
                path,
            });
        }
    }

    if config.write_manifest {
        let path = config.output_dir.join(MANIFEST_FILE);
        write_manifest(&path, &manifest)?;
        tracing::info!("Saved {}", path.display());
    }

    Ok(report)
}

/// Returns `None` when no split file matches the group.
pub fn average_group(
    input_dir: &Path,
    dataset: &str,
    combination: &Combination,
    budget: u32,
) -> Result<Option<AggregateTable>> {
    let files = find_split_files(input_dir, dataset, combination)?;
    if files.is_empty() {
        return Ok(None);
    }

    let runs = files
        .iter()
        .map(|file| -> Result<Trajectory> {
            let trajectory = RawRun::from_csv(&file.path)?.align(budget)?;
            tracing::info!("Processed {}", file.path.display());
            Ok(trajectory)
        })
        .collect::<Result<Vec<Trajectory>>>()?;

    AggregateTable::from_runs(&runs).map(Some)
}

pub fn output_name(dataset: &str, combination: &Combination) -> String {
    format!("{dataset}_{}", combination.token())
}
