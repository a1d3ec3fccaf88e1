mod log;

use std::path::PathBuf;

use averaging::{
    pipeline::{self, PipelineConfig},
    settings::BudgetPolicy,
};
use clap::Parser;

/// Averages per-split result files of a hyperparameter search over a common time axis.
#[derive(Debug, Parser)]
#[command(name = "Split Averaging")]
struct Args {
    /// Directory with the raw `<dataset>_<split>_<algorithm>_<strategy>_<size>.csv` files
    input_dir: PathBuf,
    /// Metadata table [default: <INPUT_DIR>/metadata.csv]
    #[arg(short, long)]
    metadata: Option<PathBuf>,
    /// Output directory, must not exist yet [default: <INPUT_DIR>/averaged]
    #[arg(short, long)]
    outdir: Option<PathBuf>,
    /// Json file with the budget policy
    #[arg(short, long)]
    settings: Option<PathBuf>,
    /// Also write a manifest.csv with the final scores of every group
    #[arg(long)]
    manifest: bool,
    #[arg(long, default_value = "plain")]
    log_format: log::LogFormat,
    #[arg(long, default_value = "stdout")]
    log_to: log::LogOutput,
}

impl Args {
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::new(self.input_dir);
        if let Some(metadata) = self.metadata {
            config.metadata_path = metadata;
        }
        if let Some(outdir) = self.outdir {
            config.output_dir = outdir;
        }
        if let Some(settings) = self.settings {
            config.policy = BudgetPolicy::from_json_file(&settings)?;
        }
        config.write_manifest = self.manifest;
        Ok(config)
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.into_config()?;
    tracing::info!("Config: {:?}", config);

    let report = pipeline::run(&config)?;
    tracing::info!(
        "Completed: {} groups written, {} groups without files",
        report.written.len(),
        report.skipped.len()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let guard = log::config_tracing(args.log_format, &args.log_to);
    tracing::info!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        tracing::error!("error: {:#}", e);
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
