use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("output directory already exists: {0}")]
    OutputDirExists(PathBuf),
    #[error("output file already exists: {0}")]
    OutputFileExists(PathBuf),
    #[error("failed to read metadata {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read settings {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid total_budget in metadata: {0}")]
    InvalidBudget(f64),
    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{path}: cannot parse timestamp `{value}`")]
    Timestamp { path: PathBuf, value: String },
    #[error("{path}: column `{column}` has a non-numeric value `{value}`")]
    Score {
        path: PathBuf,
        column: &'static str,
        value: String,
    },
    #[error("{0}: result table has no rows")]
    EmptyTable(PathBuf),
    #[error("column `{0}` has no observed values")]
    NoObservations(&'static str),
    #[error("budget must be at least one second")]
    ZeroBudget,
    #[error("cannot aggregate an empty group")]
    EmptyGroup,
    #[error("run {index} has {len} rows, expected {expected}")]
    LengthMismatch {
        index: usize,
        len: usize,
        expected: usize,
    },
    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}
