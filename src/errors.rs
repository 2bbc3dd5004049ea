use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("insufficient history: need at least {required} rows for the configured lags and rolling window, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("schema mismatch between reference and current matrices: missing columns: {missing:?}, extra columns: {extra:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("empty dataset: {which} has no rows")]
    EmptyDataset { which: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("length mismatch: {name} has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("duplicate timestamp {0} in frame")]
    DuplicateTimestamp(chrono::DateTime<chrono::Utc>),

    #[error("IO error reading data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV parsing error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("timestamp parsing error at row {row} for value '{value}': no supported format matched")]
    TimestampParse { row: usize, value: String },
}

pub type Result<T> = std::result::Result<T, MonitorError>;
