use crate::types::{Field, Source};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Please map a column for \"{0}\"")]
    MissingMapping(Field),

    #[error("{0} file is empty")]
    EmptySource(Source),

    #[error("No valid rows after normalization")]
    NoValidRows,

    #[error("No data after merging files")]
    NoMergedRows,

    #[error("No partners found")]
    NoPartners,

    #[error("No data loaded. Please load the files first (option 1)")]
    NotLoaded,

    #[error("Unknown field in field map: {0}")]
    UnknownField(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
