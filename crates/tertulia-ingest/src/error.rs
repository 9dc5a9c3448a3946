//! Error types for the tertulia-ingest crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Filename is empty")]
    EmptyFilename,

    #[error("Only .csv files are accepted: {0}")]
    NotCsv(String),

    #[error("Filename not recognized: {0}")]
    UnrecognizedFile(String),

    #[error("CSV content is not valid UTF-8")]
    Encoding,

    #[error("Could not detect a delimiter: the file parses as a single column")]
    SingleColumn,

    #[error("The CSV file is empty or has no data rows")]
    Empty,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
