//! tertulia-ingest: CSV bulk ingestion for the Tertulia book-club graph.
//!
//! Sniffs the delimiter of an uploaded CSV, normalizes its headers, and
//! dispatches it by filename to one of eight row-wise upsert routines.
//! Every row yields an explicit outcome collected into a [`LoadReport`].

pub mod error;
pub mod loader;
pub mod table;

pub use error::IngestError;
pub use loader::{BulkLoader, FileKind, LoadReport, RowOutcome};
pub use table::{detect_delimiter, CsvTable, Detection};
