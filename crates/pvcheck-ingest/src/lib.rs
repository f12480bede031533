//! Parameter value record sources.

pub mod error;
pub mod json_export;
pub mod source;

pub use error::{IngestError, Result};
pub use json_export::{JsonExportSource, parse_export};
pub use source::{DatabaseLocation, RecordSource, open_source};
