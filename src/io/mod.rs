pub mod csv;
pub mod json;

pub use csv::{write_records, write_records_file, Table, TableRecord};
pub use json::{write_summary_file, RunSummary};
