use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{EmissionError, Result};
use crate::physics::FlightCondition;

/// Summary statistics of one method run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub method: String,
    pub conditions: Vec<FlightCondition>,
    pub rows: usize,
    pub ei_min: f64,
    pub ei_max: f64,
    pub output: Option<String>,
}

impl RunSummary {
    /// Compute summary from the corrected emission indices of a run.
    pub fn from_results(
        method: impl Into<String>,
        conditions: Vec<FlightCondition>,
        corrected: &[f64],
    ) -> Self {
        let ei_min = corrected.iter().copied().fold(f64::INFINITY, f64::min);
        let ei_max = corrected.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        RunSummary {
            method: method.into(),
            conditions,
            rows: corrected.len(),
            ei_min,
            ei_max,
            output: None,
        }
    }

    pub fn with_output(mut self, path: &Path) -> Self {
        self.output = Some(path.display().to_string());
        self
    }
}

/// Write run summary as JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &RunSummary) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer).map_err(serde_json::Error::io)
}

/// Write run summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &RunSummary) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| EmissionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_summary(&mut writer, summary)
        .map_err(std::io::Error::from)
        .and_then(|_| writer.flush())
        .map_err(|source| EmissionError::Io { path: path.to_path_buf(), source })?;
    tracing::info!(path = %path.display(), "wrote run summary");
    Ok(())
}
