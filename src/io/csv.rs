use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{EmissionError, Result};

// ---------------------------------------------------------------------------
// Reading: header-row tables consumed by column name
// ---------------------------------------------------------------------------

/// A comma-separated table with a header row. Cells are kept as text and
/// converted on access, so sheets mixing names and numbers can be read.
#[derive(Debug, Clone)]
pub struct Table {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV text. `source` names the input in error messages.
    pub fn parse(source: &str, text: &str) -> Result<Table> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header_line = lines.next().ok_or_else(|| EmissionError::MalformedTable {
            path: source.to_string(),
            reason: "missing header row".into(),
        })?;
        let headers: Vec<String> = split_record(header_line)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let fields = split_record(line);
            if fields.len() != headers.len() {
                return Err(EmissionError::MalformedTable {
                    path: source.to_string(),
                    reason: format!(
                        "data row {} has {} fields, header has {}",
                        i,
                        fields.len(),
                        headers.len()
                    ),
                });
            }
            rows.push(fields);
        }

        Ok(Table { source: source.to_string(), headers, rows })
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EmissionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Table::parse(&path.display().to_string(), &text)?;
        if table.is_empty() {
            tracing::warn!(path = %path.display(), "table has a header but no data rows");
        }
        tracing::debug!(path = %path.display(), rows = table.len(), "read table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name of the input, as used in error messages.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name.trim())
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name.trim())
            .ok_or_else(|| EmissionError::MalformedTable {
                path: self.source.clone(),
                reason: format!("missing column {:?}", name.trim()),
            })
    }

    /// Numeric value of one cell.
    pub fn number(&self, row: usize, column: &str) -> Result<f64> {
        let col = self.column_index(column)?;
        let cell = self.rows.get(row).ok_or_else(|| EmissionError::MalformedTable {
            path: self.source.clone(),
            reason: format!("row {} requested, table has {} rows", row, self.rows.len()),
        })?;
        let text = cell[col].trim();
        text.parse::<f64>().map_err(|_| EmissionError::MalformedTable {
            path: self.source.clone(),
            reason: format!("row {}, column {:?}: {:?} is not a number", row, column.trim(), text),
        })
    }

    /// Whole column as numbers.
    pub fn numbers(&self, column: &str) -> Result<Vec<f64>> {
        (0..self.rows.len()).map(|r| self.number(r, column)).collect()
    }

    /// First present column out of several accepted spellings.
    pub fn numbers_any(&self, candidates: &[&str]) -> Result<Vec<f64>> {
        match candidates.iter().find(|c| self.has_column(c)) {
            Some(column) => self.numbers(column),
            None => Err(EmissionError::MalformedTable {
                path: self.source.clone(),
                reason: format!("missing column, expected one of {:?}", candidates),
            }),
        }
    }
}

/// Split one CSV record, honouring double-quoted fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

// ---------------------------------------------------------------------------
// Writing: one row per record
// ---------------------------------------------------------------------------

/// A result row that can be written as CSV.
pub trait TableRecord {
    fn header() -> &'static [&'static str];
    fn fields(&self) -> Vec<f64>;
}

/// Write records to CSV format: header row, then one row per record.
pub fn write_records<W: Write, R: TableRecord>(writer: &mut W, records: &[R]) -> io::Result<()> {
    writeln!(writer, "{}", R::header().join(","))?;

    for r in records {
        let row: Vec<String> = r.fields().iter().map(|v| v.to_string()).collect();
        writeln!(writer, "{}", row.join(","))?;
    }

    Ok(())
}

/// Write records to a CSV file at the given path.
pub fn write_records_file<R: TableRecord>(path: impl AsRef<Path>, records: &[R]) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| EmissionError::Io { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    tracing::info!(path = %path.display(), rows = records.len(), "wrote result table");
    Ok(())
}
