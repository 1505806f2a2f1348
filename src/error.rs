use std::path::PathBuf;

use thiserror::Error;

/// Every failure the pipelines can report.
///
/// Nothing is retried or recovered: the first error aborts the computation
/// and is handed back to the caller with the offending quantity named.
#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("{quantity} = {value} is outside the valid domain [{min}, {max}]")]
    OutOfDomain {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid {quantity}: {reason}")]
    InvalidInput { quantity: String, reason: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {path}: {reason}")]
    MalformedTable { path: String, reason: String },

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("row {row}: {source}")]
    AtRow {
        row: usize,
        #[source]
        source: Box<EmissionError>,
    },
}

pub type Result<T> = std::result::Result<T, EmissionError>;

impl EmissionError {
    pub fn invalid(quantity: impl Into<String>, reason: impl Into<String>) -> Self {
        EmissionError::InvalidInput {
            quantity: quantity.into(),
            reason: reason.into(),
        }
    }

    /// Tag an error with the input row it came from.
    pub fn at_row(self, row: usize) -> Self {
        EmissionError::AtRow {
            row,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping row tags.
    pub fn root(&self) -> &EmissionError {
        match self {
            EmissionError::AtRow { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Require two elementwise inputs to have the same length.
pub fn ensure_same_len(name_a: &str, a: usize, name_b: &str, b: usize) -> Result<()> {
    if a != b {
        return Err(EmissionError::invalid(
            format!("{name_a}/{name_b}"),
            format!("length mismatch ({a} vs {b})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_tag_keeps_root() {
        let err = EmissionError::OutOfDomain {
            quantity: "fuel flow",
            value: 9.0,
            min: 1.0,
            max: 2.0,
        }
        .at_row(3);
        assert!(err.to_string().starts_with("row 3:"));
        assert!(matches!(err.root(), EmissionError::OutOfDomain { .. }));
    }

    #[test]
    fn length_mismatch_is_invalid_input() {
        assert!(ensure_same_len("a", 2, "b", 2).is_ok());
        let err = ensure_same_len("axis", 3, "values", 2).unwrap_err();
        assert!(matches!(err, EmissionError::InvalidInput { .. }));
    }
}
