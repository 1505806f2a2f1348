//! Run configuration loaded from JSON. Every field has a default, so a
//! config file only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::databank::DatabankSelection;
use crate::error::{EmissionError, Result};
use crate::methods::{Bffm2Config, DlrConfig, MeemConfig, P3t3Config};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub bffm2: Bffm2Config,
    pub dlr: DlrConfig,
    pub p3t3: P3t3Config,
    pub meem: MeemConfig,
    pub databank: DatabankSelection,
}

impl RunConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EmissionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| EmissionError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded run configuration");
        Ok(config)
    }
}
