//! LTO reference table extraction from an ICAO Engine Emissions Databank
//! export.
//!
//! The databank ships as a spreadsheet with a gaseous-emissions sheet and
//! an nvPM sheet; both are read here as CSV exports. Rows are selected by
//! position (0-based data row) and must name the same engines, in the same
//! order, in both sheets.

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::io::{Table, TableRecord};
use crate::reference::LtoMode;

const RATED_THRUST: &str = "Rated Thrust (kN)";

/// Rows of one engine family in both sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabankSelection {
    pub gaseous_rows: Vec<usize>,
    pub nvpm_rows: Vec<usize>,
}

impl Default for DatabankSelection {
    /// LEAP-1A entries of databank issue 28c.
    fn default() -> Self {
        Self {
            gaseous_rows: vec![176, 177, 179, 181],
            nvpm_rows: vec![182, 183, 185, 187],
        }
    }
}

/// One engine at one LTO mode.
#[derive(Debug, Clone, Copy)]
pub struct LtoRecord {
    pub mode: LtoMode,
    pub thrust_kn: f64,
    pub fuel_flow: f64, // kg/s
    pub ei_nox: f64,    // g/kg
    pub ei_hc: f64,     // g/kg
    pub ei_co: f64,     // g/kg
    pub ei_mass: f64,   // mg/kg
    pub ei_number: f64, // #/kg
}

impl TableRecord for LtoRecord {
    fn header() -> &'static [&'static str] {
        &["Thrust", "Wf", "EINOx", "EIHC", "EICO", "EImass", "EInum"]
    }

    fn fields(&self) -> Vec<f64> {
        vec![
            self.thrust_kn,
            self.fuel_flow,
            self.ei_nox,
            self.ei_hc,
            self.ei_co,
            self.ei_mass,
            self.ei_number,
        ]
    }
}

fn gaseous_column(species: &str, mode: LtoMode) -> String {
    format!("{} EI {} (g/kg)", species, mode.label())
}

fn mass_column(mode: LtoMode) -> String {
    format!("nvPM EImass_SL {} (mg/kg)", mode.label())
}

fn number_column(mode: LtoMode) -> String {
    match mode {
        // spelled this way in the databank
        LtoMode::Approach => "nvPM Einum App (#/kg)".to_string(),
        _ => format!("nvPM EInum {} (#/kg)", mode.label()),
    }
}

fn fuel_flow_column(mode: LtoMode) -> String {
    format!("Fuel Flow {} (kg/sec)", mode.label())
}

/// Collect every selected engine at every LTO mode, ordered by fuel flow.
pub fn extract(gaseous: &Table, nvpm: &Table, selection: &DatabankSelection) -> Result<Vec<LtoRecord>> {
    crate::error::ensure_same_len(
        "gaseous rows",
        selection.gaseous_rows.len(),
        "nvPM rows",
        selection.nvpm_rows.len(),
    )?;
    if selection.gaseous_rows.is_empty() {
        return Err(EmissionError::invalid("databank selection", "no rows selected"));
    }

    let mut records = Vec::with_capacity(LtoMode::ALL.len() * selection.gaseous_rows.len());
    for mode in LtoMode::ALL {
        for (&g, &n) in selection.gaseous_rows.iter().zip(&selection.nvpm_rows) {
            records.push(LtoRecord {
                mode,
                thrust_kn: gaseous.number(g, RATED_THRUST)? * mode.thrust_fraction(),
                fuel_flow: nvpm.number(n, &fuel_flow_column(mode))?,
                ei_nox: gaseous.number(g, &gaseous_column("NOx", mode))?,
                ei_hc: gaseous.number(g, &gaseous_column("HC", mode))?,
                ei_co: gaseous.number(g, &gaseous_column("CO", mode))?,
                ei_mass: nvpm.number(n, &mass_column(mode))?,
                ei_number: nvpm.number(n, &number_column(mode))?,
            });
        }
    }

    // stable, so equal fuel flows keep mode order
    records.sort_by(|a, b| a.fuel_flow.total_cmp(&b.fuel_flow));
    tracing::debug!(rows = records.len(), "extracted LTO records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaseous_sheet() -> Table {
        let mut header = vec![RATED_THRUST.to_string()];
        for species in ["HC", "CO", "NOx"] {
            for mode in LtoMode::ALL {
                header.push(gaseous_column(species, mode));
            }
        }
        let rows = [
            // thrust, HC x4, CO x4, NOx x4
            "120.6,0.1,0.1,0.1,0.2,0.3,0.3,2.0,20.0,30.0,25.0,11.0,5.0",
            "999,9,9,9,9,9,9,9,9,9,9,9,9",
            "130.0,0.2,0.2,0.2,0.3,0.4,0.4,2.5,22.0,32.0,27.0,12.0,5.5",
        ];
        Table::parse("gaseous.csv", &format!("{}\n{}\n", header.join(","), rows.join("\n"))).unwrap()
    }

    fn nvpm_sheet() -> Table {
        let mut header = Vec::new();
        for mode in LtoMode::ALL {
            header.push(mass_column(mode));
            header.push(number_column(mode));
            header.push(fuel_flow_column(mode));
        }
        let rows = [
            "37.6,1.02e15,1.05,29.4,9.1e14,0.86,1.95,4.3e13,0.29,0.82,1.12e14,0.10",
            "40.1,1.10e15,1.12,31.0,9.5e14,0.92,2.10,4.6e13,0.31,0.90,1.20e14,0.11",
        ];
        Table::parse("nvpm.csv", &format!("{}\n{}\n", header.join(","), rows.join("\n"))).unwrap()
    }

    #[test]
    fn two_engines_sorted_by_fuel_flow() {
        let selection = DatabankSelection { gaseous_rows: vec![0, 2], nvpm_rows: vec![0, 1] };
        let records = extract(&gaseous_sheet(), &nvpm_sheet(), &selection).unwrap();

        assert_eq!(records.len(), 8);
        assert!(records.windows(2).all(|w| w[0].fuel_flow <= w[1].fuel_flow));

        let idle = records[0];
        assert_eq!(idle.mode, LtoMode::Idle);
        assert_eq!(idle.fuel_flow, 0.10);
        assert!((idle.thrust_kn - 120.6 * 0.07).abs() < 1e-12);
        assert_eq!(idle.ei_nox, 5.0);
        assert_eq!(idle.ei_mass, 0.82);
        assert_eq!(idle.ei_number, 1.12e14);

        let top = records[7];
        assert_eq!(top.mode, LtoMode::TakeOff);
        assert_eq!(top.thrust_kn, 130.0);
        assert_eq!(top.ei_hc, 0.2);
    }

    #[test]
    fn approach_uses_databank_spelling() {
        assert_eq!(number_column(LtoMode::Approach), "nvPM Einum App (#/kg)");
        assert_eq!(number_column(LtoMode::TakeOff), "nvPM EInum T/O (#/kg)");
    }

    #[test]
    fn selection_mismatch_rejected() {
        let selection = DatabankSelection { gaseous_rows: vec![0, 2], nvpm_rows: vec![0] };
        assert!(extract(&gaseous_sheet(), &nvpm_sheet(), &selection).is_err());
    }

    #[test]
    fn row_past_end_is_malformed() {
        let selection = DatabankSelection { gaseous_rows: vec![0], nvpm_rows: vec![7] };
        let err = extract(&gaseous_sheet(), &nvpm_sheet(), &selection).unwrap_err();
        assert!(matches!(err, EmissionError::MalformedTable { .. }));
    }
}
