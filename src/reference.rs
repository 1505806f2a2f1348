use std::path::Path;

use crate::error::{EmissionError, Result};
use crate::fit::{CorrectionCurve, CurveBuilder};
use crate::io::Table;

// ---------------------------------------------------------------------------
// LTO cycle
// ---------------------------------------------------------------------------

/// Certification landing/take-off modes, in databank column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtoMode {
    TakeOff,
    ClimbOut,
    Approach,
    Idle,
}

impl LtoMode {
    pub const ALL: [LtoMode; 4] = [LtoMode::TakeOff, LtoMode::ClimbOut, LtoMode::Approach, LtoMode::Idle];

    /// Installation correction applied to certification fuel flow.
    pub fn fuel_flow_factor(self) -> f64 {
        match self {
            LtoMode::TakeOff => 1.01,
            LtoMode::ClimbOut => 1.013,
            LtoMode::Approach => 1.02,
            LtoMode::Idle => 1.1,
        }
    }

    /// Nominal thrust setting as a fraction of rated thrust.
    pub fn thrust_fraction(self) -> f64 {
        match self {
            LtoMode::TakeOff => 1.0,
            LtoMode::ClimbOut => 0.85,
            LtoMode::Approach => 0.30,
            LtoMode::Idle => 0.07,
        }
    }

    /// Column tag used by the emissions databank.
    pub fn label(self) -> &'static str {
        match self {
            LtoMode::TakeOff => "T/O",
            LtoMode::ClimbOut => "C/O",
            LtoMode::Approach => "App",
            LtoMode::Idle => "Idle",
        }
    }
}

/// Certified fuel flow and emission index for one LTO mode.
#[derive(Debug, Clone, Copy)]
pub struct LtoReference {
    pub mode: LtoMode,
    pub fuel_flow: f64, // kg/s
    pub ei: f64,
}

/// Build LTO references from columns given in take-off, climb-out,
/// approach, idle order.
pub fn lto_references(fuel_flow: &[f64], ei: &[f64]) -> Result<Vec<LtoReference>> {
    if fuel_flow.len() != LtoMode::ALL.len() || ei.len() != LtoMode::ALL.len() {
        return Err(EmissionError::invalid(
            "LTO reference",
            format!(
                "expected one row per mode (4), got {} fuel flows and {} indices",
                fuel_flow.len(),
                ei.len()
            ),
        ));
    }
    Ok(LtoMode::ALL
        .iter()
        .zip(fuel_flow.iter().zip(ei))
        .map(|(&mode, (&fuel_flow, &ei))| LtoReference { mode, fuel_flow, ei })
        .collect())
}

/// Installation-corrected fuel flow against EI, sorted for fitting.
pub fn corrected_fuel_flow_set(refs: &[LtoReference]) -> Result<ReferenceSet> {
    let points = refs
        .iter()
        .map(|r| ReferencePoint { axis: r.fuel_flow * r.mode.fuel_flow_factor(), value: r.ei })
        .collect();
    ReferenceSet::from_points("reference fuel flow", points)
}

/// Read a four-row LTO table (`Wf` plus an EI column).
pub fn load_lto_table(path: impl AsRef<Path>, ei_column: &str) -> Result<Vec<LtoReference>> {
    let table = Table::read_file(path)?;
    lto_references(&table.numbers("Wf")?, &table.numbers(ei_column)?)
}

// ---------------------------------------------------------------------------
// Reference sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub axis: f64,
    pub value: f64,
}

/// Calibration points sorted along the interpolation axis.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    name: &'static str,
    points: Vec<ReferencePoint>,
}

impl ReferenceSet {
    /// Sort by axis; non-finite data or repeated axis values are rejected.
    pub fn from_points(name: &'static str, mut points: Vec<ReferencePoint>) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| !p.axis.is_finite() || !p.value.is_finite()) {
            return Err(EmissionError::invalid(
                name,
                format!("non-finite reference point ({}, {})", p.axis, p.value),
            ));
        }
        points.sort_by(|a, b| a.axis.total_cmp(&b.axis));
        if let Some(w) = points.windows(2).find(|w| w[0].axis == w[1].axis) {
            return Err(EmissionError::invalid(name, format!("duplicate axis value {}", w[0].axis)));
        }
        Ok(Self { name, points })
    }

    pub fn from_columns(name: &'static str, axis: &[f64], values: &[f64]) -> Result<Self> {
        crate::error::ensure_same_len("axis", axis.len(), "values", values.len())?;
        let points = axis
            .iter()
            .zip(values)
            .map(|(&axis, &value)| ReferencePoint { axis, value })
            .collect();
        Self::from_points(name, points)
    }

    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn axis(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.axis).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn fit(&self, builder: CurveBuilder) -> Result<CorrectionCurve> {
        builder.quantity(self.name).fit(&self.axis(), &self.values())
    }
}

// ---------------------------------------------------------------------------
// Preset reference data
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// LTO NOx data used to validate BFFM2 (Schaefer & Bartosch, 2013).
    pub fn bffm2_validation() -> Vec<LtoReference> {
        vec![
            LtoReference { mode: LtoMode::TakeOff, fuel_flow: 3.91, ei: 45.7 },
            LtoReference { mode: LtoMode::ClimbOut, fuel_flow: 3.1, ei: 33.3 },
            LtoReference { mode: LtoMode::Approach, fuel_flow: 1.0, ei: 11.58 },
            LtoReference { mode: LtoMode::Idle, fuel_flow: 0.3, ei: 5.33 },
        ]
    }

    /// Cruise fuel flows (kg/s) paired with `bffm2_validation`.
    pub fn bffm2_cruise_fuel_flow() -> Vec<f64> {
        vec![0.477, 0.38, 0.36, 0.339, 0.314, 0.198]
    }

    /// Small demonstration data set for the DLR method.
    pub fn dlr_example() -> Vec<LtoReference> {
        vec![
            LtoReference { mode: LtoMode::TakeOff, fuel_flow: 30.0, ei: 1.2 },
            LtoReference { mode: LtoMode::ClimbOut, fuel_flow: 40.0, ei: 1.4 },
            LtoReference { mode: LtoMode::Approach, fuel_flow: 10.0, ei: 1.6 },
            LtoReference { mode: LtoMode::Idle, fuel_flow: 5.0, ei: 1.7 },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrected_fuel_flow_is_sorted() {
        let set = corrected_fuel_flow_set(&presets::bffm2_validation()).unwrap();
        let axis = set.axis();
        assert_eq!(axis.len(), 4);
        assert!(axis.windows(2).all(|w| w[0] < w[1]));
        assert!((axis[0] - 0.33).abs() < 1e-12);
        assert!((axis[3] - 3.91 * 1.01).abs() < 1e-12);
        assert_eq!(set.values(), vec![5.33, 11.58, 33.3, 45.7]);
    }

    #[test]
    fn unordered_modes_are_sorted() {
        let set = corrected_fuel_flow_set(&presets::dlr_example()).unwrap();
        assert_eq!(set.values(), vec![1.7, 1.6, 1.2, 1.4]);
    }

    #[test]
    fn duplicate_axis_rejected() {
        let r = ReferenceSet::from_columns("t3", &[600.0, 700.0, 600.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(r, Err(EmissionError::InvalidInput { .. })));
    }

    #[test]
    fn lto_table_needs_four_rows() {
        assert!(lto_references(&[1.0, 2.0], &[3.0, 4.0]).is_err());
        let refs = lto_references(&[4.0, 3.0, 1.0, 0.3], &[40.0, 30.0, 10.0, 5.0]).unwrap();
        assert_eq!(refs[2].mode, LtoMode::Approach);
        assert_eq!(refs[3].mode.label(), "Idle");
    }

    #[test]
    fn reference_set_fits_curve() {
        let set = ReferenceSet::from_columns("T3 (K)", &[700.0, 600.0], &[20.0, 10.0]).unwrap();
        let curve = set.fit(CurveBuilder::new()).unwrap();
        assert_eq!(curve.evaluate(650.0).unwrap(), 15.0);
        assert!(curve.evaluate(800.0).unwrap_err().to_string().contains("T3 (K)"));
    }
}
