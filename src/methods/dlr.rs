//! DLR fuel flow method.
//!
//! Each operating point carries its own altitude, Mach number and fuel
//! flow. The sea-level EI comes from an exact polynomial interpolation
//! through the LTO points, then is scaled with the total-condition ratios.

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::fit::{AxisScale, CurveBuilder, FitMethod};
use crate::io::{Table, TableRecord};
use crate::physics::{FlightCondition, FlowState, HumidityModel};
use crate::reference::{corrected_fuel_flow_set, LtoReference};
use super::{AltitudeCorrector, CorrectionTerms};

/// EI_alt = EI_sl * delta^0.4 * theta^3 * exp(H)
#[derive(Debug, Clone, Copy)]
pub struct Dlr;

impl AltitudeCorrector for Dlr {
    fn correct(&self, ei_sl: f64, terms: &CorrectionTerms) -> f64 {
        ei_sl * terms.delta.powf(0.4) * terms.theta.powi(3) * terms.humidity.exp()
    }

    fn name(&self) -> &str {
        "DLR"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DlrConfig {
    pub humidity: HumidityModel,
    pub fit: FitMethod,
}

impl Default for DlrConfig {
    fn default() -> Self {
        Self {
            humidity: HumidityModel::AltitudeExponential,
            fit: FitMethod::Barycentric,
        }
    }
}

/// One operating point.
#[derive(Debug, Clone, Copy)]
pub struct DlrPoint {
    pub condition: FlightCondition,
    pub fuel_flow: f64, // kg/s
}

#[derive(Debug, Clone, Copy)]
pub struct DlrRecord {
    pub condition: FlightCondition,
    pub fuel_flow_alt: f64,
    pub fuel_flow_sl: f64,
    pub ei_sl: f64,
    pub ei_alt: f64,
}

impl TableRecord for DlrRecord {
    fn header() -> &'static [&'static str] {
        &["height", "Mach", "Wf", "Wf_SL", "EINOx_SL", "EINOx"]
    }

    fn fields(&self) -> Vec<f64> {
        vec![
            self.condition.altitude_m,
            self.condition.mach,
            self.fuel_flow_alt,
            self.fuel_flow_sl,
            self.ei_sl,
            self.ei_alt,
        ]
    }
}

/// Zip altitude, Mach and fuel flow columns into operating points.
pub fn points(altitude_m: &[f64], mach: &[f64], fuel_flow: &[f64]) -> Result<Vec<DlrPoint>> {
    crate::error::ensure_same_len("height", altitude_m.len(), "Mach", mach.len())?;
    crate::error::ensure_same_len("height", altitude_m.len(), "Wf", fuel_flow.len())?;
    Ok(altitude_m
        .iter()
        .zip(mach)
        .zip(fuel_flow)
        .map(|((&h, &m), &wf)| DlrPoint { condition: FlightCondition::new(h, m), fuel_flow: wf })
        .collect())
}

/// Operating points from a table with height in metres (`height_m` or
/// `height`), `Mach` and `Wf` columns.
pub fn load_points(table: &Table) -> Result<Vec<DlrPoint>> {
    points(
        &table.numbers_any(&["height_m", "height"])?,
        &table.numbers("Mach")?,
        &table.numbers("Wf")?,
    )
}

/// Wf_sl = Wf_alt / delta / sqrt(theta)
pub fn sea_level_fuel_flow(fuel_flow_alt: f64, flow: &FlowState) -> f64 {
    fuel_flow_alt / flow.delta / flow.theta.sqrt()
}

pub fn run(config: &DlrConfig, reference: &[LtoReference], points: &[DlrPoint]) -> Result<Vec<DlrRecord>> {
    if points.is_empty() {
        return Err(EmissionError::invalid("operating points", "no operating points given"));
    }

    let curve = corrected_fuel_flow_set(reference)?
        .fit(CurveBuilder::new().scale(AxisScale::Linear).method(config.fit))?;

    points
        .iter()
        .enumerate()
        .map(|(i, p)| evaluate_point(config, &curve, p).map_err(|e| e.at_row(i)))
        .collect()
}

fn evaluate_point(
    config: &DlrConfig,
    curve: &crate::fit::CorrectionCurve,
    point: &DlrPoint,
) -> Result<DlrRecord> {
    let flow = FlowState::at(&point.condition)?;
    let humidity = config.humidity.correction(&point.condition, &flow)?;
    let fuel_flow_sl = sea_level_fuel_flow(point.fuel_flow, &flow);
    let ei_sl = curve.evaluate(fuel_flow_sl)?;

    let terms = CorrectionTerms {
        delta: flow.delta,
        theta: flow.theta,
        pressure_ratio: 1.0,
        humidity,
    };
    tracing::debug!(
        altitude_m = point.condition.altitude_m,
        mach = point.condition.mach,
        delta = flow.delta,
        theta = flow.theta,
        humidity,
        "DLR operating point"
    );

    Ok(DlrRecord {
        condition: point.condition,
        fuel_flow_alt: point.fuel_flow,
        fuel_flow_sl,
        ei_sl,
        ei_alt: Dlr.correct(ei_sl, &terms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::presets;

    fn example_points() -> Vec<DlrPoint> {
        points(&[1000.0, 2000.0], &[0.5, 0.6], &[20.0, 15.0]).unwrap()
    }

    #[test]
    fn example_operating_points() {
        let records = run(&DlrConfig::default(), &presets::dlr_example(), &example_points()).unwrap();
        let expected = [
            (18.762_814_320_882_544, 1.377_485_079_321_159_7, 1.590_583_686_076_938_7),
            (14.814_098_212_322_389, 1.480_527_652_936_563_6, 1.709_819_232_911_084),
        ];
        for (r, (wf_sl, ei_sl, ei_alt)) in records.iter().zip(expected) {
            assert!((r.fuel_flow_sl - wf_sl).abs() < 1e-8);
            assert!((r.ei_sl - ei_sl).abs() < 1e-8);
            assert!((r.ei_alt - ei_alt).abs() / ei_alt < 1e-6);
        }
    }

    #[test]
    fn lagrange_fit_reproduces_lto_points() {
        let set = corrected_fuel_flow_set(&presets::dlr_example()).unwrap();
        let curve = set.fit(CurveBuilder::new().method(FitMethod::Barycentric)).unwrap();
        for p in set.points() {
            let ei = Dlr.correct(curve.evaluate(p.axis).unwrap(), &CorrectionTerms::identity());
            assert_eq!(ei, p.value);
        }
    }

    #[test]
    fn mismatched_columns_rejected() {
        assert!(points(&[1000.0], &[0.5, 0.6], &[20.0]).is_err());
    }

    #[test]
    fn extrapolation_is_an_error() {
        let far = points(&[1000.0], &[0.5], &[60.0]).unwrap();
        let err = run(&DlrConfig::default(), &presets::dlr_example(), &far).unwrap_err();
        assert!(matches!(err.root(), EmissionError::OutOfDomain { .. }));
    }

    #[test]
    fn points_load_from_table() {
        let t = Table::parse("dlr.csv", "height,Mach,Wf\n1000,0.5,20\n2000,0.6,15\n").unwrap();
        let p = load_points(&t).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p[1].condition.mach, 0.6);

        let t = Table::parse("dlr.csv", "height_m,Mach,Wf\n1000,0.5,20\n").unwrap();
        assert_eq!(load_points(&t).unwrap()[0].condition.altitude_m, 1000.0);
    }
}
