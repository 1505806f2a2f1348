//! P3-T3 method.
//!
//! Combustor inlet temperature T3 is the correlating variable: the
//! sea-level calibration gives EI and P3 as functions of T3, and the
//! in-flight EI follows from the pressure ratio at equal T3.

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::fit::{CorrectionCurve, CurveBuilder, FitMethod};
use crate::io::{Table, TableRecord};
use crate::physics::{FlightCondition, FlowState, HumidityModel};
use crate::reference::ReferenceSet;
use crate::units;
use super::{AltitudeCorrector, CorrectionTerms};

const T3_COLUMNS: [&str; 3] = ["T3", "T3(K)", "T3[K]"];
const P3_COLUMNS: [&str; 3] = ["P3", "P3(Pa)", "P3[pa]"];

/// EI_alt = EI_sl * (P3_alt / P3_sl)^0.4 * exp(H)
#[derive(Debug, Clone, Copy)]
pub struct P3t3;

impl AltitudeCorrector for P3t3 {
    fn correct(&self, ei_sl: f64, terms: &CorrectionTerms) -> f64 {
        ei_sl * terms.pressure_ratio.powf(0.4) * terms.humidity.exp()
    }

    fn name(&self) -> &str {
        "P3T3"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct P3t3Config {
    /// Used for rows that do not carry their own altitude and Mach.
    pub condition: FlightCondition,
    pub humidity: HumidityModel,
    pub fit: FitMethod,
}

impl Default for P3t3Config {
    fn default() -> Self {
        Self {
            condition: FlightCondition::default(),
            humidity: HumidityModel::default(),
            fit: FitMethod::PiecewiseLinear,
        }
    }
}

impl P3t3Config {
    /// Engine-deck sweep variant: per-row conditions, dry air.
    pub fn npss() -> Self {
        Self { humidity: HumidityModel::Dry, ..Self::default() }
    }
}

/// Sea-level EI and P3 against T3.
#[derive(Debug, Clone)]
pub struct SeaLevelCalibration {
    pub t3: Vec<f64>,  // K
    pub p3: Vec<f64>,  // Pa
    pub ei: Vec<f64>,  // g/kg
}

impl SeaLevelCalibration {
    /// Columns `T3`, `P3`, `EINOx` (bracketed unit suffixes accepted).
    pub fn from_table(table: &Table) -> Result<Self> {
        Ok(Self {
            t3: table.numbers_any(&T3_COLUMNS)?,
            p3: table.numbers_any(&P3_COLUMNS)?,
            ei: table.numbers("EINOx")?,
        })
    }

    fn curves(&self, method: FitMethod) -> Result<(CorrectionCurve, CorrectionCurve)> {
        let builder = || CurveBuilder::new().method(method);
        let ei = ReferenceSet::from_columns("T3 (K)", &self.t3, &self.ei)?.fit(builder())?;
        let p3 = ReferenceSet::from_columns("T3 (K)", &self.t3, &self.p3)?.fit(builder())?;
        Ok((ei, p3))
    }
}

/// In-flight combustor inlet state at one operating point.
#[derive(Debug, Clone, Copy)]
pub struct P3t3Point {
    pub condition: FlightCondition,
    pub t3: f64, // K
    pub p3: f64, // Pa
}

const HEIGHT_FT_COLUMNS: [&str; 2] = ["height_ft", "height"];

/// Read in-flight T3/P3 rows. Tables with a height (ft, `height_ft` or
/// `height`) and a `Mach` column give each row its own condition; tables
/// with neither use `default`. Only one of the two is malformed.
pub fn load_points(table: &Table, default: FlightCondition) -> Result<Vec<P3t3Point>> {
    let has_height = HEIGHT_FT_COLUMNS.iter().any(|c| table.has_column(c));
    match (has_height, table.has_column("Mach")) {
        (true, true) => load_sweep_points(table),
        (false, false) => {
            let t3 = table.numbers_any(&T3_COLUMNS)?;
            let p3 = table.numbers_any(&P3_COLUMNS)?;
            Ok(t3
                .into_iter()
                .zip(p3)
                .map(|(t3, p3)| P3t3Point { condition: default, t3, p3 })
                .collect())
        }
        _ => Err(EmissionError::MalformedTable {
            path: table.source().to_string(),
            reason: "height and Mach columns must be given together".into(),
        }),
    }
}

/// Engine-deck sweep rows: height (ft) and `Mach` are required per row.
pub fn load_sweep_points(table: &Table) -> Result<Vec<P3t3Point>> {
    let t3 = table.numbers_any(&T3_COLUMNS)?;
    let p3 = table.numbers_any(&P3_COLUMNS)?;
    let height_ft = table.numbers_any(&HEIGHT_FT_COLUMNS)?;
    let mach = table.numbers("Mach")?;

    Ok(height_ft
        .into_iter()
        .zip(mach)
        .zip(t3.into_iter().zip(p3))
        .map(|((ft, mach), (t3, p3))| P3t3Point {
            condition: FlightCondition::new(units::feet_to_meters(ft), mach),
            t3,
            p3,
        })
        .collect())
}

#[derive(Debug, Clone, Copy)]
pub struct P3t3Record {
    pub t3: f64,
    pub p3: f64,
    pub p3_sl: f64,
    pub ei_sl: f64,
    pub ei_alt: f64,
}

impl TableRecord for P3t3Record {
    fn header() -> &'static [&'static str] {
        &["T3", "P3", "P3_SL", "EINOx_SL", "EINOx_Alt"]
    }

    fn fields(&self) -> Vec<f64> {
        vec![self.t3, self.p3, self.p3_sl, self.ei_sl, self.ei_alt]
    }
}

pub fn run(
    config: &P3t3Config,
    calibration: &SeaLevelCalibration,
    points: &[P3t3Point],
) -> Result<Vec<P3t3Record>> {
    if points.is_empty() {
        return Err(EmissionError::invalid("in-flight T3/P3", "no rows given"));
    }
    let (ei_curve, p3_curve) = calibration.curves(config.fit)?;

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            evaluate_point(config, &ei_curve, &p3_curve, p).map_err(|e| e.at_row(i))
        })
        .collect()
}

fn evaluate_point(
    config: &P3t3Config,
    ei_curve: &CorrectionCurve,
    p3_curve: &CorrectionCurve,
    point: &P3t3Point,
) -> Result<P3t3Record> {
    if !(point.p3 > 0.0) {
        return Err(EmissionError::invalid("P3", format!("{} Pa must be positive", point.p3)));
    }
    let flow = FlowState::at(&point.condition)?;
    let humidity = config.humidity.correction(&point.condition, &flow)?;
    let ei_sl = ei_curve.evaluate(point.t3)?;
    let p3_sl = p3_curve.evaluate(point.t3)?;

    let terms = CorrectionTerms {
        delta: flow.delta0,
        theta: flow.theta0,
        pressure_ratio: point.p3 / p3_sl,
        humidity,
    };
    tracing::debug!(t3 = point.t3, p3_ratio = terms.pressure_ratio, humidity, "P3T3 point");

    Ok(P3t3Record {
        t3: point.t3,
        p3: point.p3,
        p3_sl,
        ei_sl,
        ei_alt: P3t3.correct(ei_sl, &terms),
    })
}
