//! Boeing Fuel Flow Method 2.
//!
//! Sea-level equivalent fuel flow is looked up on a log-log fit of the
//! certification LTO points, then the sea-level EI is scaled by ambient
//! pressure/temperature ratios and the humidity correction.
//!
//! Reference: Schaefer, M. & Bartosch, S. (2013), *Overview on fuel flow
//! correlation methods for the calculation of NOx, CO and HC emissions and
//! their implementation into aircraft performance software*, DLR Köln.

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::fit::{AxisScale, CurveBuilder, FitMethod};
use crate::io::TableRecord;
use crate::physics::{FlightCondition, FlowState, HumidityModel};
use crate::reference::{corrected_fuel_flow_set, LtoReference};
use super::{AltitudeCorrector, CorrectionTerms};

/// EI_alt = EI_sl * sqrt(delta0^1.02 / theta0^3.3) * exp(H)
#[derive(Debug, Clone, Copy)]
pub struct Bffm2;

impl AltitudeCorrector for Bffm2 {
    fn correct(&self, ei_sl: f64, terms: &CorrectionTerms) -> f64 {
        ei_sl * (terms.delta.powf(1.02) / terms.theta.powf(3.3)).powf(0.5) * terms.humidity.exp()
    }

    fn name(&self) -> &str {
        "BFFM2"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bffm2Config {
    pub condition: FlightCondition,
    pub humidity: HumidityModel,
    pub fit: FitMethod,
}

impl Default for Bffm2Config {
    fn default() -> Self {
        Self {
            condition: FlightCondition::default(),
            humidity: HumidityModel::default(),
            fit: FitMethod::PiecewiseLinear,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bffm2Record {
    pub fuel_flow_alt: f64, // kg/s
    pub fuel_flow_sl: f64,  // kg/s
    pub ei_sl: f64,         // g/kg
    pub ei_alt: f64,        // g/kg
}

impl TableRecord for Bffm2Record {
    fn header() -> &'static [&'static str] {
        &["Wf", "Wf_SL", "EINOx_SL", "EINOx"]
    }

    fn fields(&self) -> Vec<f64> {
        vec![self.fuel_flow_alt, self.fuel_flow_sl, self.ei_sl, self.ei_alt]
    }
}

/// Wf_sl = Wf_alt / delta0 * theta0^3.8 * exp(0.2 M^2)
pub fn sea_level_fuel_flow(fuel_flow_alt: f64, flow: &FlowState) -> f64 {
    fuel_flow_alt / flow.delta0 * flow.theta0.powf(3.8) * (0.2 * flow.mach * flow.mach).exp()
}

/// Cruise EINOx for every fuel flow at the configured flight condition.
pub fn run(
    config: &Bffm2Config,
    reference: &[LtoReference],
    fuel_flow_alt: &[f64],
) -> Result<Vec<Bffm2Record>> {
    if fuel_flow_alt.is_empty() {
        return Err(EmissionError::invalid("cruise fuel flow", "no fuel flow values given"));
    }

    let flow = FlowState::at(&config.condition)?;
    let humidity = config.humidity.correction(&config.condition, &flow)?;
    tracing::debug!(
        delta0 = flow.delta0,
        theta0 = flow.theta0,
        humidity,
        "BFFM2 ambient state"
    );

    let curve = corrected_fuel_flow_set(reference)?.fit(
        CurveBuilder::new().scale(AxisScale::LogLog).method(config.fit),
    )?;

    let terms = CorrectionTerms {
        delta: flow.delta0,
        theta: flow.theta0,
        pressure_ratio: 1.0,
        humidity,
    };

    fuel_flow_alt
        .iter()
        .enumerate()
        .map(|(i, &wf)| {
            let fuel_flow_sl = sea_level_fuel_flow(wf, &flow);
            let ei_sl = curve.evaluate(fuel_flow_sl).map_err(|e| e.at_row(i))?;
            Ok(Bffm2Record {
                fuel_flow_alt: wf,
                fuel_flow_sl,
                ei_sl,
                ei_alt: Bffm2.correct(ei_sl, &terms),
            })
        })
        .collect()
}
