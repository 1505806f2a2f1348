use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use super::atmosphere::{GAMMA, P0_SL, T0_SL};
use super::thermo::{FlightCondition, FlowState};

/// Compressor discharge (combustor inlet) state.
#[derive(Debug, Clone, Copy)]
pub struct CompressorExit {
    pub p3: f64, // Pa
    pub t3: f64, // K
}

/// Flight phase, selecting the pressure-ratio coefficient applied to the
/// design overall pressure ratio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FlightPhase {
    #[default]
    Cruise,
    /// Linear schedule from 0.85 at 3000 ft to 1.15 at the cruise altitude.
    Climb { cruise_altitude_ft: f64 },
}

impl FlightPhase {
    pub fn pressure_coefficient(&self, condition: &FlightCondition) -> Result<f64> {
        match *self {
            FlightPhase::Cruise => Ok(0.95),
            FlightPhase::Climb { cruise_altitude_ft } => {
                if cruise_altitude_ft <= 3_000.0 {
                    return Err(EmissionError::invalid(
                        "cruise altitude",
                        format!("{cruise_altitude_ft} ft must be above 3000 ft"),
                    ));
                }
                Ok(0.85 + (1.15 - 0.85) / (cruise_altitude_ft - 3_000.0)
                    * (condition.altitude_ft() - 3_000.0))
            }
        }
    }
}

/// Lumped compressor: design overall pressure ratio and isentropic
/// efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorModel {
    pub overall_pressure_ratio: f64,
    pub efficiency: f64,
}

impl Default for CompressorModel {
    fn default() -> Self {
        Self {
            overall_pressure_ratio: 60.0, // GE9X class
            efficiency: 0.88,
        }
    }
}

impl CompressorModel {
    pub fn validate(&self) -> Result<()> {
        if !(self.overall_pressure_ratio > 1.0) {
            return Err(EmissionError::invalid(
                "overall pressure ratio",
                format!("{} must exceed 1", self.overall_pressure_ratio),
            ));
        }
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(EmissionError::invalid(
                "compressor efficiency",
                format!("{} must lie in (0, 1]", self.efficiency),
            ));
        }
        Ok(())
    }

    /// P3/T3 in flight for a given pressure-ratio coefficient.
    pub fn exit_in_flight(&self, flow: &FlowState, pressure_coefficient: f64) -> Result<CompressorExit> {
        self.validate()?;
        let p3 = flow.total_pressure * (1.0 + pressure_coefficient * (self.overall_pressure_ratio - 1.0));
        let t3 = (1.0 + ((p3 / flow.total_pressure).powf(isentropic_exponent()) - 1.0) / self.efficiency)
            * flow.total_temperature;
        Ok(CompressorExit { p3, t3 })
    }

    /// Sea-level static operating point that reaches the same T3.
    pub fn ground_reference(&self, t3: f64) -> Result<CompressorExit> {
        self.validate()?;
        if !(t3 > 0.0) {
            return Err(EmissionError::invalid("T3", format!("{t3} K must be positive")));
        }
        let p3 = P0_SL * (1.0 + self.efficiency * (t3 / T0_SL - 1.0)).powf(1.0 / isentropic_exponent());
        Ok(CompressorExit { p3, t3 })
    }

    /// Ground-reference thrust as a fraction of rated (F_GR / F_00).
    pub fn ground_thrust_fraction(&self, p3_ground: f64) -> f64 {
        (p3_ground / P0_SL - 1.0) / (self.overall_pressure_ratio - 1.0)
    }
}

/// (gamma - 1) / gamma
fn isentropic_exponent() -> f64 {
    (GAMMA - 1.0) / GAMMA
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cruise() -> (FlightCondition, FlowState) {
        let cond = FlightCondition::default();
        (cond, FlowState::at(&cond).unwrap())
    }

    #[test]
    fn cruise_exit_state() {
        let (cond, flow) = cruise();
        let comp = CompressorModel::default();
        let pi = FlightPhase::Cruise.pressure_coefficient(&cond).unwrap();
        let exit = comp.exit_in_flight(&flow, pi).unwrap();
        assert!((exit.p3 - 2_038_714.163_706).abs() / exit.p3 < 1e-8);
        assert!((exit.t3 - 852.582_772_104_5).abs() < 1e-6);
    }

    #[test]
    fn ground_reference_and_thrust_fraction() {
        let comp = CompressorModel::default();
        let gr = comp.ground_reference(852.582_772_104_529_3).unwrap();
        assert!((gr.p3 - 3_379_141.465_566).abs() / gr.p3 < 1e-8);
        let f = comp.ground_thrust_fraction(gr.p3);
        assert!((f - 0.548_297_175_235_939_2).abs() < 1e-9);
    }

    #[test]
    fn ground_reference_at_ambient_temperature_is_ambient_pressure() {
        let comp = CompressorModel::default();
        let gr = comp.ground_reference(T0_SL).unwrap();
        assert!((gr.p3 - P0_SL).abs() < 1e-6);
        assert!(comp.ground_thrust_fraction(gr.p3).abs() < 1e-12);
    }

    #[test]
    fn default_phase_is_cruise() {
        assert_eq!(FlightPhase::default(), FlightPhase::Cruise);
        let p: FlightPhase = serde_json::from_str(r#"{"phase":"cruise"}"#).unwrap();
        assert_eq!(p, FlightPhase::default());
    }

    #[test]
    fn climb_schedule_endpoints() {
        let phase = FlightPhase::Climb { cruise_altitude_ft: 35_000.0 };
        let low = phase.pressure_coefficient(&FlightCondition::from_feet(3_000.0, 0.4)).unwrap();
        let top = phase.pressure_coefficient(&FlightCondition::from_feet(35_000.0, 0.78)).unwrap();
        assert!((low - 0.85).abs() < 1e-9);
        assert!((top - 1.15).abs() < 1e-9);
    }

    #[test]
    fn invalid_compressor_rejected() {
        let (_, flow) = cruise();
        let bad = CompressorModel { overall_pressure_ratio: 1.0, efficiency: 0.88 };
        assert!(bad.exit_in_flight(&flow, 0.95).is_err());
        let bad = CompressorModel { overall_pressure_ratio: 40.0, efficiency: 0.0 };
        assert!(bad.ground_reference(800.0).is_err());
    }
}
