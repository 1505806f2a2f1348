use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::units;
use super::atmosphere::{self, P0_SL, T0_SL};

// ---------------------------------------------------------------------------
// Flight condition (operating point)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightCondition {
    pub altitude_m: f64,
    pub mach: f64,
}

impl FlightCondition {
    pub fn new(altitude_m: f64, mach: f64) -> Self {
        Self { altitude_m, mach }
    }

    pub fn from_feet(altitude_ft: f64, mach: f64) -> Self {
        Self::new(units::feet_to_meters(altitude_ft), mach)
    }

    pub fn altitude_ft(&self) -> f64 {
        units::meters_to_feet(self.altitude_m)
    }
}

impl Default for FlightCondition {
    fn default() -> Self {
        // 35 000 ft cruise
        Self { altitude_m: 10_668.0, mach: 0.78 }
    }
}

// ---------------------------------------------------------------------------
// Static / total conditions and non-dimensional ratios
// ---------------------------------------------------------------------------

/// Static and stagnation state of the free stream.
#[derive(Debug, Clone, Copy)]
pub struct FlowState {
    pub mach: f64,
    pub static_temperature: f64, // K
    pub static_pressure: f64,    // Pa
    pub total_temperature: f64,  // K
    pub total_pressure: f64,     // Pa
    pub delta0: f64,             // P / P0_SL
    pub theta0: f64,             // T / T0_SL
    pub delta: f64,              // Pt / P0_SL
    pub theta: f64,              // Tt / T0_SL
}

impl FlowState {
    /// Isentropic stagnation conditions for gamma = 1.4.
    pub fn from_static(temperature: f64, pressure: f64, mach: f64) -> Result<Self> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(EmissionError::invalid(
                "static temperature",
                format!("{temperature} K must be positive"),
            ));
        }
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(EmissionError::invalid(
                "static pressure",
                format!("{pressure} Pa must be positive"),
            ));
        }
        if !mach.is_finite() || mach < 0.0 {
            return Err(EmissionError::invalid(
                "Mach number",
                format!("{mach} must be non-negative"),
            ));
        }

        let ram = 1.0 + 0.2 * mach * mach;
        let total_temperature = temperature * ram;
        let total_pressure = pressure * ram.powf(3.5);

        Ok(FlowState {
            mach,
            static_temperature: temperature,
            static_pressure: pressure,
            total_temperature,
            total_pressure,
            delta0: pressure / P0_SL,
            theta0: temperature / T0_SL,
            delta: total_pressure / P0_SL,
            theta: total_temperature / T0_SL,
        })
    }

    /// Free stream at a flight condition in the standard atmosphere.
    pub fn at(condition: &FlightCondition) -> Result<Self> {
        let atm = atmosphere::isa(condition.altitude_m)?;
        Self::from_static(atm.temperature, atm.pressure, condition.mach)
    }
}
