use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::units::PSI_PER_ATM;
use super::thermo::{FlightCondition, FlowState};

/// Reference humidity ratio the NOx correlations are normalised to, kg/kg.
pub const REFERENCE_HUMIDITY_RATIO: f64 = 0.006_34;
const HUMIDITY_COEFFICIENT: f64 = -19.0;
const STEAM_POINT: f64 = 373.16; // K
const MOLAR_MASS_RATIO: f64 = 0.621_970_58; // water / dry air

/// How the ambient specific humidity is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum HumidityModel {
    /// Saturation vapour pressure from the Goff-Gratch equation.
    GoffGratch { relative_humidity: f64 },
    /// Exponential fit of humidity ratio against pressure altitude.
    AltitudeExponential,
    /// Dry air (omega = 0).
    Dry,
}

impl Default for HumidityModel {
    fn default() -> Self {
        HumidityModel::GoffGratch { relative_humidity: 0.6 }
    }
}

impl HumidityModel {
    /// Ambient humidity ratio omega, kg water / kg dry air.
    pub fn humidity_ratio(&self, condition: &FlightCondition, flow: &FlowState) -> Result<f64> {
        match *self {
            HumidityModel::GoffGratch { relative_humidity } => {
                goff_gratch_humidity_ratio(relative_humidity, flow.static_temperature, flow.delta0)
            }
            HumidityModel::AltitudeExponential => {
                Ok(0.001 * (-0.000_142_6 * (condition.altitude_ft() - 12_900.0)).exp())
            }
            HumidityModel::Dry => Ok(0.0),
        }
    }

    /// Humidity correction exponent H; the correlations multiply by exp(H).
    pub fn correction(&self, condition: &FlightCondition, flow: &FlowState) -> Result<f64> {
        Ok(exponent(self.humidity_ratio(condition, flow)?))
    }
}

/// H = -19 (omega - 0.00634)
pub fn exponent(omega: f64) -> f64 {
    HUMIDITY_COEFFICIENT * (omega - REFERENCE_HUMIDITY_RATIO)
}

/// Goff-Gratch correction exponent at sea-level ambient pressure.
pub fn correction_factor(relative_humidity: f64, temperature: f64) -> Result<f64> {
    Ok(exponent(goff_gratch_humidity_ratio(relative_humidity, temperature, 1.0)?))
}

/// Saturation vapour pressure over water, psia.
pub fn saturation_vapor_pressure(temperature: f64) -> Result<f64> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(EmissionError::invalid(
            "ambient temperature",
            format!("{temperature} K must be positive"),
        ));
    }
    let tau = STEAM_POINT / temperature;
    let beta = 7.902_98 * (1.0 - tau)
        + 3.005_71
        + 5.028_08 * tau.log10()
        + 1.3816e-7 * (1.0 - 10f64.powf(11.344 * (1.0 - 1.0 / tau)))
        + 8.1328e-3 * (10f64.powf(3.491_49 * (1.0 - tau)) - 1.0);
    Ok(0.014_504 * 10f64.powf(beta))
}

/// Humidity ratio from relative humidity, temperature and ambient pressure
/// ratio `delta0 = P / P0_SL`.
pub fn goff_gratch_humidity_ratio(relative_humidity: f64, temperature: f64, delta0: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&relative_humidity) {
        return Err(EmissionError::invalid(
            "relative humidity",
            format!("{relative_humidity} must lie in [0, 1]"),
        ));
    }
    if !delta0.is_finite() || delta0 <= 0.0 {
        return Err(EmissionError::invalid(
            "ambient pressure ratio",
            format!("{delta0} must be positive"),
        ));
    }

    let pv = relative_humidity * saturation_vapor_pressure(temperature)?;
    let p = delta0 * PSI_PER_ATM;
    if pv >= p {
        return Err(EmissionError::invalid(
            "relative humidity",
            format!("vapour pressure {pv:.4} psia exceeds ambient {p:.4} psia"),
        ));
    }
    Ok(MOLAR_MASS_RATIO * pv / (p - pv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_day_sea_level() {
        let h = correction_factor(0.6, 288.15).unwrap();
        let expected = 5.422_847_419_645_892_4e-5;
        assert!(((h - expected) / expected).abs() < 1e-6, "H = {}", h);
    }

    #[test]
    fn cruise_goff_gratch() {
        let cond = FlightCondition::default();
        let flow = FlowState::at(&cond).unwrap();
        let h = HumidityModel::default().correction(&cond, &flow).unwrap();
        assert!((h - 0.119_312_515_488_92).abs() < 1e-9);
    }

    #[test]
    fn altitude_exponential_at_reference_altitude() {
        let cond = FlightCondition::from_feet(12_900.0, 0.5);
        let flow = FlowState::at(&cond).unwrap();
        let omega = HumidityModel::AltitudeExponential.humidity_ratio(&cond, &flow).unwrap();
        assert!((omega - 0.001).abs() < 1e-12);
    }

    #[test]
    fn dry_air_exponent() {
        let cond = FlightCondition::default();
        let flow = FlowState::at(&cond).unwrap();
        let h = HumidityModel::Dry.correction(&cond, &flow).unwrap();
        assert!((h - 19.0 * 0.006_34).abs() < 1e-15);
    }

    #[test]
    fn zero_humidity_matches_dry() {
        let h = correction_factor(0.0, 288.15).unwrap();
        assert_eq!(h, exponent(0.0));
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(correction_factor(1.5, 288.15).is_err());
        assert!(correction_factor(0.6, -10.0).is_err());
        // boiling point at a tenth of an atmosphere
        assert!(goff_gratch_humidity_ratio(1.0, 373.15, 0.1).is_err());
    }

    #[test]
    fn deserialize_tagged_model() {
        let m: HumidityModel =
            serde_json::from_str(r#"{"model":"goff_gratch","relative_humidity":0.4}"#).unwrap();
        assert_eq!(m, HumidityModel::GoffGratch { relative_humidity: 0.4 });
        let d: HumidityModel = serde_json::from_str(r#"{"model":"dry"}"#).unwrap();
        assert_eq!(d, HumidityModel::Dry);
    }
}
