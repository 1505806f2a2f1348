use crate::error::{EmissionError, Result};

// ---------------------------------------------------------------------------
// ISA 1976 Standard Atmosphere (sea level to 20 km)
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665;            // standard gravity, m/s^2
pub const R_AIR: f64 = 287.052_87;      // specific gas constant for dry air, J/(kg·K)
pub const GAMMA: f64 = 1.4;             // ratio of specific heats

pub const T0_SL: f64 = 288.15;          // sea-level temperature, K
pub const P0_SL: f64 = 101_325.0;       // sea-level pressure, Pa

const EARTH_RADIUS: f64 = 6_356_766.0;  // effective radius for geopotential height, m
const TROPOPAUSE: f64 = 11_000.0;       // geopotential, m
const T_TROPOPAUSE: f64 = 216.65;       // K
const P_TROPOPAUSE: f64 = 22_632.040_095; // Pa, continuous with the troposphere layer
const LAPSE_TROPOSPHERE: f64 = -0.0065; // K/m

/// Lowest and highest geometric altitude the model answers for, m.
pub const MIN_ALTITUDE: f64 = 0.0;
pub const MAX_ALTITUDE: f64 = 20_000.0;

/// Atmospheric properties at a given geometric altitude.
#[derive(Debug, Clone, Copy)]
pub struct Atmo {
    pub altitude: f64,     // m (geometric)
    pub temperature: f64,  // K
    pub pressure: f64,     // Pa
    pub density: f64,      // kg/m^3
    pub sound_speed: f64,  // m/s
}

/// ISA standard atmosphere.
///
/// Geometric altitude is converted to geopotential height before the layer
/// formulas are applied. Altitudes outside `[MIN_ALTITUDE, MAX_ALTITUDE]`
/// are rejected rather than clamped.
pub fn isa(altitude_m: f64) -> Result<Atmo> {
    if !altitude_m.is_finite() || !(MIN_ALTITUDE..=MAX_ALTITUDE).contains(&altitude_m) {
        return Err(EmissionError::OutOfDomain {
            quantity: "altitude (m)",
            value: altitude_m,
            min: MIN_ALTITUDE,
            max: MAX_ALTITUDE,
        });
    }

    let h = geopotential(altitude_m);

    let (temperature, pressure) = if h <= TROPOPAUSE {
        // Troposphere: lapse -6.5 K/km
        gradient_layer(h, 0.0, T0_SL, LAPSE_TROPOSPHERE, P0_SL)
    } else {
        // Tropopause: isothermal 216.65 K
        isothermal_layer(h, TROPOPAUSE, T_TROPOPAUSE, P_TROPOPAUSE)
    };

    Ok(Atmo {
        altitude: altitude_m,
        temperature,
        pressure,
        density: pressure / (R_AIR * temperature),
        sound_speed: (GAMMA * R_AIR * temperature).sqrt(),
    })
}

/// Standard sea-level state.
pub fn sea_level() -> Atmo {
    Atmo {
        altitude: 0.0,
        temperature: T0_SL,
        pressure: P0_SL,
        density: P0_SL / (R_AIR * T0_SL),
        sound_speed: (GAMMA * R_AIR * T0_SL).sqrt(),
    }
}

// ---------------------------------------------------------------------------
// Layer helpers
// ---------------------------------------------------------------------------

fn geopotential(z: f64) -> f64 {
    EARTH_RADIUS * z / (EARTH_RADIUS + z)
}

/// Gradient layer: T = T_base + lapse * (h - h_base)
fn gradient_layer(h: f64, h_base: f64, t_base: f64, lapse: f64, p_base: f64) -> (f64, f64) {
    let t = t_base + lapse * (h - h_base);
    let p = p_base * (t / t_base).powf(-G0 / (lapse * R_AIR));
    (t, p)
}

/// Isothermal layer: T = const, pressure decays exponentially
fn isothermal_layer(h: f64, h_base: f64, t: f64, p_base: f64) -> (f64, f64) {
    let p = p_base * ((-G0 / (R_AIR * t)) * (h - h_base)).exp();
    (t, p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
