pub mod bffm2;
pub mod dlr;
pub mod p3t3;
pub mod meem;

pub use bffm2::{Bffm2, Bffm2Config, Bffm2Record};
pub use dlr::{Dlr, DlrConfig, DlrPoint, DlrRecord};
pub use p3t3::{P3t3, P3t3Config, P3t3Point, P3t3Record, SeaLevelCalibration};
pub use meem::{Meem, MeemConfig, MeemRecord, NvpmReference};

/// Inputs a correction formula may draw on. Each method fills the ratios
/// it correlates against and leaves the rest at 1.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionTerms {
    pub delta: f64,
    pub theta: f64,
    /// P3 at altitude over P3 at the sea-level reference point.
    pub pressure_ratio: f64,
    /// Humidity exponent H.
    pub humidity: f64,
}

impl CorrectionTerms {
    /// Sea-level standard day: every correction is the identity.
    pub fn identity() -> Self {
        Self { delta: 1.0, theta: 1.0, pressure_ratio: 1.0, humidity: 0.0 }
    }
}

/// Trait for altitude correction formulas.
///
/// Implement this to map a sea-level emission index to altitude.
pub trait AltitudeCorrector {
    fn correct(&self, ei_sl: f64, terms: &CorrectionTerms) -> f64;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str;
}
