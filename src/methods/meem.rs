//! Mission Emissions Estimation Methodology (MEEM) for nvPM.
//!
//! The compressor exit state in flight is estimated from the overall
//! pressure ratio, mapped to the ground-reference point with the same T3,
//! and the certification nvPM indices are read off at the corresponding
//! thrust setting.

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use crate::fit::{CurveBuilder, FitMethod};
use crate::io::{Table, TableRecord};
use crate::physics::{CompressorModel, FlightCondition, FlightPhase, FlowState};
use crate::reference::ReferenceSet;
use super::{AltitudeCorrector, CorrectionTerms};

/// EImass_alt = EImass_gr * (P3_alt / P3_gr)^1.35 * EF^2.5
#[derive(Debug, Clone, Copy)]
pub struct Meem {
    pub enrichment_factor: f64,
}

impl AltitudeCorrector for Meem {
    fn correct(&self, ei_sl: f64, terms: &CorrectionTerms) -> f64 {
        ei_sl * terms.pressure_ratio.powf(1.35) * self.enrichment_factor.powf(2.5)
    }

    fn name(&self) -> &str {
        "MEEM"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeemConfig {
    pub condition: FlightCondition,
    pub compressor: CompressorModel,
    pub phase: FlightPhase,
    pub enrichment_factor: f64,
    /// Rated thrust, kN; converts a `Thrust` column to thrust fractions.
    pub rated_thrust_kn: f64,
    /// Throttle settings (fraction of rated) to evaluate.
    pub thrust_sweep: Vec<f64>,
    pub fit: FitMethod,
}

impl Default for MeemConfig {
    fn default() -> Self {
        Self {
            condition: FlightCondition::default(),
            compressor: CompressorModel::default(),
            phase: FlightPhase::Cruise,
            enrichment_factor: 1.1,
            rated_thrust_kn: 121.4, // LEAP-1A
            thrust_sweep: linspace(0.5, 0.7, 11),
            fit: FitMethod::PiecewiseLinear,
        }
    }
}

/// Certification nvPM indices against thrust fraction.
#[derive(Debug, Clone)]
pub struct NvpmReference {
    pub thrust_fraction: Vec<f64>,
    pub ei_mass: Vec<f64>,   // mg/kg
    pub ei_number: Vec<f64>, // #/kg
}

impl NvpmReference {
    /// Columns `EImass`, `EInum` and either `F00` (fraction of rated) or
    /// `Thrust` (kN, divided by `rated_thrust_kn`).
    pub fn from_table(table: &Table, rated_thrust_kn: f64) -> Result<Self> {
        let thrust_fraction = if table.has_column("F00") {
            table.numbers("F00")?
        } else {
            if !(rated_thrust_kn > 0.0) {
                return Err(EmissionError::invalid(
                    "rated thrust",
                    format!("{rated_thrust_kn} kN must be positive"),
                ));
            }
            table.numbers("Thrust")?.into_iter().map(|f| f / rated_thrust_kn).collect()
        };
        Ok(Self {
            thrust_fraction,
            ei_mass: table.numbers("EImass")?,
            ei_number: table.numbers("EInum")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MeemRecord {
    pub thrust_setting: f64,
    pub thrust_sl: f64,
    pub ei_mass_sl: f64,
    pub ei_mass_alt: f64,
    pub ei_number_sl: f64,
    pub ei_number_alt: f64,
}

impl TableRecord for MeemRecord {
    fn header() -> &'static [&'static str] {
        &["F00", "F_SL", "EImass_SL", "EImass", "EInum_SL", "EInum"]
    }

    fn fields(&self) -> Vec<f64> {
        vec![
            self.thrust_setting,
            self.thrust_sl,
            self.ei_mass_sl,
            self.ei_mass_alt,
            self.ei_number_sl,
            self.ei_number_alt,
        ]
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

pub fn run(config: &MeemConfig, reference: &NvpmReference) -> Result<Vec<MeemRecord>> {
    if config.thrust_sweep.is_empty() {
        return Err(EmissionError::invalid("thrust sweep", "no thrust settings given"));
    }
    if !(config.enrichment_factor > 0.0) {
        return Err(EmissionError::invalid(
            "enrichment factor",
            format!("{} must be positive", config.enrichment_factor),
        ));
    }

    // In flight
    let flow = FlowState::at(&config.condition)?;
    let pressure_coefficient = config.phase.pressure_coefficient(&config.condition)?;
    let flight = config.compressor.exit_in_flight(&flow, pressure_coefficient)?;

    // Ground reference at equal T3
    let ground = config.compressor.ground_reference(flight.t3)?;
    let ground_fraction = config.compressor.ground_thrust_fraction(ground.p3);
    tracing::debug!(
        p3 = flight.p3,
        t3 = flight.t3,
        p3_ground = ground.p3,
        ground_fraction,
        "MEEM compressor state"
    );

    if !(ground_fraction > 0.0 && ground_fraction <= 1.0) {
        tracing::warn!(ground_fraction, "ground reference thrust outside (0, 1] of rated");
    }

    let builder = || CurveBuilder::new().method(config.fit);
    let mass_curve =
        ReferenceSet::from_columns("thrust fraction", &reference.thrust_fraction, &reference.ei_mass)?
            .fit(builder())?;
    let number_curve =
        ReferenceSet::from_columns("thrust fraction", &reference.thrust_fraction, &reference.ei_number)?
            .fit(builder())?;

    let corrector = Meem { enrichment_factor: config.enrichment_factor };
    let terms = CorrectionTerms {
        pressure_ratio: flight.p3 / ground.p3,
        ..CorrectionTerms::identity()
    };

    config
        .thrust_sweep
        .iter()
        .enumerate()
        .map(|(i, &setting)| {
            let row = || -> Result<MeemRecord> {
                let thrust_sl = setting * ground_fraction;
                let ei_mass_sl = mass_curve.evaluate(thrust_sl)?;
                let ei_number_sl = number_curve.evaluate(thrust_sl)?;
                if !(ei_mass_sl > 0.0) {
                    return Err(EmissionError::invalid(
                        "nvPM mass index",
                        format!("{ei_mass_sl} at thrust fraction {thrust_sl} must be positive"),
                    ));
                }
                let ei_mass_alt = corrector.correct(ei_mass_sl, &terms);
                Ok(MeemRecord {
                    thrust_setting: setting,
                    thrust_sl,
                    ei_mass_sl,
                    ei_mass_alt,
                    ei_number_sl,
                    ei_number_alt: ei_mass_alt * ei_number_sl / ei_mass_sl,
                })
            };
            row().map_err(|e| e.at_row(i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NvpmReference {
        NvpmReference {
            thrust_fraction: vec![0.07, 0.30, 0.85, 1.0],
            ei_mass: vec![0.82, 1.95, 29.4, 37.6],
            ei_number: vec![1.12e14, 4.3e13, 9.1e14, 1.02e15],
        }
    }

    #[test]
    fn default_sweep_is_eleven_points() {
        let sweep = MeemConfig::default().thrust_sweep;
        assert_eq!(sweep.len(), 11);
        assert_eq!(sweep[0], 0.5);
        assert!((sweep[10] - 0.7).abs() < 1e-15);
    }

    #[test]
    fn cruise_sweep_matches_reference() {
        let records = run(&MeemConfig::default(), &reference()).unwrap();
        assert_eq!(records.len(), 11);

        let first = records[0];
        assert!((first.thrust_sl - 0.274_148_587_617_969_6).abs() < 1e-9);
        assert!((first.ei_mass_alt - 1.169_522_725_936_823_7).abs() / 1.1695 < 1e-8);
        assert!((first.ei_number_alt - 3.256_166_661_190_119_5e13).abs() / 3.256e13 < 1e-8);

        let last = records[10];
        assert!((last.ei_mass_alt - 3.934_428_983_244_756).abs() / 3.934 < 1e-8);
        assert!((last.ei_number_alt - 1.123_414_114_359_680_8e14).abs() / 1.123e14 < 1e-8);
    }

    #[test]
    fn number_index_scales_with_mass_index() {
        for r in run(&MeemConfig::default(), &reference()).unwrap() {
            let mass_ratio = r.ei_mass_alt / r.ei_mass_sl;
            let number_ratio = r.ei_number_alt / r.ei_number_sl;
            assert!((mass_ratio - number_ratio).abs() < 1e-12);
        }
    }

    #[test]
    fn thrust_column_normalised_by_rated_thrust() {
        let t = Table::parse(
            "LEAP1A-ICAO.csv",
            "Thrust,EImass,EInum\n8.498,0.82,1.12e14\n36.42,1.95,4.3e13\n103.19,29.4,9.1e14\n121.4,37.6,1.02e15\n",
        )
        .unwrap();
        let r = NvpmReference::from_table(&t, 121.4).unwrap();
        assert!((r.thrust_fraction[3] - 1.0).abs() < 1e-12);
        assert!((r.thrust_fraction[0] - 0.07).abs() < 1e-12);
    }

    #[test]
    fn setting_outside_reference_is_reported() {
        let config = MeemConfig { thrust_sweep: vec![0.5, 3.0], ..MeemConfig::default() };
        let err = run(&config, &reference()).unwrap_err();
        match err {
            EmissionError::AtRow { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reference_round_trip_without_enrichment() {
        let r = reference();
        let set = ReferenceSet::from_columns("thrust fraction", &r.thrust_fraction, &r.ei_mass).unwrap();
        let curve = set.fit(CurveBuilder::new()).unwrap();
        let corrector = Meem { enrichment_factor: 1.0 };
        for p in set.points() {
            let ei = corrector.correct(curve.evaluate(p.axis).unwrap(), &CorrectionTerms::identity());
            assert_eq!(ei, p.value);
        }
    }
}
