pub mod error;
pub mod units;
pub mod physics;
pub mod fit;
pub mod io;
pub mod reference;
pub mod methods;
pub mod databank;
pub mod config;

pub use config::RunConfig;
pub use error::{EmissionError, Result};
pub use physics::{isa, FlightCondition, FlowState, HumidityModel};
pub use methods::{AltitudeCorrector, CorrectionTerms};
