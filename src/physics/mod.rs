pub mod atmosphere;
pub mod thermo;
pub mod humidity;
pub mod compressor;

pub use atmosphere::{isa, Atmo};
pub use thermo::{FlightCondition, FlowState};
pub use humidity::HumidityModel;
pub use compressor::{CompressorExit, CompressorModel, FlightPhase};
