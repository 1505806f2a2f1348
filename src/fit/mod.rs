pub mod strategy;
pub mod curve;

pub use strategy::{Barycentric, Interpolator, PiecewiseLinear, Polynomial};
pub use curve::{AxisScale, CorrectionCurve, CurveBuilder, FitMethod};
