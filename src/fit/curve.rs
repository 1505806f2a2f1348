use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, Result};
use super::strategy::{validate_nodes, Barycentric, Interpolator, PiecewiseLinear, Polynomial};

/// Axis transform applied before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    #[default]
    Linear,
    /// log10 on both axes; the result is exponentiated back.
    LogLog,
}

/// Interpolation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    #[default]
    PiecewiseLinear,
    Barycentric,
    Polynomial,
}

impl FitMethod {
    fn build(self, xs: &[f64], ys: &[f64]) -> Result<Box<dyn Interpolator>> {
        Ok(match self {
            FitMethod::PiecewiseLinear => Box::new(PiecewiseLinear::new(xs, ys)?),
            FitMethod::Barycentric => Box::new(Barycentric::new(xs, ys)?),
            FitMethod::Polynomial => Box::new(Polynomial::new(xs, ys)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Fitted curve
// ---------------------------------------------------------------------------

/// Interpolant over a reference data set, valid on `[min, max]` of the
/// reference axis only.
#[derive(Debug)]
pub struct CorrectionCurve {
    quantity: &'static str,
    scale: AxisScale,
    min: f64,
    max: f64,
    interpolator: Box<dyn Interpolator>,
}

impl CorrectionCurve {
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        if !(x >= self.min && x <= self.max) {
            return Err(EmissionError::OutOfDomain {
                quantity: self.quantity,
                value: x,
                min: self.min,
                max: self.max,
            });
        }
        Ok(match self.scale {
            AxisScale::Linear => self.interpolator.value(x),
            AxisScale::LogLog => 10f64.powf(self.interpolator.value(x.log10())),
        })
    }

    /// Elementwise evaluation; a failure is tagged with its row.
    pub fn evaluate_all(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter()
            .enumerate()
            .map(|(i, &x)| self.evaluate(x).map_err(|e| e.at_row(i)))
            .collect()
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    pub fn method_name(&self) -> &str {
        self.interpolator.name()
    }
}

// ---------------------------------------------------------------------------
// Curve builder
// ---------------------------------------------------------------------------

pub struct CurveBuilder {
    quantity: &'static str,
    scale: AxisScale,
    method: FitMethod,
}

impl Default for CurveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveBuilder {
    pub fn new() -> Self {
        Self {
            quantity: "reference axis",
            scale: AxisScale::Linear,
            method: FitMethod::PiecewiseLinear,
        }
    }

    /// Name used in out-of-domain errors.
    pub fn quantity(mut self, v: &'static str) -> Self { self.quantity = v; self }
    pub fn scale(mut self, v: AxisScale) -> Self { self.scale = v; self }
    pub fn method(mut self, v: FitMethod) -> Self { self.method = v; self }

    /// Validate the reference data and build the interpolant.
    ///
    /// The axis must be finite and strictly increasing; log-log fits also
    /// need strictly positive axis and values.
    pub fn fit(self, axis: &[f64], values: &[f64]) -> Result<CorrectionCurve> {
        validate_nodes(self.quantity, axis, values)?;

        let (xs, ys): (Vec<f64>, Vec<f64>) = match self.scale {
            AxisScale::Linear => (axis.to_vec(), values.to_vec()),
            AxisScale::LogLog => {
                if let Some(v) = axis.iter().chain(values).find(|&&v| v <= 0.0) {
                    return Err(EmissionError::invalid(
                        self.quantity,
                        format!("log-log fit needs positive data, got {v}"),
                    ));
                }
                (
                    axis.iter().map(|v| v.log10()).collect(),
                    values.iter().map(|v| v.log10()).collect(),
                )
            }
        };

        let interpolator = self.method.build(&xs, &ys)?;
        tracing::debug!(
            quantity = self.quantity,
            method = interpolator.name(),
            points = axis.len(),
            "fitted reference curve"
        );

        Ok(CorrectionCurve {
            quantity: self.quantity,
            scale: self.scale,
            min: axis[0],
            max: axis[axis.len() - 1],
            interpolator,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_loglog(method: FitMethod) -> CorrectionCurve {
        CurveBuilder::new()
            .scale(AxisScale::LogLog)
            .method(method)
            .fit(&[1.0, 10.0, 100.0], &[1.0, 10.0, 100.0])
            .unwrap()
    }

    #[test]
    fn loglog_identity_in_domain() {
        for method in [FitMethod::PiecewiseLinear, FitMethod::Barycentric, FitMethod::Polynomial] {
            let c = identity_loglog(method);
            for x in [1.0, 2.5, 10.0, 42.0, 99.9, 100.0] {
                let y = c.evaluate(x).unwrap();
                assert!((y - x).abs() / x < 1e-12, "{:?}: f({}) = {}", method, x, y);
            }
        }
    }

    #[test]
    fn loglog_out_of_domain() {
        let c = identity_loglog(FitMethod::PiecewiseLinear);
        for x in [0.5, 100.5, f64::NAN] {
            assert!(matches!(c.evaluate(x), Err(EmissionError::OutOfDomain { .. })));
        }
        assert_eq!(c.domain(), (1.0, 100.0));
    }

    #[test]
    fn duplicate_or_decreasing_axis_rejected() {
        let dup = CurveBuilder::new().fit(&[1.0, 2.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(dup, Err(EmissionError::InvalidInput { .. })));
        let dec = CurveBuilder::new().fit(&[3.0, 2.0, 1.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(dec, Err(EmissionError::InvalidInput { .. })));
    }

    #[test]
    fn loglog_rejects_non_positive() {
        let r = CurveBuilder::new()
            .scale(AxisScale::LogLog)
            .fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(r, Err(EmissionError::InvalidInput { .. })));
        let r = CurveBuilder::new()
            .scale(AxisScale::LogLog)
            .fit(&[1.0, 2.0], &[-1.0, 2.0]);
        assert!(r.is_err());
    }

    #[test]
    fn length_mismatch_and_too_few_points() {
        assert!(CurveBuilder::new().fit(&[1.0, 2.0], &[1.0]).is_err());
        assert!(CurveBuilder::new().fit(&[1.0], &[1.0]).is_err());
    }

    #[test]
    fn evaluate_all_tags_failing_row() {
        let c = CurveBuilder::new()
            .quantity("fuel flow (kg/s)")
            .fit(&[1.0, 2.0], &[10.0, 20.0])
            .unwrap();
        assert_eq!(c.evaluate_all(&[1.0, 1.5]).unwrap(), vec![10.0, 15.0]);
        let err = c.evaluate_all(&[1.5, 3.0]).unwrap_err();
        match err {
            EmissionError::AtRow { row, source } => {
                assert_eq!(row, 1);
                assert!(source.to_string().contains("fuel flow"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn method_names_exposed() {
        assert_eq!(identity_loglog(FitMethod::Barycentric).method_name(), "barycentric");
        assert_eq!(identity_loglog(FitMethod::PiecewiseLinear).scale(), AxisScale::LogLog);
    }
}
