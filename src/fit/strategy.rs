use nalgebra::{DMatrix, DVector};

use crate::error::{ensure_same_len, EmissionError, Result};

/// Trait for 1-D interpolation schemes.
///
/// Implementations are built from validated, strictly increasing nodes and
/// are only queried inside the node range; domain checks live in
/// [`CorrectionCurve`](super::CorrectionCurve).
pub trait Interpolator: std::fmt::Debug {
    fn value(&self, x: f64) -> f64;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Interpolation nodes must pair up, number at least two, be finite and
/// have a strictly increasing axis.
pub fn validate_nodes(quantity: &str, xs: &[f64], ys: &[f64]) -> Result<()> {
    ensure_same_len("axis", xs.len(), "values", ys.len())?;
    if xs.len() < 2 {
        return Err(EmissionError::invalid(
            quantity,
            format!("need at least 2 reference points, got {}", xs.len()),
        ));
    }
    if let Some(v) = xs.iter().chain(ys).find(|v| !v.is_finite()) {
        return Err(EmissionError::invalid(quantity, format!("non-finite value {v}")));
    }
    if let Some(w) = xs.windows(2).find(|w| w[1] <= w[0]) {
        return Err(EmissionError::invalid(
            quantity,
            format!("axis must be strictly increasing ({} then {})", w[0], w[1]),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Piecewise linear
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PiecewiseLinear {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PiecewiseLinear {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        validate_nodes("interpolation nodes", xs, ys)?;
        Ok(Self { xs: xs.to_vec(), ys: ys.to_vec() })
    }
}

impl Interpolator for PiecewiseLinear {
    fn value(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // first node >= x
        let i = self.xs.partition_point(|&xi| xi < x);
        if i < n && self.xs[i] == x {
            return self.ys[i];
        }
        let hi = i.clamp(1, n - 1);
        let lo = hi - 1;
        let (x0, x1) = (self.xs[lo], self.xs[hi]);
        let (y0, y1) = (self.ys[lo], self.ys[hi]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    fn name(&self) -> &str {
        "piecewise-linear"
    }
}

// ---------------------------------------------------------------------------
// Barycentric Lagrange (exact through every node)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Barycentric {
    xs: Vec<f64>,
    ys: Vec<f64>,
    weights: Vec<f64>,
}

impl Barycentric {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        validate_nodes("interpolation nodes", xs, ys)?;
        let weights = xs
            .iter()
            .enumerate()
            .map(|(j, &xj)| {
                let prod: f64 = xs
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != j)
                    .map(|(_, &xk)| xj - xk)
                    .product();
                1.0 / prod
            })
            .collect();
        Ok(Self { xs: xs.to_vec(), ys: ys.to_vec(), weights })
    }
}

impl Interpolator for Barycentric {
    fn value(&self, x: f64) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for ((&xj, &yj), &wj) in self.xs.iter().zip(&self.ys).zip(&self.weights) {
            if x == xj {
                return yj;
            }
            let t = wj / (x - xj);
            num += t * yj;
            den += t;
        }
        num / den
    }

    fn name(&self) -> &str {
        "barycentric"
    }
}

// ---------------------------------------------------------------------------
// Polynomial through all nodes (monomial basis)
// ---------------------------------------------------------------------------

/// Degree n-1 polynomial solved from the Vandermonde system. The axis is
/// centred and scaled to [-1, 1] to keep the system well conditioned.
#[derive(Debug, Clone)]
pub struct Polynomial {
    center: f64,
    half_width: f64,
    coeffs: DVector<f64>, // ascending powers of the scaled axis
}

impl Polynomial {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        validate_nodes("interpolation nodes", xs, ys)?;
        let n = xs.len();
        let (lo, hi) = (xs[0], xs[n - 1]);
        let center = 0.5 * (lo + hi);
        let half_width = 0.5 * (hi - lo);

        let vandermonde = DMatrix::from_fn(n, n, |r, c| {
            ((xs[r] - center) / half_width).powi(c as i32)
        });
        let rhs = DVector::from_column_slice(ys);
        let coeffs = vandermonde.lu().solve(&rhs).ok_or_else(|| {
            EmissionError::invalid("reference axis", "polynomial fit is singular")
        })?;

        Ok(Self { center, half_width, coeffs })
    }
}

impl Interpolator for Polynomial {
    fn value(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.half_width;
        // Horner
        self.coeffs.as_slice().iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    fn name(&self) -> &str {
        "polynomial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: [f64; 4] = [5.5, 10.2, 30.3, 40.52];
    const YS: [f64; 4] = [1.7, 1.6, 1.2, 1.4];

    #[test]
    fn linear_hits_nodes_and_midpoints() {
        let f = PiecewiseLinear::new(&XS, &YS).unwrap();
        for (x, y) in XS.iter().zip(YS.iter()) {
            assert_eq!(f.value(*x), *y);
        }
        let mid = 0.5 * (XS[1] + XS[2]);
        assert!((f.value(mid) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn barycentric_matches_lagrange() {
        let f = Barycentric::new(&XS, &YS).unwrap();
        for (x, y) in XS.iter().zip(YS.iter()) {
            assert_eq!(f.value(*x), *y);
        }
        // reference value from the direct Lagrange product form
        let v = f.value(18.762_814_320_882_544);
        assert!((v - 1.377_485_079_321_159_7).abs() < 1e-10, "got {}", v);
    }

    #[test]
    fn polynomial_agrees_with_barycentric() {
        let p = Polynomial::new(&XS, &YS).unwrap();
        let b = Barycentric::new(&XS, &YS).unwrap();
        for x in [5.5, 8.0, 14.8, 22.0, 37.1, 40.52] {
            assert!((p.value(x) - b.value(x)).abs() < 1e-9, "x = {}", x);
        }
    }

    #[test]
    fn direct_construction_rejects_bad_nodes() {
        let dup = [1.0, 2.0, 2.0];
        let ys = [1.0, 2.0, 3.0];
        assert!(matches!(Barycentric::new(&dup, &ys), Err(EmissionError::InvalidInput { .. })));
        assert!(matches!(PiecewiseLinear::new(&dup, &ys), Err(EmissionError::InvalidInput { .. })));
        assert!(matches!(Polynomial::new(&dup, &ys), Err(EmissionError::InvalidInput { .. })));

        assert!(PiecewiseLinear::new(&[1.0], &[2.0]).is_err());
        assert!(Polynomial::new(&[], &[]).is_err());
        assert!(Barycentric::new(&[1.0, 2.0], &[1.0]).is_err());
        assert!(Barycentric::new(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn quadratic_reproduced_exactly() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [1.0, 2.0, 5.0]; // x^2 + 1
        let p = Polynomial::new(&xs, &ys).unwrap();
        assert!((p.value(1.5) - 3.25).abs() < 1e-12);
        assert_eq!(p.name(), "polynomial");
    }
}
