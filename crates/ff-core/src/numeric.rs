use crate::{CoreError, CoreResult};

/// Floating point type used throughout the system
pub type Real = f64;

/// Absolute/relative tolerance pair
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// True when every element is finite and larger than its predecessor.
pub fn is_strictly_increasing(xs: &[Real]) -> bool {
    xs.iter().all(|x| x.is_finite()) && xs.windows(2).all(|w| w[1] > w[0])
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`.
///
/// `xs` must be non-decreasing. Values outside the table are clamped to the
/// end values.
pub fn linear_interp(x: Real, xs: &[Real], ys: &[Real]) -> CoreResult<Real> {
    if xs.is_empty() {
        return Err(CoreError::InvalidArg {
            what: "interpolation table is empty",
        });
    }
    if xs.len() != ys.len() {
        return Err(CoreError::LengthMismatch {
            what: "interpolation table",
            expected: xs.len(),
            got: ys.len(),
        });
    }
    let last = xs.len() - 1;
    if x <= xs[0] {
        return Ok(ys[0]);
    }
    if x >= xs[last] {
        return Ok(ys[last]);
    }
    // first interval whose right end reaches x
    let i = xs.partition_point(|&xi| xi < x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    if x1 == x0 {
        return Ok(y1);
    }
    Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn interp_inside_and_clamped() {
        let xs = [0.0, 0.3, 0.7, 1.0];
        let ys = [1.0, 1.0, 3.0, 3.0];
        assert_eq!(linear_interp(-1.0, &xs, &ys).unwrap(), 1.0);
        assert_eq!(linear_interp(0.0, &xs, &ys).unwrap(), 1.0);
        assert!((linear_interp(0.5, &xs, &ys).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(linear_interp(1.0, &xs, &ys).unwrap(), 3.0);
        assert_eq!(linear_interp(2.0, &xs, &ys).unwrap(), 3.0);
    }

    #[test]
    fn interp_rejects_bad_tables() {
        assert!(linear_interp(0.5, &[], &[]).is_err());
        assert!(linear_interp(0.5, &[0.0, 1.0], &[1.0]).is_err());
    }

    #[test]
    fn strictly_increasing() {
        assert!(is_strictly_increasing(&[0.0, 0.1, 0.2]));
        assert!(!is_strictly_increasing(&[0.0, 0.1, 0.1]));
        assert!(!is_strictly_increasing(&[0.0, Real::NAN]));
    }
}
