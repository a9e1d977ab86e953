//! Adaptive grid refinement on ratio, slope and curvature criteria.

use crate::error::{SolverError, SolverResult};
use ff_core::numeric::is_strictly_increasing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Thresholds that trigger point insertion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefineCriteria {
    /// Maximum ratio between adjacent interval widths.
    pub ratio: f64,
    /// Maximum change of a component across one interval, as a fraction of
    /// its range over the domain.
    pub slope: f64,
    /// Maximum change of a component's slope across one point, as a fraction
    /// of the slope range.
    pub curve: f64,
}

impl Default for RefineCriteria {
    fn default() -> Self {
        Self {
            ratio: 10.0,
            slope: 0.8,
            curve: 0.8,
        }
    }
}

impl RefineCriteria {
    pub fn validate(&self) -> SolverResult<()> {
        if !(self.ratio >= 2.0) {
            return Err(SolverError::ProblemSetup {
                what: format!("refine ratio must be at least 2, got {}", self.ratio),
            });
        }
        for (name, v) in [("slope", self.slope), ("curve", self.curve)] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(SolverError::ProblemSetup {
                    what: format!("refine {name} must lie in (0, 1], got {v}"),
                });
            }
        }
        Ok(())
    }
}

/// Decides where new points go. Existing points are never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Refiner {
    pub criteria: RefineCriteria,
    /// Upper limit on the number of grid points.
    pub max_points: usize,
    /// Components whose range is below this fraction of their magnitude are
    /// ignored.
    pub min_range: f64,
    /// Intervals narrower than this are never split.
    pub grid_min: f64,
}

impl Default for Refiner {
    fn default() -> Self {
        Self {
            criteria: RefineCriteria::default(),
            max_points: 1000,
            min_range: 0.01,
            grid_min: 1e-10,
        }
    }
}

impl Refiner {
    pub fn new(criteria: RefineCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    /// Intervals to split, in ascending order.
    ///
    /// `components` holds one profile per refine-active component, each with
    /// one value per grid point.
    pub fn analyze(&self, z: &[f64], components: &[Vec<f64>]) -> SolverResult<Vec<usize>> {
        let n = z.len();
        if n < 2 || !is_strictly_increasing(z) {
            return Err(SolverError::InvalidState {
                what: "refinement needs a strictly increasing grid".to_string(),
            });
        }
        let dz: Vec<f64> = z.windows(2).map(|w| w[1] - w[0]).collect();
        let mut marks = BTreeSet::new();

        for v in components {
            if v.len() != n {
                return Err(SolverError::InvalidState {
                    what: "profile length does not match grid".to_string(),
                });
            }
            let (vmin, vmax) = min_max(v);
            let range = vmax - vmin;
            if range > self.min_range * vmax.abs().max(vmin.abs()) {
                for j in 0..n - 1 {
                    if (v[j + 1] - v[j]).abs() > self.criteria.slope * range {
                        marks.insert(j);
                    }
                }
            }

            let slopes: Vec<f64> = (0..n - 1).map(|j| (v[j + 1] - v[j]) / dz[j]).collect();
            let (smin, smax) = min_max(&slopes);
            let srange = smax - smin;
            if slopes.len() > 1 && srange > self.min_range * smax.abs().max(smin.abs()) {
                for j in 0..slopes.len() - 1 {
                    if (slopes[j + 1] - slopes[j]).abs() > self.criteria.curve * srange {
                        marks.insert(j);
                        marks.insert(j + 1);
                    }
                }
            }
        }

        for j in 1..dz.len() {
            if dz[j] > self.criteria.ratio * dz[j - 1] {
                marks.insert(j);
            }
            if dz[j] < dz[j - 1] / self.criteria.ratio {
                marks.insert(j - 1);
            }
        }

        let intervals: Vec<usize> = marks
            .into_iter()
            .filter(|&j| dz[j] > 2.0 * self.grid_min)
            .collect();
        if n + intervals.len() > self.max_points {
            return Err(SolverError::GridLimit {
                max: self.max_points,
            });
        }
        Ok(intervals)
    }
}

fn min_max(v: &[f64]) -> (f64, f64) {
    v.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn flat_profile_needs_nothing() {
        let z = uniform(6);
        let r = Refiner::new(RefineCriteria::default());
        assert!(r.analyze(&z, &[vec![1.0; 6]]).unwrap().is_empty());
    }

    #[test]
    fn step_is_refined_where_it_rises() {
        let z = uniform(6);
        let v = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let r = Refiner::new(RefineCriteria {
            ratio: 10.0,
            slope: 0.5,
            curve: 1.0,
        });
        assert_eq!(r.analyze(&z, &[v]).unwrap(), vec![2]);
    }

    #[test]
    fn curvature_marks_both_neighbours() {
        let z = uniform(5);
        let v = vec![0.0, 0.0, 0.0, 1.0, 2.0];
        let r = Refiner::new(RefineCriteria {
            ratio: 10.0,
            slope: 1.0,
            curve: 0.5,
        });
        assert_eq!(r.analyze(&z, &[v]).unwrap(), vec![1, 2]);
    }

    #[test]
    fn ratio_criterion() {
        let z = vec![0.0, 0.01, 1.0];
        let r = Refiner::new(RefineCriteria::default());
        assert_eq!(r.analyze(&z, &[]).unwrap(), vec![1]);
    }

    #[test]
    fn grid_limit_enforced() {
        let z = uniform(6);
        let v = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let r = Refiner {
            max_points: 7,
            ..Refiner::new(RefineCriteria::default())
        };
        assert!(matches!(r.analyze(&z, &[v]), Err(SolverError::GridLimit { max: 7 })));
    }

    #[test]
    fn criteria_validation() {
        assert!(RefineCriteria::default().validate().is_ok());
        let bad = RefineCriteria {
            ratio: 1.0,
            ..RefineCriteria::default()
        };
        assert!(bad.validate().is_err());
        let bad = RefineCriteria {
            slope: 0.0,
            ..RefineCriteria::default()
        };
        assert!(bad.validate().is_err());
    }
}
