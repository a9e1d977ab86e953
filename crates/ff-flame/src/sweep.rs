//! Independent cases in parallel.

use rayon::prelude::*;

use ff_results::CaseStore;

use crate::context::RunContext;
use crate::error::FlameResult;
use crate::run::{CaseReport, CaseRequest, run_case};

/// Apply `case` to every request on the rayon pool; results keep input order.
pub fn sweep<T, F>(requests: &[CaseRequest], case: F) -> Vec<FlameResult<T>>
where
    T: Send,
    F: Fn(&CaseRequest) -> FlameResult<T> + Sync + Send,
{
    requests.par_iter().map(case).collect()
}

/// Every case gets its own mixture, domains and grid; only `ctx` is shared.
pub fn run_sweep(ctx: &RunContext, requests: &[CaseRequest], store: &CaseStore) -> Vec<FlameResult<CaseReport>> {
    sweep(requests, |r| run_case(ctx, r, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlameError;

    #[test]
    fn results_keep_input_order() {
        let requests: Vec<CaseRequest> = (1..=16).map(|i| CaseRequest::new(0.1 * i as f64, 0.0)).collect();
        let out = sweep(&requests, |r| Ok(r.phi));
        let phis: Vec<f64> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(phis, requests.iter().map(|r| r.phi).collect::<Vec<_>>());
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let requests = [CaseRequest::new(1.0, 0.0), CaseRequest::new(-1.0, 0.0), CaseRequest::new(0.8, 0.0)];
        let out = sweep(&requests, |r| {
            if r.phi > 0.0 {
                Ok(r.phi)
            } else {
                Err(FlameError::Config {
                    what: "negative".to_string(),
                })
            }
        });
        assert!(out[0].is_ok());
        assert!(out[1].is_err());
        assert!(out[2].is_ok());
    }
}
