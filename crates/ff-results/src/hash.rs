//! Content-based hashing for run IDs.

use crate::naming::CaseKey;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the case, the serialized run settings and the solver version.
pub fn compute_run_id<C: Serialize>(case: &CaseKey, settings: &C, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let case_json = serde_json::to_string(case).unwrap_or_default();
    hasher.update(case_json.as_bytes());

    let settings_json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(settings_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Settings {
        points: usize,
        transport: &'static str,
    }

    #[test]
    fn hash_stability() {
        let case = CaseKey::new(1.0, 0.0);
        let settings = Settings {
            points: 6,
            transport: "Ion",
        };
        let hash1 = compute_run_id(&case, &settings, "v1");
        let hash2 = compute_run_id(&case, &settings, "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let settings = Settings {
            points: 6,
            transport: "Ion",
        };
        let a = compute_run_id(&CaseKey::new(1.0, 0.0), &settings, "v1");
        let b = compute_run_id(&CaseKey::new(1.0, 100.0), &settings, "v1");
        let c = compute_run_id(&CaseKey::new(1.0, 0.0), &settings, "v2");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
