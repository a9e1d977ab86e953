//! ff-results: output naming, CSV tables, solution snapshots and run manifests.

pub mod hash;
pub mod naming;
pub mod store;
pub mod table;
pub mod types;

pub use hash::compute_run_id;
pub use naming::CaseKey;
pub use store::{CaseOutputs, CaseStore, WrittenFiles};
pub use table::Table;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Case not found: {name}")]
    CaseNotFound { name: String },

    #[error("Malformed table: {what}")]
    Table { what: String },
}
