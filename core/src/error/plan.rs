use thiserror::Error;

use super::oracle::OracleError;

/// Fatal plan parsing failures.
///
/// Lines that match neither the thought nor the action grammar are skipped and
/// argument text that is not a valid literal falls back to a raw string, so
/// neither shows up here.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("operation '{0}' not found")]
    OperationNotFound(String),

    #[error("malformed plan: expected task index {expected}, found {found}")]
    MalformedPlan { expected: u32, found: u32 },

    #[error("planner oracle failed: {0}")]
    Oracle(#[from] OracleError),
}
