//! Error types for scenario runs.

use multiverse_env::OracleError;
use thiserror::Error;

/// Errors that stop a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The harness rejected the computation
    #[error("{source} (after {paths} paths)")]
    Oracle {
        source: OracleError,
        paths: u64,
    },
    
    /// The computation has more paths than the configured budget
    #[error("Path budget exceeded: more than {max_paths} paths")]
    BudgetExceeded {
        max_paths: u64,
    },
    
    /// Expected counts for this size do not fit in 64 bits
    #[error("Scenario size {size} is too large to check")]
    SizeTooLarge {
        size: usize,
    },
}

impl RunError {
    /// Returns the harness error, if that is what stopped the run.
    pub fn oracle_error(&self) -> Option<&OracleError> {
        match self {
            RunError::Oracle { source, .. } => Some(source),
            _ => None,
        }
    }
}
