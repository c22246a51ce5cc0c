//! Error types for the Multiverse oracle abstraction.

use crate::types::Divergence;
use thiserror::Error;

/// Errors that can occur when consulting the oracle.
///
/// Both kinds are logic defects in the algorithm under test rather than
/// transient faults. An exploration that hits either one stops immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The caller passed a bound of zero (empty range)
    #[error("Invalid range: bound must be at least 1, got {bound}")]
    InvalidRange {
        bound: u64,
    },
    
    /// A replay disagreed with the recorded path at oracle call `depth`
    #[error("Non-determinism detected at call #{depth}: {divergence}")]
    NonDeterminismDetected {
        depth: usize,
        divergence: Divergence,
    },
}

impl OracleError {
    /// Creates an invalid range error.
    pub fn invalid_range(bound: u64) -> Self {
        Self::InvalidRange { bound }
    }
    
    /// Creates a bound mismatch error.
    pub fn bound_changed(depth: usize, recorded: u64, observed: u64) -> Self {
        Self::NonDeterminismDetected {
            depth,
            divergence: Divergence::BoundChanged { recorded, observed },
        }
    }
    
    /// Creates an early termination error.
    pub fn terminated_early(depth: usize, recorded_depth: usize) -> Self {
        Self::NonDeterminismDetected {
            depth,
            divergence: Divergence::TerminatedEarly { recorded_depth },
        }
    }
    
    /// Returns true if this error signals a replay disagreement.
    pub fn is_non_determinism(&self) -> bool {
        matches!(self, Self::NonDeterminismDetected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_error_messages() {
        let err = OracleError::invalid_range(0);
        assert_eq!(
            err.to_string(),
            "Invalid range: bound must be at least 1, got 0"
        );
        
        let err = OracleError::bound_changed(1, 4, 5);
        assert_eq!(
            err.to_string(),
            "Non-determinism detected at call #1: bound changed from 4 to 5"
        );
        assert!(err.is_non_determinism());
        
        let err = OracleError::terminated_early(0, 2);
        assert_eq!(
            err.to_string(),
            "Non-determinism detected at call #0: computation terminated early, path records 2 calls"
        );
    }
}
