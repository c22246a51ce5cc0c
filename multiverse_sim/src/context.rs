//! Replay context implementing RandomSource for exhaustive enumeration.

use crate::path::ExecutionPath;
use multiverse_env::{OracleError, RandomSource};
use tracing::warn;

/// The oracle handed to a computation during one replay.
///
/// This implements `RandomSource` by answering from the current execution
/// path instead of an RNG:
/// - A call at a recorded position returns that node's current choice
/// - A call at a fresh position records a new node and returns `0`
///
/// The computation can only call `random_below` (and the trait's helpers);
/// it never sees the path itself.
///
/// The first fault is latched. Every later call fails with the same error,
/// and the harness reports it even if the computation swallowed the `Err`.
pub struct Replay<'a> {
    /// Path being replayed (owned by the harness)
    path: &'a mut ExecutionPath,
    
    /// Index of the next oracle call
    depth: usize,
    
    /// First error observed during this replay
    fault: Option<OracleError>,
}

impl<'a> Replay<'a> {
    /// Starts a replay at the root of `path`.
    pub(crate) fn new(path: &'a mut ExecutionPath) -> Self {
        Self {
            path,
            depth: 0,
            fault: None,
        }
    }
    
    /// Returns how many oracle calls this replay has answered.
    pub fn depth(&self) -> usize {
        self.depth
    }
    
    /// Ends the replay, surfacing any latched fault or an early termination.
    pub(crate) fn finish(self) -> Result<(), OracleError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        self.path.finish(self.depth).map_err(|e| {
            warn!("Replay diverged: {}", e);
            e
        })
    }
}

impl RandomSource for Replay<'_> {
    fn random_below(&mut self, bound: u64) -> Result<u64, OracleError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        
        match self.path.visit(self.depth, bound) {
            Ok(choice) => {
                self.depth += 1;
                Ok(choice)
            }
            Err(e) => {
                if e.is_non_determinism() {
                    warn!("Replay diverged: {}", e);
                }
                self.fault = Some(e.clone());
                Err(e)
            }
        }
    }
}
