//! Core oracle trait for algorithms under test.

use crate::error::OracleError;

/// The central interface for randomness.
///
/// This trait abstracts the random number generator so that the same
/// algorithm can run against a real RNG or under exhaustive enumeration.
///
/// # Implementations
///
/// - **Reality**: `RngSource` - wraps a seeded `ChaCha8Rng` or OS entropy
/// - **Enumeration**: `multiverse_sim::Replay` - answers from the current path
///
/// # Determinism
///
/// Implementations decide the answers; callers must not depend on anything
/// other than the answers they receive.
pub trait RandomSource {
    /// Returns a uniformly random integer in `[0, bound)`.
    ///
    /// # Errors
    /// * `OracleError::InvalidRange` - `bound` is zero
    /// * `OracleError::NonDeterminismDetected` - enumeration only, the call
    ///   disagrees with a previous replay of the same path
    fn random_below(&mut self, bound: u64) -> Result<u64, OracleError>;
    
    /// Returns the source's seed (for logging/debugging).
    ///
    /// Enumeration and OS entropy are not seeded and return `None`.
    fn seed(&self) -> Option<u64> {
        None
    }
    
    /// Flips a fair coin.
    fn coin(&mut self) -> Result<bool, OracleError> {
        Ok(self.random_below(2)? == 1)
    }
    
    /// Returns a uniformly random index into a collection of `len` items.
    fn index(&mut self, len: usize) -> Result<usize, OracleError> {
        Ok(self.random_below(len as u64)? as usize)
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn random_below(&mut self, bound: u64) -> Result<u64, OracleError> {
        (**self).random_below(bound)
    }
    
    fn seed(&self) -> Option<u64> {
        (**self).seed()
    }
}
