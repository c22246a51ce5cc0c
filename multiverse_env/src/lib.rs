//! Multiverse Oracle Abstraction Layer
//!
//! This crate provides the randomness interface that lets a probabilistic
//! algorithm run in both **Reality** (a real RNG) and **Enumeration**
//! (the `multiverse_sim` harness, which answers every oracle call with each
//! possible value in turn).
//!
//! # Core Concept: The Oracle
//!
//! An algorithm under test never touches an RNG directly. Every random
//! decision goes through a single call:
//!
//! - `random_below(n)` - a uniformly random integer in `[0, n)`
//!
//! Because this is the only source of non-determinism, a harness that
//! controls the answers can replay the algorithm down every possible
//! execution path and compute the exact probability of each result.
//!
//! # Contract
//!
//! The algorithm must be a pure function of the answers it receives: on two
//! runs that receive the same answers, it must make the same calls with the
//! same bounds. Reading wall-clock time, global counters or any other
//! external mutable state breaks exhaustive enumeration. The harness detects
//! a changed bound and fails with [`OracleError::NonDeterminismDetected`],
//! but it cannot detect every violation.
//!
//! # Example
//!
//! ```
//! use multiverse_env::{OracleError, RandomSource, RngSource};
//!
//! fn roll_die<S: RandomSource>(src: &mut S) -> Result<u64, OracleError> {
//!     Ok(src.random_below(6)? + 1)
//! }
//!
//! let mut real = RngSource::seeded(42);
//! let face = roll_die(&mut real).unwrap();
//! assert!((1..=6).contains(&face));
//! ```

mod context;
mod types;
mod error;
mod rng_impl;

pub use context::RandomSource;
pub use types::Divergence;
pub use error::OracleError;
pub use rng_impl::RngSource;
