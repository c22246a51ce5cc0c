//! Multiverse Deterministic Enumeration Harness
//!
//! This crate explores every possible execution of a probabilistic
//! algorithm. Instead of sampling, it replays the algorithm once per
//! combination of oracle answers and reports each result with its exact
//! probability.
//!
//! # Core Principle: Replay, don't sample
//!
//! The algorithm draws all randomness through `RandomSource::random_below`.
//! The harness answers those calls from an explicit path stack:
//! - **Fresh call site**: record the bound, answer `0`
//! - **Recorded call site**: check the bound, answer the current choice
//! - **Termination**: yield `(result, 1 / product of bounds)`, then backtrack
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Multiverse                           │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ ExecutionPath (stack of DecisionNode {bound, choice})│   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │ answers                      ▲ advance()            │
//! │  ┌────▼────┐                    ┌────┴────┐                 │
//! │  │ Replay  │──► computation ───►│ Outcome │──► Distribution │
//! │  └─────────┘    (user code)     └─────────┘                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use multiverse_env::RandomSource;
//! use multiverse_sim::{Multiverse, Probability};
//!
//! let outcomes = Multiverse::enumerate(|r| {
//!     let first = r.random_below(3)?;
//!     if first == 0 {
//!         r.random_below(2)?;
//!     }
//!     Ok(first)
//! })
//! .unwrap();
//!
//! assert_eq!(outcomes.len(), 4);
//! assert_eq!(outcomes[0].probability, Probability::new(1, 6).unwrap());
//! let total: Probability = outcomes.iter().map(|o| &o.probability).sum();
//! assert!(total.is_one());
//! ```

mod context;
mod path;
mod probability;
mod explorer;
mod distribution;
mod error;
mod runner;
mod exporter;
pub mod scenarios;

pub use context::Replay;
pub use path::{DecisionNode, ExecutionPath};
pub use probability::Probability;
pub use explorer::{Exploration, Multiverse, Outcome};
pub use distribution::Distribution;
pub use error::RunError;
pub use runner::{
    ExpectedCounts, MonteCarloReport, OutcomeRow, RunnerConfig, ScenarioResult, ScenarioRunner,
};
pub use exporter::{ExplorationExport, ExportRow};
