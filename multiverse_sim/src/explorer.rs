//! Multiverse - the deterministic enumeration harness.
//!
//! The harness runs a computation over and over, each time answering its
//! oracle calls from the current execution path, until every combination of
//! answers has been tried exactly once. Each replay that terminates yields
//! the computation's result together with the exact probability of the path
//! that produced it.
//!
//! # Algorithm
//!
//! ```text
//! loop {
//!     replay computation from scratch      (Replay answers from the path)
//!     yield (result, 1 / product of bounds)
//!     advance path: pop exhausted nodes, bump the deepest remaining choice
//!     stop when the path is empty
//! }
//! ```
//!
//! Paths come out in ascending lexicographic order of their answers: all
//! zeros first, the shallowest decision changes last.
//!
//! # Contract
//!
//! The computation must be a pure function of the answers it receives and
//! must terminate on every path. A changed bound at a recorded position, or a
//! replay that stops short of the recorded path, fails the exploration with
//! `OracleError::NonDeterminismDetected`.

use crate::context::Replay;
use crate::distribution::Distribution;
use crate::path::ExecutionPath;
use crate::probability::Probability;
use multiverse_env::OracleError;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// A single terminal result of the computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    /// Value the computation returned
    pub value: T,
    
    /// Exact probability of the path that produced it
    pub probability: Probability,
    
    /// Oracle answers along the path, root first
    pub choices: Vec<u64>,
}

impl<T> Outcome<T> {
    /// Returns the path as a comma separated list of answers, e.g. `"0,1"`.
    pub fn path_label(&self) -> String {
        self.choices
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
    
    /// Maps the value, keeping probability and path.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            probability: self.probability,
            choices: self.choices,
        }
    }
}

/// The enumeration harness.
///
/// A harness is single use: `explore` consumes it. Run a second exploration
/// with a fresh `Multiverse`.
#[derive(Debug, Default)]
pub struct Multiverse {
    /// The one current path
    path: ExecutionPath,
    
    /// Number of completed replays
    paths_explored: u64,
}

impl Multiverse {
    /// Creates a harness positioned at the root.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Starts a lazy exploration of `computation`.
    ///
    /// Each call to `next()` on the returned iterator performs exactly one
    /// full replay. The first error ends the exploration.
    pub fn explore<T, F>(self, computation: F) -> Exploration<T, F>
    where
        F: FnMut(&mut Replay<'_>) -> Result<T, OracleError>,
    {
        debug!("Starting exploration");
        Exploration {
            universe: self,
            computation,
            state: ExplorationState::Running,
            _marker: PhantomData,
        }
    }
    
    /// Explores `computation` to completion and collects every outcome.
    pub fn enumerate<T, F>(computation: F) -> Result<Vec<Outcome<T>>, OracleError>
    where
        F: FnMut(&mut Replay<'_>) -> Result<T, OracleError>,
    {
        Self::new().explore(computation).collect()
    }
    
    /// Explores `computation` to completion and aggregates outcomes by value.
    pub fn distribution<T, F>(computation: F) -> Result<Distribution<T>, OracleError>
    where
        T: Ord,
        F: FnMut(&mut Replay<'_>) -> Result<T, OracleError>,
    {
        Distribution::try_from_outcomes(Self::new().explore(computation))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExplorationState {
    Running,
    Exhausted,
    Faulted,
}

/// Lazy sequence of outcomes produced by [`Multiverse::explore`].
///
/// Yields `Ok(outcome)` once per path. On the first error it yields `Err`
/// once and then ends. Dropping it early is always safe; it owns only the
/// in-memory path.
pub struct Exploration<T, F> {
    universe: Multiverse,
    computation: F,
    state: ExplorationState,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> Exploration<T, F> {
    /// Number of replays that have completed successfully.
    pub fn paths_explored(&self) -> u64 {
        self.universe.paths_explored
    }
    
    /// Number of decision nodes currently held on the path stack.
    pub fn depth(&self) -> usize {
        self.universe.path.len()
    }
    
    /// Returns true once every path has been yielded.
    pub fn is_exhausted(&self) -> bool {
        self.state == ExplorationState::Exhausted
    }
}

impl<T, F> Iterator for Exploration<T, F>
where
    F: FnMut(&mut Replay<'_>) -> Result<T, OracleError>,
{
    type Item = Result<Outcome<T>, OracleError>;
    
    fn next(&mut self) -> Option<Self::Item> {
        if self.state != ExplorationState::Running {
            return None;
        }
        
        let universe = &mut self.universe;
        let mut replay = Replay::new(&mut universe.path);
        let result = (self.computation)(&mut replay);
        
        // A latched fault outranks whatever the computation returned.
        let value = match replay.finish().and(result) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Exploration aborted after {} paths: {}",
                    universe.paths_explored, e
                );
                self.state = ExplorationState::Faulted;
                return Some(Err(e));
            }
        };
        
        let outcome = Outcome {
            value,
            probability: universe.path.probability(),
            choices: universe.path.choices(),
        };
        universe.paths_explored += 1;
        debug!(
            "Path #{} [{}] p={}",
            universe.paths_explored,
            outcome.path_label(),
            outcome.probability
        );
        
        if !universe.path.advance() {
            self.state = ExplorationState::Exhausted;
            info!("Exploration complete: {} paths", universe.paths_explored);
        }
        
        Some(Ok(outcome))
    }
}

impl<T, F> FusedIterator for Exploration<T, F> where
    F: FnMut(&mut Replay<'_>) -> Result<T, OracleError>
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiverse_env::{Divergence, RandomSource};
    use proptest::prelude::*;
    use std::cell::Cell;
    
    fn p(numer: u64, denom: u64) -> Probability {
        Probability::new(numer, denom).unwrap()
    }
    
    #[test]
    fn test_single_coin() {
        let outcomes = Multiverse::enumerate(|r| r.random_below(2)).unwrap();
        
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].value, 0);
        assert_eq!(outcomes[0].probability, p(1, 2));
        assert_eq!(outcomes[1].value, 1);
        assert_eq!(outcomes[1].probability, p(1, 2));
    }
    
    #[test]
    fn test_dependent_calls() {
        let outcomes = Multiverse::enumerate(|r| {
            let first = r.random_below(3)?;
            if first == 0 {
                r.random_below(2)?;
            }
            Ok(first)
        })
        .unwrap();
        
        let labels: Vec<(String, Probability)> = outcomes
            .iter()
            .map(|o| (o.path_label(), o.probability.clone()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("0,0".to_string(), p(1, 6)),
                ("0,1".to_string(), p(1, 6)),
                ("1".to_string(), p(1, 3)),
                ("2".to_string(), p(1, 3)),
            ]
        );
        
        let total: Probability = outcomes.iter().map(|o| &o.probability).sum();
        assert!(total.is_one());
    }
    
    #[test]
    fn test_no_oracle_calls() {
        let outcomes = Multiverse::enumerate(|_| Ok("done")).unwrap();
        
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].probability.is_one());
        assert!(outcomes[0].choices.is_empty());
    }
    
    #[test]
    fn test_bound_of_one_is_certain() {
        let outcomes = Multiverse::enumerate(|r| {
            let a = r.random_below(1)?;
            let b = r.random_below(1)?;
            Ok(a + b)
        })
        .unwrap();
        
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].probability.is_one());
    }
    
    #[test]
    fn test_lexicographic_order() {
        let paths: Vec<Vec<u64>> = Multiverse::new()
            .explore(|r| {
                r.random_below(2)?;
                r.random_below(2)?;
                Ok(())
            })
            .map(|o| o.unwrap().choices)
            .collect();
        
        assert_eq!(paths, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
    }
    
    #[test]
    fn test_non_determinism_detected() {
        // Bound depends on external state instead of prior answers
        let runs = Cell::new(0u64);
        let results: Vec<_> = Multiverse::new()
            .explore(|r| {
                runs.set(runs.get() + 1);
                let bound = if runs.get() == 1 { 4 } else { 5 };
                r.random_below(bound)
            })
            .collect();
        
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(OracleError::NonDeterminismDetected {
                depth: 0,
                divergence: Divergence::BoundChanged { recorded: 4, observed: 5 },
            })
        );
    }
    
    #[test]
    fn test_early_termination_detected() {
        let runs = Cell::new(0u64);
        let result = Multiverse::enumerate(|r| {
            runs.set(runs.get() + 1);
            if runs.get() == 1 {
                r.random_below(2)?;
            }
            Ok(())
        });
        
        assert_eq!(result, Err(OracleError::terminated_early(0, 1)));
    }
    
    #[test]
    fn test_invalid_range_every_time() {
        for _ in 0..3 {
            let mut exploration = Multiverse::new().explore(|r| r.random_below(0));
            assert_eq!(exploration.next(), Some(Err(OracleError::invalid_range(0))));
            assert_eq!(exploration.next(), None);
            assert_eq!(exploration.paths_explored(), 0);
        }
    }
    
    #[test]
    fn test_invalid_range_deep_in_tree() {
        // Only the last branch asks for an empty range
        let result = Multiverse::enumerate(|r| {
            let a = r.random_below(3)?;
            if a == 2 {
                r.random_below(0)?;
            }
            Ok(a)
        });
        
        assert_eq!(result, Err(OracleError::invalid_range(0)));
    }
    
    #[test]
    fn test_swallowed_error_still_fails() {
        let result = Multiverse::enumerate(|r| {
            let _ = r.random_below(0);
            Ok(0u64)
        });
        
        assert_eq!(result, Err(OracleError::invalid_range(0)));
    }
    
    #[test]
    fn test_lazy_and_abandonable() {
        let mut exploration = Multiverse::new().explore(|r| {
            let a = r.random_below(10)?;
            let b = r.random_below(10)?;
            Ok(a * 10 + b)
        });
        
        let first: Vec<u64> = exploration
            .by_ref()
            .take(3)
            .map(|o| o.unwrap().value)
            .collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(exploration.paths_explored(), 3);
        assert_eq!(exploration.depth(), 2);
        assert!(!exploration.is_exhausted());
        // Dropped here without finishing
    }
    
    #[test]
    fn test_fused_after_exhaustion() {
        let mut exploration = Multiverse::new().explore(|r| r.random_below(2));
        assert!(exploration.next().is_some());
        assert!(exploration.next().is_some());
        assert!(exploration.is_exhausted());
        assert_eq!(exploration.depth(), 0);
        assert_eq!(exploration.next(), None);
        assert_eq!(exploration.next(), None);
    }
    
    #[test]
    fn test_distribution_shortcut() {
        let dist = Multiverse::distribution(|r| {
            let a = r.random_below(2)?;
            let b = r.random_below(2)?;
            Ok(a + b)
        })
        .unwrap();
        
        assert_eq!(dist.paths(), 4);
        assert_eq!(dist.probability_of(&1), p(1, 2));
        assert!(dist.is_complete());
    }
    
    #[test]
    fn test_outcome_map() {
        let outcome = Outcome {
            value: 3u64,
            probability: p(1, 4),
            choices: vec![1, 1],
        };
        let mapped = outcome.map(|v| v * 2);
        assert_eq!(mapped.value, 6);
        assert_eq!(mapped.path_label(), "1,1");
    }
    
    proptest! {
        #[test]
        fn prop_fixed_bounds_cover_product(bounds in prop::collection::vec(1u64..5, 0..5)) {
            let outcomes = Multiverse::enumerate(|r| {
                bounds
                    .iter()
                    .map(|&b| r.random_below(b))
                    .collect::<Result<Vec<_>, _>>()
            })
            .unwrap();
            
            let expected: u64 = bounds.iter().product();
            prop_assert_eq!(outcomes.len() as u64, expected);
            
            let total: Probability = outcomes.iter().map(|o| &o.probability).sum();
            prop_assert!(total.is_one());
            
            // Value equals the path when every call is independent
            for outcome in &outcomes {
                prop_assert_eq!(&outcome.value, &outcome.choices);
            }
        }
        
        #[test]
        fn prop_dependent_bounds_sum_to_one(seed in 0u64..1000) {
            // Each answer determines the next bound
            let outcomes = Multiverse::enumerate(|r| {
                let mut bound = seed % 4 + 1;
                let mut trail = Vec::new();
                for _ in 0..3 {
                    let answer = r.random_below(bound)?;
                    trail.push(answer);
                    bound = (answer + seed) % 3 + 1;
                }
                Ok(trail)
            })
            .unwrap();
            
            let total: Probability = outcomes.iter().map(|o| &o.probability).sum();
            prop_assert!(total.is_one());
            
            let mut sorted = outcomes.iter().map(|o| o.choices.clone()).collect::<Vec<_>>();
            sorted.sort();
            let yielded: Vec<_> = outcomes.iter().map(|o| o.choices.clone()).collect();
            prop_assert_eq!(sorted, yielded);
        }
    }
}
