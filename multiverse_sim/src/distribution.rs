//! Outcome distributions - aggregate checks over an exploration.

use crate::explorer::Outcome;
use crate::probability::Probability;
use multiverse_env::OracleError;
use std::collections::BTreeMap;

/// Exact probability of each distinct value a computation can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution<T: Ord> {
    /// Accumulated probability per value
    outcomes: BTreeMap<T, Probability>,
    
    /// Number of paths folded in
    paths: u64,
}

impl<T: Ord> Distribution<T> {
    /// Creates an empty distribution.
    pub fn new() -> Self {
        Self {
            outcomes: BTreeMap::new(),
            paths: 0,
        }
    }
    
    /// Folds one path's result into the distribution.
    pub fn record(&mut self, value: T, probability: &Probability) {
        *self.outcomes.entry(value).or_default() += probability;
        self.paths += 1;
    }
    
    /// Builds a distribution from an exploration, stopping at the first error.
    pub fn try_from_outcomes<I>(outcomes: I) -> Result<Self, OracleError>
    where
        I: IntoIterator<Item = Result<Outcome<T>, OracleError>>,
    {
        let mut dist = Self::new();
        for outcome in outcomes {
            let outcome = outcome?;
            dist.record(outcome.value, &outcome.probability);
        }
        Ok(dist)
    }
    
    /// Probability of `value` (zero if never produced).
    pub fn probability_of(&self, value: &T) -> Probability {
        self.outcomes.get(value).cloned().unwrap_or_else(Probability::zero)
    }
    
    /// Sum of all recorded probabilities.
    pub fn total(&self) -> Probability {
        self.outcomes.values().sum()
    }
    
    /// Returns true if the probabilities sum to exactly one.
    pub fn is_complete(&self) -> bool {
        self.total().is_one()
    }
    
    /// Returns true if every distinct value is equally likely.
    pub fn is_uniform(&self) -> bool {
        let mut probs = self.outcomes.values();
        match probs.next() {
            Some(first) => probs.all(|p| p == first),
            None => false,
        }
    }
    
    /// Number of distinct values.
    pub fn support_len(&self) -> usize {
        self.outcomes.len()
    }
    
    /// Number of paths folded in.
    pub fn paths(&self) -> u64 {
        self.paths
    }
    
    /// Most likely value (smallest value wins ties).
    pub fn most_likely(&self) -> Option<(&T, &Probability)> {
        self.outcomes
            .iter()
            .max_by(|(va, pa), (vb, pb)| pa.cmp(pb).then_with(|| vb.cmp(va)))
    }
    
    /// Least likely value (smallest value wins ties).
    pub fn least_likely(&self) -> Option<(&T, &Probability)> {
        self.outcomes
            .iter()
            .min_by(|(va, pa), (vb, pb)| pa.cmp(pb).then_with(|| va.cmp(vb)))
    }
    
    /// Iterates values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &Probability)> {
        self.outcomes.iter()
    }
}

impl<T: Ord> Default for Distribution<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<Outcome<T>> for Distribution<T> {
    fn from_iter<I: IntoIterator<Item = Outcome<T>>>(iter: I) -> Self {
        let mut dist = Self::new();
        for outcome in iter {
            dist.record(outcome.value, &outcome.probability);
        }
        dist
    }
}
