//! Scenario runner - explores built-in scenarios and checks their distributions.

use crate::distribution::Distribution;
use crate::error::RunError;
use crate::explorer::Multiverse;
use crate::probability::Probability;
use crate::scenarios::{self, ScenarioId};

use multiverse_env::{OracleError, RandomSource, RngSource};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, info, warn};

/// Configuration for a scenario run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of items for the sampling and shuffle scenarios
    pub size: usize,
    
    /// Reservoir capacity for reservoir sampling
    pub sample_size: usize,
    
    /// Maximum number of paths to explore before giving up
    pub max_paths: u64,
    
    /// Monte Carlo samples to draw from a real RNG (0 = skip)
    pub samples: usize,
    
    /// Seed for the Monte Carlo RNG
    pub seed: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            size: 4,
            sample_size: 2,
            max_paths: 1_000_000,
            samples: 0,
            seed: 42,
        }
    }
}

/// One row of an exact distribution, rendered for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRow {
    /// Debug rendering of the value
    pub value: String,
    
    /// Exact probability
    pub probability: Probability,
}

/// Cross-check of the exact distribution against a real RNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloReport {
    /// Number of real runs
    pub samples: usize,
    
    /// RNG seed
    pub seed: u64,
    
    /// Oracle calls answered by the RNG across all runs
    pub oracle_calls: u64,
    
    /// Largest |empirical - exact| over the support
    pub max_deviation: f64,
    
    /// Allowed deviation for this sample count
    pub tolerance: f64,
    
    /// Values seen in real runs that enumeration never produced
    pub unexpected_values: usize,
    
    /// Whether the cross-check agreed with enumeration
    pub passed: bool,
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,
    
    /// Size used
    pub size: usize,
    
    /// Whether scenario passed all assertions
    pub passed: bool,
    
    /// Paths explored before finishing or aborting
    pub paths_explored: u64,
    
    /// Exact total probability (None if exploration aborted)
    pub total_probability: Option<Probability>,
    
    /// Exact distribution, value order
    pub outcomes: Vec<OutcomeRow>,
    
    /// Failure message if any
    pub failure_reason: Option<String>,
    
    /// Error the harness raised, if any (expected for hazards)
    pub harness_error: Option<String>,
    
    /// Monte Carlo cross-check, if requested
    pub monte_carlo: Option<MonteCarloReport>,
}

impl ScenarioResult {
    /// Number of distinct values.
    pub fn support(&self) -> usize {
        self.outcomes.len()
    }
}

/// Closed-form counts a scenario's exploration is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedCounts {
    /// Number of execution paths
    pub paths: u64,
    
    /// Number of distinct values
    pub support: u64,
}

impl ExpectedCounts {
    fn new(paths: u64, support: u64) -> Self {
        Self { paths, support }
    }
}

/// Runs scenarios through the enumeration harness.
pub struct ScenarioRunner {
    config: RunnerConfig,
}

impl ScenarioRunner {
    /// Creates a runner with the given configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }
    
    /// Sets the item count.
    pub fn with_size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }
    
    /// Sets the path budget.
    pub fn with_max_paths(mut self, max_paths: u64) -> Self {
        self.config.max_paths = max_paths;
        self
    }
    
    /// Enables the Monte Carlo cross-check.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.config.samples = samples;
        self
    }
    
    /// Sets the Monte Carlo seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }
    
    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (size={})", scenario.name(), self.config.size);
        
        if scenario.is_hazard() {
            warn!("⚠ HAZARD SCENARIO - expecting the harness to refuse it");
        }
        
        let counts = match self.expected_counts(scenario) {
            Ok(counts) => counts,
            Err(e) => {
                warn!("Refusing {} before exploring: {}", scenario.name(), e);
                return self.failed::<u64>(scenario, 0, e);
            }
        };
        
        let n = self.config.size;
        match scenario {
            ScenarioId::CoinFlip => self.run_exhaustive(
                scenario,
                |src: &mut dyn RandomSource| scenarios::coin_flip(src),
                |dist| {
                    expect_paths(dist, counts.paths)?;
                    expect_probability(dist, &0, 1, 2)?;
                    expect_probability(dist, &1, 1, 2)
                },
            ),
            ScenarioId::DependentBranch => self.run_exhaustive(
                scenario,
                |src: &mut dyn RandomSource| scenarios::dependent_branch(src),
                |dist| {
                    expect_paths(dist, counts.paths)?;
                    expect_probability(dist, &vec![0, 0], 1, 6)?;
                    expect_probability(dist, &vec![0, 1], 1, 6)?;
                    expect_probability(dist, &vec![1], 1, 3)?;
                    expect_probability(dist, &vec![2], 1, 3)
                },
            ),
            ScenarioId::DiceSum => self.run_exhaustive(
                scenario,
                |src: &mut dyn RandomSource| scenarios::dice_sum(src),
                |dist| {
                    expect_paths(dist, counts.paths)?;
                    expect_support(dist, counts.support)?;
                    expect_probability(dist, &7, 1, 6)?;
                    expect_probability(dist, &2, 1, 36)
                },
            ),
            ScenarioId::ReservoirSampling => {
                let k = self.config.sample_size.min(n);
                self.run_exhaustive(
                    scenario,
                    |src: &mut dyn RandomSource| scenarios::reservoir_sample(src, n, k),
                    |dist| {
                        expect_paths(dist, counts.paths)?;
                        expect_support(dist, counts.support)?;
                        expect_uniform(dist)
                    },
                )
            }
            ScenarioId::FisherYates => self.run_exhaustive(
                scenario,
                |src: &mut dyn RandomSource| scenarios::fisher_yates(src, n),
                |dist| {
                    expect_paths(dist, counts.paths)?;
                    expect_support(dist, counts.support)?;
                    expect_uniform(dist)
                },
            ),
            ScenarioId::NaiveShuffle => self.run_exhaustive(
                scenario,
                |src: &mut dyn RandomSource| scenarios::naive_shuffle(src, n),
                |dist| {
                    expect_paths(dist, counts.paths)?;
                    expect_support(dist, counts.support)?;
                    if n >= 3 {
                        expect_biased(dist)
                    } else {
                        expect_uniform(dist)
                    }
                },
            ),
            ScenarioId::ReplayHazard => {
                let external = Cell::new(0);
                self.run_hazard(
                    scenario,
                    |src: &mut dyn RandomSource| scenarios::replay_hazard(src, &external),
                    OracleError::is_non_determinism,
                )
            }
            ScenarioId::InvalidRange => self.run_hazard(
                scenario,
                |src: &mut dyn RandomSource| scenarios::empty_range(src),
                |e| matches!(e, OracleError::InvalidRange { .. }),
            ),
        }
    }
    
    /// Closed-form path and outcome counts for a scenario at the configured size.
    ///
    /// Fails with `SizeTooLarge` when a count does not fit in 64 bits, and with
    /// `BudgetExceeded` when the scenario is known to need more paths than the
    /// budget allows. Either way nothing has been explored yet.
    pub fn expected_counts(&self, scenario: ScenarioId) -> Result<ExpectedCounts, RunError> {
        let n = self.config.size as u64;
        let too_large = || RunError::SizeTooLarge { size: self.config.size };
        
        let counts = match scenario {
            ScenarioId::CoinFlip => ExpectedCounts::new(2, 2),
            ScenarioId::DependentBranch => ExpectedCounts::new(4, 4),
            ScenarioId::DiceSum => ExpectedCounts::new(36, 11),
            ScenarioId::ReservoirSampling => {
                let k = (self.config.sample_size as u64).min(n);
                // items k..n draw from k + 1 ..= n slots: n! / k! paths
                let paths = (k + 1..=n).try_fold(1u64, |acc, i| acc.checked_mul(i));
                let subsets = binomial(n, k);
                ExpectedCounts::new(paths.ok_or_else(too_large)?, subsets.ok_or_else(too_large)?)
            }
            ScenarioId::FisherYates => {
                let orders = factorial(n).ok_or_else(too_large)?;
                ExpectedCounts::new(orders, orders)
            }
            ScenarioId::NaiveShuffle => {
                let exponent = u32::try_from(n).map_err(|_| too_large())?;
                let paths = n.checked_pow(exponent).ok_or_else(too_large)?;
                ExpectedCounts::new(paths, factorial(n).ok_or_else(too_large)?)
            }
            // Hazards never finish, so there is nothing to count
            ScenarioId::ReplayHazard | ScenarioId::InvalidRange => {
                return Ok(ExpectedCounts::default());
            }
        };
        
        if counts.paths > self.config.max_paths {
            return Err(RunError::BudgetExceeded {
                max_paths: self.config.max_paths,
            });
        }
        Ok(counts)
    }
    
    /// Explores a computation to completion within the path budget.
    pub fn enumerate<T, F>(&self, mut computation: F) -> Result<Distribution<T>, RunError>
    where
        T: Ord,
        F: FnMut(&mut dyn RandomSource) -> Result<T, OracleError>,
    {
        let max_paths = self.config.max_paths;
        let mut exploration = Multiverse::new().explore(|replay| computation(replay));
        let mut dist = Distribution::new();
        
        for outcome in exploration.by_ref() {
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(source) => {
                    return Err(RunError::Oracle {
                        source,
                        paths: dist.paths(),
                    })
                }
            };
            if dist.paths() >= max_paths {
                warn!("Path budget of {} exhausted", max_paths);
                return Err(RunError::BudgetExceeded { max_paths });
            }
            dist.record(outcome.value, &outcome.probability);
        }
        
        debug!("Explored {} paths (stack depth {})", dist.paths(), exploration.depth());
        Ok(dist)
    }
    
    /// Runs a computation on a seeded RNG and compares frequencies.
    pub fn monte_carlo<T, F>(
        &self,
        mut computation: F,
        exact: &Distribution<T>,
    ) -> Result<MonteCarloReport, OracleError>
    where
        T: Ord,
        F: FnMut(&mut dyn RandomSource) -> Result<T, OracleError>,
    {
        let samples = self.config.samples;
        let mut src = RngSource::seeded(self.config.seed);
        let mut counts: BTreeMap<T, usize> = BTreeMap::new();
        
        for _ in 0..samples {
            let value = computation(&mut src)?;
            *counts.entry(value).or_default() += 1;
        }
        
        let unexpected_values = counts
            .keys()
            .filter(|v| exact.probability_of(v).is_zero())
            .count();
        
        let max_deviation = exact
            .iter()
            .map(|(value, p)| {
                let seen = counts.get(value).copied().unwrap_or(0) as f64 / samples.max(1) as f64;
                (seen - p.to_f64()).abs()
            })
            .fold(0.0, f64::max);
        
        // Five standard deviations of the widest Bernoulli (p = 1/2).
        let tolerance = 2.5 / (samples.max(1) as f64).sqrt();
        
        Ok(MonteCarloReport {
            samples,
            seed: self.config.seed,
            oracle_calls: src.calls(),
            max_deviation,
            tolerance,
            unexpected_values,
            passed: unexpected_values == 0 && max_deviation <= tolerance,
        })
    }
    
    fn run_exhaustive<T, F, C>(&self, scenario: ScenarioId, mut computation: F, check: C) -> ScenarioResult
    where
        T: Ord + Debug,
        F: FnMut(&mut dyn RandomSource) -> Result<T, OracleError>,
        C: FnOnce(&Distribution<T>) -> Result<(), String>,
    {
        let dist = match self.enumerate(&mut computation) {
            Ok(dist) => dist,
            Err(e) => {
                let paths = match &e {
                    RunError::Oracle { paths, .. } => *paths,
                    _ => self.config.max_paths,
                };
                return self.failed::<T>(scenario, paths, e);
            }
        };
        
        let mut failure = check(&dist).err();
        if failure.is_none() && !dist.is_complete() {
            failure = Some(format!("Total probability is {}, expected exactly 1", dist.total()));
        }
        
        let mut monte_carlo = None;
        if self.config.samples > 0 {
            match self.monte_carlo(&mut computation, &dist) {
                Ok(report) => {
                    if !report.passed && failure.is_none() {
                        failure = Some(format!(
                            "Monte Carlo deviation {:.4} exceeds tolerance {:.4} ({} unexpected values)",
                            report.max_deviation, report.tolerance, report.unexpected_values
                        ));
                    }
                    monte_carlo = Some(report);
                }
                Err(e) => failure = Some(format!("Monte Carlo run failed: {}", e)),
            }
        }
        
        let mut result = self.result(scenario, dist.paths(), Some(&dist), failure, None);
        result.monte_carlo = monte_carlo;
        result
    }
    
    fn run_hazard<F>(
        &self,
        scenario: ScenarioId,
        computation: F,
        expected: impl FnOnce(&OracleError) -> bool,
    ) -> ScenarioResult
    where
        F: FnMut(&mut dyn RandomSource) -> Result<u64, OracleError>,
    {
        match self.enumerate(computation) {
            Err(RunError::Oracle { source, paths }) => {
                info!("Harness refused {} after {} paths: {}", scenario.name(), paths, source);
                let failure = if expected(&source) {
                    None
                } else {
                    Some(format!("Harness raised the wrong error: {}", source))
                };
                self.result::<u64>(scenario, paths, None, failure, Some(source.to_string()))
            }
            Err(e) => self.failed::<u64>(scenario, 0, e),
            Ok(dist) => self.result(
                scenario,
                dist.paths(),
                Some(&dist),
                Some("Harness accepted a computation it should have refused".to_string()),
                None,
            ),
        }
    }
    
    fn failed<T: Ord + Debug>(&self, scenario: ScenarioId, paths_explored: u64, err: RunError) -> ScenarioResult {
        let harness_error = err.oracle_error().map(|o| o.to_string());
        self.result::<T>(scenario, paths_explored, None, Some(err.to_string()), harness_error)
    }
    
    fn result<T: Ord + Debug>(
        &self,
        scenario: ScenarioId,
        paths_explored: u64,
        dist: Option<&Distribution<T>>,
        failure_reason: Option<String>,
        harness_error: Option<String>,
    ) -> ScenarioResult {
        let outcomes = dist
            .map(|d| {
                d.iter()
                    .map(|(value, probability)| OutcomeRow {
                        value: format!("{:?}", value),
                        probability: probability.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        
        ScenarioResult {
            scenario,
            size: self.config.size,
            passed: failure_reason.is_none(),
            paths_explored,
            total_probability: dist.map(|d| d.total()),
            outcomes,
            failure_reason,
            harness_error,
            monte_carlo: None,
        }
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

// =============================================================================
// EXPECTATIONS
// =============================================================================

fn expect_paths<T: Ord>(dist: &Distribution<T>, expected: u64) -> Result<(), String> {
    if dist.paths() != expected {
        return Err(format!("Explored {} paths, expected {}", dist.paths(), expected));
    }
    Ok(())
}

fn expect_support<T: Ord>(dist: &Distribution<T>, expected: u64) -> Result<(), String> {
    if dist.support_len() as u64 != expected {
        return Err(format!("{} distinct outcomes, expected {}", dist.support_len(), expected));
    }
    Ok(())
}

fn expect_probability<T: Ord + Debug>(
    dist: &Distribution<T>,
    value: &T,
    numer: u64,
    denom: u64,
) -> Result<(), String> {
    let expected = Probability::new(numer, denom)
        .ok_or_else(|| format!("{}/{} is not a probability", numer, denom))?;
    let actual = dist.probability_of(value);
    if actual != expected {
        return Err(format!("P({:?}) = {}, expected {}", value, actual, expected));
    }
    Ok(())
}

fn expect_uniform<T: Ord + Debug>(dist: &Distribution<T>) -> Result<(), String> {
    if !dist.is_uniform() {
        if let (Some((hi, phi)), Some((lo, plo))) = (dist.most_likely(), dist.least_likely()) {
            return Err(format!(
                "Not uniform: P({:?}) = {} but P({:?}) = {}",
                hi, phi, lo, plo
            ));
        }
        return Err("Not uniform: no outcomes".to_string());
    }
    Ok(())
}

fn expect_biased<T: Ord>(dist: &Distribution<T>) -> Result<(), String> {
    if dist.is_uniform() {
        return Err("Expected a biased distribution, got a uniform one".to_string());
    }
    Ok(())
}

/// n! if it fits in 64 bits.
fn factorial(n: u64) -> Option<u64> {
    (1..=n).try_fold(1u64, |acc, i| acc.checked_mul(i))
}

/// n choose k if it fits in 64 bits.
fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    (0..k).try_fold(1u64, |acc, i| Some(acc.checked_mul(n - i)? / (i + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_all_scenarios_pass_by_default() {
        let runner = ScenarioRunner::default();
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(
                result.passed,
                "{} failed: {:?}",
                scenario,
                result.failure_reason
            );
        }
    }
    
    #[test]
    fn test_coin_flip_result() {
        let result = ScenarioRunner::default().run(ScenarioId::CoinFlip);
        
        assert!(result.passed);
        assert_eq!(result.paths_explored, 2);
        assert_eq!(result.support(), 2);
        assert!(result.total_probability.unwrap().is_one());
        assert_eq!(result.outcomes[0].value, "0");
        assert_eq!(result.outcomes[0].probability, Probability::new(1, 2).unwrap());
        assert!(result.harness_error.is_none());
    }
    
    #[test]
    fn test_hazard_reports_harness_error() {
        let result = ScenarioRunner::default().run(ScenarioId::ReplayHazard);
        
        assert!(result.passed);
        assert_eq!(result.paths_explored, 1);
        assert!(result.total_probability.is_none());
        assert!(result
            .harness_error
            .unwrap()
            .contains("bound changed from 4 to 5"));
    }
    
    #[test]
    fn test_sizes() {
        for size in 1..=5 {
            let runner = ScenarioRunner::default().with_size(size);
            for scenario in [
                ScenarioId::ReservoirSampling,
                ScenarioId::FisherYates,
                ScenarioId::NaiveShuffle,
            ] {
                let result = runner.run(scenario);
                assert!(
                    result.passed,
                    "{} (size={}) failed: {:?}",
                    scenario,
                    size,
                    result.failure_reason
                );
            }
        }
    }
    
    #[test]
    fn test_path_budget() {
        let runner = ScenarioRunner::default().with_size(4).with_max_paths(10);
        let result = runner.run(ScenarioId::FisherYates);
        
        assert!(!result.passed);
        assert!(result
            .failure_reason
            .unwrap()
            .contains("Path budget exceeded"));
        
        let err = runner
            .enumerate(|src| scenarios::naive_shuffle(src, 4))
            .unwrap_err();
        assert_eq!(err, RunError::BudgetExceeded { max_paths: 10 });
    }
    
    #[test]
    fn test_oversized_scenario_refused_before_exploring() {
        let runner = ScenarioRunner::default().with_size(21).with_max_paths(u64::MAX);
        
        for scenario in [
            ScenarioId::FisherYates,
            ScenarioId::NaiveShuffle,
            ScenarioId::ReservoirSampling,
        ] {
            assert_eq!(
                runner.expected_counts(scenario),
                Err(RunError::SizeTooLarge { size: 21 })
            );
            
            let result = runner.run(scenario);
            assert!(!result.passed);
            assert_eq!(result.paths_explored, 0);
            assert!(result.outcomes.is_empty());
            assert!(result.harness_error.is_none());
            assert_eq!(
                result.failure_reason.as_deref(),
                Some("Scenario size 21 is too large to check")
            );
        }
        
        // Fixed-size scenarios do not depend on the size
        assert!(runner.run(ScenarioId::DiceSum).passed);
    }
    
    #[test]
    fn test_huge_size_refused_without_allocating() {
        let result = ScenarioRunner::default()
            .with_size(usize::MAX)
            .run(ScenarioId::FisherYates);
        
        assert!(!result.passed);
        assert_eq!(result.paths_explored, 0);
    }
    
    #[test]
    fn test_budget_checked_before_exploring() {
        let runner = ScenarioRunner::default().with_size(20);
        
        // 20! fits in 64 bits but is far beyond the default budget
        assert_eq!(
            runner.expected_counts(ScenarioId::FisherYates),
            Err(RunError::BudgetExceeded { max_paths: 1_000_000 })
        );
        let result = runner.run(ScenarioId::FisherYates);
        assert!(!result.passed);
        assert_eq!(result.paths_explored, 0);
    }
    
    #[test]
    fn test_expected_counts() {
        let runner = ScenarioRunner::default().with_size(5);
        
        assert_eq!(
            runner.expected_counts(ScenarioId::ReservoirSampling),
            Ok(ExpectedCounts { paths: 60, support: 10 })
        );
        assert_eq!(
            runner.expected_counts(ScenarioId::NaiveShuffle),
            Ok(ExpectedCounts { paths: 3125, support: 120 })
        );
        assert_eq!(
            runner.expected_counts(ScenarioId::ReplayHazard),
            Ok(ExpectedCounts::default())
        );
    }
    
    #[test]
    fn test_budget_is_inclusive() {
        let runner = ScenarioRunner::default().with_max_paths(36);
        let dist = runner.enumerate(|src| scenarios::dice_sum(src)).unwrap();
        assert_eq!(dist.paths(), 36);
    }
    
    #[test]
    fn test_monte_carlo_agrees() {
        let runner = ScenarioRunner::default().with_samples(20_000).with_seed(7);
        
        for scenario in [ScenarioId::DiceSum, ScenarioId::NaiveShuffle, ScenarioId::FisherYates] {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
            
            let report = result.monte_carlo.unwrap();
            assert_eq!(report.samples, 20_000);
            assert!(report.oracle_calls >= 20_000);
            assert_eq!(report.unexpected_values, 0);
            assert!(report.max_deviation <= report.tolerance);
        }
    }
    
    #[test]
    fn test_monte_carlo_flags_mismatch() {
        let runner = ScenarioRunner::default().with_samples(5_000);
        
        // Exact distribution of a fair coin vs. a coin that always lands 1
        let exact = runner.enumerate(|src| src.random_below(2)).unwrap();
        let report = runner
            .monte_carlo(|src| src.random_below(2).map(|_| 1), &exact)
            .unwrap();
        
        assert!(!report.passed);
        assert!(report.max_deviation > 0.4);
        assert_eq!(report.oracle_calls, 5_000);
    }
    
    #[test]
    fn test_counting_helpers() {
        assert_eq!(factorial(0), Some(1));
        assert_eq!(factorial(5), Some(120));
        assert_eq!(factorial(21), None);
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(4, 4), Some(1));
        assert_eq!(binomial(3, 5), Some(0));
    }
}
