//! Built-in computations under test.
//!
//! Each scenario is a small probabilistic algorithm written against
//! `RandomSource`, so it runs unchanged under a real RNG and under the
//! enumeration harness.

use multiverse_env::{OracleError, RandomSource};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// MV-001: One fair coin
    CoinFlip,
    
    /// MV-002: Second call only on one branch of the first
    DependentBranch,
    
    /// MV-003: Sum of two six-sided dice
    DiceSum,
    
    /// MV-004: Algorithm R reservoir sampling
    ReservoirSampling,
    
    /// MV-005: Unbiased Fisher-Yates shuffle
    FisherYates,
    
    /// MV-006: Swap-with-any-position shuffle (biased)
    NaiveShuffle,
    
    // ═══════════════════════════════════════════════════
    // HAZARD SCENARIOS - the harness must refuse these
    // ═══════════════════════════════════════════════════
    
    /// MV-007: Bound driven by external mutable state
    ReplayHazard,
    
    /// MV-008: Empty range requested
    InvalidRange,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::CoinFlip,
            ScenarioId::DependentBranch,
            ScenarioId::DiceSum,
            ScenarioId::ReservoirSampling,
            ScenarioId::FisherYates,
            ScenarioId::NaiveShuffle,
            // Hazards
            ScenarioId::ReplayHazard,
            ScenarioId::InvalidRange,
        ]
    }
    
    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::CoinFlip => "coin_flip",
            ScenarioId::DependentBranch => "dependent_branch",
            ScenarioId::DiceSum => "dice_sum",
            ScenarioId::ReservoirSampling => "reservoir_sampling",
            ScenarioId::FisherYates => "fisher_yates",
            ScenarioId::NaiveShuffle => "naive_shuffle",
            ScenarioId::ReplayHazard => "replay_hazard",
            ScenarioId::InvalidRange => "invalid_range",
        }
    }
    
    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::CoinFlip => "One fair coin: both faces at exactly 1/2",
            ScenarioId::DependentBranch => "d3, then a coin only after a 0: paths at 1/6, 1/6, 1/3, 1/3",
            ScenarioId::DiceSum => "Two d6 summed: 36 paths, P(7) = 1/6",
            ScenarioId::ReservoirSampling => "Algorithm R keeping k of N items: every subset equally likely",
            ScenarioId::FisherYates => "Fisher-Yates shuffle of N items: all N! orders equally likely",
            ScenarioId::NaiveShuffle => "swap(i, rand(N)) shuffle: N^N paths over N! orders, biased for N >= 3",
            ScenarioId::ReplayHazard => "⚠ Bound changes between replays: must fail with non-determinism",
            ScenarioId::InvalidRange => "⚠ Asks for rand(0): must fail with invalid range",
        }
    }
    
    /// Returns true if the scenario passes only when the harness rejects it.
    pub fn is_hazard(&self) -> bool {
        matches!(self, ScenarioId::ReplayHazard | ScenarioId::InvalidRange)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coin_flip" | "coinflip" | "mv-001" => Ok(ScenarioId::CoinFlip),
            "dependent_branch" | "dependentbranch" | "mv-002" => Ok(ScenarioId::DependentBranch),
            "dice_sum" | "dicesum" | "mv-003" => Ok(ScenarioId::DiceSum),
            "reservoir_sampling" | "reservoir" | "mv-004" => Ok(ScenarioId::ReservoirSampling),
            "fisher_yates" | "fisheryates" | "mv-005" => Ok(ScenarioId::FisherYates),
            "naive_shuffle" | "naiveshuffle" | "mv-006" => Ok(ScenarioId::NaiveShuffle),
            "replay_hazard" | "replayhazard" | "mv-007" => Ok(ScenarioId::ReplayHazard),
            "invalid_range" | "invalidrange" | "mv-008" => Ok(ScenarioId::InvalidRange),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

// =============================================================================
// COMPUTATIONS
// =============================================================================

/// Flips one coin, returning the face (0 or 1).
pub fn coin_flip<S: RandomSource + ?Sized>(src: &mut S) -> Result<u64, OracleError> {
    src.random_below(2)
}

/// Draws from 3 outcomes, and only after a 0 flips a coin.
///
/// Returns the answers drawn, so each path is its own value.
pub fn dependent_branch<S: RandomSource + ?Sized>(src: &mut S) -> Result<Vec<u64>, OracleError> {
    let first = src.random_below(3)?;
    if first == 0 {
        let second = src.random_below(2)?;
        return Ok(vec![first, second]);
    }
    Ok(vec![first])
}

/// Sum of two six-sided dice (2..=12).
pub fn dice_sum<S: RandomSource + ?Sized>(src: &mut S) -> Result<u64, OracleError> {
    let a = src.random_below(6)? + 1;
    let b = src.random_below(6)? + 1;
    Ok(a + b)
}

/// Algorithm R: keeps a uniform sample of `k` items from `0..n`.
///
/// The first `k` items fill the reservoir; item `i` then replaces a random
/// slot with probability `k / (i + 1)`. Returned sorted so equal samples
/// compare equal regardless of slot order.
pub fn reservoir_sample<S: RandomSource + ?Sized>(
    src: &mut S,
    n: usize,
    k: usize,
) -> Result<Vec<usize>, OracleError> {
    let mut reservoir: Vec<usize> = (0..k.min(n)).collect();
    for item in k..n {
        let slot = src.index(item + 1)?;
        if slot < k {
            reservoir[slot] = item;
        }
    }
    reservoir.sort_unstable();
    Ok(reservoir)
}

/// Fisher-Yates shuffle of `0..n`.
pub fn fisher_yates<S: RandomSource + ?Sized>(src: &mut S, n: usize) -> Result<Vec<usize>, OracleError> {
    let mut items: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = src.index(i + 1)?;
        items.swap(i, j);
    }
    Ok(items)
}

/// Swaps every position with a uniformly random position.
///
/// Looks like a shuffle, but `n^n` equally likely paths cannot spread evenly
/// over `n!` orders once `n >= 3`.
pub fn naive_shuffle<S: RandomSource + ?Sized>(src: &mut S, n: usize) -> Result<Vec<usize>, OracleError> {
    let mut items: Vec<usize> = (0..n).collect();
    for i in 0..n {
        let j = src.index(n)?;
        items.swap(i, j);
    }
    Ok(items)
}

/// Draws with a bound taken from `external` rather than from prior answers.
///
/// Each call bumps the counter, so the second run asks for a different
/// bound at the same call site.
pub fn replay_hazard<S: RandomSource + ?Sized>(
    src: &mut S,
    external: &std::cell::Cell<u64>,
) -> Result<u64, OracleError> {
    let runs = external.get() + 1;
    external.set(runs);
    src.random_below(3 + runs)
}

/// Asks for an integer in the empty range `[0, 0)`.
pub fn empty_range<S: RandomSource + ?Sized>(src: &mut S) -> Result<u64, OracleError> {
    let warmup = src.random_below(2)?;
    Ok(warmup + src.random_below(0)?)
}
