//! Execution path - the explicit stack of decision nodes.
//!
//! The enumeration tree is never materialized. Only the path from the root
//! to the current position is kept, as a `Vec` of decision nodes. Each replay
//! walks this stack with a depth cursor; fresh positions push new nodes, and
//! backtracking pops exhausted ones, so memory is reclaimed as subtrees
//! finish.
//!
//! ```text
//!  depth:     0          1          2
//!          ┌──────┐   ┌──────┐   ┌──────┐
//!  stack:  │ 1 /3 │──►│ 0 /2 │──►│ 4 /5 │   choice / bound
//!          └──────┘   └──────┘   └──────┘
//!                                   ▲
//!                         advance() increments here first
//! ```

use crate::probability::Probability;
use multiverse_env::OracleError;
use num_bigint::BigUint;
use num_traits::One;
use tracing::trace;

/// One oracle call site on the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionNode {
    /// Bound recorded the first time a replay reached this position
    pub bound: u64,
    
    /// Answer handed to the computation on the current path
    pub choice: u64,
}

impl DecisionNode {
    /// Creates a node at its first outcome.
    pub fn new(bound: u64) -> Self {
        Self { bound, choice: 0 }
    }
    
    /// Returns true if the current choice is the last outcome.
    pub fn is_exhausted(&self) -> bool {
        self.choice + 1 >= self.bound
    }
}

/// The current path from the root of the exploration.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPath {
    /// Decision nodes, root first
    nodes: Vec<DecisionNode>,
}

impl ExecutionPath {
    /// Creates an empty path positioned at the root.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Handles an oracle call at `depth` during a replay.
    ///
    /// A fresh position creates a node answering `0`. A recorded position
    /// must be asked for the same bound, and answers with the node's current
    /// choice.
    pub fn visit(&mut self, depth: usize, bound: u64) -> Result<u64, OracleError> {
        if bound == 0 {
            return Err(OracleError::invalid_range(bound));
        }
        
        match self.nodes.get(depth) {
            Some(node) if node.bound != bound => {
                Err(OracleError::bound_changed(depth, node.bound, bound))
            }
            Some(node) => Ok(node.choice),
            None => {
                // Replays are sequential, so a fresh node always extends the top.
                debug_assert_eq!(depth, self.nodes.len());
                self.nodes.push(DecisionNode::new(bound));
                Ok(0)
            }
        }
    }
    
    /// Marks the end of a replay at `depth` (the leaf).
    ///
    /// Every recorded node must have been reached again.
    pub fn finish(&self, depth: usize) -> Result<(), OracleError> {
        if depth < self.nodes.len() {
            return Err(OracleError::terminated_early(depth, self.nodes.len()));
        }
        Ok(())
    }
    
    /// Moves to the next unexplored path in lexicographic order.
    ///
    /// Pops every exhausted node from the top, then increments the deepest
    /// remaining one. Returns `false` once the stack is empty, meaning every
    /// path has been explored.
    pub fn advance(&mut self) -> bool {
        while let Some(top) = self.nodes.last_mut() {
            if !top.is_exhausted() {
                top.choice += 1;
                return true;
            }
            let bound = top.bound;
            self.nodes.pop();
            trace!("Pruned exhausted node (bound={}) at depth {}", bound, self.nodes.len());
        }
        false
    }
    
    /// Product of every bound on the path.
    pub fn weight(&self) -> BigUint {
        self.nodes
            .iter()
            .fold(BigUint::one(), |acc, node| acc * BigUint::from(node.bound))
    }
    
    /// Exact probability of the current path: `1 / product of bounds`.
    pub fn probability(&self) -> Probability {
        // Bounds are never zero, so the weight is at least one.
        Probability::reciprocal(&self.weight()).unwrap_or_else(Probability::zero)
    }
    
    /// Answers along the current path, root first.
    pub fn choices(&self) -> Vec<u64> {
        self.nodes.iter().map(|node| node.choice).collect()
    }
    
    /// Number of decision nodes currently held.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    
    /// Returns true if no decision node is held.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
