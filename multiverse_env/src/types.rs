//! Common types for the Multiverse oracle abstraction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a replay departed from the path it was supposed to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Divergence {
    /// The call site asked for a different bound than last time
    BoundChanged {
        recorded: u64,
        observed: u64,
    },
    
    /// The computation finished before reaching a recorded call site
    TerminatedEarly {
        recorded_depth: usize,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Divergence::BoundChanged { recorded, observed } => {
                write!(f, "bound changed from {} to {}", recorded, observed)
            }
            Divergence::TerminatedEarly { recorded_depth } => {
                write!(f, "computation terminated early, path records {} calls", recorded_depth)
            }
        }
    }
}
