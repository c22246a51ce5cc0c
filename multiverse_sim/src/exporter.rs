//! JSON exporter for exploration results.
//!
//! Exports a scenario's exact distribution as JSON, for diffing between
//! runs or plotting outside the harness.

use crate::probability::Probability;
use crate::runner::{MonteCarloReport, ScenarioResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single value of the distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRow {
    /// Debug rendering of the value
    pub value: String,
    
    /// Exact probability, as "numer/denom"
    pub probability: Probability,
    
    /// Floating point approximation
    pub approx: f64,
}

/// Complete exploration export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationExport {
    /// Scenario name
    pub scenario: String,
    
    /// Scenario size
    pub size: usize,
    
    /// Paths explored
    pub paths: u64,
    
    /// Whether the scenario passed
    pub passed: bool,
    
    /// Exact total probability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_probability: Option<Probability>,
    
    /// Distribution in value order
    pub outcomes: Vec<ExportRow>,
    
    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    
    /// Error the harness raised, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harness_error: Option<String>,
    
    /// Monte Carlo cross-check if one ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<MonteCarloReport>,
}

impl ExplorationExport {
    /// Creates an export from a scenario result.
    pub fn from_result(result: &ScenarioResult) -> Self {
        let outcomes = result
            .outcomes
            .iter()
            .map(|row| ExportRow {
                value: row.value.clone(),
                approx: row.probability.to_f64(),
                probability: row.probability.clone(),
            })
            .collect();
        
        Self {
            scenario: result.scenario.name().to_string(),
            size: result.size,
            paths: result.paths_explored,
            passed: result.passed,
            total_probability: result.total_probability.clone(),
            outcomes,
            failure_reason: result.failure_reason.clone(),
            harness_error: result.harness_error.clone(),
            monte_carlo: result.monte_carlo.clone(),
        }
    }
    
    /// Renders as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
