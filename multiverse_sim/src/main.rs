//! Multiverse Enumeration CLI
//!
//! Explore built-in probabilistic scenarios exhaustively and check their
//! exact distributions.

use clap::Parser;
use multiverse_sim::scenarios::ScenarioId;
use multiverse_sim::{ExplorationExport, RunnerConfig, ScenarioResult, ScenarioRunner};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Multiverse deterministic enumeration CLI
#[derive(Parser, Debug)]
#[command(name = "multiverse-sim")]
#[command(about = "Enumerate every execution path of probabilistic scenarios", long_about = None)]
struct Args {
    /// Scenario to run (coin_flip, dependent_branch, dice_sum, reservoir_sampling,
    /// fisher_yates, naive_shuffle, replay_hazard, invalid_range, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,
    
    /// Number of items for sampling and shuffle scenarios
    #[arg(short = 'n', long, default_value = "4")]
    size: usize,
    
    /// Reservoir capacity for reservoir_sampling
    #[arg(short = 'k', long, default_value = "2")]
    sample_size: usize,
    
    /// Maximum number of paths to explore per scenario
    #[arg(long, default_value = "1000000")]
    max_paths: u64,
    
    /// Monte Carlo samples for the real-RNG cross-check (0 = skip)
    #[arg(long, default_value = "0")]
    samples: usize,
    
    /// Seed for the Monte Carlo RNG (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,
    
    /// Verbose output (logs every path)
    #[arg(short, long)]
    verbose: bool,
    
    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
    
    /// Export the exact distribution to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();
    
    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
    
    if !args.json {
        info!("Multiverse Enumerator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
    
    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available scenarios: {}, all",
                ScenarioId::all().iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
            );
            std::process::exit(1);
        })]
    };
    
    // Determine seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };
    
    let runner = ScenarioRunner::new(RunnerConfig {
        size: args.size,
        sample_size: args.sample_size,
        max_paths: args.max_paths,
        samples: args.samples,
        seed,
    });
    
    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }
        
        let result = runner.run(scenarios[0]);
        let export = ExplorationExport::from_result(&result);
        
        if let Err(e) = export.write_to_file(export_path) {
            error!("Failed to write export: {:?}", e);
            std::process::exit(1);
        }
        info!("Exported {} outcomes to {}", export.outcomes.len(), export_path);
        
        report(&result);
        if !result.passed {
            std::process::exit(1);
        }
        return;
    }
    
    // Run scenarios
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        let result = runner.run(*scenario);
        if !args.json {
            report(&result);
        }
        all_results.push(result);
    }
    
    // Summary
    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();
    let passed = total - failed_count;
    
    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results
                .iter()
                .map(ExplorationExport::from_result)
                .collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to render JSON summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        
        if failed_count == 0 {
            info!("✅ All {} scenarios passed!", total);
        } else {
            error!("❌ {}/{} scenarios failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} (size={}): {}",
                    result.scenario.name(),
                    result.size,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }
    
    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}

/// Logs one scenario result.
fn report(result: &ScenarioResult) {
    if result.passed {
        info!(
            "✓ {} PASSED ({} paths, {} outcomes)",
            result.scenario.name(),
            result.paths_explored,
            result.support()
        );
    } else {
        error!(
            "✗ {} FAILED: {}",
            result.scenario.name(),
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
    
    if let Some(err) = &result.harness_error {
        info!("  harness: {}", err);
    }
    for row in &result.outcomes {
        debug!("  P({}) = {} ≈ {:.6}", row.value, row.probability, row.probability.to_f64());
    }
    if let Some(mc) = &result.monte_carlo {
        info!(
            "  monte carlo: {} samples ({} oracle calls), max deviation {:.4} (tolerance {:.4})",
            mc.samples, mc.oracle_calls, mc.max_deviation, mc.tolerance
        );
    }
}
