//! bft-analyzer - Locomotive brake feel test and retardation analyzer
//!
//! Reads one SPM data-logger export, reports the brake feel tests found
//! before the first real halt, and optionally rates the emergency braking
//! before each halt.
//!
//! # Usage
//!
//! ```bash
//! # Brake feel report only
//! bft-analyzer runs/12951_up.csv
//!
//! # Retardation for known halts (cumulative metres)
//! bft-analyzer runs/12951_up.csv --halt 36473 --halt 81210
//!
//! # Retardation for every standstill in the run, as JSON
//! bft-analyzer runs/12951_up.csv --scan-halts --json
//! ```
//!
//! # Environment Variables
//!
//! - `BFT_CONFIG`: Path to a detection config TOML (same as `--config`)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use bft_analyzer::config::DetectionConfig;
use bft_analyzer::spm::{SpmCsv, SpmRunInfo};
use bft_analyzer::types::{BrakeFeelReport, Halt};
use bft_analyzer::{BrakeFeelAnalyzer, HaltAnalysis, HaltOutcome, RetardationAnalyzer};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "bft-analyzer")]
#[command(about = "Locomotive brake feel test and emergency braking retardation analyzer")]
#[command(version)]
struct CliArgs {
    /// SPM CSV export to analyze
    csv: PathBuf,

    /// Detection config TOML (default: ./bft_config.toml, then built-in)
    #[arg(long, env = "BFT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Halt position in cumulative metres; repeat for several halts
    #[arg(long = "halt", value_name = "METRES")]
    halts: Vec<f64>,

    /// Rate braking before every standstill found in the run
    #[arg(long, conflicts_with = "halts")]
    scan_halts: bool,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Everything the CLI prints, in one serializable record.
#[derive(Debug, Serialize)]
struct CliOutput {
    run: SpmRunInfo,
    boundary: usize,
    report: BrakeFeelReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    halts: Vec<HaltAnalysis>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => DetectionConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DetectionConfig::load(),
    };
    info!(run = %config.run.name, loco = %config.run.loco_id, "Detection config ready");

    let run = SpmCsv::load(&args.csv)
        .with_context(|| format!("Failed to load SPM export {}", args.csv.display()))?;

    let analysis = BrakeFeelAnalyzer::new(config.clone()).analyze(&run.columns);

    let retardation = RetardationAnalyzer::new(&config);
    let halts = if args.scan_halts {
        retardation.analyze_run(&run.columns, None)
    } else if args.halts.is_empty() {
        Vec::new()
    } else {
        let requested: Vec<Halt> = args.halts.iter().copied().map(Halt::at).collect();
        retardation.analyze_run(&run.columns, Some(requested.as_slice()))
    };

    let output = CliOutput {
        run: run.info,
        boundary: analysis.boundary,
        report: analysis.report,
        halts,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{json}");
    } else {
        print_text(&output);
    }
    Ok(())
}

// ============================================================================
// Text Output
// ============================================================================

fn print_text(output: &CliOutput) {
    let summary = &output.report.summary;
    println!("Source:      {}", output.run.source_path);
    println!("Rows:        {} ({})", output.run.row_count, output.run.columns_found);
    println!("Scanned:     rows 0..{} ({} clean samples)", output.boundary, summary.data_points);
    println!();
    println!("Brake feel tests: {}", summary.total_tests);

    for test in &output.report.tests {
        println!(
            "  #{:<2} t={:>7.1}s  start {:>5.1}  max {:>5.1}  lowest {:>5.1}  drop {:>5.1} km/h  {:>5.1}s  recovery {}",
            test.test_number,
            test.start.time_offset_s,
            test.start_speed,
            test.max_speed,
            test.lowest_speed,
            test.speed_drop,
            test.total_duration_s,
            test.recovery_kind,
        );
    }

    if summary.total_tests > 0 {
        println!(
            "  avg drop {:.2} km/h | avg max {:.2} km/h | avg duration {:.2} s",
            summary.average_speed_drop, summary.average_max_speed, summary.average_test_duration
        );
    }
    for recommendation in &output.report.recommendations {
        println!("  - {recommendation}");
    }

    if output.halts.is_empty() {
        return;
    }

    println!();
    println!("Emergency braking:");
    for analysis in &output.halts {
        let halt_m = analysis.halt.cumulative_distance_m;
        match &analysis.outcome {
            HaltOutcome::Resolved { braking, retardation } => println!(
                "  halt {halt_m:>10.1} m  onset {:>10.1} m @ {:>5.1} km/h  {:>6.1} m / {:>5.1} s  avg {:.3} m/s²  kinematic {:.3} m/s²",
                braking.retardation_start.cumulative_distance_m,
                braking.initial_speed_kmh,
                braking.deceleration_distance_m,
                braking.deceleration_duration_s,
                retardation.avg_retardation_ms2,
                retardation.kinematic_retardation_ms2,
            ),
            HaltOutcome::Unresolved { miss } => println!("  halt {halt_m:>10.1} m  not rated: {miss}"),
            HaltOutcome::ComputationFailed { error, .. } => {
                println!("  halt {halt_m:>10.1} m  computation failed: {error}");
            }
        }
    }
}
