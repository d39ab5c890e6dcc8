//! # Frame Metrics - Main Entry Point
//!
//! Command-line front end of the frame-size comparison pipeline.
//!
//! ## Flow
//!
//! 1. **Parse arguments**: setup, connection type, input layout and chart settings
//! 2. **Initialize logging**: colorized console output, or the standard
//!    formatter with `--verbose`
//! 3. **Run the analysis**: load every configuration, bin each metric, parse
//!    the summary log
//! 4. **Report**: print the summary table and write the chart dataset for the
//!    renderer
//!
//! Any missing or corrupt log aborts the run with a non-zero exit status; no
//! partial dataset is written.

use anyhow::Result;
use clap::Parser;
use frame_metrics::{
    analysis::{AnalysisConfig, AnalysisRunner},
    cli::Args,
    logging::init_logging,
    results::{ChartDataset, ResultsManager},
    utils::{format_millis, print_table_row, print_table_separator},
};
use tracing::{error, info};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("Starting Frame Metrics v{}", frame_metrics::VERSION);

    let config = AnalysisConfig::from_args(&args)?;
    let results_manager = ResultsManager::new(&args.output_file)?;
    let runner = AnalysisRunner::new(config);

    let dataset = match runner.run() {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            return Err(e);
        }
    };

    print_summary_table(&dataset);
    print_computed_summaries(&dataset);

    results_manager.write(&dataset)?;
    info!("Frame Metrics completed successfully");
    Ok(())
}

/// Print the parsed summary log as a console table
fn print_summary_table(dataset: &ChartDataset) {
    let Some(table) = &dataset.summary_table else {
        return;
    };
    if table.rows.is_empty() {
        return;
    }

    let widths: Vec<usize> = table.column_labels.iter().map(|l| l.len().max(8)).collect();
    let headers: Vec<&str> = table.column_labels.iter().map(String::as_str).collect();

    println!();
    println!("{}", table.title.replace('\n', " "));
    if !dataset.metadata.subtitle.is_empty() {
        println!("{}", table.subtitle);
    }
    print_table_separator(&widths);
    print_table_row(&headers, &widths);
    print_table_separator(&widths);
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        print_table_row(&cells, &widths);
    }
    print_table_separator(&widths);
}

/// Print per-configuration averages computed from the raw logs
fn print_computed_summaries(dataset: &ChartDataset) {
    for entry in &dataset.computed_summaries {
        match &entry.summary {
            Some(summary) => info!(
                "{}: RTT {}, inter-arrival {}, jitter {}, lost {:.2}%",
                entry.label,
                format_millis(summary.avg_rtt_ms),
                format_millis(summary.avg_inter_arrival_ms),
                format_millis(summary.jitter_ms),
                summary.lost_pct.unwrap_or(0.0)
            ),
            None => info!("{}: no packets or inter-arrival times logged", entry.label),
        }
    }
}
