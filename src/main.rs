//! Plate Decoder - reads tube barcodes from a scanned plate.
//!
//! This binary runs the decode pipeline against a pre-captured image or
//! prints the well layout for a bounding box.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plate_decoder::{
    compute_cells,
    config::{CellsConfig, Cli, Command, DecodeConfig},
    PipelineOutcome, PlateDecoder, Scanner, SimulatedScanner,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Decode(config) => run_decode(config).await,
        Command::Cells(config) => run_cells(config),
    }
}

// =============================================================================
// Decode Command
// =============================================================================

async fn run_decode(config: DecodeConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let plate = config.plate_configuration();

    info!("Configuration:");
    info!("  Image: {}", config.image.display());
    info!("  Output: {}", config.output_path().display());
    info!(
        "  Plate: {} ({:?}, A1 at {:?})",
        plate.plate_type, plate.orientation, plate.barcode_position
    );
    match &config.bbox {
        Some(bbox) => info!(
            "  Bounding box: {}x{} at ({}, {})",
            bbox.width, bbox.height, bbox.x, bbox.y
        ),
        None => info!("  Bounding box: whole image"),
    }
    info!(
        "  Decode: {:?}, {}..={} symbol(s) per well, {} worker(s)",
        config.symbology, config.min_symbols, config.max_symbols, config.workers
    );

    let scanner = Scanner::Simulated(
        SimulatedScanner::new(&config.image).with_settle_delay(config.settle_delay()),
    );
    let decoder =
        PlateDecoder::new(scanner, config.symbology.decoder()).with_workers(config.workers);

    let handle = decoder.submit(
        config.scan_parameters(),
        config.bbox,
        plate,
        config.decode_options(),
    );
    let token = handle.cancellation_token();

    let wait = handle.wait();
    tokio::pin!(wait);
    let outcome = tokio::select! {
        outcome = &mut wait => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling run");
            token.cancel();
            wait.await
        }
    };

    match outcome {
        Ok(PipelineOutcome::Completed(result)) => {
            if let Err(e) = print_json(&result, config.pretty) {
                error!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
            if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Ok(PipelineOutcome::Cancelled) => {
            warn!("Run cancelled before completion");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Cells Command
// =============================================================================

fn run_cells(config: CellsConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let cells = match compute_cells(&config.bbox, &config.plate_configuration()) {
        Ok(cells) => cells,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = print_json(&cells, config.pretty) {
        error!("Failed to serialize cells: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// =============================================================================
// Helpers
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), serde_json::Error> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so stdout carries only the JSON output.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "plate_decoder=debug"
    } else {
        "plate_decoder=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
