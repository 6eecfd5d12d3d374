//! Command-line and environment configuration.
//!
//! The binary has two subcommands:
//! - `decode` runs the full scan-and-decode pipeline against a pre-captured
//!   plate image and prints the result as JSON
//! - `cells` prints the well rectangles for a bounding box without scanning
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use plate_decoder::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! if let Command::Decode(config) = cli.command {
//!     config.validate()?;
//!     let scan = config.scan_parameters();
//! }
//! ```
//!
//! # Environment Variables
//!
//! Every `decode` option can be set with the `PLATE_` prefix:
//!
//! - `PLATE_IMAGE` - Pre-captured plate image (required)
//! - `PLATE_OUTPUT` - Where the scan is written (default: the image itself)
//! - `PLATE_BBOX` - Plate region in pixels as `x,y,w,h` (default: whole image)
//! - `PLATE_TYPE` - `RxC` or a standard well count (default: 96)
//! - `PLATE_ORIENTATION` - `landscape` or `portrait` (default: landscape)
//! - `PLATE_BARCODE_POSITION` - Origin corner of well A1 (default: top-left)
//! - `PLATE_DPI` - Scan resolution (default: 300)
//! - `PLATE_BRIGHTNESS`, `PLATE_CONTRAST` - Scanner adjustments (default: 0)
//! - `PLATE_SETTLE_MS` - Simulated scan delay in milliseconds (default: 500)
//! - `PLATE_SYMBOLOGY` - `datamatrix` or `qr` (default: datamatrix)
//! - `PLATE_MIN_SYMBOLS`, `PLATE_MAX_SYMBOLS` - Per-well search budget
//! - `PLATE_WORKERS` - Concurrent well decodes (default: 4)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::decode::{DecodeOptions, Symbology, DEFAULT_MAX_SYMBOLS, DEFAULT_MIN_SYMBOLS};
use crate::pipeline::DEFAULT_WORKERS;
use crate::plate::{BarcodePosition, BoundingBox, PlateConfiguration, PlateOrientation, PlateType};
use crate::scan::{ScanParameters, DEFAULT_DPI, MAX_ADJUSTMENT, MIN_ADJUSTMENT};

// =============================================================================
// Default Values
// =============================================================================

/// Default plate type.
pub const DEFAULT_PLATE_TYPE: &str = "96";

/// Default simulated scan delay in milliseconds.
pub const DEFAULT_SETTLE_MS: u64 = 500;

/// Upper bound on concurrent well decodes.
pub const MAX_WORKERS: usize = 256;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Plate Decoder - reads 2D tube barcodes from a scanned rack.
#[derive(Parser, Debug, Clone)]
#[command(name = "plate-decoder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a plate and decode every well.
    Decode(DecodeConfig),

    /// Print the well rectangles for a bounding box.
    Cells(CellsConfig),
}

/// Plate layout options shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct PlateArgs {
    /// Plate type as `RxC` or a standard well count (96, 384, 81, 100, 144).
    #[arg(long, default_value = DEFAULT_PLATE_TYPE, env = "PLATE_TYPE")]
    pub plate_type: PlateType,

    /// How the plate lies on the scanner bed.
    #[arg(long, value_enum, default_value_t, env = "PLATE_ORIENTATION")]
    pub orientation: PlateOrientation,

    /// Corner holding well A1.
    #[arg(long, value_enum, default_value_t, env = "PLATE_BARCODE_POSITION")]
    pub barcode_position: BarcodePosition,
}

impl PlateArgs {
    pub fn plate_configuration(&self) -> PlateConfiguration {
        PlateConfiguration::new(self.orientation, self.plate_type, self.barcode_position)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DecodeConfig {
    // =========================================================================
    // Acquisition
    // =========================================================================
    /// Pre-captured plate image used in place of a live scan.
    #[arg(long, env = "PLATE_IMAGE")]
    pub image: PathBuf,

    /// Where the scanned image is written. Defaults to the input image.
    #[arg(long, env = "PLATE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Scan resolution in dots per inch.
    #[arg(long, default_value_t = DEFAULT_DPI, env = "PLATE_DPI")]
    pub dpi: u32,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true, env = "PLATE_BRIGHTNESS")]
    pub brightness: i32,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true, env = "PLATE_CONTRAST")]
    pub contrast: i32,

    /// Diagnostic level forwarded to the scanner driver.
    #[arg(long, default_value_t = 0, env = "PLATE_DEBUG_LEVEL")]
    pub debug_level: u32,

    /// Delay before the simulated scan completes, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS, env = "PLATE_SETTLE_MS")]
    pub settle_ms: u64,

    // =========================================================================
    // Plate Layout
    // =========================================================================
    /// Plate region in image pixels as `x,y,width,height`.
    ///
    /// If not specified, the whole image is partitioned.
    #[arg(long, value_parser = parse_bbox, env = "PLATE_BBOX")]
    pub bbox: Option<BoundingBox>,

    #[command(flatten)]
    pub plate: PlateArgs,

    // =========================================================================
    // Decoding
    // =========================================================================
    /// Barcode symbology printed on the tubes.
    #[arg(long, value_enum, default_value_t = Symbology::DataMatrix, env = "PLATE_SYMBOLOGY")]
    pub symbology: Symbology,

    /// Minimum number of symbols to look for in each well.
    #[arg(long, default_value_t = DEFAULT_MIN_SYMBOLS, env = "PLATE_MIN_SYMBOLS")]
    pub min_symbols: usize,

    /// Maximum number of symbols to accept from each well.
    #[arg(long, default_value_t = DEFAULT_MAX_SYMBOLS, env = "PLATE_MAX_SYMBOLS")]
    pub max_symbols: usize,

    /// Number of wells decoded concurrently (1 = sequential).
    #[arg(long, default_value_t = DEFAULT_WORKERS, env = "PLATE_WORKERS")]
    pub workers: usize,

    // =========================================================================
    // Output
    // =========================================================================
    /// Pretty-print the JSON result.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl DecodeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.image.as_os_str().is_empty() {
            return Err("Plate image is required. Set --image or PLATE_IMAGE".to_string());
        }

        if self.dpi == 0 {
            return Err("dpi must be greater than 0".to_string());
        }

        let adjustments = MIN_ADJUSTMENT..=MAX_ADJUSTMENT;
        if !adjustments.contains(&self.brightness) {
            return Err(format!(
                "brightness must be between {} and {}",
                MIN_ADJUSTMENT, MAX_ADJUSTMENT
            ));
        }
        if !adjustments.contains(&self.contrast) {
            return Err(format!(
                "contrast must be between {} and {}",
                MIN_ADJUSTMENT, MAX_ADJUSTMENT
            ));
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(format!("workers must be between 1 and {}", MAX_WORKERS));
        }

        self.decode_options().validate()?;

        if let Some(bbox) = &self.bbox {
            bbox.validate().map_err(|e| e.to_string())?;
        }
        self.plate
            .plate_configuration()
            .validate()
            .map_err(|e| e.to_string())
    }

    /// Path the scan is written to.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.image.clone())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn scan_parameters(&self) -> ScanParameters {
        ScanParameters::new(self.output_path())
            .with_dpi(self.dpi)
            .with_adjustments(self.brightness, self.contrast)
            .with_debug_level(self.debug_level)
    }

    pub fn plate_configuration(&self) -> PlateConfiguration {
        self.plate.plate_configuration()
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new(self.min_symbols, self.max_symbols)
    }
}

#[derive(Args, Debug, Clone)]
pub struct CellsConfig {
    /// Plate region as `x,y,width,height`.
    #[arg(long, value_parser = parse_bbox, env = "PLATE_BBOX")]
    pub bbox: BoundingBox,

    #[command(flatten)]
    pub plate: PlateArgs,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl CellsConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.bbox.validate().map_err(|e| e.to_string())?;
        self.plate
            .plate_configuration()
            .validate()
            .map_err(|e| e.to_string())
    }

    pub fn plate_configuration(&self) -> PlateConfiguration {
        self.plate.plate_configuration()
    }
}

/// Parse a bounding box given as `x,y,width,height`.
pub fn parse_bbox(value: &str) -> Result<BoundingBox, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!(
            "expected x,y,width,height but got {} value(s) in '{}'",
            parts.len(),
            value
        ));
    }

    let mut numbers = [0.0f64; 4];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }

    let [x, y, width, height] = numbers;
    let bbox = BoundingBox::new(x, y, width, height);
    bbox.validate().map_err(|e| e.to_string())?;
    Ok(bbox)
}

// =============================================================================
// Tests
// =============================================================================
