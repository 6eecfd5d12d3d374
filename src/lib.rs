//! # Plate Decoder
//!
//! Reads the 2D barcodes on the tubes of a scanned sample plate and reports
//! which tags were found in which well.
//!
//! A run scans the plate (or replays a pre-captured image), partitions the
//! plate's bounding box into one rectangle per well, decodes every well
//! independently and aggregates the tags into a single result keyed by well
//! label (`A1`, `B12`, ...).
//!
//! ## Features
//!
//! - **Deterministic geometry**: any `R x C` plate, both orientations, any
//!   origin corner
//! - **Fault isolation**: a crashing or out-of-bounds well is recorded as
//!   empty and never aborts the run
//! - **Concurrent decoding**: wells are decoded on a bounded worker pool
//!   without changing the result order
//! - **Cancellable runs**: every run is a background task with an observable
//!   state and a cancellation handle
//!
//! ## Architecture
//!
//! - [`plate`] - Plate data model and the well geometry engine
//! - [`scan`] - Image acquisition from a device or a pre-captured file
//! - [`decode`] - Raster I/O and per-well symbol decoding
//! - [`pipeline`] - The run state machine and result aggregation
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plate_decoder::{
//!     DataMatrixDecoder, DecodeOptions, PlateConfiguration, PlateDecoder, ScanParameters, Scanner,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), plate_decoder::PipelineError> {
//!     let decoder = PlateDecoder::new(
//!         Scanner::simulated("plate.png"),
//!         Arc::new(DataMatrixDecoder::new()),
//!     );
//!
//!     let handle = decoder.submit(
//!         ScanParameters::new("plate.png"),
//!         None,
//!         PlateConfiguration::default(),
//!         DecodeOptions::default(),
//!     );
//!
//!     if let Some(result) = handle.wait().await?.into_result() {
//!         println!("{}: {} tag(s)", result.message(), result.tag_count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod pipeline;
pub mod plate;
pub mod scan;

// Re-export commonly used types
pub use config::{CellsConfig, Cli, Command, DecodeConfig, PlateArgs};
pub use decode::{
    crop_region, DataMatrixDecoder, DecodeAdapter, DecodeOptions, DecodedTag, ImageFileLoader,
    QrSymbolDecoder, Raster, RasterLoader, Symbol, SymbolDecoder, Symbology,
};
pub use error::{DecodeError, GeometryError, PipelineError, RasterError, ScanError};
pub use pipeline::{
    aggregate, PipelineHandle, PipelineOutcome, PipelineResult, PipelineState, PipelineTask,
    PlateDecoder,
};
pub use plate::{
    compute_cells, well_label, BarcodePosition, BoundingBox, PlateConfiguration,
    PlateOrientation, PlateType, WellCell,
};
pub use scan::{
    DeviceScanner, NativeScanResult, ScanAdapter, ScanCapability, ScanOutcome, ScanParameters,
    ScanResultCode, Scanner, SimulatedScanner, Status,
};
