use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while computing well geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Plate dimensions or bounding box cannot be partitioned
    #[error("Invalid plate configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

/// Errors raised by a scan adapter before or instead of producing an outcome.
///
/// Driver failures are not represented here: they are normalized into a
/// `ScanOutcome` with a failure status.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// A required setting (e.g. the device scan region) was never configured
    #[error("Configuration missing: {what}")]
    ConfigurationMissing { what: String },

    /// The pre-captured image used for simulated acquisition does not exist
    #[error("File not present: {}", path.display())]
    MissingInput { path: PathBuf },

    /// The native driver faulted
    #[error("Scanner driver error: {0}")]
    Driver(String),
}

/// Errors from raster I/O.
#[derive(Debug, Clone, Error)]
pub enum RasterError {
    /// The raster file could not be opened or decoded
    #[error("Failed to load image {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// Crop rectangle exceeds the raster dimensions
    #[error(
        "Region out of bounds: {width}x{height} at ({x}, {y}), raster is {raster_width}x{raster_height}"
    )]
    OutOfBounds {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        raster_width: u32,
        raster_height: u32,
    },
}

/// Errors from decoding a single well.
///
/// None of these abort a pipeline run; they are recovered as an empty tag list.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The well rectangle does not fit the raster
    #[error("Well {label}: {source}")]
    OutOfBounds {
        label: String,
        #[source]
        source: RasterError,
    },

    /// The symbol engine reported an error
    #[error("Decode engine error: {message}")]
    Engine { message: String },

    /// The symbol engine panicked while processing a well
    #[error("Decode engine crashed on well {label}")]
    Panicked { label: String },
}

/// Run-level errors returned to the caller without a result payload.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Plate geometry or bounding box is unusable
    #[error(transparent)]
    InvalidConfiguration(#[from] GeometryError),

    /// Decode search budget is unusable
    #[error("Invalid decode options: {reason}")]
    InvalidDecodeOptions { reason: String },

    /// A required setting was not configured
    #[error("Configuration missing: {what}")]
    ConfigurationMissing { what: String },

    /// The simulated scan input is absent
    #[error("File not present: {}", path.display())]
    MissingInput { path: PathBuf },

    /// A scan adapter surfaced a driver fault instead of an outcome
    #[error("Scanner driver error: {message}")]
    ScanDriver { message: String },

    /// The background task died before publishing an outcome
    #[error("Pipeline task failed: {message}")]
    TaskFailed { message: String },
}

impl From<ScanError> for PipelineError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::ConfigurationMissing { what } => PipelineError::ConfigurationMissing { what },
            ScanError::MissingInput { path } => PipelineError::MissingInput { path },
            ScanError::Driver(message) => PipelineError::ScanDriver { message },
        }
    }
}
