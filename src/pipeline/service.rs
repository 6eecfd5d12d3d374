//! Caller-facing entry point.

use std::sync::Arc;

use crate::decode::{DecodeAdapter, DecodeOptions, ImageFileLoader, RasterLoader, SymbolDecoder};
use crate::plate::{BoundingBox, PlateConfiguration};
use crate::scan::{ScanAdapter, ScanParameters};

use super::task::{PipelineHandle, PipelineTask};

/// Default number of wells decoded in parallel.
pub const DEFAULT_WORKERS: usize = 4;

/// Builds and launches pipeline runs against one scanner and one symbol engine.
///
/// # Example
///
/// ```ignore
/// use plate_decoder::{DataMatrixDecoder, PlateDecoder, Scanner, ScanParameters};
///
/// let decoder = PlateDecoder::new(Scanner::simulated("plate.png"), Arc::new(DataMatrixDecoder::new()));
///
/// let handle = decoder.submit(
///     ScanParameters::new("plate.png"),
///     None,
///     PlateConfiguration::default(),
///     DecodeOptions::default(),
/// );
///
/// if let PipelineOutcome::Completed(result) = handle.wait().await? {
///     println!("{} tags", result.tag_count());
/// }
/// ```
pub struct PlateDecoder<S: ScanAdapter> {
    scanner: Arc<S>,
    decoder: DecodeAdapter,
    loader: Arc<dyn RasterLoader>,
    workers: usize,
}

impl<S: ScanAdapter + 'static> PlateDecoder<S> {
    /// Create a decoder that reads scans from disk and decodes
    /// [`DEFAULT_WORKERS`] wells at a time.
    pub fn new(scanner: S, decoder: Arc<dyn SymbolDecoder>) -> Self {
        Self {
            scanner: Arc::new(scanner),
            decoder: DecodeAdapter::new(decoder),
            loader: Arc::new(ImageFileLoader::new()),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Replace the raster loader.
    pub fn with_loader(mut self, loader: Arc<dyn RasterLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Set the number of concurrent well decodes; 1 decodes sequentially.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn scanner(&self) -> &Arc<S> {
        &self.scanner
    }

    /// Build a task without starting it.
    pub fn task(
        &self,
        scan: ScanParameters,
        bbox: Option<BoundingBox>,
        plate: PlateConfiguration,
        options: DecodeOptions,
    ) -> PipelineTask<S> {
        PipelineTask::new(
            Arc::clone(&self.scanner),
            self.decoder.clone(),
            Arc::clone(&self.loader),
            self.workers,
            scan,
            bbox,
            plate,
            options,
        )
    }

    /// Start a run in the background.
    ///
    /// `bbox` locates the plate in raster pixels; `None` uses the whole image.
    /// Must be called from within a Tokio runtime.
    pub fn submit(
        &self,
        scan: ScanParameters,
        bbox: Option<BoundingBox>,
        plate: PlateConfiguration,
        options: DecodeOptions,
    ) -> PipelineHandle {
        self.task(scan, bbox, plate, options).start()
    }
}
