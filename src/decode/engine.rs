//! Symbol recognition engines.
//!
//! Tube racks carry DataMatrix codes, so [`DataMatrixDecoder`] is the
//! default engine. [`QrSymbolDecoder`] handles racks labelled with QR codes.

use std::sync::Arc;

use rxing::BarcodeFormat;
use tracing::debug;

use crate::error::DecodeError;

use super::raster::Raster;

/// One symbol found in a raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Decoded payload
    pub id: String,
}

impl Symbol {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A 2D barcode recognition engine.
///
/// `min_count` is the number of symbols the caller expects; `max_count`
/// bounds the search. Finding nothing is `Ok(vec![])`, not an error.
pub trait SymbolDecoder: Send + Sync {
    fn find_symbols(
        &self,
        region: &Raster,
        min_count: usize,
        max_count: usize,
    ) -> Result<Vec<Symbol>, DecodeError>;
}

/// Built-in engines selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Symbology {
    #[default]
    #[value(name = "datamatrix")]
    DataMatrix,
    Qr,
}

impl Symbology {
    /// A fresh engine for this symbology.
    pub fn decoder(&self) -> Arc<dyn SymbolDecoder> {
        match self {
            Symbology::DataMatrix => Arc::new(DataMatrixDecoder::new()),
            Symbology::Qr => Arc::new(QrSymbolDecoder::new()),
        }
    }
}

// =============================================================================
// DataMatrix
// =============================================================================

/// DataMatrix engine.
///
/// Reads at most one symbol per region, which matches one tube per well.
#[derive(Debug, Clone, Default)]
pub struct DataMatrixDecoder;

impl DataMatrixDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for DataMatrixDecoder {
    fn find_symbols(
        &self,
        region: &Raster,
        min_count: usize,
        max_count: usize,
    ) -> Result<Vec<Symbol>, DecodeError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let luma = region.to_luma8();
        let (width, height) = luma.dimensions();

        let symbols = match rxing::helpers::detect_in_luma(
            luma.into_raw(),
            width,
            height,
            Some(BarcodeFormat::DATA_MATRIX),
        ) {
            Ok(found) => vec![Symbol::new(found.getText())],
            // not-found, checksum and format failures all mean an unreadable well
            Err(e) => {
                debug!("No DataMatrix symbol in {}x{} region: {}", width, height, e);
                Vec::new()
            }
        };

        if symbols.len() < min_count {
            debug!(
                "Found {} symbol(s), expected at least {}",
                symbols.len(),
                min_count
            );
        }
        Ok(symbols)
    }
}

// =============================================================================
// QR
// =============================================================================

/// QR code engine.
#[derive(Debug, Clone, Default)]
pub struct QrSymbolDecoder;

impl QrSymbolDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrSymbolDecoder {
    fn find_symbols(
        &self,
        region: &Raster,
        min_count: usize,
        max_count: usize,
    ) -> Result<Vec<Symbol>, DecodeError> {
        let luma = region.to_luma8();
        let (width, height) = (luma.width() as usize, luma.height() as usize);

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });

        let mut symbols = Vec::new();
        for grid in prepared.detect_grids() {
            if symbols.len() >= max_count {
                break;
            }
            match grid.decode() {
                Ok((_, content)) => symbols.push(Symbol::new(content)),
                Err(e) => debug!("Skipping unreadable grid: {:?}", e),
            }
        }

        if symbols.len() < min_count {
            debug!(
                "Found {} symbol(s), expected at least {}",
                symbols.len(),
                min_count
            );
        }
        Ok(symbols)
    }
}
