use std::sync::Arc;

use tracing::{info, warn};

use crate::error::DecodeError;
use crate::plate::WellCell;

use super::engine::SymbolDecoder;
use super::raster::{crop_region, Raster};

/// Default minimum number of symbols expected per well.
pub const DEFAULT_MIN_SYMBOLS: usize = 1;

/// Default upper bound on symbols searched for per well.
pub const DEFAULT_MAX_SYMBOLS: usize = 10_000;

// =============================================================================
// Decode Options
// =============================================================================

/// Search budget handed to the symbol engine for every well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub min_symbols: usize,
    pub max_symbols: usize,
}

impl DecodeOptions {
    pub fn new(min_symbols: usize, max_symbols: usize) -> Self {
        Self {
            min_symbols,
            max_symbols,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_symbols == 0 {
            return Err("max_symbols must be greater than 0".to_string());
        }
        if self.min_symbols > self.max_symbols {
            return Err(format!(
                "min_symbols ({}) must not exceed max_symbols ({})",
                self.min_symbols, self.max_symbols
            ));
        }
        Ok(())
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SYMBOLS, DEFAULT_MAX_SYMBOLS)
    }
}

/// A value decoded from one well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTag {
    pub well_label: String,
    pub value: String,
}

// =============================================================================
// Decode Adapter
// =============================================================================

/// Crops well cells out of a plate raster and runs the symbol engine on them.
#[derive(Clone)]
pub struct DecodeAdapter {
    decoder: Arc<dyn SymbolDecoder>,
}

impl std::fmt::Debug for DecodeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeAdapter").finish_non_exhaustive()
    }
}

impl DecodeAdapter {
    pub fn new(decoder: Arc<dyn SymbolDecoder>) -> Self {
        Self { decoder }
    }

    /// Decode the symbols inside one well.
    ///
    /// An empty well yields `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// - `DecodeError::OutOfBounds` if the cell does not fit the raster
    /// - whatever the engine reports
    pub fn decode_cell(
        &self,
        raster: &Raster,
        cell: &WellCell,
        options: &DecodeOptions,
    ) -> Result<Vec<DecodedTag>, DecodeError> {
        let crop = crop_region(raster, cell.x, cell.y, cell.width, cell.height).map_err(
            |source| DecodeError::OutOfBounds {
                label: cell.label.clone(),
                source,
            },
        )?;

        let symbols =
            self.decoder
                .find_symbols(&crop, options.min_symbols, options.max_symbols)?;

        info!("cell: {}, tags: {}", cell.label, symbols.len());

        Ok(symbols
            .into_iter()
            .map(|symbol| DecodedTag {
                well_label: cell.label.clone(),
                value: symbol.id,
            })
            .collect())
    }

    /// Decode one well on the blocking pool, turning every fault into an
    /// empty result.
    ///
    /// Engine errors, out-of-bounds cells and engine panics are logged and
    /// yield no tags; they never propagate.
    pub async fn decode_cell_isolated(
        &self,
        raster: Arc<Raster>,
        cell: WellCell,
        options: DecodeOptions,
    ) -> Vec<DecodedTag> {
        let adapter = self.clone();
        let label = cell.label.clone();

        let joined =
            tokio::task::spawn_blocking(move || adapter.decode_cell(&raster, &cell, &options))
                .await;

        let result = joined.unwrap_or_else(|_| Err(DecodeError::Panicked { label }));
        match result {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Skipping well after decode fault: {}", e);
                Vec::new()
            }
        }
    }
}
