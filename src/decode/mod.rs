//! Per-well symbol decoding.
//!
//! The decode layer sits between the pipeline and the external recognition
//! engine:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Pipeline Task              │
//! └────────────────────┬────────────────────┘
//!                      │ one call per well
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             DecodeAdapter               │
//! │  crop_region() → SymbolDecoder          │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │      SymbolDecoder (DataMatrix, QR)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`DecodeAdapter`]: crops a [`WellCell`](crate::plate::WellCell) and collects its tags
//! - [`SymbolDecoder`]: the recognition engine seam
//! - [`DataMatrixDecoder`]: built-in DataMatrix engine, the default
//! - [`QrSymbolDecoder`]: built-in QR engine
//! - [`Symbology`]: picks one of the built-in engines
//! - [`RasterLoader`] / [`ImageFileLoader`]: read plate images from disk
//! - [`crop_region`]: bounds-checked crop

mod adapter;
mod engine;
mod raster;

pub use adapter::{
    DecodeAdapter, DecodeOptions, DecodedTag, DEFAULT_MAX_SYMBOLS, DEFAULT_MIN_SYMBOLS,
};
pub use engine::{DataMatrixDecoder, QrSymbolDecoder, Symbol, SymbolDecoder, Symbology};
pub use raster::{crop_region, ImageFileLoader, Raster, RasterLoader};
