//! Plate model and well geometry.
//!
//! This module describes a multi-well plate as it appears in a scanned image
//! and partitions the plate's bounding box into one [`WellCell`] per well.
//!
//! # Example
//!
//! ```
//! use plate_decoder::plate::{
//!     compute_cells, BarcodePosition, BoundingBox, PlateConfiguration, PlateOrientation,
//!     PlateType,
//! };
//!
//! let bbox = BoundingBox::new(0.0, 0.0, 96.0, 64.0);
//! let config = PlateConfiguration::new(
//!     PlateOrientation::Landscape,
//!     PlateType::PT_96,
//!     BarcodePosition::TopLeft,
//! );
//!
//! let cells = compute_cells(&bbox, &config).unwrap();
//! assert_eq!(cells.len(), 96);
//! assert_eq!(cells[0].label, "A1");
//! assert_eq!(cells[95].label, "H12");
//! ```

mod geometry;
mod types;

pub use geometry::{compute_cells, row_letters, well_label};
pub use types::{
    BarcodePosition, BoundingBox, PlateConfiguration, PlateOrientation, PlateType, WellCell,
};
