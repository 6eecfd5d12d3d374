//! Partitioning of a plate bounding box into labelled well cells.
//!
//! The image grid always has `plate_type.rows` rows stacked down the
//! bounding box and `plate_type.columns` columns across it. Orientation
//! decides which grid axis carries the row letters, and the barcode
//! position decides which corner holds `A1`:
//!
//! ```text
//!   LANDSCAPE, TOP_LEFT          PORTRAIT, TOP_LEFT
//!   ┌────┬────┬────┐             ┌────┬────┬────┐
//!   │ A1 │ A2 │ A3 │             │ A1 │ B1 │ C1 │
//!   ├────┼────┼────┤             ├────┼────┼────┤
//!   │ B1 │ B2 │ B3 │             │ A2 │ B2 │ C2 │
//!   └────┴────┴────┘             └────┴────┴────┘
//! ```
//!
//! Cells are returned in label order (`A1`, `A2`, ..., `B1`, ...), which is
//! the traversal order used by the rest of the pipeline.
//!
//! Cell extents are `floor(extent / count)`; the last row and column absorb
//! whatever remains so the cells tile the box exactly.

use crate::error::GeometryError;

use super::types::{BoundingBox, PlateConfiguration, PlateOrientation, WellCell};

/// Compute the well cells of a plate.
///
/// Pure and deterministic: identical inputs give identical cells in the
/// same order.
///
/// # Errors
///
/// Returns `GeometryError::InvalidConfiguration` if the plate has zero rows
/// or columns, if the bounding box has no area, or if the box is too small
/// to give every cell at least one unit of width and height.
pub fn compute_cells(
    bbox: &BoundingBox,
    config: &PlateConfiguration,
) -> Result<Vec<WellCell>, GeometryError> {
    config.validate()?;
    bbox.validate()?;

    let grid_rows = config.plate_type.rows;
    let grid_columns = config.plate_type.columns;

    let row_spans = axis_spans(bbox.y, bbox.height, grid_rows, "height")?;
    let column_spans = axis_spans(bbox.x, bbox.width, grid_columns, "width")?;

    let (letter_count, number_count) = match config.orientation {
        PlateOrientation::Landscape => (grid_rows, grid_columns),
        PlateOrientation::Portrait => (grid_columns, grid_rows),
    };

    let from_bottom = config.barcode_position.from_bottom();
    let from_right = config.barcode_position.from_right();

    let mut cells = Vec::with_capacity(config.plate_type.well_count());
    for letter in 0..letter_count {
        for number in 0..number_count {
            let (row, column) = match config.orientation {
                PlateOrientation::Landscape => (letter, number),
                PlateOrientation::Portrait => (number, letter),
            };
            let row = if from_bottom { grid_rows - 1 - row } else { row };
            let column = if from_right {
                grid_columns - 1 - column
            } else {
                column
            };

            let (y, height) = row_spans[row as usize];
            let (x, width) = column_spans[column as usize];

            cells.push(WellCell {
                label: well_label(letter, number),
                row: letter,
                column: number,
                x,
                y,
                width,
                height,
            });
        }
    }

    Ok(cells)
}

/// Split `extent` starting at `origin` into `count` spans of `(start, length)`.
///
/// Spans are cut at the edges `origin + step * i`, with the last edge at
/// `origin + extent`, so neighbours share bit-identical edges and no span
/// ends past the next one.
fn axis_spans(
    origin: f64,
    extent: f64,
    count: u32,
    axis: &str,
) -> Result<Vec<(f64, f64)>, GeometryError> {
    let step = (extent / count as f64).floor();
    if step < 1.0 {
        return Err(GeometryError::InvalidConfiguration {
            reason: format!(
                "bounding box {} {} is too small for {} cells",
                axis, extent, count
            ),
        });
    }

    let end = origin + extent;
    let edge = |i: u32| {
        if i == count {
            end
        } else {
            origin + step * i as f64
        }
    };

    let spans = (0..count)
        .map(|i| {
            let start = edge(i);
            (start, span_length(start, edge(i + 1)))
        })
        .collect();
    Ok(spans)
}

/// Length from `start` to `end`, shortened by the rounding error (if any)
/// so that `start + length` never lands past `end`.
fn span_length(start: f64, end: f64) -> f64 {
    let mut length = end - start;
    while start + length > end {
        length = f64::from_bits(length.to_bits() - 1);
    }
    length
}

/// Label of the well at zero-based `row` and `column`, e.g. `(0, 0)` is `A1`.
pub fn well_label(row: u32, column: u32) -> String {
    format!("{}{}", row_letters(row), column + 1)
}

/// Letters for a zero-based row index: `A`..`Z`, then `AA`, `AB`, ...
pub fn row_letters(row: u32) -> String {
    let mut letters = Vec::new();
    let mut n = row as u64 + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

// =============================================================================
// Tests
// =============================================================================
