use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::GeometryError;

// =============================================================================
// Bounding Box
// =============================================================================

/// Region of the source raster that contains the full plate grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check that the box has a finite, positive extent.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(GeometryError::InvalidConfiguration {
                reason: "bounding box coordinates must be finite".to_string(),
            });
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GeometryError::InvalidConfiguration {
                reason: format!(
                    "bounding box must have positive size, got {}x{}",
                    self.width, self.height
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Plate Type
// =============================================================================

/// Number of well rows and columns on a plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlateType {
    pub rows: u32,
    pub columns: u32,
}

impl PlateType {
    /// 96 wells, 8 rows by 12 columns.
    pub const PT_96: PlateType = PlateType::new(8, 12);
    /// 384 wells, 16 rows by 24 columns.
    pub const PT_384: PlateType = PlateType::new(16, 24);
    /// 81 wells, 9 rows by 9 columns.
    pub const PT_81: PlateType = PlateType::new(9, 9);
    /// 100 wells, 10 rows by 10 columns.
    pub const PT_100: PlateType = PlateType::new(10, 10);
    /// 144 wells, 12 rows by 12 columns.
    pub const PT_144: PlateType = PlateType::new(12, 12);

    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Total number of wells.
    pub fn well_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

impl Default for PlateType {
    fn default() -> Self {
        Self::PT_96
    }
}

impl fmt::Display for PlateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// Parses either a well count of a standard plate (`"96"`) or `"<rows>x<columns>"`.
impl FromStr for PlateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "96" => return Ok(Self::PT_96),
            "384" => return Ok(Self::PT_384),
            "81" => return Ok(Self::PT_81),
            "100" => return Ok(Self::PT_100),
            "144" => return Ok(Self::PT_144),
            _ => {}
        }

        let (rows, columns) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("invalid plate type '{}': expected RxC or 96/384/81/100/144", s))?;
        let rows = rows
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid row count '{}': {}", rows, e))?;
        let columns = columns
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid column count '{}': {}", columns, e))?;
        Ok(Self::new(rows, columns))
    }
}

// =============================================================================
// Orientation & Barcode Position
// =============================================================================

/// How the plate lies on the scanner bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlateOrientation {
    /// Letters run down the image, numbers run across
    #[default]
    Landscape,
    /// Letters run across the image, numbers run down
    Portrait,
}

/// The corner of the image where well `A1` sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodePosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl BarcodePosition {
    /// Whether label indices grow from the bottom edge upwards.
    pub fn from_bottom(&self) -> bool {
        matches!(self, BarcodePosition::BottomLeft | BarcodePosition::BottomRight)
    }

    /// Whether label indices grow from the right edge leftwards.
    pub fn from_right(&self) -> bool {
        matches!(self, BarcodePosition::TopRight | BarcodePosition::BottomRight)
    }
}

// =============================================================================
// Plate Configuration
// =============================================================================

/// Geometry settings for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlateConfiguration {
    pub orientation: PlateOrientation,
    pub plate_type: PlateType,
    pub barcode_position: BarcodePosition,
}

impl PlateConfiguration {
    pub fn new(
        orientation: PlateOrientation,
        plate_type: PlateType,
        barcode_position: BarcodePosition,
    ) -> Self {
        Self {
            orientation,
            plate_type,
            barcode_position,
        }
    }

    /// Reject plates without any rows or columns.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.plate_type.rows == 0 || self.plate_type.columns == 0 {
            return Err(GeometryError::InvalidConfiguration {
                reason: format!(
                    "plate type must have at least one row and column, got {}",
                    self.plate_type
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Well Cell
// =============================================================================

/// The rectangle of one well inside the bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellCell {
    /// Well label such as `A1`
    pub label: String,

    /// Zero-based label row (the letter)
    pub row: u32,

    /// Zero-based label column (the number minus one)
    pub column: u32,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WellCell {
    /// Whether this cell lies fully inside `bbox`.
    pub fn is_within(&self, bbox: &BoundingBox) -> bool {
        self.x >= bbox.x
            && self.y >= bbox.y
            && self.x + self.width <= bbox.right()
            && self.y + self.height <= bbox.bottom()
    }

    /// Whether the interiors of two cells intersect.
    pub fn overlaps(&self, other: &WellCell) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}
