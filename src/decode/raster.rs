//! Raster I/O.

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader};

use crate::error::RasterError;

/// In-memory plate image.
pub type Raster = DynamicImage;

/// Loads a raster from disk.
///
/// Loading may block; the pipeline calls it from the blocking pool.
pub trait RasterLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Raster, RasterError>;
}

/// Loader for image files, with the format guessed from content.
#[derive(Debug, Clone, Default)]
pub struct ImageFileLoader;

impl ImageFileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl RasterLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> Result<Raster, RasterError> {
        let load_error = |message: String| RasterError::Load {
            path: path.to_path_buf(),
            message,
        };

        let reader = ImageReader::open(path)
            .map_err(|e| load_error(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| load_error(e.to_string()))?;

        reader.decode().map_err(|e| load_error(e.to_string()))
    }
}

/// Copy out the region at (`x`, `y`) of size `width` x `height`.
///
/// Fractional coordinates are truncated to whole pixels.
///
/// # Errors
///
/// Returns `RasterError::OutOfBounds` if the region is empty or does not
/// lie fully inside the raster.
pub fn crop_region(
    raster: &Raster,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Result<Raster, RasterError> {
    let (x, y, width, height) = (
        x.trunc() as i64,
        y.trunc() as i64,
        width.trunc() as i64,
        height.trunc() as i64,
    );
    let (raster_width, raster_height) = raster.dimensions();

    let fits = x >= 0
        && y >= 0
        && width > 0
        && height > 0
        && x + width <= raster_width as i64
        && y + height <= raster_height as i64;
    if !fits {
        return Err(RasterError::OutOfBounds {
            x,
            y,
            width,
            height,
            raster_width,
            raster_height,
        });
    }

    Ok(raster.crop_imm(x as u32, y as u32, width as u32, height as u32))
}
