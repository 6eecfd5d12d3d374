//! Plate acquisition.
//!
//! A [`ScanAdapter`] turns [`ScanParameters`] into a [`ScanOutcome`]. Two
//! implementations exist and are chosen when the [`Scanner`] is built:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                Scanner                  │
//! └────────────────────┬────────────────────┘
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │  DeviceScanner  │    │  SimulatedScanner   │
//! │ (native driver) │    │ (pre-captured file) │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! Driver failures never escape an adapter; they come back as a failed
//! outcome. Only missing configuration or a missing simulated input is
//! reported as an `Err`.

mod device;
mod outcome;
mod simulated;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScanError;

pub use device::{DeviceScanner, ScanCapability};
pub use outcome::{
    NativeScanResult, ScanOutcome, ScanParameters, ScanResultCode, Status, DEFAULT_DPI,
    MAX_ADJUSTMENT, MIN_ADJUSTMENT,
};
pub use simulated::{SimulatedScanner, DEFAULT_SETTLE_DELAY};

/// Something that can acquire a plate image.
#[async_trait]
pub trait ScanAdapter: Send + Sync {
    /// Acquire an image according to `params`.
    ///
    /// On success the image has been written to `params.output_path`.
    async fn acquire(&self, params: &ScanParameters) -> Result<ScanOutcome, ScanError>;
}

/// Scan adapter selected by configuration.
#[derive(Debug, Clone)]
pub enum Scanner {
    Device(DeviceScanner),
    Simulated(SimulatedScanner),
}

impl Scanner {
    /// Scanner backed by a native driver.
    pub fn device(driver: Arc<dyn ScanCapability>) -> Self {
        Scanner::Device(DeviceScanner::new(driver))
    }

    /// Scanner that replays a pre-captured image.
    pub fn simulated(image_path: impl Into<std::path::PathBuf>) -> Self {
        Scanner::Simulated(SimulatedScanner::new(image_path))
    }
}

#[async_trait]
impl ScanAdapter for Scanner {
    async fn acquire(&self, params: &ScanParameters) -> Result<ScanOutcome, ScanError> {
        match self {
            Scanner::Device(s) => s.acquire(params).await,
            Scanner::Simulated(s) => s.acquire(params).await,
        }
    }
}
