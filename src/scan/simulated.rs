//! Acquisition from a pre-captured plate image.
//!
//! Used on hosts without a scanner: after a settle delay the configured image
//! stands in for a fresh scan.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::ScanError;

use super::outcome::{ScanOutcome, ScanParameters, ScanResultCode};
use super::ScanAdapter;

/// Default delay before a simulated scan completes.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Scan adapter that replays an image file.
#[derive(Debug, Clone)]
pub struct SimulatedScanner {
    image_path: PathBuf,
    settle_delay: Duration,
}

impl SimulatedScanner {
    /// Create a simulated scanner with the default settle delay.
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}

#[async_trait]
impl ScanAdapter for SimulatedScanner {
    async fn acquire(&self, params: &ScanParameters) -> Result<ScanOutcome, ScanError> {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        match tokio::fs::try_exists(&self.image_path).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ScanError::MissingInput {
                    path: self.image_path.clone(),
                })
            }
            Err(e) => {
                error!(
                    "Failed to check simulated scan input {}: {}",
                    self.image_path.display(),
                    e
                );
                return Ok(ScanOutcome::failure(
                    ScanResultCode::Fail.code(),
                    format!("exception: {}", e),
                ));
            }
        }

        if params.output_path != self.image_path {
            debug!(
                "Copying {} to {}",
                self.image_path.display(),
                params.output_path.display()
            );
            if let Err(e) = tokio::fs::copy(&self.image_path, &params.output_path).await {
                error!(
                    "Failed to write simulated scan to {}: {}",
                    params.output_path.display(),
                    e
                );
                return Ok(ScanOutcome::failure(
                    ScanResultCode::Fail.code(),
                    format!("exception: {}", e),
                ));
            }
        }

        info!("Simulated scan from {}", self.image_path.display());
        Ok(ScanOutcome::success())
    }
}
