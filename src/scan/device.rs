//! Acquisition through a native scanner driver.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::ScanError;
use crate::plate::BoundingBox;

use super::outcome::{NativeScanResult, ScanOutcome, ScanParameters, ScanResultCode};
use super::ScanAdapter;

/// The native image acquisition capability.
///
/// Implementations wrap the platform's scanner driver. Calls may block for
/// the duration of the scan; `DeviceScanner` runs them on the blocking pool.
pub trait ScanCapability: Send + Sync {
    /// Acquire `region` and write the image to `params.output_path`.
    fn scan_image(
        &self,
        region: &BoundingBox,
        params: &ScanParameters,
    ) -> Result<NativeScanResult, ScanError>;
}

/// Scan adapter backed by a real device.
#[derive(Clone)]
pub struct DeviceScanner {
    driver: Arc<dyn ScanCapability>,
}

impl DeviceScanner {
    pub fn new(driver: Arc<dyn ScanCapability>) -> Self {
        Self { driver }
    }
}

impl std::fmt::Debug for DeviceScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceScanner").finish_non_exhaustive()
    }
}

#[async_trait]
impl ScanAdapter for DeviceScanner {
    async fn acquire(&self, params: &ScanParameters) -> Result<ScanOutcome, ScanError> {
        let region = params.region.ok_or_else(|| ScanError::ConfigurationMissing {
            what: "scanning region not defined".to_string(),
        })?;

        debug!(
            "Scanning region {:?} at {} dpi (brightness {}, contrast {})",
            region, params.dpi, params.brightness, params.contrast
        );

        let driver = Arc::clone(&self.driver);
        let request = params.clone();
        let joined =
            tokio::task::spawn_blocking(move || driver.scan_image(&region, &request)).await;

        let outcome = match joined {
            Ok(Ok(native)) => {
                debug!(
                    "Driver returned code {} value {}: {}",
                    native.code, native.value, native.message
                );
                ScanOutcome::from_native(native)
            }
            Ok(Err(e)) => {
                error!("Scanner driver error: {}", e);
                ScanOutcome::failure(ScanResultCode::Fail.code(), format!("exception: {}", e))
            }
            Err(e) => {
                error!("Scanner driver task failed: {}", e);
                ScanOutcome::failure(ScanResultCode::Fail.code(), format!("exception: {}", e))
            }
        };

        info!(
            "Scan finished: {:?} (code {})",
            outcome.status, outcome.code
        );
        Ok(outcome)
    }
}
