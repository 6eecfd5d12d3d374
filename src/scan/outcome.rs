use std::path::PathBuf;

use serde::Serialize;

use crate::plate::BoundingBox;

/// Default scan resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// Brightness and contrast accepted by the driver lie in this range.
pub const MIN_ADJUSTMENT: i32 = -1000;
pub const MAX_ADJUSTMENT: i32 = 1000;

// =============================================================================
// Result Codes
// =============================================================================

/// Overall status of a scan or of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failure,
}

/// Result codes reported by the native scanning library.
///
/// Codes not listed here are passed through untouched in `ScanOutcome::code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanResultCode {
    Success,
    Fail,
    TwainUnavailable,
    InvalidDpi,
    NothingDecoded,
    InvalidImage,
    NothingToDecode,
    IncorrectDpiScanned,
}

impl ScanResultCode {
    /// The numeric code used by the native library.
    pub fn code(&self) -> i32 {
        match self {
            ScanResultCode::Success => 0,
            ScanResultCode::Fail => -1,
            ScanResultCode::TwainUnavailable => -2,
            ScanResultCode::InvalidDpi => -3,
            ScanResultCode::NothingDecoded => -4,
            ScanResultCode::InvalidImage => -5,
            ScanResultCode::NothingToDecode => -6,
            ScanResultCode::IncorrectDpiScanned => -7,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ScanResultCode::Success),
            -1 => Some(ScanResultCode::Fail),
            -2 => Some(ScanResultCode::TwainUnavailable),
            -3 => Some(ScanResultCode::InvalidDpi),
            -4 => Some(ScanResultCode::NothingDecoded),
            -5 => Some(ScanResultCode::InvalidImage),
            -6 => Some(ScanResultCode::NothingToDecode),
            -7 => Some(ScanResultCode::IncorrectDpiScanned),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScanResultCode::Success => "success",
            ScanResultCode::Fail => "scan failed",
            ScanResultCode::TwainUnavailable => "scanner driver unavailable",
            ScanResultCode::InvalidDpi => "invalid dpi",
            ScanResultCode::NothingDecoded => "nothing decoded",
            ScanResultCode::InvalidImage => "invalid image",
            ScanResultCode::NothingToDecode => "nothing to decode",
            ScanResultCode::IncorrectDpiScanned => "scanned dpi does not match requested dpi",
        }
    }
}

// =============================================================================
// Scan Parameters
// =============================================================================

/// Parameters for one acquisition.
#[derive(Debug, Clone)]
pub struct ScanParameters {
    /// Region of the scanner bed to acquire; required by real devices
    pub region: Option<BoundingBox>,

    pub dpi: u32,

    pub brightness: i32,

    pub contrast: i32,

    /// Verbosity forwarded to the native driver
    pub debug_level: u32,

    /// Where the acquired image is written
    pub output_path: PathBuf,
}

impl ScanParameters {
    /// Parameters with default dpi and neutral brightness/contrast.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            region: None,
            dpi: DEFAULT_DPI,
            brightness: 0,
            contrast: 0,
            debug_level: 0,
            output_path: output_path.into(),
        }
    }

    pub fn with_region(mut self, region: BoundingBox) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_adjustments(mut self, brightness: i32, contrast: i32) -> Self {
        self.brightness = brightness;
        self.contrast = contrast;
        self
    }

    pub fn with_debug_level(mut self, debug_level: u32) -> Self {
        self.debug_level = debug_level;
        self
    }
}

// =============================================================================
// Scan Outcome
// =============================================================================

/// Raw triple returned by the native scanning library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeScanResult {
    pub code: i32,
    pub value: i32,
    pub message: String,
}

/// Normalized result of one acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub status: Status,
    pub code: i32,
    pub message: String,
}

impl ScanOutcome {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            code: ScanResultCode::Success.code(),
            message: String::new(),
        }
    }

    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            code,
            message: message.into(),
        }
    }

    /// Normalize a native result. Any code other than success is a failure.
    pub fn from_native(result: NativeScanResult) -> Self {
        let known = ScanResultCode::from_code(result.code);
        let status = if known == Some(ScanResultCode::Success) {
            Status::Success
        } else {
            Status::Failure
        };

        let message = match known {
            Some(code) if result.message.is_empty() && status == Status::Failure => {
                code.description().to_string()
            }
            _ => result.message,
        };

        Self {
            status,
            code: result.code,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
