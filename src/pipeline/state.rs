use std::fmt;

/// Lifecycle of a pipeline run.
///
/// ```text
/// PENDING ─► SCANNING ─► PARTITIONING ─► DECODING ─► AGGREGATING ─► SUCCEEDED
///    │          │              │             │
///    ▼          ▼              ▼             ▼
/// REJECTED  SCAN_FAILED   DECODE_FAILED  CANCELLED (from any non-terminal state)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Pending,
    Scanning,
    Partitioning,
    Decoding,
    Aggregating,
    /// Plate or decode settings were refused before scanning
    Rejected,
    ScanFailed,
    DecodeFailed,
    Succeeded,
    Cancelled,
}

impl PipelineState {
    /// Whether no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Rejected
                | PipelineState::ScanFailed
                | PipelineState::DecodeFailed
                | PipelineState::Succeeded
                | PipelineState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Pending => "PENDING",
            PipelineState::Scanning => "SCANNING",
            PipelineState::Partitioning => "PARTITIONING",
            PipelineState::Decoding => "DECODING",
            PipelineState::Aggregating => "AGGREGATING",
            PipelineState::Rejected => "REJECTED",
            PipelineState::ScanFailed => "SCAN_FAILED",
            PipelineState::DecodeFailed => "DECODE_FAILED",
            PipelineState::Succeeded => "SUCCEEDED",
            PipelineState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
