//! Result aggregation.

use indexmap::IndexMap;
use serde::Serialize;

use crate::decode::DecodedTag;
use crate::plate::WellCell;
use crate::scan::{ScanOutcome, ScanResultCode, Status};

/// Message attached to a successful run.
pub const SUCCESS_MESSAGE: &str = "success";

/// Final, immutable result of one pipeline run.
///
/// `tags_by_well` keeps wells in traversal order; a well without symbols is
/// present with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    status: Status,
    code: i32,
    message: String,
    tags_by_well: IndexMap<String, Vec<String>>,
}

impl PipelineResult {
    /// Result for a run that stopped at a failed scan.
    pub fn from_scan(outcome: &ScanOutcome) -> Self {
        Self {
            status: outcome.status,
            code: outcome.code,
            message: outcome.message.clone(),
            tags_by_well: IndexMap::new(),
        }
    }

    /// Failed result with no wells.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            code,
            message: message.into(),
            tags_by_well: IndexMap::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tags_by_well(&self) -> &IndexMap<String, Vec<String>> {
        &self.tags_by_well
    }

    /// Decoded values for one well, `None` if the well was not part of the run.
    pub fn tags(&self, label: &str) -> Option<&[String]> {
        self.tags_by_well.get(label).map(Vec::as_slice)
    }

    /// Number of wells in the result.
    pub fn well_count(&self) -> usize {
        self.tags_by_well.len()
    }

    /// Number of decoded values across all wells.
    pub fn tag_count(&self) -> usize {
        self.tags_by_well.values().map(Vec::len).sum()
    }
}

/// Fold per-well tags into a result, in the order given.
///
/// A scan that did not succeed short-circuits to [`PipelineResult::from_scan`].
pub fn aggregate<I>(scan: &ScanOutcome, per_cell: I) -> PipelineResult
where
    I: IntoIterator<Item = (WellCell, Vec<DecodedTag>)>,
{
    if !scan.is_success() {
        return PipelineResult::from_scan(scan);
    }

    let mut tags_by_well = IndexMap::new();
    for (cell, tags) in per_cell {
        let values: &mut Vec<String> = tags_by_well.entry(cell.label).or_default();
        values.extend(tags.into_iter().map(|tag| tag.value));
    }

    PipelineResult {
        status: Status::Success,
        code: ScanResultCode::Success.code(),
        message: SUCCESS_MESSAGE.to_string(),
        tags_by_well,
    }
}
