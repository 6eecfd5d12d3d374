//! Scan-and-decode pipeline.
//!
//! A run acquires a plate image, partitions it into wells, decodes every
//! well and folds the tags into one [`PipelineResult`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PipelineTask                             │
//! │                                                                 │
//! │  SCANNING ──► PARTITIONING ──► DECODING ──► AGGREGATING         │
//! │     │              │               │              │             │
//! │     ▼              ▼               ▼              ▼             │
//! │ ScanAdapter   compute_cells   DecodeAdapter   aggregate()       │
//! │                               (worker pool)                     │
//! └─────────────────────────────────────────────────────────────────┘
//!            ▲                                       │
//!            │ cancel()                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       PipelineHandle                            │
//! │          state() / wait() / on_complete(callback)               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure handling
//!
//! - A failed scan ends the run with a failure result built from the scan
//!   outcome; no well is decoded.
//! - An unreadable image after a successful scan ends the run with a
//!   failure result.
//! - Invalid configuration, a missing scan region or a missing simulated
//!   image is returned as a [`PipelineError`](crate::error::PipelineError).
//! - A fault in a single well leaves that well empty and the run continues.
//! - Cancellation ends the run with [`PipelineOutcome::Cancelled`] and no
//!   result.

mod result;
mod service;
mod state;
mod task;

pub use result::{aggregate, PipelineResult, SUCCESS_MESSAGE};
pub use service::{PlateDecoder, DEFAULT_WORKERS};
pub use state::PipelineState;
pub use task::{PipelineHandle, PipelineOutcome, PipelineTask};
