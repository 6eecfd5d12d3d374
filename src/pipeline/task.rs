//! The scan → partition → decode → aggregate state machine.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::decode::{DecodeAdapter, DecodeOptions, DecodedTag, Raster, RasterLoader};
use crate::error::PipelineError;
use crate::plate::{compute_cells, BoundingBox, PlateConfiguration, WellCell};
use crate::scan::{ScanAdapter, ScanParameters, ScanResultCode};

use super::result::{aggregate, PipelineResult};
use super::state::PipelineState;

/// How a run ended when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The run reached a terminal state with a result (which may itself be a failure)
    Completed(PipelineResult),

    /// The caller cancelled the run; no result was produced
    Cancelled,
}

impl PipelineOutcome {
    /// The result, if one was produced.
    pub fn into_result(self) -> Option<PipelineResult> {
        match self {
            PipelineOutcome::Completed(result) => Some(result),
            PipelineOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineOutcome::Cancelled)
    }
}

// =============================================================================
// Pipeline Task
// =============================================================================

/// One single-shot run of the pipeline.
///
/// A task is consumed by [`PipelineTask::start`] or [`PipelineTask::run`],
/// so it cannot be restarted; build a new one for every run.
pub struct PipelineTask<S: ScanAdapter> {
    scanner: Arc<S>,
    decoder: DecodeAdapter,
    loader: Arc<dyn RasterLoader>,
    workers: usize,

    scan: ScanParameters,
    bbox: Option<BoundingBox>,
    plate: PlateConfiguration,
    options: DecodeOptions,

    token: CancellationToken,
    state: watch::Sender<PipelineState>,
}

impl<S: ScanAdapter + 'static> PipelineTask<S> {
    /// Create a task.
    ///
    /// `bbox` is the plate's region in raster pixels; `None` uses the whole
    /// acquired raster. `workers` bounds concurrent well decodes, 1 decodes
    /// sequentially.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scanner: Arc<S>,
        decoder: DecodeAdapter,
        loader: Arc<dyn RasterLoader>,
        workers: usize,
        scan: ScanParameters,
        bbox: Option<BoundingBox>,
        plate: PlateConfiguration,
        options: DecodeOptions,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Pending);
        Self {
            scanner,
            decoder,
            loader,
            workers: workers.max(1),
            scan,
            bbox,
            plate,
            options,
            token: CancellationToken::new(),
            state,
        }
    }

    /// Token that cancels this run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn the run onto the runtime and return a handle to it.
    pub fn start(self) -> PipelineHandle {
        let token = self.token.clone();
        let state = self.state.subscribe();
        let join = tokio::spawn(self.run());
        PipelineHandle { token, state, join }
    }

    /// Drive the run to a terminal state on the current task.
    pub async fn run(self) -> Result<PipelineOutcome, PipelineError> {
        let outcome = self.execute().await;
        match &outcome {
            Ok(PipelineOutcome::Completed(result)) => info!(
                "Pipeline finished: {} ({:?}, code {}, {} well(s), {} tag(s))",
                self.current(),
                result.status(),
                result.code(),
                result.well_count(),
                result.tag_count()
            ),
            Ok(PipelineOutcome::Cancelled) => info!("Pipeline cancelled"),
            Err(e) => error!("Pipeline aborted in {}: {}", self.current(), e),
        }
        outcome
    }

    async fn execute(&self) -> Result<PipelineOutcome, PipelineError> {
        if self.token.is_cancelled() {
            return Ok(self.cancelled());
        }

        debug!("Plate configuration: {:?}", self.plate);
        debug!("Decode options: {:?}", self.options);
        if let Err(e) = self.validate() {
            self.transition(PipelineState::Rejected);
            return Err(e);
        }

        // Scanning
        self.transition(PipelineState::Scanning);
        let acquired = tokio::select! {
            _ = self.token.cancelled() => return Ok(self.cancelled()),
            acquired = self.scanner.acquire(&self.scan) => acquired,
        };
        let scan = match acquired {
            Ok(scan) => scan,
            Err(e) => {
                self.transition(PipelineState::ScanFailed);
                return Err(e.into());
            }
        };
        if !scan.is_success() {
            error!("Scan failed with code {}: {}", scan.code, scan.message);
            self.transition(PipelineState::ScanFailed);
            return Ok(PipelineOutcome::Completed(PipelineResult::from_scan(&scan)));
        }
        if self.token.is_cancelled() {
            return Ok(self.cancelled());
        }

        // Partitioning
        self.transition(PipelineState::Partitioning);
        let raster = match self.load_raster().await {
            Ok(raster) => Arc::new(raster),
            Err(message) => {
                error!(
                    "Image load failed after a successful scan of {}: {}",
                    self.scan.output_path.display(),
                    message
                );
                self.transition(PipelineState::DecodeFailed);
                return Ok(PipelineOutcome::Completed(PipelineResult::failure(
                    ScanResultCode::Fail.code(),
                    message,
                )));
            }
        };

        let bbox = self.bbox.unwrap_or_else(|| {
            BoundingBox::new(0.0, 0.0, raster.width() as f64, raster.height() as f64)
        });
        let cells = match compute_cells(&bbox, &self.plate) {
            Ok(cells) => cells,
            Err(e) => {
                self.transition(PipelineState::DecodeFailed);
                return Err(e.into());
            }
        };
        debug!("Partitioned {:?} into {} cell(s)", bbox, cells.len());
        if self.token.is_cancelled() {
            return Ok(self.cancelled());
        }

        // Decoding
        self.transition(PipelineState::Decoding);
        let per_cell = if self.workers == 1 {
            self.decode_sequential(&raster, &cells).await
        } else {
            self.decode_concurrent(&raster, &cells).await
        };
        let Some(per_cell) = per_cell else {
            return Ok(self.cancelled());
        };

        // Aggregating
        self.transition(PipelineState::Aggregating);
        let result = aggregate(&scan, cells.into_iter().zip(per_cell));
        self.transition(PipelineState::Succeeded);
        Ok(PipelineOutcome::Completed(result))
    }

    fn validate(&self) -> Result<(), PipelineError> {
        self.plate.validate()?;
        if let Some(bbox) = &self.bbox {
            bbox.validate()?;
        }
        self.options
            .validate()
            .map_err(|reason| PipelineError::InvalidDecodeOptions { reason })
    }

    async fn load_raster(&self) -> Result<Raster, String> {
        let loader = Arc::clone(&self.loader);
        let path = self.scan.output_path.clone();
        match tokio::task::spawn_blocking(move || loader.load(&path)).await {
            Ok(Ok(raster)) => Ok(raster),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("image loader crashed: {}", e)),
        }
    }

    /// Decode wells one after another. `None` if cancelled.
    async fn decode_sequential(
        &self,
        raster: &Arc<Raster>,
        cells: &[WellCell],
    ) -> Option<Vec<Vec<DecodedTag>>> {
        let mut per_cell = Vec::with_capacity(cells.len());
        for cell in cells {
            let tags = self
                .decoder
                .decode_cell_isolated(Arc::clone(raster), cell.clone(), self.options)
                .await;
            per_cell.push(tags);
            if self.token.is_cancelled() {
                return None;
            }
        }
        Some(per_cell)
    }

    /// Decode wells on up to `workers` blocking threads. `None` if cancelled.
    ///
    /// Results land in per-index slots so completion order never reaches the
    /// output.
    async fn decode_concurrent(
        &self,
        raster: &Arc<Raster>,
        cells: &[WellCell],
    ) -> Option<Vec<Vec<DecodedTag>>> {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();

        for (index, cell) in cells.iter().enumerate() {
            let permits = Arc::clone(&permits);
            let decoder = self.decoder.clone();
            let raster = Arc::clone(raster);
            let cell = cell.clone();
            let options = self.options;
            let token = self.token.clone();

            set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                if token.is_cancelled() {
                    return None;
                }
                Some((index, decoder.decode_cell_isolated(raster, cell, options).await))
            });
        }

        let mut slots: Vec<Option<Vec<DecodedTag>>> = vec![None; cells.len()];
        while let Some(joined) = set.join_next().await {
            if self.token.is_cancelled() {
                set.abort_all();
                return None;
            }
            match joined {
                Ok(Some((index, tags))) => slots[index] = Some(tags),
                Ok(None) => {}
                Err(e) => warn!("Decode worker failed: {}", e),
            }
        }

        Some(slots.into_iter().map(Option::unwrap_or_default).collect())
    }

    fn transition(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        debug!("Pipeline state {} -> {}", previous, next);
    }

    fn current(&self) -> PipelineState {
        *self.state.borrow()
    }

    fn cancelled(&self) -> PipelineOutcome {
        self.transition(PipelineState::Cancelled);
        PipelineOutcome::Cancelled
    }
}

// =============================================================================
// Pipeline Handle
// =============================================================================

/// Caller's view of a running pipeline.
#[derive(Debug)]
pub struct PipelineHandle {
    token: CancellationToken,
    state: watch::Receiver<PipelineState>,
    join: JoinHandle<Result<PipelineOutcome, PipelineError>>,
}

impl PipelineHandle {
    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Latest published state.
    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to end.
    pub async fn wait(self) -> Result<PipelineOutcome, PipelineError> {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => Err(PipelineError::TaskFailed {
                message: e.to_string(),
            }),
        }
    }

    /// Invoke `callback` with the result once the run produces one.
    ///
    /// The callback is not called for a cancelled run. The returned handle
    /// yields the terminal state.
    pub fn on_complete<F>(self, callback: F) -> JoinHandle<Result<PipelineState, PipelineError>>
    where
        F: FnOnce(PipelineResult) + Send + 'static,
    {
        tokio::spawn(async move {
            let state = self.state.clone();
            if let PipelineOutcome::Completed(result) = self.wait().await? {
                callback(result);
            }
            let terminal = *state.borrow();
            Ok(terminal)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
