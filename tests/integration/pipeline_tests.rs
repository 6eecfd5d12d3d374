//! Integration tests for full pipeline runs.
//!
//! These tests drive `PlateDecoder` through a mock device driver that writes
//! a real PNG, then check:
//! - Tags land in the right wells, in traversal order
//! - Scan failures short-circuit decoding
//! - Unreadable images and per-well faults are handled without aborting
//! - Worker count never changes the result
//! - Cancellation and completion callbacks

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plate_decoder::{
    BarcodePosition, BoundingBox, DecodeOptions, PipelineError, PipelineOutcome,
    PipelineResult, PipelineState, PlateConfiguration, PlateDecoder, PlateOrientation,
    PlateType, ScanParameters, Scanner, SimulatedScanner, Status,
};
use tempfile::TempDir;

use super::test_utils::{
    plate_image, sequential_fill, tag_for, write_png, InMemoryLoader, MockScanDriver,
    PixelTagDecoder, CRASHING_WELL, EMPTY_WELL,
};

const CELL_PX: u32 = 10;

fn landscape_96() -> PlateConfiguration {
    PlateConfiguration::new(
        PlateOrientation::Landscape,
        PlateType::PT_96,
        BarcodePosition::TopLeft,
    )
}

fn scan_params(dir: &TempDir) -> ScanParameters {
    ScanParameters::new(dir.path().join("scan.png"))
        .with_region(BoundingBox::new(0.0, 0.0, 5.0, 3.4))
        .with_dpi(600)
}

fn plate_bbox() -> Option<BoundingBox> {
    Some(BoundingBox::new(0.0, 0.0, 120.0, 80.0))
}

async fn run(
    driver: MockScanDriver,
    decoder: PixelTagDecoder,
    workers: usize,
    dir: &TempDir,
    plate: PlateConfiguration,
) -> Result<PipelineOutcome, PipelineError> {
    PlateDecoder::new(Scanner::device(Arc::new(driver)), Arc::new(decoder))
        .with_workers(workers)
        .submit(scan_params(dir), plate_bbox(), plate, DecodeOptions::default())
        .wait()
        .await
}

fn completed(outcome: Result<PipelineOutcome, PipelineError>) -> PipelineResult {
    match outcome {
        Ok(PipelineOutcome::Completed(result)) => result,
        other => panic!("expected a completed run, got {:?}", other),
    }
}

// =============================================================================
// Successful Runs
// =============================================================================

#[tokio::test]
async fn test_full_plate_decoded() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));

    let result = completed(run(driver, PixelTagDecoder::new(), 4, &dir, landscape_96()).await);

    assert_eq!(result.status(), Status::Success);
    assert_eq!(result.code(), 0);
    assert_eq!(result.message(), "success");
    assert_eq!(result.well_count(), 96);
    assert_eq!(result.tag_count(), 96);
    assert_eq!(result.tags("A1").unwrap(), [tag_for(1)]);
    assert_eq!(result.tags("B1").unwrap(), [tag_for(13)]);
    assert_eq!(result.tags("H12").unwrap(), [tag_for(96)]);

    let labels: Vec<&str> = result.tags_by_well().keys().map(String::as_str).collect();
    assert_eq!(&labels[..3], ["A1", "A2", "A3"]);
    assert_eq!(labels[12], "B1");
}

#[tokio::test]
async fn test_bottom_right_origin() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let plate = PlateConfiguration::new(
        PlateOrientation::Landscape,
        PlateType::PT_96,
        BarcodePosition::BottomRight,
    );

    let result = completed(run(driver, PixelTagDecoder::new(), 2, &dir, plate).await);

    // A1 sits on the last grid well, H12 on the first
    assert_eq!(result.tags("A1").unwrap(), [tag_for(96)]);
    assert_eq!(result.tags("H12").unwrap(), [tag_for(1)]);
}

#[tokio::test]
async fn test_portrait_labels_columns() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let plate = PlateConfiguration::new(
        PlateOrientation::Portrait,
        PlateType::PT_96,
        BarcodePosition::TopLeft,
    );

    let result = completed(run(driver, PixelTagDecoder::new(), 1, &dir, plate).await);

    // Letters run across grid columns, numbers down grid rows
    assert_eq!(result.tags("A1").unwrap(), [tag_for(1)]);
    assert_eq!(result.tags("A2").unwrap(), [tag_for(13)]);
    assert_eq!(result.tags("B1").unwrap(), [tag_for(2)]);
    assert_eq!(result.tags("L8").unwrap(), [tag_for(96)]);
    assert_eq!(result.well_count(), 96);
}

#[tokio::test]
async fn test_empty_wells_present() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, |row, column| {
        if column == 0 {
            (row + 1) as u8
        } else {
            EMPTY_WELL
        }
    }));

    let result = completed(run(driver, PixelTagDecoder::new(), 4, &dir, landscape_96()).await);

    assert!(result.is_success());
    assert_eq!(result.well_count(), 96);
    assert_eq!(result.tag_count(), 8);
    assert_eq!(result.tags("C1").unwrap(), [tag_for(3)]);
    assert!(result.tags("C2").unwrap().is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_scan_failure_short_circuits() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::failing(-1, "device offline");
    let scans = driver.call_counter();
    let decoder = PixelTagDecoder::new();
    let decodes = decoder.call_counter();

    let result = completed(run(driver, decoder, 4, &dir, landscape_96()).await);

    assert_eq!(result.status(), Status::Failure);
    assert_eq!(result.code(), -1);
    assert_eq!(result.message(), "device offline");
    assert!(result.tags_by_well().is_empty());
    assert_eq!(scans.load(Ordering::SeqCst), 1);
    assert_eq!(decodes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_native_failure_code_described() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::failing(-2, "");

    let result = completed(run(driver, PixelTagDecoder::new(), 1, &dir, landscape_96()).await);

    assert_eq!(result.code(), -2);
    assert!(!result.message().is_empty());
}

#[tokio::test]
async fn test_driver_fault_normalized() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::erroring("usb reset");

    let result = completed(run(driver, PixelTagDecoder::new(), 1, &dir, landscape_96()).await);

    assert_eq!(result.status(), Status::Failure);
    assert_eq!(result.code(), -1);
    assert!(result.message().starts_with("exception: "));
    assert!(result.message().contains("usb reset"));
}

#[tokio::test]
async fn test_missing_region_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let scans = driver.call_counter();

    let outcome = PlateDecoder::new(
        Scanner::device(Arc::new(driver)),
        Arc::new(PixelTagDecoder::new()),
    )
    .submit(
        ScanParameters::new(dir.path().join("scan.png")),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    )
    .wait()
    .await;

    assert!(matches!(
        outcome,
        Err(PipelineError::ConfigurationMissing { .. })
    ));
    assert_eq!(scans.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_image_after_scan() {
    let dir = TempDir::new().unwrap();
    let decoder = PixelTagDecoder::new();
    let decodes = decoder.call_counter();

    let handle = PlateDecoder::new(
        Scanner::device(Arc::new(MockScanDriver::writing_garbage())),
        Arc::new(decoder),
    )
    .submit(
        scan_params(&dir),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    );
    let state = handle.subscribe();
    let result = completed(handle.wait().await);

    assert_eq!(result.status(), Status::Failure);
    assert_eq!(result.code(), -1);
    assert!(result.tags_by_well().is_empty());
    assert_eq!(*state.borrow(), PipelineState::DecodeFailed);
    assert_eq!(decodes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_options_rejected_before_scan() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let scans = driver.call_counter();

    let outcome = PlateDecoder::new(
        Scanner::device(Arc::new(driver)),
        Arc::new(PixelTagDecoder::new()),
    )
    .submit(
        scan_params(&dir),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::new(5, 2),
    )
    .wait()
    .await;

    assert!(matches!(
        outcome,
        Err(PipelineError::InvalidDecodeOptions { .. })
    ));
    assert_eq!(scans.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_crashing_well_isolated() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, |row, column| {
        if (row, column) == (2, 4) {
            CRASHING_WELL
        } else {
            (row * 12 + column + 1) as u8
        }
    }));

    let result = completed(run(driver, PixelTagDecoder::new(), 4, &dir, landscape_96()).await);

    assert!(result.is_success());
    assert_eq!(result.well_count(), 96);
    assert!(result.tags("C5").unwrap().is_empty());
    assert_eq!(result.tags("C4").unwrap(), [tag_for(28)]);
    assert_eq!(result.tags("C6").unwrap(), [tag_for(30)]);
    assert_eq!(result.tag_count(), 95);
}

#[tokio::test]
async fn test_bbox_past_raster_edge_isolated() {
    let dir = TempDir::new().unwrap();
    // Raster is missing the bottom row of wells
    let driver = MockScanDriver::succeeding(plate_image(7, 12, CELL_PX, sequential_fill(12)));

    let result = completed(run(driver, PixelTagDecoder::new(), 3, &dir, landscape_96()).await);

    assert!(result.is_success());
    assert_eq!(result.well_count(), 96);
    assert_eq!(result.tags("G12").unwrap(), [tag_for(84)]);
    assert!(result.tags("H1").unwrap().is_empty());
    assert_eq!(result.tag_count(), 84);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_worker_count_does_not_change_result() {
    let image = plate_image(16, 24, CELL_PX, |row, column| {
        if (row + column) % 7 == 0 {
            EMPTY_WELL
        } else {
            ((row * 24 + column) % 250 + 1) as u8
        }
    });
    let plate = PlateConfiguration::new(
        PlateOrientation::Landscape,
        PlateType::PT_384,
        BarcodePosition::TopRight,
    );
    let bbox = Some(BoundingBox::new(0.0, 0.0, 240.0, 160.0));

    let mut results = Vec::new();
    for workers in [1, 2, 8, 32] {
        let decoder = PlateDecoder::new(
            Scanner::device(Arc::new(MockScanDriver::succeeding_silently())),
            Arc::new(PixelTagDecoder::with_jitter()),
        )
        .with_loader(Arc::new(InMemoryLoader::new(image.clone())))
        .with_workers(workers);

        let dir = TempDir::new().unwrap();
        let handle = decoder.submit(scan_params(&dir), bbox, plate, DecodeOptions::default());
        results.push(completed(handle.wait().await));
    }

    for result in &results[1..] {
        assert_eq!(result, &results[0]);
        let a: Vec<&String> = results[0].tags_by_well().keys().collect();
        let b: Vec<&String> = result.tags_by_well().keys().collect();
        assert_eq!(a, b);
    }
    assert_eq!(results[0].well_count(), 384);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_cancel_before_start() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let scans = driver.call_counter();

    let decoder = PlateDecoder::new(
        Scanner::device(Arc::new(driver)),
        Arc::new(PixelTagDecoder::new()),
    );
    let task = decoder.task(
        scan_params(&dir),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    );
    task.cancellation_token().cancel();

    let handle = task.start();
    let outcome = handle.wait().await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Cancelled);
    assert!(outcome.into_result().is_none());
    assert_eq!(scans.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_during_simulated_scan() {
    let dir = TempDir::new().unwrap();
    let image = write_png(
        dir.path(),
        "plate.png",
        &plate_image(8, 12, CELL_PX, sequential_fill(12)),
    );
    let scanner = Scanner::Simulated(
        SimulatedScanner::new(&image).with_settle_delay(Duration::from_secs(30)),
    );
    let decoder = PixelTagDecoder::new();
    let decodes = decoder.call_counter();

    let handle = PlateDecoder::new(scanner, Arc::new(decoder)).submit(
        ScanParameters::new(&image),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    );
    let mut state = handle.subscribe();
    state
        .wait_for(|s| *s == PipelineState::Scanning)
        .await
        .unwrap();

    handle.cancel();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("cancellation should end the run promptly")
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(*state.borrow(), PipelineState::Cancelled);
    assert_eq!(decodes.load(Ordering::SeqCst), 0);
}

async fn cancel_while_decoding(workers: usize) {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let decoder = PixelTagDecoder::slow(Duration::from_millis(25));
    let decodes = decoder.call_counter();

    let handle = PlateDecoder::new(Scanner::device(Arc::new(driver)), Arc::new(decoder))
        .with_workers(workers)
        .submit(
            scan_params(&dir),
            plate_bbox(),
            landscape_96(),
            DecodeOptions::default(),
        );
    let mut state = handle.subscribe();
    state
        .wait_for(|s| *s == PipelineState::Decoding)
        .await
        .unwrap();

    handle.cancel();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("cancellation should end the run promptly")
        .unwrap();

    assert_eq!(outcome, PipelineOutcome::Cancelled);
    assert_eq!(*state.borrow(), PipelineState::Cancelled);
    let decoded = decodes.load(Ordering::SeqCst);
    assert!(decoded < 96, "decoded {} wells after cancel", decoded);
}

#[tokio::test]
async fn test_cancel_during_sequential_decode() {
    cancel_while_decoding(1).await;
}

#[tokio::test]
async fn test_cancel_during_concurrent_decode() {
    cancel_while_decoding(4).await;
}

#[tokio::test]
async fn test_on_complete_callback() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let received: Arc<Mutex<Vec<PipelineResult>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    let terminal = PlateDecoder::new(
        Scanner::device(Arc::new(driver)),
        Arc::new(PixelTagDecoder::new()),
    )
    .submit(
        scan_params(&dir),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    )
    .on_complete(move |result| sink.lock().unwrap().push(result))
    .await
    .unwrap()
    .unwrap();

    assert_eq!(terminal, PipelineState::Succeeded);
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].tag_count(), 96);
}

#[tokio::test]
async fn test_each_submit_is_independent() {
    let dir = TempDir::new().unwrap();
    let driver = MockScanDriver::succeeding(plate_image(8, 12, CELL_PX, sequential_fill(12)));
    let scans = driver.call_counter();
    let decoder = PlateDecoder::new(
        Scanner::device(Arc::new(driver)),
        Arc::new(PixelTagDecoder::new()),
    );

    let first = decoder.submit(
        scan_params(&dir),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    );
    let first = completed(first.wait().await);
    let second = decoder.submit(
        scan_params(&dir),
        plate_bbox(),
        landscape_96(),
        DecodeOptions::default(),
    );
    let second = completed(second.wait().await);

    assert_eq!(first, second);
    assert_eq!(scans.load(Ordering::SeqCst), 2);
}
