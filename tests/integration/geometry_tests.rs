//! Integration tests for well geometry.
//!
//! These tests verify, across every standard plate type:
//! - Cells cover the bounding box without overlapping
//! - Labels are unique and follow traversal order
//! - Orientation changes the labelling but not the set of rectangles
//! - Invalid geometry is rejected

use std::collections::HashSet;

use plate_decoder::{
    compute_cells, BarcodePosition, BoundingBox, GeometryError, PlateConfiguration,
    PlateOrientation, PlateType, WellCell,
};

const PLATE_TYPES: [PlateType; 5] = [
    PlateType::PT_96,
    PlateType::PT_384,
    PlateType::PT_81,
    PlateType::PT_100,
    PlateType::PT_144,
];

const ORIENTATIONS: [PlateOrientation; 2] = [PlateOrientation::Landscape, PlateOrientation::Portrait];

const CORNERS: [BarcodePosition; 4] = [
    BarcodePosition::TopLeft,
    BarcodePosition::TopRight,
    BarcodePosition::BottomLeft,
    BarcodePosition::BottomRight,
];

fn every_configuration() -> Vec<PlateConfiguration> {
    let mut configs = Vec::new();
    for plate_type in PLATE_TYPES {
        for orientation in ORIENTATIONS {
            for corner in CORNERS {
                configs.push(PlateConfiguration::new(orientation, plate_type, corner));
            }
        }
    }
    configs
}

fn area(cells: &[WellCell]) -> f64 {
    cells.iter().map(|c| c.width * c.height).sum()
}

fn rect_key(cell: &WellCell) -> (i64, i64, i64, i64) {
    (
        (cell.x * 1000.0) as i64,
        (cell.y * 1000.0) as i64,
        (cell.width * 1000.0) as i64,
        (cell.height * 1000.0) as i64,
    )
}

// =============================================================================
// Coverage
// =============================================================================

#[test]
fn test_cells_tile_the_bounding_box() {
    // Deliberately not a multiple of any plate dimension
    let bbox = BoundingBox::new(13.0, 7.0, 1001.0, 677.0);

    for config in every_configuration() {
        let cells = compute_cells(&bbox, &config).unwrap();

        assert_eq!(cells.len(), config.plate_type.well_count(), "{:?}", config);
        assert!(cells.iter().all(|c| c.is_within(&bbox)), "{:?}", config);
        assert!((area(&cells) - bbox.width * bbox.height).abs() < 1e-6);

        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {} in {:?}", a.label, b.label, config);
            }
        }
    }
}

#[test]
fn test_labels_unique_and_ordered() {
    let bbox = BoundingBox::new(0.0, 0.0, 2400.0, 1600.0);

    for config in every_configuration() {
        let cells = compute_cells(&bbox, &config).unwrap();

        let labels: HashSet<&str> = cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels.len(), cells.len());

        let order: Vec<(u32, u32)> = cells.iter().map(|c| (c.row, c.column)).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted, "cells not in traversal order for {:?}", config);
        assert_eq!(cells[0].label, "A1");
    }
}

#[test]
fn test_orientation_keeps_rectangles() {
    let bbox = BoundingBox::new(5.0, 5.0, 1200.0, 800.0);

    for plate_type in PLATE_TYPES {
        for corner in CORNERS {
            let landscape = compute_cells(
                &bbox,
                &PlateConfiguration::new(PlateOrientation::Landscape, plate_type, corner),
            )
            .unwrap();
            let portrait = compute_cells(
                &bbox,
                &PlateConfiguration::new(PlateOrientation::Portrait, plate_type, corner),
            )
            .unwrap();

            let a: HashSet<_> = landscape.iter().map(rect_key).collect();
            let b: HashSet<_> = portrait.iter().map(rect_key).collect();
            assert_eq!(a, b);
        }
    }
}

#[test]
fn test_corner_moves_first_well() {
    let bbox = BoundingBox::new(0.0, 0.0, 120.0, 80.0);
    let a1 = |corner| {
        let config = PlateConfiguration::new(PlateOrientation::Landscape, PlateType::PT_96, corner);
        let cells = compute_cells(&bbox, &config).unwrap();
        (cells[0].x, cells[0].y)
    };

    assert_eq!(a1(BarcodePosition::TopLeft), (0.0, 0.0));
    assert_eq!(a1(BarcodePosition::TopRight), (110.0, 0.0));
    assert_eq!(a1(BarcodePosition::BottomLeft), (0.0, 70.0));
    assert_eq!(a1(BarcodePosition::BottomRight), (110.0, 70.0));
}

#[test]
fn test_384_plate_last_label() {
    let bbox = BoundingBox::new(0.0, 0.0, 2400.0, 1600.0);
    let config = PlateConfiguration::new(
        PlateOrientation::Landscape,
        PlateType::PT_384,
        BarcodePosition::TopLeft,
    );

    let cells = compute_cells(&bbox, &config).unwrap();
    let last = cells.last().unwrap();
    assert_eq!(last.label, "P24");
    assert_eq!((last.x, last.y, last.width, last.height), (2300.0, 1500.0, 100.0, 100.0));
}

// =============================================================================
// Rejection
// =============================================================================

#[test]
fn test_rejects_box_smaller_than_grid() {
    let config = PlateConfiguration::new(
        PlateOrientation::Landscape,
        PlateType::PT_384,
        BarcodePosition::TopLeft,
    );
    let result = compute_cells(&BoundingBox::new(0.0, 0.0, 20.0, 10.0), &config);
    assert!(matches!(
        result,
        Err(GeometryError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_rejects_degenerate_box() {
    let config = PlateConfiguration::default();
    for bbox in [
        BoundingBox::new(0.0, 0.0, 0.0, 80.0),
        BoundingBox::new(0.0, 0.0, 120.0, -1.0),
        BoundingBox::new(f64::NAN, 0.0, 120.0, 80.0),
    ] {
        assert!(compute_cells(&bbox, &config).is_err(), "{:?}", bbox);
    }
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_cells_serialize_for_cli() {
    let config = PlateConfiguration::new(
        PlateOrientation::Landscape,
        PlateType::new(1, 2),
        BarcodePosition::TopLeft,
    );
    let cells = compute_cells(&BoundingBox::new(0.0, 0.0, 20.0, 10.0), &config).unwrap();

    let json = serde_json::to_value(&cells).unwrap();
    assert_eq!(json[0]["label"], "A1");
    assert_eq!(json[1]["label"], "A2");
    assert_eq!(json[1]["x"], 10.0);
    assert_eq!(json[1]["width"], 10.0);
}
