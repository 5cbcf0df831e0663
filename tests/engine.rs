//! End-to-end tests for the transform engine.
//!
//! Covers grid conversions, transform execution through handles and the
//! executor, region growing properties and JSON-configured pipelines.

use std::time::Duration;

use gridstag::{
    AverageFilter, Coord, EdgeFilter, ExecutionHandle, ExecutionStatus, Executor, Opacity, Pipeline,
    PipelineConfig, PipelineError, Pixel, PixelGrid, RegionGrower, RegionGrowerConfig, RegionRecolor,
    Transform, TransformConfig, TransformError, TraversalOrder,
};

// ============================================================================
// Test Utilities
// ============================================================================

const RED: Pixel = Pixel::rgb(255, 0, 0);

/// 10x10 grid, black in columns 0-4 and white in columns 5-9.
fn black_white() -> PixelGrid {
    let mut grid = PixelGrid::filled(10, 10, Pixel::BLACK);
    for y in 0..10 {
        for x in 5..10 {
            grid.set(Coord::new(x, y), Pixel::WHITE).unwrap();
        }
    }
    grid
}

// ============================================================================
// Grid
// ============================================================================

#[test]
fn test_set_get_round_trip_everywhere() {
    let mut grid = PixelGrid::new(7, 5);
    for coord in grid.coords().collect::<Vec<_>>() {
        let p = Pixel::new(coord.x as u8 * 30, coord.y as u8 * 40, 7, Opacity::LEVELS[coord.x % 5]);
        grid.set(coord, p).unwrap();
        assert_eq!(grid.get(coord).unwrap(), p);
    }
    assert!(matches!(
        grid.get(Coord::new(7, 0)),
        Err(TransformError::OutOfBounds { x: 7, y: 0, width: 7, height: 5 })
    ));
}

#[test]
fn test_delta_properties() {
    let a = Pixel::rgb(12, 200, 90);
    let b = Pixel::new(40, 10, 90, Opacity::Half);
    assert_eq!(PixelGrid::delta(a, b), PixelGrid::delta(b, a));
    assert_eq!(PixelGrid::delta(a, a), 0);
    assert_eq!(PixelGrid::delta(Pixel::BLACK, Pixel::WHITE), 765);
}

#[test]
fn test_rgba_buffer_quantizes_alpha() {
    let data = [1u8, 2, 3, 200, 4, 5, 6, 255];
    let grid = PixelGrid::from_rgba(&data, 2, 1).unwrap();
    assert_eq!(grid.opacity(Coord::new(0, 0)).unwrap(), Opacity::ThreeQuarter);
    assert_eq!(grid.to_rgba(), vec![1, 2, 3, 191, 4, 5, 6, 255]);
    assert!(PixelGrid::from_rgba(&data, 3, 1).is_err());
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn test_edge_filter_marks_column_boundary() {
    let handle = ExecutionHandle::new(
        Transform::independent(EdgeFilter::new(RED, 1, 100, true)),
        black_white(),
    );
    assert_eq!(handle.status(), ExecutionStatus::NotStarted);
    handle.submit().unwrap();
    assert_eq!(handle.wait_until_finished(None), ExecutionStatus::Success);

    let out = handle.result().unwrap();
    for y in 0..10 {
        for x in 0..10 {
            let expected = if x == 4 || x == 5 { RED } else { Pixel::CLEAR };
            assert_eq!(out.get(Coord::new(x, y)).unwrap(), expected, "at ({x}, {y})");
        }
    }
}

#[test]
fn test_average_filter_star_mean() {
    let mut grid = PixelGrid::filled(5, 5, Pixel::rgb(9, 9, 9));
    grid.set(Coord::new(2, 2), Pixel::rgb(10, 100, 0)).unwrap();
    grid.set(Coord::new(2, 1), Pixel::rgb(20, 90, 5)).unwrap();
    grid.set(Coord::new(3, 2), Pixel::rgb(30, 80, 10)).unwrap();
    grid.set(Coord::new(2, 3), Pixel::rgb(40, 70, 15)).unwrap();
    grid.set(Coord::new(1, 2), Pixel::rgb(50, 60, 20)).unwrap();

    let out = Executor::new()
        .with_parallel_visits(true)
        .run(Transform::independent(AverageFilter::new(1)), grid)
        .unwrap();
    assert_eq!(out.get(Coord::new(2, 2)).unwrap(), Pixel::rgb(30, 80, 10));
}

#[test]
fn test_handle_lifecycle() {
    let handle = ExecutionHandle::new(Transform::independent(AverageFilter::new(1)), PixelGrid::new(3, 3));
    assert!(matches!(handle.result(), Err(TransformError::InvalidState(_))));
    assert_eq!(handle.wait_until_finished(Some(Duration::from_millis(5))), ExecutionStatus::NotStarted);

    handle.submit().unwrap();
    assert!(matches!(handle.submit(), Err(TransformError::InvalidState(_))));

    let status = handle.wait_until_finished(None);
    assert_eq!(status, ExecutionStatus::Success);
    assert_eq!(handle.status(), ExecutionStatus::Success);
    assert!(handle.result().is_ok());
    assert!(matches!(handle.result(), Err(TransformError::InvalidState(_))));
}

#[test]
fn test_configured_huge_size_runs() {
    let transform = TransformConfig::from_json(r#"{"kind": "average", "size": 18446744073709551615}"#)
        .unwrap()
        .build()
        .unwrap();
    let grid = PixelGrid::filled(4, 4, Pixel::rgb(33, 66, 99));
    let handle = Executor::new().submit(transform, grid.copy()).unwrap();

    assert_eq!(handle.wait_until_finished(None), ExecutionStatus::Success, "{:?}", handle.messages());
    assert_eq!(handle.result().unwrap(), grid);
}

#[test]
fn test_failure_keeps_messages() {
    let bad = RegionGrowerConfig {
        min_size: 3,
        max_size: 1,
        ..RegionGrowerConfig::default()
    };
    let handle = Executor::new()
        .submit(Transform::dependent(RegionRecolor::new(bad)), PixelGrid::new(4, 4))
        .unwrap();

    assert_eq!(handle.wait_until_finished(None), ExecutionStatus::Failure);
    assert!(matches!(handle.result(), Err(TransformError::InvalidState(_))));
    let messages = handle.messages();
    assert!(messages.iter().any(|m| m.contains("exceeds max_size")), "{messages:?}");
}

// ============================================================================
// Region growing
// ============================================================================

#[test]
fn test_fixed_size_regions_flag_shortfall() {
    let grid = black_white();
    let grower = RegionGrower::new(RegionGrowerConfig {
        min_size: 7,
        max_size: 7,
        rounding_interval: 2,
        delta_threshold: 50,
        traversal: TraversalOrder::Randomized,
        seed: Some(2024),
        partition: true,
        frontier_fallback: true,
    })
    .unwrap();

    let mut covered = 0;
    for region in grower.generate(&grid) {
        let region = region.unwrap();
        let len = region.selection.len();
        assert!(len <= 7);
        assert_eq!(region.exhausted(), len < 7);
        covered += len;
    }
    assert_eq!(covered, 100);
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn test_pipeline_from_json() {
    let config = PipelineConfig::from_json(
        r#"{
            "parallel_visits": true,
            "stage_timeout_ms": 30000,
            "stages": [
                {"kind": "average", "size": 1, "delta": 30},
                {"kind": "edge", "name": "outline", "color": {"r": 255, "g": 0, "b": 0}, "size": 1, "delta": 100, "edges_only": true}
            ]
        }"#,
    )
    .unwrap();

    let output = Pipeline::from_config(&config).unwrap().run(black_white()).unwrap();
    let names: Vec<&str> = output.stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["average", "outline"]);
    assert_eq!(output.grid.get(Coord::new(4, 3)).unwrap(), RED);
    assert_eq!(output.grid.get(Coord::new(0, 3)).unwrap(), Pixel::CLEAR);
}

#[test]
fn test_pipeline_stops_at_failed_stage() {
    let config = PipelineConfig::from_json(
        r#"{"stages": [{"kind": "regions", "grower": {"min_size": 9, "max_size": 3}}]}"#,
    );
    // Rejected while loading
    assert!(config.is_err());

    let bad = RegionGrowerConfig {
        min_size: 9,
        max_size: 3,
        ..RegionGrowerConfig::default()
    };
    let err = Pipeline::new(Executor::new())
        .stage("segment", Transform::dependent(RegionRecolor::new(bad)))
        .run(black_white())
        .unwrap_err();
    assert!(matches!(err, PipelineError::StageFailed { ref stage, .. } if stage == "segment"));
}
