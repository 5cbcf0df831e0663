//! Star-based edge marking.
//!
//! A pixel is an edge when the average delta between its star members and
//! the pixel itself reaches the threshold. Edge pixels are painted with the
//! marker color; the rest are copied through or cleared.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::grid::{Coord, Pixel, PixelGrid};
use crate::selection::Selection;
use crate::transform::{Diagnostics, IndependentTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFilter {
    /// Marker painted on edge pixels
    pub color: Pixel,
    /// Star radius
    pub size: usize,
    /// Minimum average delta for an edge
    pub delta: u32,
    /// Clear non-edge pixels instead of copying them
    #[serde(default)]
    pub edges_only: bool,
}

impl EdgeFilter {
    pub fn new(color: Pixel, size: usize, delta: u32, edges_only: bool) -> Self {
        Self {
            color,
            size,
            delta,
            edges_only,
        }
    }

    /// Whether `coord` counts as an edge in `input`.
    pub fn is_edge(&self, input: &PixelGrid, coord: Coord) -> Result<bool> {
        let star = Selection::star(input, coord, self.size)?;
        match star.average_delta(input) {
            Ok(delta) => Ok(delta >= self.delta),
            Err(TransformError::EmptySelection) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl IndependentTransform for EdgeFilter {
    fn name(&self) -> &str {
        "edge"
    }

    fn visit(&self, input: &PixelGrid, coord: Coord, _: &Diagnostics) -> Result<Pixel> {
        if self.is_edge(input, coord)? {
            Ok(self.color)
        } else if self.edges_only {
            Ok(Pixel::CLEAR)
        } else {
            input.get(coord)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    const RED: Pixel = Pixel::rgb(255, 0, 0);

    fn run(filter: EdgeFilter, grid: &PixelGrid) -> PixelGrid {
        Transform::independent(filter)
            .run(grid, &Diagnostics::new(), false)
            .unwrap()
    }

    fn split(width: usize, height: usize, at: usize) -> PixelGrid {
        let mut grid = PixelGrid::filled(width, height, Pixel::BLACK);
        for coord in grid.coords().collect::<Vec<_>>() {
            if coord.x >= at {
                grid.set(coord, Pixel::WHITE).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_uniform_grid_has_no_edges() {
        let grid = PixelGrid::filled(5, 5, Pixel::rgb(40, 80, 120));
        let out = run(EdgeFilter::new(RED, 1, 10, true), &grid);
        assert!(out.pixels().all(|&p| p == Pixel::CLEAR));
    }

    #[test]
    fn test_marks_both_sides_of_boundary() {
        let grid = split(10, 10, 5);
        let out = run(EdgeFilter::new(RED, 1, 100, true), &grid);
        for coord in grid.coords() {
            let expected = if coord.x == 4 || coord.x == 5 { RED } else { Pixel::CLEAR };
            assert_eq!(out.get(coord).unwrap(), expected, "at {coord:?}");
        }
    }

    #[test]
    fn test_non_edges_copied_when_not_edges_only() {
        let grid = split(6, 3, 3);
        let out = run(EdgeFilter::new(RED, 1, 100, false), &grid);
        assert_eq!(out.get(Coord::new(0, 1)).unwrap(), Pixel::BLACK);
        assert_eq!(out.get(Coord::new(5, 1)).unwrap(), Pixel::WHITE);
        assert_eq!(out.get(Coord::new(2, 1)).unwrap(), RED);
    }

    #[test]
    fn test_high_threshold_suppresses_edges() {
        let grid = split(6, 3, 3);
        let out = run(EdgeFilter::new(RED, 1, 766, true), &grid);
        assert!(out.pixels().all(|&p| p == Pixel::CLEAR));
    }
}
