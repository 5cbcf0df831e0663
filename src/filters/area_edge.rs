//! Windowed-average edge detection.
//!
//! Instead of comparing single pixels, each pixel compares the average color
//! of the `size` columns to its left against the `size` columns starting at
//! itself (and likewise rows above vs. rows from itself down). Averaging
//! over a window suppresses noise, and the asymmetric split marks exactly
//! the first pixel of the new color, giving one-pixel-wide edge lines.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Coord, Pixel, PixelAccumulator, PixelGrid};
use crate::transform::{Diagnostics, IndependentTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaEdgeTransform {
    pub color: Pixel,
    /// Window depth on each side, and half the window span across
    pub size: usize,
    pub delta: u32,
    #[serde(default)]
    pub edges_only: bool,
}

impl AreaEdgeTransform {
    pub fn new(color: Pixel, size: usize, delta: u32, edges_only: bool) -> Self {
        Self {
            color,
            size,
            delta,
            edges_only,
        }
    }

    /// Average over `xs × ys`, clipped to the grid.
    fn window_mean(
        input: &PixelGrid,
        xs: std::ops::Range<usize>,
        ys: std::ops::Range<usize>,
    ) -> Result<Option<Pixel>> {
        let mut acc = PixelAccumulator::default();
        for y in ys.start..ys.end.min(input.height()) {
            for x in xs.start..xs.end.min(input.width()) {
                acc.add(input.get(Coord::new(x, y))?);
            }
        }
        Ok(acc.mean())
    }

    /// Largest delta between the before/after windows in either direction.
    fn window_delta(&self, input: &PixelGrid, coord: Coord) -> Result<u32> {
        let size = self.size.max(1);
        let (x0, y0) = (coord.x.saturating_sub(size), coord.y.saturating_sub(size));
        let span_x = x0..coord.x.saturating_add(size).saturating_add(1);
        let span_y = y0..coord.y.saturating_add(size).saturating_add(1);

        let left = Self::window_mean(input, x0..coord.x, span_y.clone())?;
        let right = Self::window_mean(input, coord.x..coord.x.saturating_add(size), span_y)?;
        let above = Self::window_mean(input, span_x.clone(), y0..coord.y)?;
        let below = Self::window_mean(input, span_x, coord.y..coord.y.saturating_add(size))?;

        let horizontal = match (left, right) {
            (Some(a), Some(b)) => a.delta(b),
            _ => 0,
        };
        let vertical = match (above, below) {
            (Some(a), Some(b)) => a.delta(b),
            _ => 0,
        };
        Ok(horizontal.max(vertical))
    }
}

impl IndependentTransform for AreaEdgeTransform {
    fn name(&self) -> &str {
        "area-edge"
    }

    fn visit(&self, input: &PixelGrid, coord: Coord, _: &Diagnostics) -> Result<Pixel> {
        if self.window_delta(input, coord)? >= self.delta {
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

    const BLUE: Pixel = Pixel::rgb(0, 0, 255);

    fn run(t: AreaEdgeTransform, grid: &PixelGrid) -> PixelGrid {
        Transform::independent(t)
            .run(grid, &Diagnostics::new(), true)
            .unwrap()
    }

    #[test]
    fn test_single_column_edge() {
        let mut grid = PixelGrid::filled(8, 6, Pixel::BLACK);
        for coord in grid.coords().collect::<Vec<_>>() {
            if coord.x >= 4 {
                grid.set(coord, Pixel::WHITE).unwrap();
            }
        }
        let out = run(AreaEdgeTransform::new(BLUE, 1, 300, true), &grid);
        for coord in grid.coords() {
            let expected = if coord.x == 4 { BLUE } else { Pixel::CLEAR };
            assert_eq!(out.get(coord).unwrap(), expected, "at {coord:?}");
        }
    }

    #[test]
    fn test_horizontal_boundary_detected() {
        let mut grid = PixelGrid::filled(5, 6, Pixel::rgb(200, 200, 200));
        for coord in grid.coords().collect::<Vec<_>>() {
            if coord.y >= 3 {
                grid.set(coord, Pixel::rgb(20, 20, 20)).unwrap();
            }
        }
        let out = run(AreaEdgeTransform::new(BLUE, 2, 200, false), &grid);
        assert_eq!(out.get(Coord::new(2, 3)).unwrap(), BLUE);
        assert_eq!(out.get(Coord::new(2, 0)).unwrap(), Pixel::rgb(200, 200, 200));
        assert_eq!(out.get(Coord::new(2, 5)).unwrap(), Pixel::rgb(20, 20, 20));
    }

    #[test]
    fn test_isolated_noise_is_damped() {
        let mut grid = PixelGrid::filled(7, 7, Pixel::rgb(100, 100, 100));
        grid.set(Coord::new(3, 3), Pixel::rgb(160, 100, 100)).unwrap();
        // Every window holding the outlier has at least 8 pixels
        let out = run(AreaEdgeTransform::new(BLUE, 2, 30, true), &grid);
        assert!(out.pixels().all(|&p| p == Pixel::CLEAR));
    }

    #[test]
    fn test_huge_window_clipped_to_grid() {
        let flat = PixelGrid::filled(4, 3, Pixel::rgb(70, 70, 70));
        let out = run(AreaEdgeTransform::new(BLUE, usize::MAX, 1, true), &flat);
        assert!(out.pixels().all(|&p| p == Pixel::CLEAR));

        let mut split = PixelGrid::filled(6, 2, Pixel::BLACK);
        for coord in split.coords().collect::<Vec<_>>() {
            if coord.x >= 3 {
                split.set(coord, Pixel::WHITE).unwrap();
            }
        }
        let out = run(AreaEdgeTransform::new(BLUE, usize::MAX, 300, true), &split);
        assert_eq!(out.get(Coord::new(3, 0)).unwrap(), BLUE);
    }
}
