//! Star-neighborhood averaging.
//!
//! Plain mode averages the whole star around each pixel. With a delta, only
//! neighbors within that color distance of the center take part, which
//! smooths flat areas while keeping edges sharp.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Coord, Pixel, PixelGrid};
use crate::selection::Selection;
use crate::transform::{Diagnostics, IndependentTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageFilter {
    /// Star radius (Manhattan distance)
    pub size: usize,
    /// Edge-preserving cutoff; `None` averages the whole star
    #[serde(default)]
    pub delta: Option<u32>,
}

impl AverageFilter {
    pub fn new(size: usize) -> Self {
        Self { size, delta: None }
    }

    pub fn with_delta(size: usize, delta: u32) -> Self {
        Self {
            size,
            delta: Some(delta),
        }
    }
}

impl IndependentTransform for AverageFilter {
    fn name(&self) -> &str {
        "average"
    }

    fn visit(&self, input: &PixelGrid, coord: Coord, _: &Diagnostics) -> Result<Pixel> {
        let star = Selection::star(input, coord, self.size)?;
        let Some(delta) = self.delta else {
            return star.average(input);
        };

        let center = input.get(coord)?;
        let mut similar = Selection::new();
        for member in star.iter() {
            if input.get(member)?.delta(center) <= delta {
                similar.insert(member);
            }
        }
        similar.average(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn run(filter: AverageFilter, grid: &PixelGrid) -> PixelGrid {
        Transform::independent(filter)
            .run(grid, &Diagnostics::new(), false)
            .unwrap()
    }

    #[test]
    fn test_uniform_grid_unchanged() {
        let grid = PixelGrid::filled(6, 5, Pixel::rgb(17, 99, 201));
        assert_eq!(run(AverageFilter::new(2), &grid), grid);
    }

    #[test]
    fn test_star_mean_per_channel() {
        let mut grid = PixelGrid::filled(3, 3, Pixel::BLACK);
        grid.set(Coord::new(1, 1), Pixel::rgb(50, 0, 10)).unwrap();
        grid.set(Coord::new(1, 0), Pixel::rgb(100, 5, 20)).unwrap();
        grid.set(Coord::new(2, 1), Pixel::rgb(150, 10, 30)).unwrap();
        grid.set(Coord::new(1, 2), Pixel::rgb(200, 15, 40)).unwrap();
        grid.set(Coord::new(0, 1), Pixel::rgb(0, 20, 50)).unwrap();

        let out = run(AverageFilter::new(1), &grid);
        // (50+100+150+200+0)/5, (0+5+10+15+20)/5, (10+20+30+40+50)/5
        assert_eq!(out.get(Coord::new(1, 1)).unwrap(), Pixel::rgb(100, 10, 30));
    }

    #[test]
    fn test_delta_preserves_edges() {
        let mut grid = PixelGrid::filled(4, 1, Pixel::BLACK);
        grid.set(Coord::new(2, 0), Pixel::WHITE).unwrap();
        grid.set(Coord::new(3, 0), Pixel::WHITE).unwrap();

        let blurred = run(AverageFilter::new(1), &grid);
        assert_ne!(blurred.get(Coord::new(1, 0)).unwrap(), Pixel::BLACK);

        let preserved = run(AverageFilter::with_delta(1, 30), &grid);
        assert_eq!(preserved, grid);
    }
}
