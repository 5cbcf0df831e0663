//! Soft edges for painted areas.
//!
//! The opacity of a painted pixel is lowered to match how much of its
//! star is painted, so shapes fade out toward their outline. A pixel never
//! becomes more opaque than it was, and never fully disappears.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Coord, Opacity, Pixel, PixelGrid};
use crate::selection::Selection;
use crate::transform::{Diagnostics, IndependentTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatherTransform {
    pub radius: usize,
}

impl FeatherTransform {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl IndependentTransform for FeatherTransform {
    fn name(&self) -> &str {
        "feather"
    }

    fn visit(&self, input: &PixelGrid, coord: Coord, _: &Diagnostics) -> Result<Pixel> {
        let pixel = input.get(coord)?;
        if pixel.is_transparent() {
            return Ok(pixel);
        }

        let star = Selection::star(input, coord, self.radius)?;
        let mut painted = 0usize;
        for member in star.iter() {
            if !input.is_transparent(member)? {
                painted += 1;
            }
        }

        let coverage = Opacity::from_fraction(painted as f32 / star.len() as f32).max(Opacity::Quarter);
        Ok(pixel.with_opacity(pixel.opacity.min(coverage)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn run(radius: usize, grid: &PixelGrid) -> PixelGrid {
        Transform::independent(FeatherTransform::new(radius))
            .run(grid, &Diagnostics::new(), false)
            .unwrap()
    }

    #[test]
    fn test_fades_toward_outline() {
        let mut grid = PixelGrid::filled(5, 5, Pixel::rgb(90, 60, 30));
        for y in 0..5 {
            grid.set(Coord::new(0, y), Pixel::CLEAR).unwrap();
        }
        let out = run(1, &grid);

        // four of five star members painted
        assert_eq!(out.opacity(Coord::new(1, 2)).unwrap(), Opacity::ThreeQuarter);
        assert_eq!(out.opacity(Coord::new(3, 2)).unwrap(), Opacity::Opaque);
        assert_eq!(out.get(Coord::new(0, 2)).unwrap(), Pixel::CLEAR);
        // color survives
        let p = out.get(Coord::new(1, 2)).unwrap();
        assert_eq!((p.r, p.g, p.b), (90, 60, 30));
    }

    #[test]
    fn test_isolated_pixel_keeps_quarter() {
        let mut grid = PixelGrid::new(5, 5);
        grid.set(Coord::new(2, 2), Pixel::WHITE).unwrap();
        let out = run(2, &grid);
        assert_eq!(out.opacity(Coord::new(2, 2)).unwrap(), Opacity::Quarter);
    }

    #[test]
    fn test_never_raises_opacity() {
        let grid = PixelGrid::filled(3, 3, Pixel::new(1, 2, 3, Opacity::Half));
        assert_eq!(run(1, &grid), grid);
    }
}
