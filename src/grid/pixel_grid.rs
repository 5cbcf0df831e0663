//! Fixed-size 2-D pixel storage.
//!
//! Pixels are stored row-major in an `ndarray::Array2`, indexed `[[y, x]]`
//! like the `(height, width, channels)` arrays used at the crate boundary.
//! The grid is never resized after creation and carries no locking; a grid
//! shared between transforms is shared read-only.

use ndarray::{Array2, Array3, ArrayView3};

use super::pixel::{Opacity, Pixel};
use crate::error::{Result, TransformError};

/// 4-connected neighbor offsets: north, east, south, west.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Grid coordinate. Validity is always checked against the grid it indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another coordinate.
    #[inline]
    pub fn manhattan(self, other: Coord) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    pixels: Array2<Pixel>,
}

impl PixelGrid {
    /// Grid of cleared (transparent black) pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Pixel::CLEAR)
    }

    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            pixels: Array2::from_elem((height, width), pixel),
        }
    }

    /// Build from row-major pixels.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        let len = pixels.len();
        let pixels = Array2::from_shape_vec((height, width), pixels).map_err(|_| {
            TransformError::InvalidConfig(format!(
                "{len} pixels do not fill a {width}x{height} grid"
            ))
        })?;
        Ok(Self { pixels })
    }

    /// Build from a flat RGBA buffer (4 bytes per pixel), as produced by an
    /// image decoder. Alpha is quantized to the nearest opacity level.
    pub fn from_rgba(data: &[u8], width: usize, height: usize) -> Result<Self> {
        let expected = width.checked_mul(height).and_then(|n| n.checked_mul(4));
        if expected != Some(data.len()) {
            return Err(TransformError::InvalidConfig(format!(
                "RGBA buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        let pixels = data
            .chunks_exact(4)
            .map(|px| Pixel::from_rgba(px[0], px[1], px[2], px[3]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// Build from a `(height, width, channels)` array with 1, 3 or 4
    /// channels. Grayscale and RGB inputs are treated as fully opaque.
    pub fn from_array(input: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = input.dim();
        if !matches!(channels, 1 | 3 | 4) {
            return Err(TransformError::InvalidConfig(format!(
                "expected 1, 3 or 4 channels, got {channels}"
            )));
        }
        let pixels = Array2::from_shape_fn((height, width), |(y, x)| match channels {
            1 => {
                let v = input[[y, x, 0]];
                Pixel::rgb(v, v, v)
            }
            3 => Pixel::rgb(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]),
            _ => Pixel::from_rgba(
                input[[y, x, 0]],
                input[[y, x, 1]],
                input[[y, x, 2]],
                input[[y, x, 3]],
            ),
        });
        Ok(Self { pixels })
    }

    /// Flat RGBA buffer, 4 bytes per pixel, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgba()).collect()
    }

    /// `(height, width, 4)` RGBA array.
    pub fn to_array(&self) -> Array3<u8> {
        let (height, width) = self.pixels.dim();
        Array3::from_shape_fn((height, width, 4), |(y, x, c)| self.pixels[[y, x]].to_rgba()[c])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width() && coord.y < self.height()
    }

    fn check(&self, coord: Coord) -> Result<()> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(TransformError::OutOfBounds {
                x: coord.x,
                y: coord.y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    pub fn get(&self, coord: Coord) -> Result<Pixel> {
        self.check(coord)?;
        Ok(self.pixels[[coord.y, coord.x]])
    }

    pub fn set(&mut self, coord: Coord, pixel: Pixel) -> Result<()> {
        self.check(coord)?;
        self.pixels[[coord.y, coord.x]] = pixel;
        Ok(())
    }

    /// Dissimilarity between two pixels, see [`Pixel::delta`].
    #[inline]
    pub fn delta(a: Pixel, b: Pixel) -> u32 {
        a.delta(b)
    }

    /// Deep copy. Transforms work on copies so caller-owned grids are
    /// never mutated.
    pub fn copy(&self) -> PixelGrid {
        self.clone()
    }

    pub fn opacity(&self, coord: Coord) -> Result<Opacity> {
        Ok(self.get(coord)?.opacity)
    }

    pub fn is_opaque(&self, coord: Coord) -> Result<bool> {
        Ok(self.get(coord)?.is_opaque())
    }

    pub fn is_transparent(&self, coord: Coord) -> Result<bool> {
        Ok(self.get(coord)?.is_transparent())
    }

    /// Coordinate shifted by `(dx, dy)`, or `None` if it leaves the grid.
    #[inline]
    pub fn offset(&self, coord: Coord, dx: isize, dy: isize) -> Option<Coord> {
        let x = coord.x.checked_add_signed(dx)?;
        let y = coord.y.checked_add_signed(dy)?;
        let shifted = Coord::new(x, y);
        self.contains(shifted).then_some(shifted)
    }

    /// In-bounds 4-connected neighbors in north, east, south, west order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| self.offset(coord, dx, dy))
    }

    /// Whether the coordinate touches the grid edge.
    pub fn on_edge(&self, coord: Coord) -> bool {
        coord.x == 0
            || coord.y == 0
            || coord.x + 1 >= self.width()
            || coord.y + 1 >= self.height()
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (width, height) = (self.width(), self.height());
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    /// Row-major pixel iterator.
    pub fn pixels(&self) -> impl Iterator<Item = &Pixel> {
        self.pixels.iter()
    }
}
