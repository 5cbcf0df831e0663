//! Pixel storage for the transform engine.
//!
//! - **Pixel**: RGB channels plus one of five discrete opacity levels
//! - **PixelGrid**: fixed-size row-major grid with bounds-checked access
//! - **Coord**: `(x, y)` position validated against the grid it indexes

pub mod pixel;
pub mod pixel_grid;

pub use pixel::{Opacity, Pixel};
pub(crate) use pixel::PixelAccumulator;
pub use pixel_grid::{Coord, PixelGrid, NEIGHBOR_OFFSETS};
