//! Directional edge detection with run filtering.
//!
//! Each scan compares a pixel with the one before it (to the left for
//! horizontal scans, above for vertical ones). Marks are then kept only
//! when they form a contiguous line across the scan direction, which drops
//! isolated specks and keeps real boundaries.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Coord, Pixel, PixelGrid};
use crate::transform::{DependentTransform, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    /// Left to right, finds vertical boundaries
    Horizontal,
    /// Top to bottom, finds horizontal boundaries
    Vertical,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearEdgeTransform {
    pub color: Pixel,
    pub delta: u32,
    /// Shortest line of marks that survives filtering
    pub min_run: usize,
    #[serde(default)]
    pub direction: ScanDirection,
    #[serde(default)]
    pub edges_only: bool,
}

impl LinearEdgeTransform {
    pub fn new(color: Pixel, delta: u32, min_run: usize) -> Self {
        Self {
            color,
            delta,
            min_run,
            direction: ScanDirection::Both,
            edges_only: false,
        }
    }

    pub fn with_direction(mut self, direction: ScanDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn edges_only(mut self, edges_only: bool) -> Self {
        self.edges_only = edges_only;
        self
    }

    /// Marks where a pixel differs from its predecessor offset by
    /// `(dx, dy)`. The mask is indexed `[[y, x]]`.
    fn scan(&self, input: &PixelGrid, dx: usize, dy: usize) -> Result<Array2<bool>> {
        let mut mask = Array2::from_elem((input.height(), input.width()), false);
        for coord in input.coords() {
            if coord.x < dx || coord.y < dy {
                continue;
            }
            let previous = input.get(Coord::new(coord.x - dx, coord.y - dy))?;
            if input.get(coord)?.delta(previous) >= self.delta {
                mask[[coord.y, coord.x]] = true;
            }
        }
        Ok(mask)
    }

    /// Keep only runs of at least `min_run` marks along `axis`.
    fn keep_runs(&self, mask: &Array2<bool>, axis: Axis) -> Array2<bool> {
        let mut kept = Array2::from_elem(mask.raw_dim(), false);
        for (mut out, lane) in kept.lanes_mut(axis).into_iter().zip(mask.lanes(axis)) {
            let n = lane.len();
            let mut run = 0;
            for i in 0..=n {
                if i < n && lane[i] {
                    run += 1;
                    continue;
                }
                if run >= self.min_run {
                    for j in i - run..i {
                        out[j] = true;
                    }
                }
                run = 0;
            }
        }
        kept
    }
}

impl DependentTransform for LinearEdgeTransform {
    fn name(&self) -> &str {
        "linear-edge"
    }

    fn process_image(
        &self,
        input: &PixelGrid,
        output: &mut PixelGrid,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        let mut edges = Array2::from_elem((input.height(), input.width()), false);

        if matches!(self.direction, ScanDirection::Horizontal | ScanDirection::Both) {
            // boundaries found left to right run top to bottom
            let marks = self.keep_runs(&self.scan(input, 1, 0)?, Axis(0));
            edges.zip_mut_with(&marks, |e, &m| *e |= m);
        }
        if matches!(self.direction, ScanDirection::Vertical | ScanDirection::Both) {
            let marks = self.keep_runs(&self.scan(input, 0, 1)?, Axis(1));
            edges.zip_mut_with(&marks, |e, &m| *e |= m);
        }

        let mut marked = 0usize;
        for coord in input.coords() {
            if edges[[coord.y, coord.x]] {
                output.set(coord, self.color)?;
                marked += 1;
            } else if self.edges_only {
                output.set(coord, Pixel::CLEAR)?;
            }
        }

        diagnostics.note(format!("linear-edge: marked {marked} pixels"));
        Ok(())
    }
}
