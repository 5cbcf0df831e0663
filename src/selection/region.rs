//! Insertion-ordered coordinate sets and their aggregates.
//!
//! A [`Selection`] is built up by an algorithm (star construction, region
//! growth, brush search) and then read by consumers for statistics and
//! border extraction. The first inserted coordinate is the selection's
//! origin and serves as the reference pixel for [`Selection::average_delta`].
//!
//! Connectivity is 4-connected throughout: neighbor search, growth and
//! border extraction all use the north/east/south/west offsets.

use std::collections::HashSet;

use crate::error::{Result, TransformError};
use crate::grid::{Coord, Opacity, Pixel, PixelAccumulator, PixelGrid, NEIGHBOR_OFFSETS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    members: Vec<Coord>,
    index: HashSet<Coord>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection holding only `origin`.
    pub fn with_origin(origin: Coord) -> Self {
        let mut selection = Self::new();
        selection.insert(origin);
        selection
    }

    /// Diamond-shaped neighborhood: every coordinate within Manhattan
    /// distance `radius` of `center`, clipped to the grid.
    ///
    /// The center is inserted first (and becomes the origin), the rest follow
    /// in row-major order.
    pub fn star(grid: &PixelGrid, center: Coord, radius: usize) -> Result<Self> {
        grid.get(center)?;
        let mut selection = Self::with_origin(center);

        let y_start = center.y.saturating_sub(radius);
        let y_end = center.y.saturating_add(radius).min(grid.height() - 1);
        for y in y_start..=y_end {
            let reach = radius - center.y.abs_diff(y);
            let x_start = center.x.saturating_sub(reach);
            let x_end = center.x.saturating_add(reach).min(grid.width() - 1);
            for x in x_start..=x_end {
                selection.insert(Coord::new(x, y));
            }
        }

        Ok(selection)
    }

    /// Add a coordinate. Returns `false` if it was already a member.
    pub fn insert(&mut self, coord: Coord) -> bool {
        if self.index.insert(coord) {
            self.members.push(coord);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        self.index.contains(&coord)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.members.iter().copied()
    }

    pub fn coords(&self) -> &[Coord] {
        &self.members
    }

    /// First inserted coordinate.
    pub fn origin(&self) -> Option<Coord> {
        self.members.first().copied()
    }

    /// Most recently inserted coordinate.
    pub fn last(&self) -> Option<Coord> {
        self.members.last().copied()
    }

    /// Mean member position.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let (sx, sy) = self
            .members
            .iter()
            .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x as f64, sy + c.y as f64));
        Some((sx / n, sy / n))
    }

    /// Channel-wise mean of all member pixels.
    pub fn average(&self, grid: &PixelGrid) -> Result<Pixel> {
        let mut acc = PixelAccumulator::default();
        for &coord in &self.members {
            acc.add(grid.get(coord)?);
        }
        acc.mean().ok_or(TransformError::EmptySelection)
    }

    /// Mean delta between each member and the pixel at the origin.
    pub fn average_delta(&self, grid: &PixelGrid) -> Result<u32> {
        let origin = self.origin().ok_or(TransformError::EmptySelection)?;
        let reference = grid.get(origin)?;
        let mut total = 0u64;
        for &coord in &self.members {
            total += grid.get(coord)?.delta(reference) as u64;
        }
        Ok((total / self.len() as u64) as u32)
    }

    /// Members adjacent to a non-member or to the grid edge.
    pub fn border(&self, grid: &PixelGrid) -> Selection {
        self.members
            .iter()
            .copied()
            .filter(|&coord| {
                NEIGHBOR_OFFSETS.iter().any(|&(dx, dy)| match grid.offset(coord, dx, dy) {
                    Some(neighbor) => !self.contains(neighbor),
                    None => true,
                })
            })
            .collect()
    }

    /// Members that are not on the border.
    pub fn interior(&self, grid: &PixelGrid) -> Selection {
        let border = self.border(grid);
        self.iter().filter(|c| !border.contains(*c)).collect()
    }

    /// Among the `radius`-stars centered on each member, the one holding the
    /// most pixels at or above `threshold` opacity.
    ///
    /// Returns `None` when even the best star has fewer than `min_count`
    /// qualifying pixels. The first maximum in member order wins.
    pub fn most_opaque(
        &self,
        grid: &PixelGrid,
        radius: usize,
        min_count: usize,
        threshold: Opacity,
    ) -> Result<Option<Selection>> {
        if self.is_empty() {
            return Err(TransformError::EmptySelection);
        }

        let mut best: Option<(usize, Selection)> = None;
        for &center in &self.members {
            let star = Selection::star(grid, center, radius)?;
            let mut count = 0;
            for coord in star.iter() {
                if grid.opacity(coord)? >= threshold {
                    count += 1;
                }
            }
            if best.as_ref().map_or(true, |(best_count, _)| count > *best_count) {
                best = Some((count, star));
            }
        }

        Ok(best
            .filter(|(count, _)| *count >= min_count)
            .map(|(_, star)| star))
    }
}

impl FromIterator<Coord> for Selection {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut selection = Selection::new();
        selection.extend(iter);
        selection
    }
}

impl Extend<Coord> for Selection {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for coord in iter {
            self.insert(coord);
        }
    }
}
