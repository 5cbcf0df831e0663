//! Neighbor search strategies for growing a selection one step at a time.
//!
//! Both strategies compare candidates against the selection's running
//! average color and only accept candidates whose delta is strictly below
//! the threshold:
//! - **Closest color**: looks only around the most recently added member
//!   and picks the most similar neighbor, producing organic color-coherent
//!   growth.
//! - **Roundest**: looks at the whole frontier and picks the candidate that
//!   keeps member distances to the centroid most uniform, used periodically
//!   to stop regions from turning into long spikes.

use std::collections::HashSet;

use super::region::Selection;
use crate::error::{Result, TransformError};
use crate::grid::{Coord, PixelGrid};

/// Scores within this distance count as a tie.
const ROUNDNESS_EPSILON: f64 = 1e-9;

impl Selection {
    /// Most similar unselected neighbor of the last added member.
    ///
    /// Returns `Ok(None)` when no in-bounds neighbor is within `threshold`.
    pub fn closest_color_neighbor(&self, grid: &PixelGrid, threshold: u32) -> Result<Option<Coord>> {
        if self.is_empty() {
            return Err(TransformError::EmptySelection);
        }
        self.closest_color_candidate(grid, threshold, |_| true)
    }

    /// Frontier candidate that keeps the selection closest to circular.
    ///
    /// Returns `Ok(None)` when no frontier coordinate is within `threshold`.
    pub fn roundest_neighbor(&self, grid: &PixelGrid, threshold: u32) -> Result<Option<Coord>> {
        if self.is_empty() {
            return Err(TransformError::EmptySelection);
        }
        self.roundest_candidate(grid, threshold, |_| true)
    }

    /// Closest-color search restricted to coordinates accepted by `eligible`.
    pub(crate) fn closest_color_candidate<F>(
        &self,
        grid: &PixelGrid,
        threshold: u32,
        eligible: F,
    ) -> Result<Option<Coord>>
    where
        F: Fn(Coord) -> bool,
    {
        let Some(last) = self.last() else {
            return Ok(None);
        };
        let reference = self.average(grid)?;

        let mut best: Option<(u32, Coord)> = None;
        for neighbor in grid.neighbors(last) {
            if self.contains(neighbor) || !eligible(neighbor) {
                continue;
            }
            let delta = grid.get(neighbor)?.delta(reference);
            if delta >= threshold {
                continue;
            }
            if best.map_or(true, |(best_delta, _)| delta < best_delta) {
                best = Some((delta, neighbor));
            }
        }

        Ok(best.map(|(_, coord)| coord))
    }

    /// Roundest search restricted to coordinates accepted by `eligible`.
    pub(crate) fn roundest_candidate<F>(
        &self,
        grid: &PixelGrid,
        threshold: u32,
        eligible: F,
    ) -> Result<Option<Coord>>
    where
        F: Fn(Coord) -> bool,
    {
        if self.is_empty() {
            return Ok(None);
        }
        let reference = self.average(grid)?;

        let mut seen = HashSet::new();
        let mut best: Option<(f64, u32, Coord)> = None;
        for member in self.iter() {
            for candidate in grid.neighbors(member) {
                if self.contains(candidate) || !eligible(candidate) || !seen.insert(candidate) {
                    continue;
                }
                let delta = grid.get(candidate)?.delta(reference);
                if delta >= threshold {
                    continue;
                }
                let score = self.radial_variance_with(candidate);
                let better = match best {
                    None => true,
                    Some((best_score, best_delta, _)) => {
                        score < best_score - ROUNDNESS_EPSILON
                            || ((score - best_score).abs() <= ROUNDNESS_EPSILON && delta < best_delta)
                    }
                };
                if better {
                    best = Some((score, delta, candidate));
                }
            }
        }

        Ok(best.map(|(_, _, coord)| coord))
    }

    /// Variance of member distances to the centroid after adding `extra`.
    fn radial_variance_with(&self, extra: Coord) -> f64 {
        let n = (self.len() + 1) as f64;
        let (sx, sy) = self
            .iter()
            .chain(std::iter::once(extra))
            .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x as f64, sy + c.y as f64));
        let (cx, cy) = (sx / n, sy / n);

        let (sum, sum_sq) = self
            .iter()
            .chain(std::iter::once(extra))
            .map(|c| {
                let dx = c.x as f64 - cx;
                let dy = c.y as f64 - cy;
                (dx * dx + dy * dy).sqrt()
            })
            .fold((0.0, 0.0), |(s, sq), d| (s + d, sq + d * d));

        let mean = sum / n;
        (sum_sq / n - mean * mean).max(0.0)
    }
}
