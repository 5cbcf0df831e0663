//! Region growing over a whole grid.
//!
//! A [`RegionGrower`] walks start coordinates in sequential or shuffled
//! order and grows one [`Selection`] per start. Growth alternates between
//! closest-color steps and periodic roundest steps, and stops once the
//! region reaches its target size or runs out of eligible neighbors.
//!
//! The sequence is produced lazily by [`Regions`], which can only be
//! consumed once. A fresh `generate` call with the same seed reproduces
//! the same regions; without a seed, randomized runs differ.

use std::collections::HashSet;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::region::Selection;
use crate::error::{Result, TransformError};
use crate::grid::{Coord, PixelGrid};

/// Order in which start coordinates are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Row-major
    #[default]
    Sequential,
    /// Shuffled once per `generate` call
    Randomized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionGrowerConfig {
    /// Smallest target region size, in coordinates
    pub min_size: usize,
    /// Largest target region size, in coordinates
    pub max_size: usize,
    /// Every n-th growth step uses the roundest neighbor (0 = never)
    pub rounding_interval: usize,
    /// Candidates must be strictly closer than this to the region's average
    pub delta_threshold: u32,
    pub traversal: TraversalOrder,
    /// Seed for shuffling and size choice; entropy when absent
    pub seed: Option<u64>,
    /// Skip coordinates already claimed by an earlier region
    pub partition: bool,
    /// When the last member has no eligible neighbor, search the whole
    /// frontier before stopping
    pub frontier_fallback: bool,
}

impl Default for RegionGrowerConfig {
    fn default() -> Self {
        Self {
            min_size: 8,
            max_size: 32,
            rounding_interval: 4,
            delta_threshold: 96,
            traversal: TraversalOrder::Sequential,
            seed: None,
            partition: true,
            frontier_fallback: true,
        }
    }
}

impl RegionGrowerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(TransformError::InvalidConfig("min_size must be at least 1".into()));
        }
        if self.min_size > self.max_size {
            return Err(TransformError::InvalidConfig(format!(
                "min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

/// One grown region and the size it was aiming for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrownRegion {
    pub selection: Selection,
    pub target_size: usize,
}

impl GrownRegion {
    /// Whether growth reached the target size.
    pub fn is_complete(&self) -> bool {
        self.selection.len() >= self.target_size
    }

    /// Whether growth stopped early for lack of eligible neighbors.
    pub fn exhausted(&self) -> bool {
        !self.is_complete()
    }
}

#[derive(Debug, Clone)]
pub struct RegionGrower {
    config: RegionGrowerConfig,
}

impl RegionGrower {
    pub fn new(config: RegionGrowerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RegionGrowerConfig {
        &self.config
    }

    /// Lazily grow regions over `grid`.
    pub fn generate<'g>(&self, grid: &'g PixelGrid) -> Regions<'g> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut order: Vec<Coord> = grid.coords().collect();
        if self.config.traversal == TraversalOrder::Randomized {
            order.shuffle(&mut rng);
        }

        debug!(
            "Growing regions over {}x{} grid ({:?}, sizes {}..={})",
            grid.width(),
            grid.height(),
            self.config.traversal,
            self.config.min_size,
            self.config.max_size
        );

        Regions {
            grid,
            config: self.config.clone(),
            order: order.into_iter(),
            claimed: HashSet::new(),
            rng,
        }
    }
}

/// Single-pass iterator over grown regions.
pub struct Regions<'g> {
    grid: &'g PixelGrid,
    config: RegionGrowerConfig,
    order: std::vec::IntoIter<Coord>,
    claimed: HashSet<Coord>,
    rng: StdRng,
}

impl Regions<'_> {
    fn target_size(&mut self) -> usize {
        if self.config.min_size == self.config.max_size {
            self.config.min_size
        } else {
            self.rng.gen_range(self.config.min_size..=self.config.max_size)
        }
    }

    fn grow(&self, start: Coord, target: usize) -> Result<Selection> {
        let mut selection = Selection::with_origin(start);
        let claimed = &self.claimed;
        let partition = self.config.partition;
        let eligible = |c: Coord| !partition || !claimed.contains(&c);

        let mut step = 1;
        while selection.len() < target {
            let rounding = self.config.rounding_interval > 0 && step % self.config.rounding_interval == 0;
            let threshold = self.config.delta_threshold;
            let next = if rounding {
                selection.roundest_candidate(self.grid, threshold, &eligible)?
            } else {
                match selection.closest_color_candidate(self.grid, threshold, &eligible)? {
                    None if self.config.frontier_fallback => {
                        selection.roundest_candidate(self.grid, threshold, &eligible)?
                    }
                    next => next,
                }
            };
            match next {
                Some(coord) => {
                    selection.insert(coord);
                }
                None => break,
            }
            step += 1;
        }

        Ok(selection)
    }
}

impl Iterator for Regions<'_> {
    type Item = Result<GrownRegion>;

    fn next(&mut self) -> Option<Result<GrownRegion>> {
        loop {
            let start = self.order.next()?;
            if self.config.partition && self.claimed.contains(&start) {
                continue;
            }

            let target_size = self.target_size();
            let selection = match self.grow(start, target_size) {
                Ok(selection) => selection,
                Err(err) => {
                    debug!("Region growth from {:?} aborted: {}", start, err);
                    // Fuse: nothing more is produced after an error
                    self.order = Vec::new().into_iter();
                    return Some(Err(err));
                }
            };

            if self.config.partition {
                self.claimed.extend(selection.iter());
            }
            return Some(Ok(GrownRegion {
                selection,
                target_size,
            }));
        }
    }
}
