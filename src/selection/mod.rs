//! Selections and region growing.
//!
//! This module provides the coordinate-set side of the engine:
//! - **Selection**: insertion-ordered coordinate set with star construction,
//!   aggregates, border extraction and most-opaque search
//! - **Neighbor search**: closest-color and roundest growth steps
//! - **Region grower**: lazily partitions or samples a grid into regions
//!
//! All neighborhood logic is 4-connected.

pub mod grower;
pub mod neighbors;
pub mod region;

pub use grower::{GrownRegion, RegionGrower, RegionGrowerConfig, Regions, TraversalOrder};
pub use region::Selection;
