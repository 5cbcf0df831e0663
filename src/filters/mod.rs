//! Concrete transforms.
//!
//! | Transform | Shape | Effect |
//! |-----------|-------|--------|
//! | [`AverageFilter`] | independent | star mean, optionally edge-preserving |
//! | [`EdgeFilter`] | independent | marks pixels that differ from their star |
//! | [`AreaEdgeTransform`] | independent | compares averaged half-windows |
//! | [`FeatherTransform`] | independent | fades opacity toward outlines |
//! | [`BrushTransform`] | dependent | stamps the most opaque neighborhood |
//! | [`LinearEdgeTransform`] | dependent | directional edges, filtered by run length |
//! | [`RegionRecolor`] | dependent | flattens grown regions to their average |
//!
//! Independent transforms may be visited in parallel; dependent ones always
//! run as one ordered pass over the output grid.

pub mod area_edge;
pub mod average;
pub mod brush;
pub mod edge;
pub mod feather;
pub mod linear_edge;
pub mod regions;

pub use area_edge::AreaEdgeTransform;
pub use average::AverageFilter;
pub use brush::BrushTransform;
pub use edge::EdgeFilter;
pub use feather::FeatherTransform;
pub use linear_edge::{LinearEdgeTransform, ScanDirection};
pub use regions::RegionRecolor;
