//! JSON configuration for transforms and pipelines.
//!
//! Each transform is described by its parameters plus a `kind` tag:
//!
//! ```json
//! {
//!   "stage_timeout_ms": 5000,
//!   "parallel_visits": true,
//!   "stages": [
//!     { "kind": "average", "size": 1, "delta": 48 },
//!     { "kind": "edge", "name": "outline", "color": { "r": 255, "g": 0, "b": 0 }, "size": 1, "delta": 96, "edges_only": true }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::filters::{
    AreaEdgeTransform, AverageFilter, BrushTransform, EdgeFilter, FeatherTransform, LinearEdgeTransform,
    RegionRecolor,
};
use crate::transform::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformConfig {
    Average(AverageFilter),
    Edge(EdgeFilter),
    Brush(BrushTransform),
    Feather(FeatherTransform),
    LinearEdge(LinearEdgeTransform),
    AreaEdge(AreaEdgeTransform),
    Regions(RegionRecolor),
}

fn positive(kind: &str, field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(TransformError::InvalidConfig(format!(
            "{kind}: {field} must be at least 1"
        )));
    }
    Ok(())
}

impl TransformConfig {
    /// The `kind` tag of this configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformConfig::Average(_) => "average",
            TransformConfig::Edge(_) => "edge",
            TransformConfig::Brush(_) => "brush",
            TransformConfig::Feather(_) => "feather",
            TransformConfig::LinearEdge(_) => "linear_edge",
            TransformConfig::AreaEdge(_) => "area_edge",
            TransformConfig::Regions(_) => "regions",
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check parameter ranges without building anything.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            TransformConfig::Average(t) => positive(kind, "size", t.size),
            TransformConfig::Edge(t) => positive(kind, "size", t.size),
            TransformConfig::Brush(t) => positive(kind, "radius", t.radius),
            TransformConfig::Feather(t) => positive(kind, "radius", t.radius),
            TransformConfig::LinearEdge(t) => positive(kind, "min_run", t.min_run),
            TransformConfig::AreaEdge(t) => positive(kind, "size", t.size),
            TransformConfig::Regions(t) => t.grower.validate(),
        }
    }

    /// Validate and turn the configuration into a runnable transform.
    pub fn build(&self) -> Result<Transform> {
        self.validate()?;
        Ok(match self.clone() {
            TransformConfig::Average(t) => Transform::independent(t),
            TransformConfig::Edge(t) => Transform::independent(t),
            TransformConfig::Brush(t) => Transform::dependent(t),
            TransformConfig::Feather(t) => Transform::independent(t),
            TransformConfig::LinearEdge(t) => Transform::dependent(t),
            TransformConfig::AreaEdge(t) => Transform::independent(t),
            TransformConfig::Regions(t) => Transform::dependent(t),
        })
    }
}

/// One pipeline stage: an optional display name plus the transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub transform: TransformConfig,
}

impl StageConfig {
    /// The configured name, or the transform kind.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.transform.kind())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<StageConfig>,
    /// Per-stage wait limit; unlimited when absent
    #[serde(default)]
    pub stage_timeout_ms: Option<u64>,
    #[serde(default)]
    pub parallel_visits: bool,
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            TransformError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(TransformError::InvalidConfig("pipeline has no stages".into()));
        }
        for stage in &self.stages {
            stage.transform.validate()?;
        }
        Ok(())
    }
}
