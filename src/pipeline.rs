//! Sequential multi-stage pipelines.
//!
//! Each stage is submitted to the [`Executor`] and awaited before the next
//! one starts; the output of a stage is the input of the next. A stage that
//! fails or times out stops the pipeline, and its diagnostic messages are
//! logged and returned in the error. A partial result is never passed on.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::execution::{ExecutionStatus, Executor};
use crate::filters::{AverageFilter, BrushTransform, EdgeFilter};
use crate::grid::{Pixel, PixelGrid};
use crate::transform::Transform;

struct Stage {
    name: String,
    transform: Transform,
}

/// Messages recorded by one completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: String,
    pub messages: Vec<String>,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub grid: PixelGrid,
    pub stages: Vec<StageReport>,
}

pub struct Pipeline {
    executor: Executor,
    stages: Vec<Stage>,
    stage_timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            stages: Vec::new(),
            stage_timeout: None,
        }
    }

    /// Append a stage.
    pub fn stage(mut self, name: impl Into<String>, transform: Transform) -> Self {
        self.stages.push(Stage {
            name: name.into(),
            transform,
        });
        self
    }

    /// Give up on a stage that has not finished after `timeout`.
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Edge-preserving blur, edge marking, then brush thickening of the
    /// marked edges.
    pub fn sketch(executor: Executor, color: Pixel) -> Self {
        Self::new(executor)
            .stage("average", Transform::independent(AverageFilter::with_delta(1, 48)))
            .stage("edge", Transform::independent(EdgeFilter::new(color, 1, 96, true)))
            .stage("brush", Transform::dependent(BrushTransform::new(1, color)))
    }

    /// One edge-preserving average pass per threshold, in the given order.
    pub fn progressive_average(executor: Executor, size: usize, thresholds: &[u32]) -> Self {
        thresholds
            .iter()
            .enumerate()
            .fold(Self::new(executor), |pipeline, (i, &delta)| {
                pipeline.stage(
                    format!("average-{}", i + 1),
                    Transform::independent(AverageFilter::with_delta(size, delta)),
                )
            })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let executor = Executor::new().with_parallel_visits(config.parallel_visits);
        let mut pipeline = Self::new(executor);
        if let Some(ms) = config.stage_timeout_ms {
            pipeline = pipeline.with_stage_timeout(Duration::from_millis(ms));
        }
        for stage in &config.stages {
            pipeline = pipeline.stage(stage.display_name(), stage.transform.build()?);
        }
        Ok(pipeline)
    }

    /// Run every stage in order over `input`.
    pub fn run(self, input: PixelGrid) -> std::result::Result<PipelineOutput, PipelineError> {
        let mut current = Arc::new(input);
        let mut reports = Vec::with_capacity(self.stages.len());

        for Stage { name, transform } in self.stages {
            let handle = self.executor.submit(transform, Arc::clone(&current))?;
            match handle.wait_until_finished(self.stage_timeout) {
                ExecutionStatus::Success => {
                    current = Arc::new(handle.result()?);
                    info!("Pipeline stage '{}' done", name);
                    reports.push(StageReport {
                        name,
                        messages: handle.messages(),
                    });
                }
                ExecutionStatus::Failure => {
                    let messages = handle.messages();
                    error!("Pipeline stage '{}' failed, aborting", name);
                    for message in &messages {
                        error!("  {}: {}", name, message);
                    }
                    return Err(PipelineError::StageFailed {
                        stage: name,
                        messages,
                    });
                }
                ExecutionStatus::NotStarted | ExecutionStatus::Running => {
                    error!("Pipeline stage '{}' timed out, aborting", name);
                    return Err(PipelineError::StageTimedOut { stage: name });
                }
            }
        }

        let grid = Arc::try_unwrap(current).unwrap_or_else(|shared| shared.copy());
        Ok(PipelineOutput {
            grid,
            stages: reports,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("stage_timeout", &self.stage_timeout)
            .finish()
    }
}
