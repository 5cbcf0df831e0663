//! GridStag: pixel-grid transforms and selections.
//!
//! A small engine for neighborhood-based image operations over a grid of
//! RGB pixels with five discrete opacity levels:
//!
//! - [`grid`]: the pixel grid, coordinates and the color delta metric
//! - [`selection`]: ordered coordinate sets, neighbor search and region growing
//! - [`transform`]: the independent (per-pixel) and dependent (whole-image)
//!   transform shapes
//! - [`execution`]: asynchronous execution with a status, a blocking wait and
//!   diagnostic messages
//! - [`filters`]: the concrete transforms
//! - [`pipeline`] and [`config`]: chained stages, loadable from JSON
//!
//! ## Image Format
//! Grids convert to and from `(height, width, 4)` RGBA `u8` arrays. Alpha is
//! quantized to the nearest opacity level on the way in. Grayscale
//! `(H, W, 1)` and RGB `(H, W, 3)` arrays are accepted as fully opaque.
//!
//! ## Example
//! ```no_run
//! use gridstag::{EdgeFilter, Executor, Pixel, PixelGrid, Transform};
//!
//! let grid = PixelGrid::filled(10, 10, Pixel::BLACK);
//! let edges = Executor::new()
//!     .run(Transform::independent(EdgeFilter::new(Pixel::WHITE, 1, 100, true)), grid)
//!     .unwrap();
//! assert_eq!(edges.width(), 10);
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod filters;
pub mod grid;
pub mod pipeline;
pub mod selection;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{PipelineConfig, StageConfig, TransformConfig};
pub use error::{PipelineError, Result, TransformError};
pub use execution::{ExecutionHandle, ExecutionStatus, Executor};
pub use filters::{
    AreaEdgeTransform, AverageFilter, BrushTransform, EdgeFilter, FeatherTransform, LinearEdgeTransform,
    RegionRecolor, ScanDirection,
};
pub use grid::{Coord, Opacity, Pixel, PixelGrid};
pub use pipeline::{Pipeline, PipelineOutput, StageReport};
pub use selection::{GrownRegion, RegionGrower, RegionGrowerConfig, Selection, TraversalOrder};
pub use transform::{DependentTransform, Diagnostics, IndependentTransform, Transform};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::config::PipelineConfig;
    use crate::error::{PipelineError, TransformError};
    use crate::execution::Executor;
    use crate::filters::{
        AreaEdgeTransform, AverageFilter, BrushTransform, EdgeFilter, FeatherTransform, LinearEdgeTransform,
        ScanDirection,
    };
    use crate::grid::{Pixel, PixelGrid};
    use crate::pipeline::Pipeline;
    use crate::transform::Transform;

    impl From<TransformError> for PyErr {
        fn from(err: TransformError) -> PyErr {
            match err {
                TransformError::OutOfBounds { .. } | TransformError::InvalidConfig(_) => {
                    PyValueError::new_err(err.to_string())
                }
                _ => PyRuntimeError::new_err(err.to_string()),
            }
        }
    }

    impl From<PipelineError> for PyErr {
        fn from(err: PipelineError) -> PyErr {
            match err {
                PipelineError::Transform(inner) => inner.into(),
                other => PyRuntimeError::new_err(other.to_string()),
            }
        }
    }

    fn color(rgba: [u8; 4]) -> Pixel {
        Pixel::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    fn apply<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        transform: Transform,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let grid = PixelGrid::from_array(image.as_array())?;
        let output = Executor::new().with_parallel_visits(true).run(transform, grid)?;
        Ok(output.to_array().into_pyarray(py))
    }

    /// Star-neighborhood average.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels), output is always RGBA
    /// * `size` - Star radius
    /// * `delta` - Only average neighbors within this color delta of the center
    ///
    /// # Returns
    /// RGBA image of the same height and width
    #[pyfunction]
    #[pyo3(signature = (image, size=1, delta=None))]
    pub fn average_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
        delta: Option<u32>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let filter = AverageFilter { size, delta };
        apply(py, image, Transform::independent(filter))
    }

    /// Mark pixels whose star differs from them by at least `delta`.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `color` - Edge color as RGBA
    /// * `size` - Star radius
    /// * `delta` - Minimum average delta that counts as an edge
    /// * `edges_only` - Clear every non-edge pixel instead of keeping it
    ///
    /// # Returns
    /// RGBA image of the same height and width
    #[pyfunction]
    #[pyo3(signature = (image, color, size=1, delta=100, edges_only=false))]
    pub fn edge_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        color: [u8; 4],
        size: usize,
        delta: u32,
        edges_only: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let filter = EdgeFilter::new(self::color(color), size, delta, edges_only);
        apply(py, image, Transform::independent(filter))
    }

    /// Windowed-average edges.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `color` - Edge color as RGBA
    /// * `size` - Window depth on each side of a pixel
    /// * `delta` - Minimum delta between the two window averages
    /// * `edges_only` - Clear every non-edge pixel instead of keeping it
    ///
    /// # Returns
    /// RGBA image of the same height and width
    #[pyfunction]
    #[pyo3(signature = (image, color, size=2, delta=100, edges_only=false))]
    pub fn area_edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        color: [u8; 4],
        size: usize,
        delta: u32,
        edges_only: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let filter = AreaEdgeTransform::new(self::color(color), size, delta, edges_only);
        apply(py, image, Transform::independent(filter))
    }

    /// Directional edges.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `color` - Edge color as RGBA
    /// * `delta` - Minimum delta between neighbors along a scan line
    /// * `min_run` - Shortest run of edge pixels that is kept
    /// * `direction` - "horizontal", "vertical" or "both"
    /// * `edges_only` - Clear every non-edge pixel instead of keeping it
    ///
    /// # Returns
    /// RGBA image of the same height and width
    ///
    /// Raises `ValueError` for an unknown direction.
    #[pyfunction]
    #[pyo3(signature = (image, color, delta=100, min_run=2, direction="both", edges_only=false))]
    pub fn linear_edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        color: [u8; 4],
        delta: u32,
        min_run: usize,
        direction: &str,
        edges_only: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let direction = match direction {
            "horizontal" => ScanDirection::Horizontal,
            "vertical" => ScanDirection::Vertical,
            "both" => ScanDirection::Both,
            other => return Err(PyValueError::new_err(format!("unknown direction '{other}'"))),
        };
        let filter = LinearEdgeTransform::new(self::color(color), delta, min_run)
            .with_direction(direction)
            .edges_only(edges_only);
        apply(py, image, Transform::dependent(filter))
    }

    /// Brush dilation of every painted pixel.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `color` - Stamp color as RGBA
    /// * `radius` - Stamp radius
    ///
    /// # Returns
    /// RGBA image of the same height and width
    #[pyfunction]
    #[pyo3(signature = (image, color, radius=2))]
    pub fn brush<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        color: [u8; 4],
        radius: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        apply(py, image, Transform::dependent(BrushTransform::new(radius, self::color(color))))
    }

    /// Fade painted areas toward their outline.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `radius` - Star radius used to measure painted coverage
    ///
    /// # Returns
    /// RGBA image of the same height and width
    #[pyfunction]
    #[pyo3(signature = (image, radius=2))]
    pub fn feather<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        apply(py, image, Transform::independent(FeatherTransform::new(radius)))
    }

    /// Run a pipeline described as JSON.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `config` - Pipeline configuration as JSON
    ///
    /// # Returns
    /// RGBA image after the last stage. A failed stage raises `RuntimeError`.
    #[pyfunction]
    pub fn run_pipeline<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        config: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let config = PipelineConfig::from_json(config)?;
        let grid = PixelGrid::from_array(image.as_array())?;
        let output = Pipeline::from_config(&config)?.run(grid)?;
        Ok(output.grid.to_array().into_pyarray(py))
    }

    #[pymodule]
    pub fn gridstag(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(average_filter, m)?)?;
        m.add_function(wrap_pyfunction!(edge_filter, m)?)?;
        m.add_function(wrap_pyfunction!(area_edges, m)?)?;
        m.add_function(wrap_pyfunction!(linear_edges, m)?)?;
        m.add_function(wrap_pyfunction!(brush, m)?)?;
        m.add_function(wrap_pyfunction!(feather, m)?)?;
        m.add_function(wrap_pyfunction!(run_pipeline, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::gridstag;
