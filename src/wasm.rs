//! WebAssembly exports for GridStag transforms.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Every
//! function takes a flat RGBA byte buffer (length = width * height * 4) and
//! returns a new buffer of the same size. Errors surface as JS exceptions
//! carrying the error message.

use wasm_bindgen::prelude::*;

use crate::config::PipelineConfig;
use crate::filters::{AverageFilter, BrushTransform, EdgeFilter, FeatherTransform};
use crate::grid::{Pixel, PixelGrid};
use crate::transform::{Diagnostics, Transform};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn apply(data: &[u8], width: usize, height: usize, transform: Transform) -> Result<Vec<u8>, JsValue> {
    let grid = PixelGrid::from_rgba(data, width, height).map_err(to_js)?;
    // No threads on wasm32: run the transform inline
    let output = transform
        .run(&grid, &Diagnostics::new(), false)
        .map_err(to_js)?;
    Ok(output.to_rgba())
}

// ============================================================================
// Averaging
// ============================================================================

/// Star-neighborhood average. A `delta` of 0 averages the whole star.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `size` - Star radius
/// * `delta` - Only average neighbors within this color delta of the center
///
/// # Returns
/// Flat array of RGBA bytes, or an error message for a malformed buffer
#[wasm_bindgen]
pub fn average_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    size: usize,
    delta: u32,
) -> Result<Vec<u8>, JsValue> {
    let filter = if delta == 0 {
        AverageFilter::new(size)
    } else {
        AverageFilter::with_delta(size, delta)
    };
    apply(data, width, height, Transform::independent(filter))
}

// ============================================================================
// Edges
// ============================================================================

/// Mark edge pixels with an opaque `(r, g, b)` color.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `r`, `g`, `b` - Edge color
/// * `size` - Star radius compared against each pixel
/// * `delta` - Minimum average delta that counts as an edge
/// * `edges_only` - Clear every non-edge pixel instead of keeping it
///
/// # Returns
/// Flat array of RGBA bytes, or an error message for a malformed buffer
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn edge_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    r: u8,
    g: u8,
    b: u8,
    size: usize,
    delta: u32,
    edges_only: bool,
) -> Result<Vec<u8>, JsValue> {
    let filter = EdgeFilter::new(Pixel::rgb(r, g, b), size, delta, edges_only);
    apply(data, width, height, Transform::independent(filter))
}

// ============================================================================
// Brush and feather
// ============================================================================

/// Brush dilation of every painted pixel.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `r`, `g`, `b` - Stamp color
/// * `radius` - Stamp radius; stamps need `max(radius / 2, 1)` half-opaque pixels
///
/// # Returns
/// Flat array of RGBA bytes, or an error message for a malformed buffer
#[wasm_bindgen]
pub fn brush_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    r: u8,
    g: u8,
    b: u8,
    radius: usize,
) -> Result<Vec<u8>, JsValue> {
    apply(data, width, height, Transform::dependent(BrushTransform::new(radius, Pixel::rgb(r, g, b))))
}

/// Fade painted areas toward their outline.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `radius` - Star radius used to measure painted coverage
///
/// # Returns
/// Flat array of RGBA bytes, or an error message for a malformed buffer
#[wasm_bindgen]
pub fn feather_wasm(data: &[u8], width: usize, height: usize, radius: usize) -> Result<Vec<u8>, JsValue> {
    apply(data, width, height, Transform::independent(FeatherTransform::new(radius)))
}

// ============================================================================
// Pipelines
// ============================================================================

/// Run every stage of a JSON pipeline configuration in order.
///
/// Stages run inline; the stage timeout of the configuration is ignored.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `config` - Pipeline configuration as JSON
///
/// # Returns
/// Flat array of RGBA bytes after the last stage, or the first error
#[wasm_bindgen]
pub fn run_pipeline_wasm(data: &[u8], width: usize, height: usize, config: &str) -> Result<Vec<u8>, JsValue> {
    let config = PipelineConfig::from_json(config).map_err(to_js)?;
    let mut grid = PixelGrid::from_rgba(data, width, height).map_err(to_js)?;
    for stage in &config.stages {
        let transform = stage.transform.build().map_err(to_js)?;
        grid = transform
            .run(&grid, &Diagnostics::new(), false)
            .map_err(|e| to_js(format!("stage '{}' failed: {e}", stage.display_name())))?;
    }
    Ok(grid.to_rgba())
}
