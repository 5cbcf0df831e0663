//! The two transform shapes and the diagnostics sink they report into.
//!
//! - **Independent**: `visit` computes one output pixel from the read-only
//!   input. Visits never see each other's results, so they may run in any
//!   order or in parallel.
//! - **Dependent**: `process_image` runs once, in order, over an output grid
//!   that starts as a copy of the input, and may read cells it already
//!   wrote earlier in the same pass.
//!
//! [`Transform`] closes the set: every concrete operation is one of these
//! two shapes.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};
use rayon::prelude::*;

use crate::error::Result;
use crate::grid::{Coord, Pixel, PixelGrid};

/// Ordered, thread-safe collection of diagnostic messages.
///
/// Clones share the same message list. Every message is also forwarded to
/// the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational message.
    pub fn note(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.push(message);
    }

    /// Record a warning.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.push(message);
    }

    fn push(&self, message: String) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Snapshot of all messages so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Per-pixel operation with no dependency between visits.
pub trait IndependentTransform: Send + Sync {
    fn name(&self) -> &str;

    /// Compute the output pixel for `coord` from the input grid alone.
    fn visit(&self, input: &PixelGrid, coord: Coord, diagnostics: &Diagnostics) -> Result<Pixel>;
}

/// Whole-image operation run as a single ordered pass.
pub trait DependentTransform: Send {
    fn name(&self) -> &str;

    /// `output` starts as a copy of `input`.
    fn process_image(
        &self,
        input: &PixelGrid,
        output: &mut PixelGrid,
        diagnostics: &Diagnostics,
    ) -> Result<()>;
}

pub enum Transform {
    Independent(Box<dyn IndependentTransform>),
    Dependent(Box<dyn DependentTransform>),
}

impl Transform {
    pub fn independent(transform: impl IndependentTransform + 'static) -> Self {
        Self::Independent(Box::new(transform))
    }

    pub fn dependent(transform: impl DependentTransform + 'static) -> Self {
        Self::Dependent(Box::new(transform))
    }

    pub fn name(&self) -> &str {
        match self {
            Transform::Independent(t) => t.name(),
            Transform::Dependent(t) => t.name(),
        }
    }

    pub fn is_independent(&self) -> bool {
        matches!(self, Transform::Independent(_))
    }

    /// Run the transform to completion and return the new output grid.
    ///
    /// With `parallel` set, independent visits are spread over the rayon
    /// pool row by row. Dependent transforms always run sequentially.
    pub fn run(&self, input: &PixelGrid, diagnostics: &Diagnostics, parallel: bool) -> Result<PixelGrid> {
        match self {
            Transform::Independent(t) if parallel => visit_parallel(t.as_ref(), input, diagnostics),
            Transform::Independent(t) => visit_sequential(t.as_ref(), input, diagnostics),
            Transform::Dependent(t) => {
                let mut output = input.copy();
                t.process_image(input, &mut output, diagnostics)?;
                Ok(output)
            }
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = if self.is_independent() { "Independent" } else { "Dependent" };
        f.debug_tuple(shape).field(&self.name()).finish()
    }
}

fn visit_sequential(
    transform: &dyn IndependentTransform,
    input: &PixelGrid,
    diagnostics: &Diagnostics,
) -> Result<PixelGrid> {
    let mut output = PixelGrid::new(input.width(), input.height());
    for coord in input.coords() {
        let pixel = transform.visit(input, coord, diagnostics)?;
        output.set(coord, pixel)?;
    }
    Ok(output)
}

fn visit_parallel(
    transform: &dyn IndependentTransform,
    input: &PixelGrid,
    diagnostics: &Diagnostics,
) -> Result<PixelGrid> {
    let (width, height) = (input.width(), input.height());
    let rows = (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| transform.visit(input, Coord::new(x, y), diagnostics))
                .collect::<Result<Vec<Pixel>>>()
        })
        .collect::<Result<Vec<Vec<Pixel>>>>()?;
    PixelGrid::from_pixels(width, height, rows.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;

    struct Invert;

    impl IndependentTransform for Invert {
        fn name(&self) -> &str {
            "invert"
        }

        fn visit(&self, input: &PixelGrid, coord: Coord, _: &Diagnostics) -> Result<Pixel> {
            let p = input.get(coord)?;
            Ok(Pixel::new(255 - p.r, 255 - p.g, 255 - p.b, p.opacity))
        }
    }

    struct FailAt(Coord);

    impl IndependentTransform for FailAt {
        fn name(&self) -> &str {
            "fail"
        }

        fn visit(&self, input: &PixelGrid, coord: Coord, _: &Diagnostics) -> Result<Pixel> {
            if coord == self.0 {
                return Err(TransformError::failure("fail", "bad pixel"));
            }
            input.get(coord)
        }
    }

    /// Each pixel becomes the sum of itself and the already-written pixel to
    /// its left, so results depend on visit order.
    struct RunningSum;

    impl DependentTransform for RunningSum {
        fn name(&self) -> &str {
            "running-sum"
        }

        fn process_image(&self, input: &PixelGrid, output: &mut PixelGrid, _: &Diagnostics) -> Result<()> {
            for coord in input.coords() {
                if coord.x == 0 {
                    continue;
                }
                let left = output.get(Coord::new(coord.x - 1, coord.y))?;
                let here = output.get(coord)?;
                output.set(coord, Pixel::rgb(left.r.saturating_add(here.r), 0, 0))?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let mut grid = PixelGrid::filled(5, 4, Pixel::rgb(10, 20, 30));
        grid.set(Coord::new(3, 2), Pixel::rgb(200, 0, 100)).unwrap();
        let transform = Transform::independent(Invert);
        let diagnostics = Diagnostics::new();

        let seq = transform.run(&grid, &diagnostics, false).unwrap();
        let par = transform.run(&grid, &diagnostics, true).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.get(Coord::new(3, 2)).unwrap(), Pixel::rgb(55, 255, 155));
    }

    #[test]
    fn test_visit_error_aborts() {
        let grid = PixelGrid::new(3, 3);
        let transform = Transform::independent(FailAt(Coord::new(1, 1)));
        let diagnostics = Diagnostics::new();
        assert!(transform.run(&grid, &diagnostics, false).is_err());
        assert!(transform.run(&grid, &diagnostics, true).is_err());
    }

    #[test]
    fn test_dependent_sees_earlier_output() {
        let grid = PixelGrid::filled(4, 1, Pixel::rgb(1, 0, 0));
        let out = Transform::dependent(RunningSum)
            .run(&grid, &Diagnostics::new(), true)
            .unwrap();
        let reds: Vec<u8> = out.pixels().map(|p| p.r).collect();
        assert_eq!(reds, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_diagnostics_shared_between_clones() {
        let diagnostics = Diagnostics::new();
        let clone = diagnostics.clone();
        clone.note("first");
        diagnostics.warn("second");
        assert_eq!(diagnostics.messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_debug_names_shape() {
        let transform = Transform::independent(Invert);
        assert_eq!(format!("{transform:?}"), "Independent(\"invert\")");
    }
}
