//! Brush-style dilation.
//!
//! Every pixel that carries paint in the input is forced fully opaque, then
//! the most opaque star around it is stamped with the brush color. Stamps
//! are written into the output as the pass proceeds, so the neighborhood
//! search for a later pixel already sees earlier stamps.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Opacity, Pixel, PixelGrid};
use crate::selection::Selection;
use crate::transform::{DependentTransform, Diagnostics};

fn half() -> Opacity {
    Opacity::Half
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushTransform {
    /// Stamp radius (Manhattan distance)
    pub radius: usize,
    /// Stamp color
    pub color: Pixel,
    /// Minimum opacity counted by the stamp search
    #[serde(default = "half")]
    pub threshold: Opacity,
}

impl BrushTransform {
    pub fn new(radius: usize, color: Pixel) -> Self {
        Self {
            radius,
            color,
            threshold: Opacity::Half,
        }
    }

    pub fn with_threshold(mut self, threshold: Opacity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Qualifying pixels a star needs before it gets stamped.
    #[inline]
    pub fn min_count(&self) -> usize {
        (self.radius / 2).max(1)
    }
}

impl DependentTransform for BrushTransform {
    fn name(&self) -> &str {
        "brush"
    }

    fn process_image(
        &self,
        input: &PixelGrid,
        output: &mut PixelGrid,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        let mut painted = 0usize;
        let mut stamped = 0usize;

        for coord in input.coords() {
            if input.is_transparent(coord)? {
                continue;
            }
            painted += 1;

            let current = output.get(coord)?;
            if !current.is_opaque() {
                output.set(coord, current.with_opacity(Opacity::Opaque))?;
            }

            let star = Selection::star(output, coord, self.radius)?;
            let Some(stamp) = star.most_opaque(output, self.radius, self.min_count(), self.threshold)?
            else {
                continue;
            };
            for member in stamp.iter() {
                output.set(member, self.color)?;
            }
            stamped += 1;
        }

        diagnostics.note(format!(
            "brush: stamped {stamped} of {painted} painted pixels (radius {})",
            self.radius
        ));
        Ok(())
    }
}
