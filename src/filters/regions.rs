//! Segmentation by region growing.
//!
//! The input is cut into color-coherent regions with a [`RegionGrower`].
//! Each region is flattened to its average color, and its border can be
//! outlined in a separate color.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Pixel, PixelGrid};
use crate::selection::{RegionGrower, RegionGrowerConfig};
use crate::transform::{DependentTransform, Diagnostics};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecolor {
    #[serde(default)]
    pub grower: RegionGrowerConfig,
    /// Outline color; region borders take the average when unset
    #[serde(default)]
    pub border_color: Option<Pixel>,
}

impl RegionRecolor {
    pub fn new(grower: RegionGrowerConfig) -> Self {
        Self {
            grower,
            border_color: None,
        }
    }

    pub fn with_border(mut self, color: Pixel) -> Self {
        self.border_color = Some(color);
        self
    }
}

impl DependentTransform for RegionRecolor {
    fn name(&self) -> &str {
        "regions"
    }

    fn process_image(
        &self,
        input: &PixelGrid,
        output: &mut PixelGrid,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        let grower = RegionGrower::new(self.grower.clone())?;

        let mut total = 0usize;
        let mut exhausted = 0usize;
        for region in grower.generate(input) {
            let region = region?;
            total += 1;
            if region.exhausted() {
                exhausted += 1;
            }

            let average = region.selection.average(input)?;
            let outline = self.border_color.unwrap_or(average);
            let border = region.selection.border(input);
            for coord in region.selection.iter() {
                let pixel = if border.contains(coord) { outline } else { average };
                output.set(coord, pixel)?;
            }
        }

        diagnostics.note(format!("regions: recolored {total} regions"));
        if exhausted > 0 {
            diagnostics.warn(format!(
                "regions: {exhausted} of {total} regions stopped short of their target size"
            ));
        }
        Ok(())
    }
}
