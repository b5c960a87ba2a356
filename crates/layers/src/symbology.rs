use foundation::color::Rgba;

use crate::ramp::ColorRamp;
use crate::raster::{DEFAULT_CELL_BUDGET, MeshOptions};

/// How one raster dataset is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSymbology {
    pub ramp: ColorRamp,
    pub cell_budget: usize,
    pub mesh: MeshOptions,
}

impl RasterSymbology {
    pub fn new(ramp: ColorRamp) -> Self {
        Self {
            ramp,
            cell_budget: DEFAULT_CELL_BUDGET,
            mesh: MeshOptions::default(),
        }
    }

    /// Two hex endpoints, e.g. `("#F7FBEA", "#CBEAA6")`.
    pub fn from_hex_pair(low: &str, high: &str) -> Option<Self> {
        Some(Self::new(ColorRamp::two(
            Rgba::from_hex(low)?,
            Rgba::from_hex(high)?,
        )))
    }

    pub fn with_budget(mut self, cell_budget: usize) -> Self {
        self.cell_budget = cell_budget;
        self
    }
}
