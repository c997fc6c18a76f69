//! High-level runtime engine settings
//!
//! Selects dimension (1D/2D/3D), boundary policy, velocity rescaling and
//! which pair terms are active when building and running a `Simulation`

use super::boundary::BoundaryMode;
use super::integrator::ScaleType;
use super::states::Dimension;

/// Steps between two progress log lines
pub const DEFAULT_PROGRESS_EVERY: u64 = 100;

#[derive(Debug, Clone)]
pub struct Engine {
    pub dimension: Dimension, // 1D, 2D or 3D
    pub boundary: BoundaryMode, // absorption, periodic or reflective
    pub scaling: ScaleType, // none or kinetic-energy rescale
    pub pair_gravity: bool, // add the r * m / |r|^3 pair term
    pub progress_every: u64, // steps between progress logs, 0 = silent
}

impl Engine {
    pub fn new(dimension: Dimension, boundary: BoundaryMode, scaling: ScaleType) -> Self {
        Self {
            dimension,
            boundary,
            scaling,
            pair_gravity: true,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}
