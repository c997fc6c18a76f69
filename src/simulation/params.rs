//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - domain extents `l1, l2, l3` and cutoff radius,
//! - time step and end time,
//! - Lennard-Jones `eps`, `sigma` and the uniform field `g`,
//! - kinetic-energy rescale target and period

use crate::error::{Result, SimError};
use super::states::{Dimension, NVec3};

/// Target kinetic energy of the velocity rescale
pub const DEFAULT_TARGET_ENERGY: f64 = 0.005;

/// Steps between two velocity rescales
pub const DEFAULT_RESCALE_EVERY: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub l1: f64, // extent along x
    pub l2: f64, // extent along y, 0 in 1D
    pub l3: f64, // extent along z, 0 in 1D and 2D
    pub r_cut: f64, // cutoff radius and cell edge
    pub eps: f64, // LJ well depth
    pub sigma: f64, // LJ zero-crossing distance
    pub dt: f64, // time step
    pub t_max: f64, // end time
    pub g: f64, // uniform field along y, any sign
    pub target_energy: f64, // kinetic energy after a rescale
    pub rescale_every: u64, // steps between rescales
}

impl Parameters {
    /// Extents as a vector, inactive axes forced to zero
    pub fn extents(&self, dimension: Dimension) -> NVec3 {
        let mut ext = NVec3::new(self.l1, self.l2, self.l3);
        for axis in dimension.axes()..3 {
            ext[axis] = 0.0;
        }
        ext
    }

    /// Reject non-positive physical parameters. `g` may take any sign.
    pub fn validate(&self, dimension: Dimension) -> Result<()> {
        let extents = [("l1", self.l1), ("l2", self.l2), ("l3", self.l3)];
        for (name, value) in extents.iter().take(dimension.axes()) {
            positive(name, *value)?;
        }
        positive("r_cut", self.r_cut)?;
        positive("eps", self.eps)?;
        positive("sigma", self.sigma)?;
        positive("dt", self.dt)?;
        positive("t_max", self.t_max)?;
        positive("target_energy", self.target_energy)?;
        if self.rescale_every == 0 {
            return Err(SimError::config("rescale_every must be at least 1"));
        }
        if !self.g.is_finite() {
            return Err(SimError::config(format!("g must be finite, got {}", self.g)));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::config(format!("{name} must be positive, got {value}")))
    }
}
