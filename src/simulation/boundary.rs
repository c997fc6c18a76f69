//! Domain boundary policies
//!
//! Exactly one policy is active per run:
//! - `Absorption`: particles outside `[0, L]` on any active axis are removed for good
//! - `Periodic`: coordinates wrap modulo the extent, velocity untouched
//! - `Reflective`: the x or y velocity component that would carry a particle out is
//!   negated before the position is committed, then absorption runs as a
//!   safety net for particles fast enough to escape anyway

use log::debug;
use serde::Deserialize;

use super::grid::SpatialGrid;
use super::states::{Dimension, NVec3, Particle};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    Absorption,
    Periodic,
    Reflective,
}

impl BoundaryMode {
    /// Integer codes used by older configuration files: 0, 1, 2
    pub fn from_int(code: u32) -> Option<Self> {
        match code {
            0 => Some(BoundaryMode::Absorption),
            1 => Some(BoundaryMode::Periodic),
            2 => Some(BoundaryMode::Reflective),
            _ => None,
        }
    }
}

/// True when every active coordinate lies in `[0, L]`
pub fn is_inside(x: &NVec3, extents: &NVec3, dimension: Dimension) -> bool {
    (0..dimension.axes()).all(|axis| x[axis] >= 0.0 && x[axis] <= extents[axis])
}

/// Wrap a single coordinate into `[0, extent)`
pub fn wrap_coord(coord: f64, extent: f64) -> f64 {
    let wrapped = if coord < 0.0 {
        extent - (coord % extent).abs()
    } else if coord >= extent {
        coord % extent
    } else {
        coord
    };
    // a negative exact multiple of the extent lands on `extent` itself
    if wrapped >= extent { wrapped - extent } else { wrapped }
}

/// Wrap every active axis with a nonzero extent
pub fn wrap(x: &mut NVec3, extents: &NVec3, dimension: Dimension) {
    for axis in 0..dimension.axes() {
        if extents[axis] > 0.0 {
            x[axis] = wrap_coord(x[axis], extents[axis]);
        }
    }
}

/// Reflective drift for one particle.
///
/// `tentative` is the position the plain drift would produce. For each of
/// the x and y axes (when active) where it leaves `[0, L]` the velocity
/// component is negated;
/// the position is then recomputed from `x_old` with the corrected velocity.
/// Returns the committed position.
pub fn reflect(
    particle: &mut Particle,
    tentative: NVec3,
    kick: &NVec3,
    dt: f64,
    extents: &NVec3,
    dimension: Dimension,
) -> NVec3 {
    let mut flipped = false;
    // walls reflect along x and y only, a z escapee is left to absorption
    for axis in 0..dimension.axes().min(2) {
        if tentative[axis] < 0.0 || tentative[axis] > extents[axis] {
            particle.v[axis] = -particle.v[axis];
            flipped = true;
        }
    }

    if flipped {
        particle.x + (particle.v + kick) * dt
    } else {
        tentative
    }
}

/// Remove every particle that left the domain. Returns the removed particles.
pub fn absorb(grid: &mut SpatialGrid) -> Vec<Particle> {
    let extents = grid.extents();
    let dimension = grid.dimension();
    let removed = grid.remove_where(|p| !is_inside(&p.x, &extents, dimension));
    for p in &removed {
        debug!("absorbed particle {} at ({}, {}, {})", p.id, p.x.x, p.x.y, p.x.z);
    }
    removed
}

/// Apply the post-drift part of a boundary policy.
/// Returns how many particles left the simulation.
pub fn enforce(mode: BoundaryMode, grid: &mut SpatialGrid) -> usize {
    match mode {
        BoundaryMode::Absorption | BoundaryMode::Reflective => absorb(grid).len(),
        BoundaryMode::Periodic => {
            let extents = grid.extents();
            let dimension = grid.dimension();
            for p in grid.particles_mut() {
                wrap(&mut p.x, &extents, dimension);
            }
            0
        }
    }
}
