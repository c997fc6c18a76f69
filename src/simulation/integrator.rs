//! Velocity-Verlet time integration over the cell grid
//!
//! One step is split around the force evaluation:
//! - `drift`: x_n+1 = x_n + (v_n + F_n dt / 2m) dt, using the force stored on each particle
//! - (boundary policy, grid rebuild and force evaluation happen in between)
//! - `kick`: v_n+1 = v_n + (F_n+1 + F_n) dt / 2m
//!
//! F_n is remembered per particle id in `forces_old`, captured right after
//! each force evaluation.

use std::collections::HashMap;

use serde::Deserialize;

use super::boundary::{self, BoundaryMode};
use super::grid::SpatialGrid;
use super::states::NVec3;

/// Velocity rescaling policy
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    None,
    #[serde(rename = "kinetic_energy")]
    KineticEnergyRescale,
}

impl ScaleType {
    /// Integer codes used by older configuration files: 0, 1
    pub fn from_int(code: u32) -> Option<Self> {
        match code {
            0 => Some(ScaleType::None),
            1 => Some(ScaleType::KineticEnergyRescale),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct VelocityVerlet {
    forces_old: HashMap<u32, NVec3>, // particle id -> force of the previous evaluation
}

impl VelocityVerlet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the force currently stored on every particle
    pub fn record_forces(&mut self, grid: &SpatialGrid) {
        self.forces_old.clear();
        self.forces_old.extend(grid.particles().map(|p| (p.id, p.f)));
    }

    /// Previous force of a particle, zero if it was never recorded
    pub fn force_old(&self, id: u32) -> NVec3 {
        self.forces_old.get(&id).copied().unwrap_or_else(NVec3::zeros)
    }

    /// Advance every position by one step.
    ///
    /// Under the reflective policy the tentative position is checked first
    /// and escaping velocity components are flipped before committing.
    pub fn drift(&self, grid: &mut SpatialGrid, dt: f64, mode: BoundaryMode) {
        let extents = grid.extents();
        let dimension = grid.dimension();

        for p in grid.particles_mut() {
            // F_n dt / 2m
            let kick = p.f * (dt * 0.5 / p.mass);
            let tentative = p.x + (p.v + kick) * dt;

            p.x = match mode {
                BoundaryMode::Reflective => {
                    boundary::reflect(p, tentative, &kick, dt, &extents, dimension)
                }
                BoundaryMode::Absorption | BoundaryMode::Periodic => tentative,
            };
        }
    }

    /// Finish the step with the average of the previous and new force
    pub fn kick(&self, grid: &mut SpatialGrid, dt: f64) {
        for p in grid.particles_mut() {
            let f_old = self.force_old(p.id);
            p.v += (p.f + f_old) * (dt * 0.5 / p.mass);
        }
    }
}

/// Total kinetic energy 0.5 * sum m |v|^2
pub fn kinetic_energy(grid: &SpatialGrid) -> f64 {
    grid.particles().map(|p| p.kinetic_energy()).sum()
}

/// Scale every velocity by beta = sqrt(target / KE).
/// Returns beta, or `None` when the system is at rest.
pub fn rescale_velocities(grid: &mut SpatialGrid, target_energy: f64) -> Option<f64> {
    let ke = kinetic_energy(grid);
    if ke <= 0.0 {
        return None;
    }
    let beta = (target_energy / ke).sqrt();
    for p in grid.particles_mut() {
        p.v *= beta;
    }
    Some(beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::{Dimension, Particle};
    use approx::assert_abs_diff_eq;

    fn grid_with(particles: Vec<Particle>) -> SpatialGrid {
        let mut grid = SpatialGrid::new(Dimension::Two, NVec3::new(10.0, 10.0, 0.0), 1.0).unwrap();
        for p in particles {
            grid.assign(p).unwrap();
        }
        grid
    }

    #[test]
    fn drift_uses_stored_force() {
        let mut p = Particle::new(0, 2.0, 0, NVec3::new(5.0, 5.0, 0.0), NVec3::new(1.0, 0.0, 0.0));
        p.f = NVec3::new(0.0, 4.0, 0.0);
        let mut grid = grid_with(vec![p]);

        VelocityVerlet::new().drift(&mut grid, 0.1, BoundaryMode::Periodic);

        let p = grid.particles().next().unwrap();
        // x += (v + f dt / 2m) dt
        assert_abs_diff_eq!(p.x.x, 5.1, epsilon = 1e-12);
        assert_abs_diff_eq!(p.x.y, 5.01, epsilon = 1e-12);
    }

    #[test]
    fn kick_averages_old_and_new_force() {
        let mut p = Particle::new(3, 1.0, 0, NVec3::new(5.0, 5.0, 0.0), NVec3::zeros());
        p.f = NVec3::new(2.0, 0.0, 0.0);
        let mut grid = grid_with(vec![p]);

        let mut vv = VelocityVerlet::new();
        vv.record_forces(&grid);
        for p in grid.particles_mut() {
            p.f = NVec3::new(4.0, 0.0, 0.0);
        }
        vv.kick(&mut grid, 0.5);

        let p = grid.particles().next().unwrap();
        assert_abs_diff_eq!(p.v.x, (4.0 + 2.0) * 0.5 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn reflective_drift_turns_particle_around() {
        let p = Particle::new(0, 1.0, 0, NVec3::new(9.95, 5.0, 0.0), NVec3::new(1.0, 0.0, 0.0));
        let mut grid = grid_with(vec![p]);

        VelocityVerlet::new().drift(&mut grid, 0.1, BoundaryMode::Reflective);

        let p = grid.particles().next().unwrap();
        assert_eq!(p.v.x, -1.0);
        assert_abs_diff_eq!(p.x.x, 9.85, epsilon = 1e-12);
    }

    #[test]
    fn rescale_hits_target_energy() {
        let mut grid = grid_with(vec![
            Particle::new(0, 1.0, 0, NVec3::new(1.0, 1.0, 0.0), NVec3::new(3.0, 0.0, 0.0)),
            Particle::new(1, 2.0, 0, NVec3::new(2.0, 2.0, 0.0), NVec3::new(0.0, -1.0, 0.0)),
        ]);
        let beta = rescale_velocities(&mut grid, 0.005).unwrap();
        assert!(beta < 1.0);
        assert_abs_diff_eq!(kinetic_energy(&grid), 0.005, epsilon = 1e-12);
    }

    #[test]
    fn rescale_skips_system_at_rest() {
        let mut grid = grid_with(vec![Particle::new(0, 1.0, 0, NVec3::new(1.0, 1.0, 0.0), NVec3::zeros())]);
        assert!(rescale_velocities(&mut grid, 0.005).is_none());
    }

    #[test]
    fn scale_type_from_int() {
        assert_eq!(ScaleType::from_int(1), Some(ScaleType::KineticEnergyRescale));
        assert_eq!(ScaleType::from_int(2), None);
    }
}
