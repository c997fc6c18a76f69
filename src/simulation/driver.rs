//! Step loop of the particle simulation
//!
//! `Simulation` owns the grid, the force evaluator and the integrator state.
//! One call to [`Simulation::step`] runs, in order:
//! drift -> boundary policy -> grid rebuild -> force evaluation -> velocity
//! kick -> optional kinetic-energy rescale.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::error::{Result, SimError};
use crate::output::snapshot::{Frame, SnapshotSink};
use super::boundary;
use super::engine::Engine;
use super::forces::{ForceEvaluator, ForceSet, LennardJones, PairGravity, FORCE_CLAMP};
use super::grid::SpatialGrid;
use super::integrator::{self, ScaleType, VelocityVerlet};
use super::params::Parameters;
use super::states::{Dimension, Particle};

pub struct Simulation {
    engine: Engine,
    params: Parameters,
    grid: SpatialGrid,
    forces: ForceEvaluator,
    integrator: VelocityVerlet,
    n_particles: usize, // tracked count, must match the grid outside of a step
    t: f64,
    step: u64,
}

impl Simulation {
    /// Validate the configuration, distribute the particles into the grid
    /// and compute the initial forces.
    ///
    /// Components on inactive axes are zeroed so a 2D run stays planar.
    pub fn new(engine: Engine, params: Parameters, particles: Vec<Particle>) -> Result<Self> {
        params.validate(engine.dimension)?;

        let extents = params.extents(engine.dimension);
        let mut grid = SpatialGrid::new(engine.dimension, extents, params.r_cut)?;

        let mut seen = HashSet::with_capacity(particles.len());
        let n_particles = particles.len();
        for mut p in particles {
            if !seen.insert(p.id) {
                return Err(SimError::config(format!("duplicate particle id {}", p.id)));
            }
            if !(p.mass > 0.0) {
                return Err(SimError::config(format!("particle {} has non-positive mass {}", p.id, p.mass)));
            }
            flatten(&mut p, engine.dimension);
            grid.assign(p)?;
        }

        let forces = build_forces(&engine, &params);
        forces.evaluate(&mut grid);

        let mut integrator = VelocityVerlet::new();
        integrator.record_forces(&grid);

        info!(
            "simulation ready: {} particles, {:?}, {:?} boundary, dt = {}, t_max = {}",
            n_particles, engine.dimension, engine.boundary, params.dt, params.t_max
        );

        Ok(Self {
            engine,
            params,
            grid,
            forces,
            integrator,
            n_particles,
            t: 0.0,
            step: 0,
        })
    }

    /// Advance the system by one time step
    pub fn step(&mut self) -> Result<()> {
        let dt = self.params.dt;

        self.integrator.drift(&mut self.grid, dt, self.engine.boundary);

        let removed = boundary::enforce(self.engine.boundary, &mut self.grid);
        if removed > 0 {
            self.n_particles -= removed;
            debug!("step {}: {} particle(s) left the domain", self.step + 1, removed);
        }

        self.grid.rebuild()?;

        self.forces.evaluate(&mut self.grid);
        self.integrator.kick(&mut self.grid, dt);
        self.integrator.record_forces(&self.grid);

        self.t += dt;
        self.step += 1;

        if self.engine.scaling == ScaleType::KineticEnergyRescale
            && self.step % self.params.rescale_every == 0
        {
            if let Some(beta) = integrator::rescale_velocities(&mut self.grid, self.params.target_energy) {
                debug!("step {}: velocities rescaled by {beta}", self.step);
            }
        }

        debug_assert_eq!(self.grid.particle_count(), self.n_particles);
        Ok(())
    }

    /// Run until `t_max`, emitting a snapshot for the initial state and
    /// after every step. Snapshot failures are logged and skipped.
    pub fn run<S: SnapshotSink>(&mut self, sink: &mut S) -> Result<()> {
        self.emit(sink);

        while self.t < self.params.t_max {
            self.step()?;
            self.emit(sink);

            let every = self.engine.progress_every;
            if every > 0 && self.step % every == 0 {
                info!(
                    "t = {:.4} / {} ({:.1}%), {} particles, E = {:.6}",
                    self.t,
                    self.params.t_max,
                    100.0 * self.t / self.params.t_max,
                    self.n_particles,
                    self.total_energy()
                );
            }
        }

        info!("run finished after {} steps, {} particles left", self.step, self.n_particles);
        Ok(())
    }

    fn emit<S: SnapshotSink>(&self, sink: &mut S) {
        if let Err(e) = sink.write(&self.frame()) {
            warn!("snapshot for step {} skipped: {e}", self.step);
        }
    }

    /// Current state as a snapshot frame
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            step: self.step,
            time: self.t,
            dimension: self.engine.dimension,
            particles: self.grid.particles().collect(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Mutable grid access. Callers that move particles must leave every
    /// position inside the domain and call `rebuild_grid` afterwards.
    pub fn grid_mut(&mut self) -> &mut SpatialGrid {
        &mut self.grid
    }

    pub fn rebuild_grid(&mut self) -> Result<()> {
        self.grid.rebuild()
    }

    /// Apply the post-drift boundary policy on its own
    pub fn enforce_boundary(&mut self) -> usize {
        let removed = boundary::enforce(self.engine.boundary, &mut self.grid);
        self.n_particles -= removed;
        removed
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.grid.particles()
    }

    pub fn particle(&self, id: u32) -> Option<&Particle> {
        self.grid.particles().find(|p| p.id == id)
    }

    pub fn particle_count(&self) -> usize {
        self.n_particles
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn step_index(&self) -> u64 {
        self.step
    }

    pub fn kinetic_energy(&self) -> f64 {
        integrator::kinetic_energy(&self.grid)
    }

    pub fn potential_energy(&self) -> f64 {
        self.forces.potential_energy(&self.grid)
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }
}

/// Active pair terms and clamp for an engine/parameter pair.
/// The clamp only applies when no velocity rescaling runs.
pub fn build_forces(engine: &Engine, params: &Parameters) -> ForceEvaluator {
    let mut terms = ForceSet::new().with(LennardJones {
        eps: params.eps,
        sigma: params.sigma,
    });
    if engine.pair_gravity {
        terms = terms.with(PairGravity);
    }

    let clamp = match engine.scaling {
        ScaleType::None => Some(FORCE_CLAMP),
        ScaleType::KineticEnergyRescale => None,
    };

    ForceEvaluator::new(terms, params.r_cut, clamp, params.g)
}

/// Zero position, velocity and force on inactive axes
fn flatten(p: &mut Particle, dimension: Dimension) {
    for axis in dimension.axes()..3 {
        p.x[axis] = 0.0;
        p.v[axis] = 0.0;
        p.f[axis] = 0.0;
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("engine", &self.engine)
            .field("params", &self.params)
            .field("n_particles", &self.n_particles)
            .field("t", &self.t)
            .field("step", &self.step)
            .finish()
    }
}
