use std::time::Instant;

use crate::simulation::boundary::BoundaryMode;
use crate::simulation::driver::{build_forces, Simulation};
use crate::simulation::engine::Engine;
use crate::simulation::integrator::ScaleType;
use crate::simulation::params::{Parameters, DEFAULT_RESCALE_EVERY, DEFAULT_TARGET_ENERGY};
use crate::simulation::scenario::lattice;
use crate::simulation::states::{Dimension, NVec3, Particle};

/// Lattice sizes (sites per side) used by the benchmarks
const SIDES: [usize; 6] = [10, 20, 40, 80, 120, 160];

/// Helper to build an engine for a 2D periodic run without pair gravity
fn make_engine() -> Engine {
    let mut engine = Engine::new(Dimension::Two, BoundaryMode::Periodic, ScaleType::None);
    engine.pair_gravity = false;
    engine.progress_every = 0;
    engine
}

/// Helper to build parameters for a square domain of side `l`
fn make_params(l: f64) -> Parameters {
    Parameters {
        l1: l,
        l2: l,
        l3: 0.0,
        r_cut: 2.5,
        eps: 1.0,
        sigma: 1.0,
        dt: 1.0e-4,
        t_max: 1.0,
        g: 0.0,
        target_energy: DEFAULT_TARGET_ENERGY,
        rescale_every: DEFAULT_RESCALE_EVERY,
    }
}

/// Helper to build a `side x side` block at the LJ equilibrium spacing,
/// with a small deterministic velocity so particles actually move
fn make_particles(side: usize) -> (Vec<Particle>, f64) {
    let spacing = 2f64.powf(1.0 / 6.0);
    let margin = 5.0;
    let sites = lattice(NVec3::new(margin, margin, 0.0), &[side, side], spacing);
    let l = 2.0 * margin + side as f64 * spacing;

    let particles = sites
        .into_iter()
        .enumerate()
        .map(|(i, x)| {
            let i_f = i as f64;
            // deterministic velocities, no rand needed
            let v = NVec3::new((i_f * 0.37).sin(), (i_f * 0.13).cos(), 0.0) * 0.1;
            Particle::new(i as u32, 1.0, 0, x, v)
        })
        .collect();

    (particles, l)
}

/// Time one cell-list force evaluation for growing N
pub fn bench_forces() {
    for side in SIDES {
        let (particles, l) = make_particles(side);
        let n = particles.len();

        let mut sim = match Simulation::new(make_engine(), make_params(l), particles) {
            Ok(sim) => sim,
            Err(e) => {
                println!("N = {n:6}: setup failed: {e}");
                continue;
            }
        };
        let forces = build_forces(sim.engine(), sim.parameters());

        // Warm up
        forces.evaluate(sim.grid_mut());

        let t0 = Instant::now();
        forces.evaluate(sim.grid_mut());
        let dt_forces = t0.elapsed().as_secs_f64();

        println!("N = {n:6}, forces = {dt_forces:8.6} s");
    }
}

/// Time full integration steps for growing N
/// Paste output directly into a spreadsheet to graph
pub fn bench_step() {
    println!("N,step_ms");

    for side in SIDES {
        let (particles, l) = make_particles(side);
        let n = particles.len();
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 6400 { 10 } else { 2 };

        let mut sim = match Simulation::new(make_engine(), make_params(l), particles) {
            Ok(sim) => sim,
            Err(e) => {
                println!("{n},setup failed: {e}");
                continue;
            }
        };

        let t0 = Instant::now();
        for _ in 0..steps {
            if let Err(e) = sim.step() {
                println!("{n},step failed: {e}");
                break;
            }
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
}
