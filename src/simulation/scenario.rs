//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the initial particle set, explicit particles first, then generated ones
//!
//! `Scenario::into_simulation` hands the bundle to [`Simulation::new`],
//! which distributes the particles into the grid.

use crate::configuration::config::{GeneratorConfig, ParticleConfig, ScenarioConfig};
use crate::error::{Result, SimError};
use super::driver::Simulation;
use super::engine::{Engine, DEFAULT_PROGRESS_EVERY};
use super::params::{Parameters, DEFAULT_RESCALE_EVERY, DEFAULT_TARGET_ENERGY};
use super::states::{Dimension, NVec3, Particle};

/// Fully-initialized simulation scenario, ready to be run
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub particles: Vec<Particle>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let dimension = Dimension::from_int(e_cfg.dimension).ok_or_else(|| {
            SimError::config(format!("dimension must be 1, 2 or 3, got {}", e_cfg.dimension))
        })?;
        let engine = Engine {
            dimension,
            boundary: e_cfg.boundary,
            scaling: e_cfg.scaling,
            pair_gravity: e_cfg.pair_gravity,
            progress_every: e_cfg.progress_every.unwrap_or(DEFAULT_PROGRESS_EVERY),
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            l1: p_cfg.l1,
            l2: p_cfg.l2,
            l3: p_cfg.l3,
            r_cut: p_cfg.r_cut,
            eps: p_cfg.eps,
            sigma: p_cfg.sigma,
            dt: p_cfg.dt,
            t_max: p_cfg.t_max,
            g: p_cfg.g,
            target_energy: p_cfg.target_energy.unwrap_or(DEFAULT_TARGET_ENERGY),
            rescale_every: p_cfg.rescale_every.unwrap_or(DEFAULT_RESCALE_EVERY),
        };
        parameters.validate(dimension)?;

        // Particles: explicit ids are kept, the rest count up from the largest one.
        // `None` once the id space is used up.
        let mut next_id = match cfg.particles.iter().filter_map(|pc| pc.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };

        let mut particles = Vec::new();
        for pc in &cfg.particles {
            let id = match pc.id {
                Some(id) => id,
                None => take_id(&mut next_id)?,
            };
            particles.push(particle_from_config(id, pc)?);
        }

        let equilibrium = 2f64.powf(1.0 / 6.0) * parameters.sigma;
        for generator in &cfg.generators {
            for (x, v, mass, category) in generate(generator, equilibrium)? {
                particles.push(Particle::new(take_id(&mut next_id)?, mass, category, x, v));
            }
        }

        Ok(Self {
            engine,
            parameters,
            particles,
        })
    }

    pub fn into_simulation(self) -> Result<Simulation> {
        Simulation::new(self.engine, self.parameters, self.particles)
    }
}

fn take_id(next_id: &mut Option<u32>) -> Result<u32> {
    let id = next_id.ok_or_else(|| SimError::config(format!("no particle ids left above {}", u32::MAX)))?;
    *next_id = id.checked_add(1);
    Ok(id)
}

/// Vector from up to three components, missing ones zero
pub fn vec3(components: &[f64]) -> Result<NVec3> {
    if components.len() > 3 {
        return Err(SimError::config(format!(
            "expected at most 3 vector components, got {}",
            components.len()
        )));
    }
    let mut v = NVec3::zeros();
    for (axis, c) in components.iter().enumerate() {
        v[axis] = *c;
    }
    Ok(v)
}

fn particle_from_config(id: u32, pc: &ParticleConfig) -> Result<Particle> {
    Ok(Particle::new(id, pc.mass, pc.category, vec3(&pc.x)?, vec3(&pc.v)?))
}

/// (position, velocity, mass, category) of every generated particle
fn generate(generator: &GeneratorConfig, equilibrium: f64) -> Result<Vec<(NVec3, NVec3, f64, i32)>> {
    match generator {
        GeneratorConfig::Lattice { origin, counts, spacing, mass, category, velocity } => {
            if counts.len() > 3 {
                return Err(SimError::config("lattice counts take at most 3 entries"));
            }
            let v = vec3(velocity)?;
            let sites = lattice(vec3(origin)?, counts, spacing.unwrap_or(equilibrium));
            Ok(sites.into_iter().map(|x| (x, v, *mass, *category)).collect())
        }
        GeneratorConfig::Disk { center, radius, spacing, mass, category, velocity } => {
            let v = vec3(velocity)?;
            let sites = disk(vec3(center)?, *radius, spacing.unwrap_or(equilibrium));
            Ok(sites.into_iter().map(|x| (x, v, *mass, *category)).collect())
        }
    }
}

/// Rectangular lattice of `counts[0] x counts[1] x counts[2]` sites.
/// Missing counts are 1. Sites are ordered x fastest.
pub fn lattice(origin: NVec3, counts: &[usize], spacing: f64) -> Vec<NVec3> {
    let n = |axis: usize| counts.get(axis).copied().unwrap_or(1);
    let (nx, ny, nz) = (n(0), n(1), n(2));

    let mut sites = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                sites.push(origin + NVec3::new(i as f64, j as f64, k as f64) * spacing);
            }
        }
    }
    sites
}

/// Square-lattice sites within `radius` of `center` in the xy plane
pub fn disk(center: NVec3, radius: f64, spacing: f64) -> Vec<NVec3> {
    if !(radius >= 0.0) || !(spacing > 0.0) {
        return Vec::new();
    }
    let steps = (radius / spacing).floor() as i64;
    let mut sites = Vec::new();
    for j in -steps..=steps {
        for i in -steps..=steps {
            let offset = NVec3::new(i as f64 * spacing, j as f64 * spacing, 0.0);
            if offset.norm() <= radius {
                sites.push(center + offset);
            }
        }
    }
    sites
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_counts_and_spacing() {
        let sites = lattice(NVec3::new(1.0, 2.0, 0.0), &[3, 2], 0.5);
        assert_eq!(sites.len(), 6);
        assert_eq!(sites[0], NVec3::new(1.0, 2.0, 0.0));
        assert_eq!(sites[5], NVec3::new(2.0, 2.5, 0.0));
    }

    #[test]
    fn disk_stays_within_radius() {
        let center = NVec3::new(5.0, 5.0, 0.0);
        let sites = disk(center, 2.0, 1.0);
        // 13 integer points with i^2 + j^2 <= 4
        assert_eq!(sites.len(), 13);
        assert!(sites.iter().all(|x| (x - center).norm() <= 2.0));
    }

    fn config_with(particles: &str, generators: &str) -> ScenarioConfig {
        let text = format!(
            "engine: {{ dimension: 2, boundary: periodic }}\n\
             parameters: {{ l1: 10.0, l2: 10.0, r_cut: 2.5, eps: 1.0, sigma: 1.0, dt: 0.001, t_max: 0.1 }}\n\
             particles: {particles}\n\
             generators: {generators}\n"
        );
        ScenarioConfig::from_yaml_str(&text).unwrap()
    }

    #[test]
    fn largest_explicit_id_is_accepted() {
        let cfg = config_with("[{ id: 4294967295, mass: 1.0, x: [1.0, 1.0] }]", "[]");
        let scenario = Scenario::build_scenario(cfg).unwrap();
        assert_eq!(scenario.particles[0].id, u32::MAX);
    }

    #[test]
    fn exhausted_ids_are_a_configuration_error() {
        let cfg = config_with(
            "[{ id: 4294967295, mass: 1.0, x: [1.0, 1.0] }]",
            "[{ kind: lattice, origin: [5.0, 5.0], counts: [1, 1], mass: 1.0 }]",
        );
        assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::Configuration(_))));

        let cfg = config_with("[{ id: 4294967295, mass: 1.0, x: [1.0, 1.0] }, { mass: 1.0, x: [2.0, 2.0] }]", "[]");
        assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::Configuration(_))));
    }

    #[test]
    fn vec3_pads_and_rejects() {
        assert_eq!(vec3(&[1.0]).unwrap(), NVec3::new(1.0, 0.0, 0.0));
        assert!(vec3(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }
}
