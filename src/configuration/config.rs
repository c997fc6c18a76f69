//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – dimension, boundary policy, velocity rescaling
//! - [`ParametersConfig`] – domain, cutoff, time stepping and physical constants
//! - [`ParticleConfig`]   – initial state for individual particles
//! - [`GeneratorConfig`]  – lattice blocks and disks of identical particles
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example 2D scenario matching these types:
//!
//! ```yaml
//! engine:
//!   dimension: 2              # 1, 2 or 3
//!   boundary: reflective      # absorption | periodic | reflective, or 0 | 1 | 2
//!   scaling: none             # none | kinetic_energy, or 0 | 1
//!   pair_gravity: false       # optional, default true
//!
//! parameters:
//!   l1: 250.0                 # domain extent along x
//!   l2: 180.0                 # domain extent along y
//!   r_cut: 2.5                # cutoff radius, also the cell edge
//!   eps: 1.0                  # LJ well depth
//!   sigma: 1.0                # LJ zero-crossing distance
//!   dt: 0.00005
//!   t_max: 19.5
//!   g: -12.0                  # uniform field along y, optional
//!
//! particles:
//!   - id: 0
//!     mass: 1.0
//!     category: 2
//!     x: [ 5.0, 5.0 ]
//!     v: [ 0.0, 1.0 ]
//!
//! generators:
//!   - kind: lattice
//!     origin: [ 50.0, 10.0 ]
//!     counts: [ 160, 40 ]
//!     mass: 1.0
//!     category: 0
//!   - kind: disk
//!     center: [ 125.0, 130.0 ]
//!     radius: 20.0
//!     mass: 1.0
//!     category: 1
//!     velocity: [ 0.0, -10.0 ]
//! ```
//!
//! The scenario builder maps this configuration into the runtime types
//! (`Engine`, `Parameters`, `Particle`).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::simulation::boundary::BoundaryMode;
use crate::simulation::integrator::ScaleType;

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub dimension: u32, // 1, 2 or 3
    #[serde(deserialize_with = "boundary_code")]
    pub boundary: BoundaryMode, // policy for particles leaving the domain
    #[serde(default = "default_scaling", deserialize_with = "scaling_code")]
    pub scaling: ScaleType, // `kinetic_energy` rescales velocities periodically
    #[serde(default = "default_true")]
    pub pair_gravity: bool, // include the r * m / |r|^3 pair term
    pub progress_every: Option<u64>, // steps between progress logs
}

/// Domain, numerical and physical parameters
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub l1: f64,
    #[serde(default)]
    pub l2: f64,
    #[serde(default)]
    pub l3: f64,
    pub r_cut: f64,
    pub eps: f64,
    pub sigma: f64,
    pub dt: f64,
    pub t_max: f64,
    #[serde(default)]
    pub g: f64,
    pub target_energy: Option<f64>,
    pub rescale_every: Option<u64>,
}

/// Initial state of one particle. Missing vector components are zero.
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub id: Option<u32>, // assigned in declaration order when omitted
    pub mass: f64,
    #[serde(default)]
    pub category: i32,
    pub x: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

/// Generators for blocks of identical particles
/// `spacing` defaults to the LJ equilibrium distance 2^(1/6) sigma
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Rectangular lattice with `counts[i]` sites along axis i
    Lattice {
        origin: Vec<f64>,
        counts: Vec<usize>,
        spacing: Option<f64>,
        mass: f64,
        #[serde(default)]
        category: i32,
        #[serde(default)]
        velocity: Vec<f64>,
    },
    /// Lattice sites within `radius` of `center` in the xy plane
    Disk {
        center: Vec<f64>,
        radius: f64,
        spacing: Option<f64>,
        mass: f64,
        #[serde(default)]
        category: i32,
        #[serde(default)]
        velocity: Vec<f64>,
    },
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
    #[serde(default)]
    pub generators: Vec<GeneratorConfig>,
}

impl ScenarioConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

/// Either the snake_case name or the integer code of a mode
#[derive(Deserialize)]
#[serde(untagged)]
enum Code<T> {
    Int(u32),
    Name(T),
}

fn boundary_code<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<BoundaryMode, D::Error> {
    match Code::<BoundaryMode>::deserialize(d)? {
        Code::Name(mode) => Ok(mode),
        Code::Int(code) => BoundaryMode::from_int(code)
            .ok_or_else(|| D::Error::custom(format!("unknown boundary code {code}, expected 0, 1 or 2"))),
    }
}

fn scaling_code<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<ScaleType, D::Error> {
    match Code::<ScaleType>::deserialize(d)? {
        Code::Name(scaling) => Ok(scaling),
        Code::Int(code) => ScaleType::from_int(code)
            .ok_or_else(|| D::Error::custom(format!("unknown scaling code {code}, expected 0 or 1"))),
    }
}

fn default_scaling() -> ScaleType {
    ScaleType::None
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_scenario() {
        let cfg = ScenarioConfig::from_yaml_str(
            r#"
engine:
  dimension: 2
  boundary: periodic
parameters:
  l1: 10.0
  l2: 10.0
  r_cut: 2.5
  eps: 1.0
  sigma: 1.0
  dt: 0.001
  t_max: 0.1
particles:
  - mass: 1.0
    x: [1.0, 2.0]
"#,
        )
        .unwrap();

        assert_eq!(cfg.engine.boundary, BoundaryMode::Periodic);
        assert_eq!(cfg.engine.scaling, ScaleType::None);
        assert!(cfg.engine.pair_gravity);
        assert_eq!(cfg.parameters.l3, 0.0);
        assert_eq!(cfg.parameters.g, 0.0);
        assert_eq!(cfg.particles.len(), 1);
        assert!(cfg.particles[0].v.is_empty());
        assert!(cfg.generators.is_empty());
    }

    #[test]
    fn parses_generators() {
        let cfg = ScenarioConfig::from_yaml_str(
            r#"
engine:
  dimension: 2
  boundary: reflective
  scaling: kinetic_energy
parameters: { l1: 10.0, l2: 10.0, r_cut: 2.5, eps: 1.0, sigma: 1.0, dt: 0.001, t_max: 0.1 }
generators:
  - kind: lattice
    origin: [1.0, 1.0]
    counts: [4, 4]
    mass: 1.0
  - kind: disk
    center: [5.0, 5.0]
    radius: 2.0
    spacing: 1.0
    mass: 2.0
    category: 1
    velocity: [0.0, -1.0]
"#,
        )
        .unwrap();

        assert_eq!(cfg.engine.scaling, ScaleType::KineticEnergyRescale);
        assert!(matches!(cfg.generators[0], GeneratorConfig::Lattice { ref counts, .. } if counts == &vec![4, 4]));
        assert!(matches!(cfg.generators[1], GeneratorConfig::Disk { radius, category: 1, .. } if radius == 2.0));
    }

    #[test]
    fn accepts_integer_mode_codes() {
        let cfg = ScenarioConfig::from_yaml_str(
            "engine: { dimension: 3, boundary: 2, scaling: 1 }\nparameters: { l1: 1.0, r_cut: 1.0, eps: 1.0, sigma: 1.0, dt: 0.1, t_max: 1.0 }\n",
        )
        .unwrap();
        assert_eq!(cfg.engine.boundary, BoundaryMode::Reflective);
        assert_eq!(cfg.engine.scaling, ScaleType::KineticEnergyRescale);

        let cfg = ScenarioConfig::from_yaml_str(
            "engine: { dimension: 2, boundary: 0, scaling: 0 }\nparameters: { l1: 1.0, r_cut: 1.0, eps: 1.0, sigma: 1.0, dt: 0.1, t_max: 1.0 }\n",
        )
        .unwrap();
        assert_eq!(cfg.engine.boundary, BoundaryMode::Absorption);
        assert_eq!(cfg.engine.scaling, ScaleType::None);
    }

    #[test]
    fn rejects_out_of_range_codes() {
        let params = "parameters: { l1: 1.0, r_cut: 1.0, eps: 1.0, sigma: 1.0, dt: 0.1, t_max: 1.0 }\n";
        let bad_boundary = format!("engine: {{ dimension: 2, boundary: 3 }}\n{params}");
        let bad_scaling = format!("engine: {{ dimension: 2, boundary: 1, scaling: 2 }}\n{params}");
        assert!(ScenarioConfig::from_yaml_str(&bad_boundary).is_err());
        assert!(ScenarioConfig::from_yaml_str(&bad_scaling).is_err());
    }

    #[test]
    fn rejects_unknown_boundary() {
        let err = ScenarioConfig::from_yaml_str(
            "engine: { dimension: 2, boundary: bouncy }\nparameters: { l1: 1.0, r_cut: 1.0, eps: 1.0, sigma: 1.0, dt: 0.1, t_max: 1.0 }\n",
        );
        assert!(err.is_err());
    }
}
