pub mod error;
pub mod simulation;
pub mod configuration;
pub mod output;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{Dimension, NVec3, Particle};
pub use simulation::cell::Cell;
pub use simulation::grid::SpatialGrid;
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::forces::{ForceEvaluator, ForceSet, LennardJones, PairForce, PairGravity, FORCE_CLAMP};
pub use simulation::boundary::BoundaryMode;
pub use simulation::integrator::{ScaleType, VelocityVerlet};
pub use simulation::driver::Simulation;
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, GeneratorConfig, ParametersConfig, ParticleConfig, ScenarioConfig};

pub use output::snapshot::{Frame, NullSink, SnapshotSink};
pub use output::vtu::VtuWriter;

pub use benchmark::benchmark::{bench_forces, bench_step};
