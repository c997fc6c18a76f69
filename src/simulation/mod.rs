pub mod states;
pub mod cell;
pub mod grid;
pub mod params;
pub mod engine;
pub mod forces;
pub mod boundary;
pub mod integrator;
pub mod driver;
pub mod scenario;
