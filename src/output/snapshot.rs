//! Per-step snapshot hand-off
//!
//! The simulation builds a `Frame` once per step (step 0 included) and hands
//! it to a `SnapshotSink`. A failing sink is reported by the caller and does
//! not stop the run.

use crate::error::Result;
use crate::simulation::states::{Dimension, Particle};

/// Read-only view of the particle set at the end of a step
pub struct Frame<'a> {
    pub step: u64,
    pub time: f64,
    pub dimension: Dimension,
    pub particles: Vec<&'a Particle>,
}

pub trait SnapshotSink {
    fn write(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// Sink that drops every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn write(&mut self, _frame: &Frame<'_>) -> Result<()> {
        Ok(())
    }
}
