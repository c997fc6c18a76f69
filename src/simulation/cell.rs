//! A single cell of the spatial grid.

use super::states::{NVec3, Particle};

/// One cubic (square in 2D) region of side `r_cut` and the particles it owns
#[derive(Debug, Clone)]
pub struct Cell {
    coords: [usize; 3], // integer grid coordinates (cx, cy, cz)
    center: NVec3, // geometric center, diagnostic only
    particles: Vec<Particle>,
}

impl Cell {
    pub fn new(coords: [usize; 3], center: NVec3) -> Self {
        Self {
            coords,
            center,
            particles: Vec::new(),
        }
    }

    pub fn coords(&self) -> [usize; 3] {
        self.coords
    }

    pub fn center(&self) -> NVec3 {
        self.center
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn add(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Remove the particle with the given id, keeping the order of the rest
    pub fn remove(&mut self, id: u32) -> Option<Particle> {
        let idx = self.particles.iter().position(|p| p.id == id)?;
        Some(self.particles.remove(idx))
    }

    /// Remove every particle matching `pred` and hand them back
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<Particle>
    where
        F: FnMut(&Particle) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = self.particles.drain(..).partition(|p| pred(p));
        self.particles = kept;
        removed
    }

    /// Empty the cell, returning what it held
    pub fn take_all(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.particles)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
