//! Short-range pair forces evaluated over the cell grid
//!
//! Defines the pair-term trait, the Lennard-Jones and pair-gravity terms,
//! and the `ForceEvaluator` that walks the grid cell by cell and writes the
//! net force into every particle.

use super::grid::SpatialGrid;
use super::states::{NVec3, Particle};

/// Per-axis bound on the net pair force when no velocity rescaling is active
pub const FORCE_CLAMP: f64 = 1.0e5;

/// Trait for a pairwise interaction seen from particle `p1`
/// `r` is `p2.x - p1.x` and `norm` is `|r|`, already checked to be in `(0, r_cut)`
pub trait PairForce {
    /// Force exerted on `p1` by `p2`
    fn force(&self, r: &NVec3, norm: f64, p1: &Particle, p2: &Particle) -> NVec3;

    /// Potential energy of the pair as seen from `p1`
    fn potential(&self, norm: f64, p1: &Particle, p2: &Particle) -> f64;
}

/// Collection of pair terms (Lennard-Jones, gravity, ...)
/// Contributions of every term are summed for each pair
pub struct ForceSet {
    terms: Vec<Box<dyn PairForce + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add a pair term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: PairForce + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of every term's force on `p1`
    pub fn pair_force(&self, r: &NVec3, norm: f64, p1: &Particle, p2: &Particle) -> NVec3 {
        self.terms
            .iter()
            .fold(NVec3::zeros(), |acc, term| acc + term.force(r, norm, p1, p2))
    }

    /// Sum of every term's potential
    pub fn pair_potential(&self, norm: f64, p1: &Particle, p2: &Particle) -> f64 {
        self.terms.iter().map(|term| term.potential(norm, p1, p2)).sum()
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Lennard-Jones 12-6 interaction
/// V(r) = 4 eps [(sigma/r)^12 - (sigma/r)^6]
#[derive(Debug, Clone, Copy)]
pub struct LennardJones {
    pub eps: f64, // well depth
    pub sigma: f64, // zero-crossing distance of the potential
}

impl PairForce for LennardJones {
    fn force(&self, r: &NVec3, norm: f64, _p1: &Particle, _p2: &Particle) -> NVec3 {
        // s6 = (sigma / |r|)^6
        let s6 = (self.sigma / norm).powi(6);

        // F = r * 24 eps / |r|^2 * s6 * (1 - 2 s6)
        // Negative coefficient pushes p1 away from p2 (repulsive core),
        // positive pulls it in (attractive tail). Zero at |r| = 2^(1/6) sigma.
        r * (24.0 * self.eps / (norm * norm) * s6 * (1.0 - 2.0 * s6))
    }

    fn potential(&self, norm: f64, _p1: &Particle, _p2: &Particle) -> f64 {
        let s6 = (self.sigma / norm).powi(6);
        4.0 * self.eps * (s6 * s6 - s6)
    }
}

/// Pairwise attraction `r * m1 / |r|^3`.
///
/// Only the mass of the particle being pushed enters the law; the partner's
/// mass is not weighted in. Kept as-is until the intended physics is
/// confirmed; disable it with `Engine::pair_gravity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairGravity;

impl PairForce for PairGravity {
    fn force(&self, r: &NVec3, norm: f64, p1: &Particle, _p2: &Particle) -> NVec3 {
        r * (p1.mass / (norm * norm * norm))
    }

    fn potential(&self, norm: f64, p1: &Particle, _p2: &Particle) -> f64 {
        -p1.mass / norm
    }
}

/// Cutoff-radius force evaluation over a [`SpatialGrid`]
///
/// For each cell the candidate set is the cell plus its in-grid neighbors.
/// Every particle scans all of its candidates, so each unordered pair is
/// evaluated twice (once from each side) and no third-law shortcut is taken.
pub struct ForceEvaluator {
    pub terms: ForceSet,
    pub r_cut: f64,
    pub clamp: Option<f64>, // per-axis bound on the pair sum, `None` disables it
    pub g: f64, // uniform field along +y, scaled by mass
}

impl ForceEvaluator {
    pub fn new(terms: ForceSet, r_cut: f64, clamp: Option<f64>, g: f64) -> Self {
        Self {
            terms,
            r_cut,
            clamp,
            g,
        }
    }

    /// Recompute the force of every particle in the grid.
    /// Forces are computed against a frozen snapshot, then written back.
    pub fn evaluate(&self, grid: &mut SpatialGrid) {
        let per_cell: Vec<Vec<NVec3>> = (0..grid.cells().len())
            .map(|idx| self.cell_forces(grid, idx))
            .collect();

        for (cell, forces) in grid.cells_mut().iter_mut().zip(per_cell) {
            for (p, f) in cell.particles_mut().iter_mut().zip(forces) {
                p.f = f;
            }
        }
    }

    /// Net force on each particle of cell `idx`, in cell order
    fn cell_forces(&self, grid: &SpatialGrid, idx: usize) -> Vec<NVec3> {
        let candidates = candidates(grid, idx);
        grid.cells()[idx]
            .particles()
            .iter()
            .map(|p1| self.net_force(p1, &candidates))
            .collect()
    }

    /// Net force on `p1` from a candidate set, including clamp and uniform field
    pub fn net_force(&self, p1: &Particle, candidates: &[&Particle]) -> NVec3 {
        let mut f = NVec3::zeros();

        for p2 in candidates {
            // identity, not value: two particles may share a position
            if p2.id == p1.id {
                continue;
            }
            let r = p2.x - p1.x;
            let norm = r.norm();
            if norm > 0.0 && norm < self.r_cut {
                f += self.terms.pair_force(&r, norm, p1, p2);
            }
        }

        if let Some(limit) = self.clamp {
            f = f.map(|c| c.clamp(-limit, limit));
        }

        if self.g != 0.0 {
            f.y += p1.mass * self.g;
        }

        f
    }

    /// Total pair potential within the cutoff. Pairs are visited from both
    /// sides, so each ordered contribution counts half.
    pub fn potential_energy(&self, grid: &SpatialGrid) -> f64 {
        let mut total = 0.0;
        for idx in 0..grid.cells().len() {
            let candidates = candidates(grid, idx);
            for p1 in grid.cells()[idx].particles() {
                for p2 in &candidates {
                    if p2.id == p1.id {
                        continue;
                    }
                    let norm = (p2.x - p1.x).norm();
                    if norm > 0.0 && norm < self.r_cut {
                        total += 0.5 * self.terms.pair_potential(norm, p1, p2);
                    }
                }
            }
        }
        total
    }
}

/// Particles of cell `idx` and of every in-grid neighbor
fn candidates(grid: &SpatialGrid, idx: usize) -> Vec<&Particle> {
    grid.neighbor_cells(idx)
        .flat_map(|n| grid.cells()[n].particles().iter())
        .collect()
}
