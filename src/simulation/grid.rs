//! Cell-linked spatial grid.
//!
//! The domain `[0, L1] x [0, L2] x [0, L3]` is cut into cells of side
//! `r_cut`, so every interaction partner of a particle lives either in its
//! own cell or in one of the grid-adjacent cells. Cells are stored densely
//! in row-major order: `cx + cy * nx + cz * nx * ny`.
//!
//! After particles move the grid is rebuilt from scratch (collect every
//! particle, clear, re-assign). That is O(N) per step and keeps the
//! membership exact without tracking per-cell migrations; the O(N * k)
//! force evaluation dominates the step cost anyway.

use log::info;

use crate::error::{Result, SimError};
use super::cell::Cell;
use super::states::{Dimension, NVec3, Particle};

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    dimension: Dimension,
    extents: NVec3, // L1, L2, L3 (zero on inactive axes)
    r_cut: f64, // cell edge length
    n_cells: [usize; 3], // cells per axis, 1 on inactive axes
    offsets: Vec<[i64; 3]>, // neighbor stencil, self included
    cells: Vec<Cell>,
}

impl SpatialGrid {
    /// Build an empty grid covering the domain.
    ///
    /// Each active axis gets `floor(L / r_cut)` cells. When `L` is not a
    /// multiple of `r_cut` the last cell on that axis absorbs the remainder.
    pub fn new(dimension: Dimension, extents: NVec3, r_cut: f64) -> Result<Self> {
        if !(r_cut > 0.0) {
            return Err(SimError::config(format!("cutoff radius must be positive, got {r_cut}")));
        }

        let mut n_cells = [1usize; 3];
        for axis in 0..dimension.axes() {
            let n = (extents[axis] / r_cut).floor();
            if !(n >= 1.0) {
                return Err(SimError::config(format!(
                    "domain extent {} on axis {axis} is smaller than the cutoff radius {r_cut}",
                    extents[axis]
                )));
            }
            n_cells[axis] = n as usize;
        }

        let [nx, ny, nz] = n_cells;
        let mut cells = Vec::with_capacity(nx * ny * nz);
        for cz in 0..nz {
            for cy in 0..ny {
                for cx in 0..nx {
                    let coords = [cx, cy, cz];
                    let mut center = NVec3::zeros();
                    for axis in 0..dimension.axes() {
                        center[axis] = (coords[axis] as f64 + 0.5) * r_cut;
                    }
                    cells.push(Cell::new(coords, center));
                }
            }
        }

        info!("spatial grid: {nx} x {ny} x {nz} cells of side {r_cut}");

        Ok(Self {
            dimension,
            extents,
            r_cut,
            n_cells,
            offsets: dimension.neighbor_offsets(),
            cells,
        })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn extents(&self) -> NVec3 {
        self.extents
    }

    pub fn r_cut(&self) -> f64 {
        self.r_cut
    }

    pub fn n_cells(&self) -> [usize; 3] {
        self.n_cells
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Row-major linear index of a cell
    pub fn linear_index(&self, coords: [usize; 3]) -> usize {
        let [nx, ny, _] = self.n_cells;
        coords[0] + coords[1] * nx + coords[2] * nx * ny
    }

    pub fn cell_at(&self, coords: [usize; 3]) -> Option<&Cell> {
        if (0..3).any(|axis| coords[axis] >= self.n_cells[axis]) {
            return None;
        }
        self.cells.get(self.linear_index(coords))
    }

    /// Grid coordinates `floor(x / r_cut)` of a particle on the active axes.
    ///
    /// A particle exactly on the upper domain edge (or in the remainder
    /// strip when `L` is not a multiple of `r_cut`) lands in the last cell.
    /// Anything outside `[0, L]` is an `OutOfDomain` error.
    pub fn cell_coords(&self, particle: &Particle) -> Result<[usize; 3]> {
        let mut coords = [0usize; 3];
        for axis in 0..self.dimension.axes() {
            let pos = particle.x[axis];
            if !(pos >= 0.0 && pos <= self.extents[axis]) {
                return Err(SimError::OutOfDomain {
                    id: particle.id,
                    position: particle.x,
                });
            }
            let c = (pos / self.r_cut).floor() as usize;
            coords[axis] = c.min(self.n_cells[axis] - 1);
        }
        Ok(coords)
    }

    /// Place a particle into the cell matching its position
    pub fn assign(&mut self, particle: Particle) -> Result<()> {
        let coords = self.cell_coords(&particle)?;
        let idx = self.linear_index(coords);
        self.cells[idx].add(particle);
        Ok(())
    }

    /// Collect every particle, clear all cells and re-assign them.
    ///
    /// Must run after positions change and before the next force evaluation.
    /// Every particle is checked before any cell is touched, so on an
    /// `OutOfDomain` error the grid is left exactly as it was.
    pub fn rebuild(&mut self) -> Result<()> {
        for particle in self.particles() {
            self.cell_coords(particle)?;
        }

        let mut all = Vec::with_capacity(self.particle_count());
        for cell in self.cells.iter_mut() {
            all.append(&mut cell.take_all());
        }
        for particle in all {
            self.assign(particle)?;
        }
        Ok(())
    }

    /// Linear indices of the cell itself and its in-grid neighbors.
    /// The stencil is not wrapped, even for periodic runs.
    pub fn neighbor_cells(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let coords = self.cells[idx].coords();
        self.offsets.iter().filter_map(move |offset| {
            let mut neighbor = [0usize; 3];
            for axis in 0..3 {
                let c = coords[axis] as i64 + offset[axis];
                if c < 0 || c >= self.n_cells[axis] as i64 {
                    return None;
                }
                neighbor[axis] = c as usize;
            }
            Some(self.linear_index(neighbor))
        })
    }

    pub fn particle_count(&self) -> usize {
        self.cells.iter().map(Cell::len).sum()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.cells.iter().flat_map(|c| c.particles().iter())
    }

    pub fn particles_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.cells.iter_mut().flat_map(|c| c.particles_mut().iter_mut())
    }

    /// Remove every particle matching `pred` from whichever cell owns it
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<Particle>
    where
        F: FnMut(&Particle) -> bool,
    {
        let mut removed = Vec::new();
        for cell in self.cells.iter_mut() {
            removed.append(&mut cell.remove_where(&mut pred));
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2d(l: f64, r_cut: f64) -> SpatialGrid {
        SpatialGrid::new(Dimension::Two, NVec3::new(l, l, 0.0), r_cut).unwrap()
    }

    fn at(id: u32, x: f64, y: f64) -> Particle {
        Particle::new(id, 1.0, 0, NVec3::new(x, y, 0.0), NVec3::zeros())
    }

    #[test]
    fn grid_shape_and_centers() {
        let grid = grid_2d(10.0, 2.5);
        assert_eq!(grid.n_cells(), [4, 4, 1]);
        assert_eq!(grid.cells().len(), 16);

        let cell = grid.cell_at([1, 2, 0]).unwrap();
        assert_eq!(cell.coords(), [1, 2, 0]);
        assert_eq!(cell.center(), NVec3::new(3.75, 6.25, 0.0));
        assert_eq!(grid.linear_index([1, 2, 0]), 9);
    }

    #[test]
    fn assign_uses_floor_of_position() {
        let mut grid = grid_2d(10.0, 2.5);
        grid.assign(at(0, 3.0, 7.6)).unwrap();
        let idx = grid.linear_index([1, 3, 0]);
        assert_eq!(grid.cells()[idx].len(), 1);
    }

    #[test]
    fn assign_clamps_upper_edge() {
        let mut grid = grid_2d(10.0, 2.5);
        grid.assign(at(0, 10.0, 10.0)).unwrap();
        assert_eq!(grid.cell_at([3, 3, 0]).unwrap().len(), 1);
    }

    #[test]
    fn assign_rejects_escaped_particle() {
        let mut grid = grid_2d(10.0, 2.5);
        let err = grid.assign(at(4, 10.5, 5.0)).unwrap_err();
        assert!(matches!(err, SimError::OutOfDomain { id: 4, .. }));
        assert!(grid.assign(at(5, 1.0, -0.01)).is_err());
        assert_eq!(grid.particle_count(), 0);
    }

    #[test]
    fn remainder_strip_goes_to_last_cell() {
        let mut grid = grid_2d(10.0, 3.0);
        assert_eq!(grid.n_cells(), [3, 3, 1]);
        grid.assign(at(0, 9.5, 0.5)).unwrap();
        assert_eq!(grid.cell_at([2, 0, 0]).unwrap().len(), 1);
    }

    #[test]
    fn extent_below_cutoff_is_rejected() {
        let err = SpatialGrid::new(Dimension::Two, NVec3::new(10.0, 0.5, 0.0), 1.0);
        assert!(matches!(err, Err(SimError::Configuration(_))));
    }

    #[test]
    fn neighbor_cells_are_bounded() {
        let grid = grid_2d(10.0, 2.5);
        let corner = grid.linear_index([0, 0, 0]);
        let inner = grid.linear_index([1, 1, 0]);
        assert_eq!(grid.neighbor_cells(corner).count(), 4);
        assert_eq!(grid.neighbor_cells(inner).count(), 9);

        let grid3 = SpatialGrid::new(Dimension::Three, NVec3::new(3.0, 3.0, 3.0), 1.0).unwrap();
        let center = grid3.linear_index([1, 1, 1]);
        assert_eq!(grid3.neighbor_cells(center).count(), 27);
    }

    #[test]
    fn rebuild_moves_particles_to_new_cells() {
        let mut grid = grid_2d(10.0, 2.5);
        grid.assign(at(0, 1.0, 1.0)).unwrap();
        grid.assign(at(1, 6.0, 6.0)).unwrap();

        for p in grid.particles_mut() {
            p.x += NVec3::new(3.0, 0.0, 0.0);
        }
        grid.rebuild().unwrap();

        assert_eq!(grid.particle_count(), 2);
        assert_eq!(grid.cell_at([1, 0, 0]).unwrap().particles()[0].id, 0);
        assert_eq!(grid.cell_at([3, 2, 0]).unwrap().particles()[0].id, 1);
    }

    #[test]
    fn failed_rebuild_keeps_every_particle() {
        let mut grid = grid_2d(10.0, 2.5);
        grid.assign(at(0, 1.0, 1.0)).unwrap();
        grid.assign(at(1, 6.0, 6.0)).unwrap();
        grid.assign(at(2, 9.0, 9.0)).unwrap();

        for p in grid.particles_mut() {
            if p.id == 1 {
                p.x = NVec3::new(11.0, 6.0, 0.0);
            }
        }
        let err = grid.rebuild().unwrap_err();

        assert!(matches!(err, SimError::OutOfDomain { id: 1, .. }));
        assert_eq!(grid.particle_count(), 3);
        assert_eq!(grid.cell_at([0, 0, 0]).unwrap().particles()[0].id, 0);
        assert_eq!(grid.cell_at([2, 2, 0]).unwrap().particles()[0].id, 1);
        assert_eq!(grid.cell_at([3, 3, 0]).unwrap().particles()[0].id, 2);
    }

    #[test]
    fn one_dimensional_grid_ignores_other_axes() {
        let mut grid = SpatialGrid::new(Dimension::One, NVec3::new(5.0, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(grid.n_cells(), [5, 1, 1]);
        grid.assign(Particle::new(0, 1.0, 0, NVec3::new(2.2, 7.0, -3.0), NVec3::zeros())).unwrap();
        assert_eq!(grid.cell_at([2, 0, 0]).unwrap().len(), 1);
    }
}
