//! Core state types for the particle simulation.
//!
//! - `NVec3`: the 3-component value type used for position, velocity and force
//! - `Particle`: one point particle with a permanent id
//! - `Dimension`: 1D, 2D or 3D run, decides which axes are active
//!
//! 2D and 1D runs reuse `NVec3`; components on inactive axes are carried
//! along untouched.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u32, // unique for the whole run, key into per-particle maps
    pub mass: f64, // mass (> 0)
    pub category: i32, // opaque tag, only read by snapshot writers
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub f: NVec3, // force from the latest evaluation
}

impl Particle {
    /// New particle with no accumulated force
    pub fn new(id: u32, mass: f64, category: i32, x: NVec3, v: NVec3) -> Self {
        Self {
            id,
            mass,
            category,
            x,
            v,
            f: NVec3::zeros(),
        }
    }

    /// 0.5 * m * |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.v.norm_squared()
    }
}

/// Spatial dimensionality of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    One,
    Two,
    Three,
}

impl Dimension {
    /// Map the integer dimension (1..=3) used in configuration files
    pub fn from_int(d: u32) -> Option<Self> {
        match d {
            1 => Some(Dimension::One),
            2 => Some(Dimension::Two),
            3 => Some(Dimension::Three),
            _ => None,
        }
    }

    /// Number of active axes
    pub fn axes(self) -> usize {
        match self {
            Dimension::One => 1,
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }

    /// Offsets of the cell itself plus every grid-adjacent cell over the
    /// active axes: 3, 9 or 27 entries.
    pub fn neighbor_offsets(self) -> Vec<[i64; 3]> {
        let span = |axis: usize| -> Vec<i64> {
            if axis < self.axes() { vec![-1, 0, 1] } else { vec![0] }
        };

        let mut offsets = Vec::with_capacity(3usize.pow(self.axes() as u32));
        for dz in span(2) {
            for dy in span(1) {
                for dx in span(0) {
                    offsets.push([dx, dy, dz]);
                }
            }
        }
        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_per_dimension() {
        assert_eq!(Dimension::One.neighbor_offsets().len(), 3);
        assert_eq!(Dimension::Two.neighbor_offsets().len(), 9);
        assert_eq!(Dimension::Three.neighbor_offsets().len(), 27);
        assert!(Dimension::Two.neighbor_offsets().iter().all(|o| o[2] == 0));
        assert!(Dimension::Three.neighbor_offsets().contains(&[0, 0, 0]));
    }

    #[test]
    fn dimension_from_int_rejects_out_of_range() {
        assert_eq!(Dimension::from_int(0), None);
        assert_eq!(Dimension::from_int(4), None);
        assert_eq!(Dimension::from_int(2), Some(Dimension::Two));
    }
}
