//! VTK XML unstructured-grid writer
//!
//! One ASCII `.vtu` file per step, named `data_t<step>.vtu`, holding the
//! particles as a point cloud (`NumberOfCells="0"`) with velocity, mass and
//! category as point data. ParaView opens the series directly.

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::Result;
use crate::simulation::states::NVec3;
use super::snapshot::{Frame, SnapshotSink};

pub struct VtuWriter {
    out_dir: PathBuf,
}

impl VtuWriter {
    /// Create the output directory if needed
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path of the file written for `step`
    pub fn path_for(&self, step: u64) -> PathBuf {
        self.out_dir.join(format!("data_t{step}.vtu"))
    }
}

impl SnapshotSink for VtuWriter {
    fn write(&mut self, frame: &Frame<'_>) -> Result<()> {
        let path = self.path_for(frame.step);
        fs::write(&path, render(frame))?;
        trace!("wrote {}", path.display());
        Ok(())
    }
}

/// Render a frame as a VTU document.
/// VTK points always carry three components, velocity only the active ones.
pub fn render(frame: &Frame<'_>) -> String {
    let n = frame.particles.len();
    let dims = frame.dimension.axes();

    let positions = join_vectors(frame.particles.iter().map(|p| &p.x), 3);
    let velocities = join_vectors(frame.particles.iter().map(|p| &p.v), dims);
    let masses = join_scalars(frame.particles.iter().map(|p| p.mass));
    let categories = join_scalars(frame.particles.iter().map(|p| p.category));

    format!(
        r#"<?xml version="1.0"?>
<VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian">
  <UnstructuredGrid>
    <Piece NumberOfPoints="{n}" NumberOfCells="0">
      <Points>
        <DataArray Name="Position" type="Float32" NumberOfComponents="3" format="ascii">
{positions}
        </DataArray>
      </Points>
      <PointData Vectors="Velocity" Scalars="Mass">
        <DataArray Name="Velocity" type="Float32" NumberOfComponents="{dims}" format="ascii">
{velocities}
        </DataArray>
        <DataArray Name="Mass" type="Float32" format="ascii">
{masses}
        </DataArray>
        <DataArray Name="Category" type="Int32" format="ascii">
{categories}
        </DataArray>
      </PointData>
      <Cells>
        <DataArray type="Int32" Name="connectivity" format="ascii">
        </DataArray>
        <DataArray type="Int32" Name="offsets" format="ascii">
        </DataArray>
        <DataArray type="UInt8" Name="types" format="ascii">
        </DataArray>
      </Cells>
    </Piece>
  </UnstructuredGrid>
</VTKFile>
"#
    )
}

fn join_scalars<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

fn join_vectors<'a>(vectors: impl Iterator<Item = &'a NVec3>, components: usize) -> String {
    let mut out = Vec::new();
    for v in vectors {
        for axis in 0..components {
            out.push(v[axis].to_string());
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::{Dimension, Particle};

    fn frame_particles() -> Vec<Particle> {
        vec![
            Particle::new(0, 1.0, 1, NVec3::new(0.5, 1.5, 0.0), NVec3::new(2.0, -1.0, 0.0)),
            Particle::new(1, 2.5, 0, NVec3::new(3.0, 4.0, 0.0), NVec3::zeros()),
        ]
    }

    #[test]
    fn render_lists_every_particle() {
        let particles = frame_particles();
        let frame = Frame {
            step: 3,
            time: 0.015,
            dimension: Dimension::Two,
            particles: particles.iter().collect(),
        };
        let doc = render(&frame);

        assert!(doc.contains("NumberOfPoints=\"2\""));
        assert!(doc.contains("0.5 1.5 0 3 4 0"));
        assert!(doc.contains("NumberOfComponents=\"2\""));
        assert!(doc.contains("2 -1 0 0"));
        assert!(doc.contains("1 2.5"));
        assert!(doc.contains("\n1 0\n"));
    }

    #[test]
    fn empty_frame_renders_complete_document() {
        let frame = Frame {
            step: 0,
            time: 0.0,
            dimension: Dimension::One,
            particles: Vec::new(),
        };
        let doc = render(&frame);

        assert!(doc.contains("NumberOfPoints=\"0\""));
        assert!(doc.contains("NumberOfComponents=\"1\""));
        assert_eq!(doc.matches("<DataArray").count(), 7);
        assert_eq!(doc.matches("</DataArray>").count(), 7);
        assert!(doc.ends_with("</VTKFile>\n"));
    }

    #[test]
    fn writer_names_files_by_step() {
        let dir = std::env::temp_dir().join(format!("ljsim-vtu-{}", std::process::id()));
        let mut writer = VtuWriter::new(&dir).unwrap();
        let particles = frame_particles();
        let frame = Frame {
            step: 7,
            time: 0.0,
            dimension: Dimension::Three,
            particles: particles.iter().collect(),
        };

        writer.write(&frame).unwrap();

        let path = dir.join("data_t7.vtu");
        assert_eq!(writer.path_for(7), path);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
