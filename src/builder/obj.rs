//! Wavefront OBJ export of the mesh objects in a scene.

use crate::builder::scene::Scene;
use crate::error::Result;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `o`, `v` and `l` records; vertex indices are global and 1-based
pub fn write_obj<S: Scene + ?Sized, W: Write>(scene: &S, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "# blueprint3d wireframe export")?;

    let mut base = 1usize;
    for mesh in scene.meshes() {
        writeln!(writer, "o {}", mesh.name)?;
        for [x, y, z] in &mesh.vertices {
            writeln!(writer, "v {} {} {}", x, y, z)?;
        }
        for [a, b] in &mesh.edges {
            writeln!(writer, "l {} {}", base + a, base + b)?;
        }
        base += mesh.vertices.len();
    }

    writer.flush()
}

pub fn save_obj<S: Scene + ?Sized, P: AsRef<Path>>(scene: &S, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_obj(scene, BufWriter::new(file))?;
    Ok(())
}
