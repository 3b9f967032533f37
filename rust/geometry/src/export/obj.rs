// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ writer
//!
//! Z-up coordinates are written as-is. Faces are triangulated and use
//! 1-based indices.

use crate::mesh::Mesh;
use std::io::{self, Write};

/// Write `mesh` as OBJ text
pub fn write_obj<W: Write>(mesh: &Mesh, mut w: W) -> io::Result<()> {
    writeln!(w, "# gridmesh OBJ")?;
    writeln!(w, "# vertices: {}", mesh.vertex_count())?;
    writeln!(w, "# triangles: {}", mesh.triangle_count())?;
    writeln!(w, "o map")?;

    for v in &mesh.vertices {
        writeln!(w, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
    }

    for [a, b, c] in mesh.triangles() {
        writeln!(w, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }

    w.flush()
}
