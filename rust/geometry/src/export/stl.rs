// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary STL writer
//!
//! Layout: 80-byte header, u32 triangle count, then 50 bytes per triangle
//! (normal, three vertices as f32 triples, u16 attribute). Little-endian.

use crate::mesh::Mesh;
use std::io::{self, Write};

/// Size of the fixed header
pub const HEADER_LEN: usize = 80;

/// Size of one triangle record
pub const TRIANGLE_RECORD_LEN: usize = 50;

const HEADER_TAG: &[u8] = b"gridmesh binary STL";

/// Total encoded size for `triangles` triangles
#[inline]
pub fn encoded_len(triangles: usize) -> usize {
    HEADER_LEN + 4 + triangles * TRIANGLE_RECORD_LEN
}

fn header() -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..HEADER_TAG.len()].copy_from_slice(HEADER_TAG);
    header
}

#[inline]
fn write_vec3<W: Write>(w: &mut W, x: f64, y: f64, z: f64) -> io::Result<()> {
    w.write_all(&(x as f32).to_le_bytes())?;
    w.write_all(&(y as f32).to_le_bytes())?;
    w.write_all(&(z as f32).to_le_bytes())
}

/// Write `mesh` as binary STL
///
/// Normals are recomputed per triangle from its winding.
pub fn write_stl<W: Write>(mesh: &Mesh, mut w: W) -> io::Result<()> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many triangles"))?;

    w.write_all(&header())?;
    w.write_all(&count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let n = mesh.triangle_normal(tri);
        write_vec3(&mut w, n.x, n.y, n.z)?;
        for i in tri {
            let v = mesh.vertices[i as usize];
            write_vec3(&mut w, v.x, v.y, v.z)?;
        }
        w.write_all(&0u16.to_le_bytes())?;
    }

    w.flush()
}
