// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GridMesh Geometry
//!
//! Turns extracted wall cells into a polygon mesh (one box per wall cell
//! plus a floor) and serializes it as OBJ or binary STL.

pub mod builder;
pub mod error;
pub mod export;
pub mod mesh;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use builder::{
    floor_cells, floor_quad, wall_cuboid, FloorStyle, MeshBuilder, MeshBuilderConfig,
    CUBOID_TRIANGLES, CUBOID_VERTICES,
};
pub use error::{Error, Result};
pub use export::{
    check_writable, encode, write_atomic, write_atomic_all, ExportFormat, ExportedFile,
    MeshExporter,
};
pub use mesh::{Face, FaceIndices, Mesh, MAX_VERTICES};
