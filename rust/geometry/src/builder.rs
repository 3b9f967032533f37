// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall extrusion and floor generation
//!
//! Every wall cell becomes an axis-aligned box with a
//! `resolution x resolution` footprint, base at Z = 0 and top at the wall
//! height. The floor spans the whole grid at Z = 0. All parts are merged
//! floor first, then cuboids in wall-cell order. Touching cuboids keep their
//! shared faces; no vertices are welded.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use gridmesh_core::{BinaryGrid, GridCell, GridFrame, WallCellSet};
use nalgebra::{Point2, Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Vertices emitted per wall cuboid
pub const CUBOID_VERTICES: usize = 8;

/// Triangles emitted per wall cuboid after triangulation
pub const CUBOID_TRIANGLES: usize = 12;

/// Wall cells between progress log lines
const PROGRESS_INTERVAL: usize = 1000;

/// Floor surface granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorStyle {
    /// One rectangle covering the full grid extent (4 vertices, 2 triangles)
    #[default]
    Quad,
    /// One rectangle per free cell
    PerFreeCell,
}

/// Mesh generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshBuilderConfig {
    /// Wall height in meters, must be positive
    pub wall_height: f64,
    pub floor: FloorStyle,
    /// Build cuboids across rayon workers
    pub parallel: bool,
}

impl Default for MeshBuilderConfig {
    fn default() -> Self {
        Self {
            wall_height: 1.0,
            floor: FloorStyle::Quad,
            parallel: true,
        }
    }
}

/// Builds the merged wall + floor mesh for a grid
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    config: MeshBuilderConfig,
}

impl MeshBuilder {
    pub fn new(config: MeshBuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MeshBuilderConfig {
        &self.config
    }

    /// Extrude `walls` and add a floor
    ///
    /// `binary` is only consulted for [`FloorStyle::PerFreeCell`] but must
    /// match the frame's dimensions either way.
    pub fn build(
        &self,
        walls: &WallCellSet,
        binary: &BinaryGrid,
        frame: &GridFrame,
    ) -> Result<Mesh> {
        let height = self.config.wall_height;
        if !height.is_finite() || height <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "wall height must be positive, got {}",
                height
            )));
        }
        if !frame.resolution.is_finite() || frame.resolution <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "resolution must be positive, got {}",
                frame.resolution
            )));
        }
        if binary.width() != frame.width || binary.height() != frame.height {
            return Err(Error::InvalidParameter(format!(
                "binary grid is {}x{} but frame is {}x{}",
                binary.width(),
                binary.height(),
                frame.width,
                frame.height
            )));
        }

        let floor = match self.config.floor {
            FloorStyle::Quad => floor_quad(frame),
            FloorStyle::PerFreeCell => floor_cells(frame, binary)?,
        };

        let mut mesh = Mesh::with_capacity(
            floor.vertex_count() + walls.len() * CUBOID_VERTICES,
            floor.face_count() + walls.len() * 6,
        );
        mesh.merge(&floor)?;

        let total = walls.len();
        if walls.is_empty() {
            tracing::warn!("No wall cells found, mesh contains only the floor");
        } else if self.config.parallel {
            // One sub-mesh per chunk, merged back in chunk order
            let chunks = walls
                .as_slice()
                .par_chunks(PROGRESS_INTERVAL)
                .enumerate()
                .map(|(n, cells)| -> Result<Mesh> {
                    tracing::debug!(
                        processed = n * PROGRESS_INTERVAL,
                        total,
                        "Extruding wall cells"
                    );
                    let mut part = Mesh::with_capacity(
                        cells.len() * CUBOID_VERTICES,
                        cells.len() * 6,
                    );
                    for &cell in cells {
                        part.merge(&wall_cuboid(frame, cell, height))?;
                    }
                    Ok(part)
                })
                .collect::<Result<Vec<Mesh>>>()?;
            mesh.merge_all(&chunks)?;
        } else {
            for (i, &cell) in walls.iter().enumerate() {
                if i % PROGRESS_INTERVAL == 0 {
                    tracing::debug!(processed = i, total, "Extruding wall cells");
                }
                mesh.merge(&wall_cuboid(frame, cell, height))?;
            }
        }

        tracing::info!(
            cuboids = walls.len(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "Built mesh"
        );

        Ok(mesh)
    }
}

/// Axis-aligned box over one cell's footprint, from Z = 0 to `height`
///
/// Vertex layout: 0-3 bottom ring and 4-7 top ring, both counter-clockwise
/// from the (min x, min y) corner. Quads wind counter-clockwise seen from
/// outside.
pub fn wall_cuboid(frame: &GridFrame, cell: GridCell, height: f64) -> Mesh {
    let (min, max) = frame.cell_bounds(cell);
    box_mesh(min, max, height)
}

fn box_mesh(min: Point2<f64>, max: Point2<f64>, height: f64) -> Mesh {
    let mut vertices = Vec::with_capacity(CUBOID_VERTICES);
    vertices.extend(rect_corners(min, max, 0.0));
    vertices.extend(rect_corners(min, max, height));

    let mut mesh = Mesh {
        vertices,
        faces: Vec::with_capacity(6),
    };
    mesh.add_quad([0, 3, 2, 1], -Vector3::z());
    mesh.add_quad([4, 5, 6, 7], Vector3::z());
    mesh.add_quad([0, 1, 5, 4], -Vector3::y());
    mesh.add_quad([3, 7, 6, 2], Vector3::y());
    mesh.add_quad([0, 4, 7, 3], -Vector3::x());
    mesh.add_quad([1, 2, 6, 5], Vector3::x());

    mesh
}

/// Rectangle corners counter-clockwise from (min x, min y), seen from +Z
fn rect_corners(min: Point2<f64>, max: Point2<f64>, z: f64) -> [Point3<f64>; 4] {
    [
        Point3::new(min.x, min.y, z),
        Point3::new(max.x, min.y, z),
        Point3::new(max.x, max.y, z),
        Point3::new(min.x, max.y, z),
    ]
}

/// Single upward-facing rectangle covering the grid extent at Z = 0
pub fn floor_quad(frame: &GridFrame) -> Mesh {
    let (min, max) = frame.extent();
    let mut mesh = Mesh {
        vertices: rect_corners(min, max, 0.0).to_vec(),
        faces: Vec::with_capacity(1),
    };
    mesh.add_quad([0, 1, 2, 3], Vector3::z());
    mesh
}

/// One upward-facing rectangle per free cell, in row-major order
pub fn floor_cells(frame: &GridFrame, binary: &BinaryGrid) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    for cell in binary.free_cells() {
        let (min, max) = frame.cell_bounds(cell);
        let mut quad = [0u32; 4];
        for (slot, corner) in quad.iter_mut().zip(rect_corners(min, max, 0.0)) {
            *slot = mesh.add_vertex(corner)?;
        }
        mesh.add_quad(quad, Vector3::z());
    }
    Ok(mesh)
}
