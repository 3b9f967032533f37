// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

/// Vertex indices of one polygon face
pub type FaceIndices = SmallVec<[u32; 4]>;

/// Largest vertex index addressable by `u32` indices
pub const MAX_VERTICES: usize = u32::MAX as usize;

/// Index of the vertex that would be stored at position `len`
fn vertex_index(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::InvalidMesh(format!(
            "vertex index {} exceeds {}",
            len, MAX_VERTICES
        ))
    })
}

/// A planar polygon referencing mesh vertices (0-based)
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: FaceIndices,
    /// Outward normal, if known
    pub normal: Option<Vector3<f64>>,
}

impl Face {
    pub fn new(indices: &[u32]) -> Self {
        Self {
            indices: SmallVec::from_slice(indices),
            normal: None,
        }
    }

    pub fn with_normal(indices: &[u32], normal: Vector3<f64>) -> Self {
        Self {
            indices: SmallVec::from_slice(indices),
            normal: Some(normal),
        }
    }

    /// Triangles produced by fan triangulation
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len().saturating_sub(2)
    }

    /// Fan triangulation from the first vertex: a quad `[a, b, c, d]`
    /// becomes `[a, b, c]` and `[a, c, d]`
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let idx = &self.indices;
        (1..idx.len().saturating_sub(1)).map(move |i| [idx[0], idx[i], idx[i + 1]])
    }
}

/// Polygon mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<Point3<f64>>,
    /// Faces, each with at least three vertex indices
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<u32> {
        let index = vertex_index(self.vertices.len())?;
        self.vertices.push(position);
        Ok(index)
    }

    #[inline]
    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.faces.push(Face::new(&[i0, i1, i2]));
    }

    #[inline]
    pub fn add_quad(&mut self, indices: [u32; 4], normal: Vector3<f64>) {
        self.faces.push(Face::with_normal(&indices, normal));
    }

    /// Append another mesh, offsetting its face indices by the current
    /// vertex count. Coincident vertices are not merged.
    ///
    /// Fails without modifying `self` if the result would not be
    /// addressable by `u32` indices.
    pub fn merge(&mut self, other: &Mesh) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }

        let vertex_offset = vertex_index(self.vertices.len())?;
        vertex_index(self.vertices.len() + other.vertices.len() - 1)?;

        let faces = other
            .faces
            .iter()
            .map(|face| {
                let indices = face
                    .indices
                    .iter()
                    .map(|&i| {
                        i.checked_add(vertex_offset).ok_or_else(|| {
                            Error::InvalidMesh(format!("vertex index {} overflows", i))
                        })
                    })
                    .collect::<Result<FaceIndices>>()?;
                Ok(Face {
                    indices,
                    normal: face.normal,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(faces);
        Ok(())
    }

    /// Batch merge, reserving capacity once
    pub fn merge_all(&mut self, meshes: &[Mesh]) -> Result<()> {
        let total_vertices: usize = meshes.iter().map(|m| m.vertices.len()).sum();
        let total_faces: usize = meshes.iter().map(|m| m.faces.len()).sum();

        self.vertices.reserve(total_vertices);
        self.faces.reserve(total_faces);

        for mesh in meshes {
            self.merge(mesh)?;
        }
        Ok(())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Triangle count after triangulation
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(Face::triangle_count).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Calculate bounds (min, max); the origin for an empty mesh
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        (min, max)
    }

    /// Check that every face has at least three in-range indices
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (f, face) in self.faces.iter().enumerate() {
            if face.indices.len() < 3 {
                return Err(Error::InvalidMesh(format!(
                    "face {} has {} vertices",
                    f,
                    face.indices.len()
                )));
            }
            if let Some(&bad) = face.indices.iter().find(|&&i| i as usize >= count) {
                return Err(Error::InvalidMesh(format!(
                    "face {} references vertex {} of {}",
                    f, bad, count
                )));
            }
        }
        Ok(())
    }

    /// True when every face is a triangle
    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(|f| f.indices.len() == 3)
    }

    /// Copy of this mesh with every face split into triangles
    pub fn triangulate(&self) -> Mesh {
        let mut out = Mesh::with_capacity(self.vertices.len(), self.triangle_count());
        out.vertices.extend_from_slice(&self.vertices);
        for face in &self.faces {
            out.faces.extend(face.triangles().map(|tri| Face {
                indices: SmallVec::from_slice(&tri),
                normal: face.normal,
            }));
        }
        out
    }

    /// All triangles, in face order
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces.iter().flat_map(Face::triangles)
    }

    /// Right-hand-rule unit normal of a triangle, zero if degenerate
    pub fn triangle_normal(&self, tri: [u32; 3]) -> Vector3<f64> {
        let a = self.vertices[tri[0] as usize];
        let b = self.vertices[tri[1] as usize];
        let c = self.vertices[tri[2] as usize];
        let n = (b - a).cross(&(c - a));
        n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }
}
