// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural properties of generated meshes and their OBJ/STL encodings.

use approx::assert_relative_eq;
use gridmesh_core::{
    BinaryGrid, CellState, GridFrame, MapMetadata, OccupancyGrid, Pose2D, WallExtractor,
};
use gridmesh_geometry::export::obj::write_obj;
use gridmesh_geometry::export::stl;
use gridmesh_geometry::{encode, ExportFormat, Mesh, MeshBuilder, MeshBuilderConfig, Point3};

/// A 12x9 room: closed outer wall, one internal pillar, free elsewhere
fn room_pixels() -> (Vec<u8>, usize, usize) {
    let (w, h) = (12usize, 9usize);
    let mut px = vec![255u8; w * h];
    for row in 0..h {
        for col in 0..w {
            let border = row == 0 || row == h - 1 || col == 0 || col == w - 1;
            let pillar = (3..6).contains(&row) && (4..7).contains(&col);
            if border || pillar {
                px[row * w + col] = 0;
            }
        }
    }
    (px, w, h)
}

fn build(resolution: f64, wall_height: f64) -> (Mesh, usize) {
    let (px, w, h) = room_pixels();
    let meta = MapMetadata::new(resolution, Pose2D::new(0.0, 0.0, 0.0));
    let grid = OccupancyGrid::from_raster(px, w, h, &meta).unwrap();

    let binary = BinaryGrid::from_occupancy(&grid, Default::default());
    let walls = WallExtractor::default().extract_from_binary(&binary);
    let mesh = MeshBuilder::new(MeshBuilderConfig {
        wall_height,
        ..Default::default()
    })
    .build(&walls, &binary, &grid.frame())
    .unwrap();

    (mesh, walls.len())
}

struct ObjSummary {
    vertices: Vec<Point3<f64>>,
    triangles: usize,
}

fn parse_obj(text: &str) -> ObjSummary {
    let mut vertices = Vec::new();
    let mut triangles = 0;
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let c: Vec<f64> = parts.map(|p| p.parse().unwrap()).collect();
                vertices.push(Point3::new(c[0], c[1], c[2]));
            }
            Some("f") => {
                let idx: Vec<usize> = parts.map(|p| p.parse().unwrap()).collect();
                assert_eq!(idx.len(), 3);
                assert!(idx.iter().all(|&i| i >= 1 && i <= vertices.len()));
                triangles += 1;
            }
            _ => {}
        }
    }
    ObjSummary {
        vertices,
        triangles,
    }
}

fn stl_bounds(bytes: &[u8]) -> (usize, [f32; 3], [f32; 3]) {
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    assert_eq!(bytes.len(), stl::encoded_len(count));

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for t in 0..count {
        let rec = 84 + t * stl::TRIANGLE_RECORD_LEN;
        for v in 0..3 {
            for axis in 0..3 {
                let at = rec + 12 + v * 12 + axis * 4;
                let value =
                    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }
    }
    (count, min, max)
}

#[test]
fn test_triangle_count_is_twelve_per_wall_plus_floor() {
    let (mesh, walls) = build(1.0, 1.0);

    // Outer ring 2*12 + 2*7 = 38, pillar ring 9 - 1 = 8
    assert_eq!(walls, 46);
    assert_eq!(mesh.triangle_count(), 12 * walls + 2);
    assert_eq!(mesh.vertex_count(), 8 * walls + 4);
}

#[test]
fn test_fully_free_grid_is_just_the_floor() {
    let binary = BinaryGrid::from_cells(7, 5, vec![CellState::Free; 35]).unwrap();
    let frame = GridFrame::new(7, 5, 0.2, Pose2D::default());
    let walls = WallExtractor::default().extract_from_binary(&binary);

    let mesh = MeshBuilder::default().build(&walls, &binary, &frame).unwrap();

    assert!(walls.is_empty());
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn test_bounds_scale_with_resolution_but_not_height() {
    for resolution in [1.0, 0.05, 2.5] {
        let (mesh, _) = build(resolution, 1.75);
        let (min, max) = mesh.bounds();

        assert_relative_eq!(max.x - min.x, 12.0 * resolution, epsilon = 1e-9);
        assert_relative_eq!(max.y - min.y, 9.0 * resolution, epsilon = 1e-9);
        assert_relative_eq!(max.z - min.z, 1.75, epsilon = 1e-12);
    }

    let (base, _) = build(1.0, 1.0);
    let (scaled, _) = build(3.0, 1.0);
    for (a, b) in base.vertices.iter().zip(&scaled.vertices) {
        assert_relative_eq!(b.x, a.x * 3.0, epsilon = 1e-9);
        assert_relative_eq!(b.y, a.y * 3.0, epsilon = 1e-9);
        assert_relative_eq!(b.z, a.z, epsilon = 1e-12);
    }
}

#[test]
fn test_obj_and_stl_agree() {
    let (mesh, _) = build(0.05, 1.0);

    let obj = String::from_utf8(encode(&mesh, ExportFormat::Obj).unwrap()).unwrap();
    let stl = encode(&mesh, ExportFormat::Stl).unwrap();

    let parsed = parse_obj(&obj);
    let (stl_triangles, stl_min, stl_max) = stl_bounds(&stl);

    assert_eq!(parsed.vertices.len(), mesh.vertex_count());
    assert_eq!(parsed.triangles, mesh.triangle_count());
    assert_eq!(stl_triangles, parsed.triangles);

    let obj_mesh = Mesh {
        vertices: parsed.vertices,
        faces: Vec::new(),
    };
    let (obj_min, obj_max) = obj_mesh.bounds();
    for axis in 0..3 {
        assert!((obj_min[axis] - stl_min[axis] as f64).abs() < 1e-5);
        assert!((obj_max[axis] - stl_max[axis] as f64).abs() < 1e-5);
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let (a, _) = build(0.1, 1.0);
    let (b, _) = build(0.1, 1.0);

    assert_eq!(
        encode(&a, ExportFormat::Obj).unwrap(),
        encode(&b, ExportFormat::Obj).unwrap()
    );
    assert_eq!(
        encode(&a, ExportFormat::Stl).unwrap(),
        encode(&b, ExportFormat::Stl).unwrap()
    );
}

#[test]
fn test_single_block_obj_golden() {
    let mut px = vec![255u8; 9];
    px[4] = 0;
    let meta = MapMetadata::new(1.0, Pose2D::new(0.0, 0.0, 0.0));
    let grid = OccupancyGrid::from_raster(px, 3, 3, &meta).unwrap();
    let binary = BinaryGrid::from_occupancy(&grid, Default::default());
    let walls = WallExtractor::default().extract_from_binary(&binary);
    let mesh = MeshBuilder::default()
        .build(&walls, &binary, &grid.frame())
        .unwrap();

    let mut buf = Vec::new();
    write_obj(&mesh, &mut buf).unwrap();

    let expected = "\
# gridmesh OBJ
# vertices: 12
# triangles: 14
o map
v 0.000000 0.000000 0.000000
v 3.000000 0.000000 0.000000
v 3.000000 3.000000 0.000000
v 0.000000 3.000000 0.000000
v 1.000000 1.000000 0.000000
v 2.000000 1.000000 0.000000
v 2.000000 2.000000 0.000000
v 1.000000 2.000000 0.000000
v 1.000000 1.000000 1.000000
v 2.000000 1.000000 1.000000
v 2.000000 2.000000 1.000000
v 1.000000 2.000000 1.000000
f 1 2 3
f 1 3 4
f 5 8 7
f 5 7 6
f 9 10 11
f 9 11 12
f 5 6 10
f 5 10 9
f 8 12 11
f 8 11 7
f 5 9 12
f 5 12 8
f 6 7 11
f 6 11 10
";
    assert_eq!(String::from_utf8(buf).unwrap(), expected);
    assert_eq!(encode(&mesh, ExportFormat::Obj).unwrap(), expected.as_bytes());
}
