// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid to mesh conversion
//!
//! Stages run in a fixed order: threshold, extract walls, build the mesh,
//! encode every requested format in memory, then write. Output paths are
//! checked before any work is done, and files are only renamed into place
//! once every format has been staged, so a failed run leaves no partial
//! output behind.

use crate::config::ConversionConfig;
use crate::error::Result;
use crate::source::GridInput;
use gridmesh_core::{BinaryGrid, GridFrame, WallCellSet, WallExtractor};
use gridmesh_geometry::{
    check_writable, ExportFormat, ExportedFile, Mesh, MeshBuilder, MeshExporter,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A built mesh with the wall cells and frame it came from
#[derive(Debug, Clone)]
pub struct MapMesh {
    pub mesh: Mesh,
    pub walls: WallCellSet,
    pub frame: GridFrame,
}

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    /// Requested output first, companion (if any) second
    pub files: Vec<ExportedFile>,
    pub grid_width: usize,
    pub grid_height: usize,
    /// One cuboid per wall cell
    pub wall_cells: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
}

impl ExportResult {
    /// Path of the requested output
    pub fn primary_path(&self) -> Option<&Path> {
        self.files.first().map(|f| f.path.as_path())
    }
}

/// A single map to convert as part of a batch
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: GridInput,
    pub output: PathBuf,
}

/// Run thresholding, wall extraction and mesh building without writing
pub fn build_mesh(input: &GridInput, config: &ConversionConfig) -> Result<MapMesh> {
    config.validate()?;

    let grid = input.to_grid()?;
    if grid.origin().yaw != 0.0 {
        tracing::warn!(
            yaw = grid.origin().yaw,
            "Map origin has a yaw; the mesh is built axis-aligned"
        );
    }

    let frame = grid.frame();
    let binary = BinaryGrid::from_occupancy(&grid, config.band_policy);
    let walls = WallExtractor::new(config.extractor_config()).extract_from_binary(&binary);
    let mesh = MeshBuilder::new(config.builder_config()).build(&walls, &binary, &frame)?;

    Ok(MapMesh { mesh, walls, frame })
}

/// Convert a map into a mesh file at `output_path`
///
/// The format follows the extension of `output_path`. With
/// [`ConversionConfig::companion`] set, the other format is written next to
/// it with the same stem.
pub fn convert(
    input: &GridInput,
    config: &ConversionConfig,
    output_path: &Path,
) -> Result<ExportResult> {
    let span = tracing::info_span!("convert", output = %output_path.display());
    let _enter = span.enter();
    let start = Instant::now();

    config.validate()?;
    let targets = output_targets(output_path, config.companion)?;
    for (path, _) in &targets {
        check_writable(path)?;
    }

    let MapMesh { mesh, walls, frame } = build_mesh(input, config)?;

    let paths: Vec<PathBuf> = targets.into_iter().map(|(path, _)| path).collect();
    let files = MeshExporter::new().export_all(&mesh, &paths)?;

    let (min, max) = mesh.bounds();
    let result = ExportResult {
        files,
        grid_width: frame.width,
        grid_height: frame.height,
        wall_cells: walls.len(),
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        bounds_min: [min.x, min.y, min.z],
        bounds_max: [max.x, max.y, max.z],
    };

    tracing::info!(
        files = result.files.len(),
        wall_cells = result.wall_cells,
        triangles = result.triangles,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Conversion complete"
    );

    Ok(result)
}

/// Convert several maps in parallel, one result per job in job order
pub fn convert_batch(
    jobs: &[ConversionJob],
    config: &ConversionConfig,
) -> Vec<Result<ExportResult>> {
    tracing::info!(jobs = jobs.len(), "Starting batch conversion");

    jobs.par_iter()
        .map(|job| convert(&job.input, config, &job.output))
        .collect()
}

fn output_targets(output_path: &Path, companion: bool) -> Result<Vec<(PathBuf, ExportFormat)>> {
    let primary = ExportFormat::from_path(output_path)?;
    let mut targets = vec![(output_path.to_path_buf(), primary)];

    if companion {
        let other = primary.companion();
        targets.push((output_path.with_extension(other.extension()), other));
    }

    Ok(targets)
}
