// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall cell extraction
//!
//! A wall cell is an occupied cell with at least one free (or out-of-grid)
//! neighbour. Equivalently, the occupied cells minus their single-step
//! erosion. Cells buried inside an occupied region expose no geometry and
//! are dropped.

use crate::binary::{AmbiguousPolicy, BinaryGrid, CellState};
use crate::frame::GridCell;
use crate::grid::OccupancyGrid;
use crate::morphology::{erode, Connectivity};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Boundary cells of the occupied region, in row-major order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallCellSet {
    cells: Vec<GridCell>,
}

impl WallCellSet {
    /// Cells must already be sorted row-major without duplicates
    fn from_sorted(cells: Vec<GridCell>) -> Self {
        debug_assert!(cells.windows(2).all(|w| w[0] < w[1]));
        Self { cells }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, GridCell> {
        self.cells.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }
}

impl<'a> IntoIterator for &'a WallCellSet {
    type Item = &'a GridCell;
    type IntoIter = std::slice::Iter<'a, GridCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Strategy used to find boundary cells. Both produce the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Direct neighbourhood test per occupied cell (row-parallel)
    #[default]
    Neighborhood,
    /// Occupied cells minus their erosion
    Erosion,
}

/// Wall extraction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub connectivity: Connectivity,
    pub band_policy: AmbiguousPolicy,
    pub method: ExtractionMethod,
    /// Split the neighbourhood scan across rows with rayon
    pub parallel: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            band_policy: AmbiguousPolicy::Occupied,
            method: ExtractionMethod::Neighborhood,
            parallel: true,
        }
    }
}

/// Finds wall cells in occupancy grids
#[derive(Debug, Clone, Default)]
pub struct WallExtractor {
    config: ExtractorConfig,
}

impl WallExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Threshold `grid` and extract its wall cells
    pub fn extract(&self, grid: &OccupancyGrid) -> WallCellSet {
        let binary = BinaryGrid::from_occupancy(grid, self.config.band_policy);
        self.extract_from_binary(&binary)
    }

    /// Extract wall cells from an already thresholded grid
    pub fn extract_from_binary(&self, binary: &BinaryGrid) -> WallCellSet {
        let walls = match self.config.method {
            ExtractionMethod::Neighborhood => self.scan_neighbourhood(binary),
            ExtractionMethod::Erosion => boundary_by_erosion(binary, self.config.connectivity),
        };

        tracing::info!(
            occupied = binary.occupied_count(),
            walls = walls.len(),
            connectivity = ?self.config.connectivity,
            method = ?self.config.method,
            "Extracted wall cells"
        );

        walls
    }

    fn scan_neighbourhood(&self, binary: &BinaryGrid) -> WallCellSet {
        let offsets = self.config.connectivity.offsets();

        let cells = if self.config.parallel {
            // Row results are collected in order, so output matches the serial scan
            (0..binary.height())
                .into_par_iter()
                .map(|row| scan_row(binary, row, offsets))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            (0..binary.height())
                .flat_map(|row| scan_row(binary, row, offsets))
                .collect()
        };

        WallCellSet::from_sorted(cells)
    }
}

fn scan_row(binary: &BinaryGrid, row: usize, offsets: &[(isize, isize)]) -> Vec<GridCell> {
    (0..binary.width())
        .filter(|&col| is_boundary(binary, row, col, offsets))
        .map(|col| GridCell::new(row, col))
        .collect()
}

#[inline]
fn is_boundary(binary: &BinaryGrid, row: usize, col: usize, offsets: &[(isize, isize)]) -> bool {
    if binary.get(row, col) != Some(CellState::Occupied) {
        return false;
    }
    let (r, c) = (row as isize, col as isize);
    offsets
        .iter()
        .any(|&(dr, dc)| !binary.is_occupied_at(r + dr, c + dc))
}

fn boundary_by_erosion(binary: &BinaryGrid, connectivity: Connectivity) -> WallCellSet {
    let eroded = erode(binary, connectivity);
    let width = binary.width();

    let cells = binary
        .cells()
        .iter()
        .zip(eroded.cells())
        .enumerate()
        .filter(|(_, (before, after))| {
            **before == CellState::Occupied && **after == CellState::Free
        })
        .map(|(i, _)| GridCell::new(i / width, i % width))
        .collect();

    WallCellSet::from_sorted(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MapMetadata, Pose2D};

    const O: CellState = CellState::Occupied;
    const F: CellState = CellState::Free;

    fn binary(width: usize, height: usize, cells: Vec<CellState>) -> BinaryGrid {
        BinaryGrid::from_cells(width, height, cells).unwrap()
    }

    /// Deterministic pseudo-random pattern (LCG)
    fn noisy(width: usize, height: usize, seed: u64) -> BinaryGrid {
        let mut state = seed;
        let cells = (0..width * height)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                if (state >> 33) % 3 == 0 {
                    F
                } else {
                    O
                }
            })
            .collect();
        binary(width, height, cells)
    }

    fn serial(connectivity: Connectivity, method: ExtractionMethod) -> WallExtractor {
        WallExtractor::new(ExtractorConfig {
            connectivity,
            method,
            parallel: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_isolated_centre_cell() {
        // Raster: white everywhere except a black centre pixel
        let meta = MapMetadata::new(1.0, Pose2D::default());
        let mut pixels = vec![255u8; 9];
        pixels[4] = 0;
        let grid = OccupancyGrid::from_raster(pixels, 3, 3, &meta).unwrap();

        let walls = WallExtractor::default().extract(&grid);

        assert_eq!(walls.as_slice(), &[GridCell::new(1, 1)]);
    }

    #[test]
    fn test_fully_occupied_keeps_only_border_ring() {
        let grid = binary(5, 4, vec![O; 20]);
        let walls = WallExtractor::default().extract_from_binary(&grid);

        // 2*5 + 2*(4-2) border cells
        assert_eq!(walls.len(), 14);
        assert!(walls.contains(GridCell::new(0, 0)));
        assert!(walls.contains(GridCell::new(3, 4)));
        assert!(!walls.contains(GridCell::new(1, 1)));
        assert!(!walls.contains(GridCell::new(2, 3)));
    }

    #[test]
    fn test_fully_free_has_no_walls() {
        let grid = binary(6, 6, vec![F; 36]);
        assert!(WallExtractor::default().extract_from_binary(&grid).is_empty());
    }

    #[test]
    fn test_diagonal_gap_depends_on_connectivity() {
        // Centre cell only touches free space through a corner
        #[rustfmt::skip]
        let grid = binary(5, 5, vec![
            O, O, O, O, O,
            O, O, O, O, O,
            O, O, O, O, O,
            O, O, O, F, O,
            O, O, O, O, O,
        ]);

        let eight =
            serial(Connectivity::Eight, ExtractionMethod::Neighborhood).extract_from_binary(&grid);
        let four =
            serial(Connectivity::Four, ExtractionMethod::Neighborhood).extract_from_binary(&grid);

        assert!(eight.contains(GridCell::new(2, 2)));
        assert!(!four.contains(GridCell::new(2, 2)));
        assert!(four.contains(GridCell::new(2, 3)));
    }

    #[test]
    fn test_output_is_row_major() {
        let grid = noisy(17, 11, 7);
        let walls = WallExtractor::default().extract_from_binary(&grid);
        assert!(walls.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_erosion_matches_neighbourhood() {
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            for seed in [1u64, 42, 1234] {
                let grid = noisy(23, 19, seed);
                let by_scan = serial(connectivity, ExtractionMethod::Neighborhood)
                    .extract_from_binary(&grid);
                let by_erosion =
                    serial(connectivity, ExtractionMethod::Erosion).extract_from_binary(&grid);
                assert_eq!(by_scan, by_erosion, "{:?} seed {}", connectivity, seed);
            }
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let grid = noisy(64, 48, 99);
        let parallel = WallExtractor::default().extract_from_binary(&grid);
        let sequential =
            serial(Connectivity::Eight, ExtractionMethod::Neighborhood).extract_from_binary(&grid);
        assert_eq!(parallel, sequential);
    }
}
